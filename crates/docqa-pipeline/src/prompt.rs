//! Prompt templates for grounded answering.

pub const SYSTEM_PROMPT: &str = "\
You are a helpful AI assistant that answers questions based on internal company documentation.

Your role is to:
1. Provide accurate, concise answers based ONLY on the provided context
2. Cite specific sources when answering
3. Admit when you don't have enough information to answer
4. Be professional and helpful

Guidelines:
- Always base your answers on the provided context
- If the context doesn't contain the answer, say so clearly
- Reference sources by their [Source N] tags
- Be conversational but maintain professionalism
- Keep answers focused and to the point";

/// Build the user prompt from the assembled context and the question.
pub fn build_query_prompt(context: &str, question: &str) -> String {
    format!(
        "Context information is below:\n\
         ---------------------\n\
         {context}\
         ---------------------\n\n\
         Given the context information above, please answer the following question.\n\
         If you cannot answer the question based on the context, say \
         \"I don't have enough information to answer this question.\"\n\n\
         Always cite the sources you used (by their [Source N] tags) when providing an answer.\n\n\
         Question: {question}\n\n\
         Answer: "
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_context_and_question() {
        let prompt = build_query_prompt("[Source 1: docs/a.md]\nsome text\n", "What is X?");
        assert!(prompt.contains("some text"));
        assert!(prompt.contains("Question: What is X?"));
        assert!(prompt.ends_with("Answer: "));
    }
}
