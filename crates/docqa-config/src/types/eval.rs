//! Offline evaluation configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Concurrency cap for pipeline calls during an evaluation run.
    /// Results are merged in input order regardless of completion order.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub weights: MetricWeights,
}

/// Weighted contribution of each metric to the overall score.
/// Must sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricWeights {
    #[serde(default = "default_retrieval_weight")]
    pub retrieval: f32,
    #[serde(default = "default_faithfulness_weight")]
    pub faithfulness: f32,
    #[serde(default = "default_relevance_weight")]
    pub relevance: f32,
    #[serde(default = "default_completeness_weight")]
    pub completeness: f32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            weights: MetricWeights::default(),
        }
    }
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            retrieval: default_retrieval_weight(),
            faithfulness: default_faithfulness_weight(),
            relevance: default_relevance_weight(),
            completeness: default_completeness_weight(),
        }
    }
}

impl crate::validation::Validate for EvalConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;

        if self.concurrency == 0 {
            return Err(ConfigError::InvalidInteger {
                field: "eval.concurrency".to_string(),
                value: self.concurrency,
                min: 0,
            });
        }
        let sum = self.weights.retrieval
            + self.weights.faithfulness
            + self.weights.relevance
            + self.weights.completeness;
        if (sum - 1.0).abs() > 0.001 {
            return Err(ConfigError::InvalidWeightSum {
                field: "eval.weights".to_string(),
                expected: 1.0,
                actual: sum,
            });
        }
        Ok(())
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_retrieval_weight() -> f32 {
    0.30
}

fn default_faithfulness_weight() -> f32 {
    0.25
}

fn default_relevance_weight() -> f32 {
    0.25
}

fn default_completeness_weight() -> f32 {
    0.20
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;

    #[test]
    fn default_weights_sum_to_one() {
        assert!(EvalConfig::default().validate().is_ok());
    }

    #[test]
    fn skewed_weights_rejected() {
        let config = EvalConfig {
            weights: MetricWeights {
                retrieval: 0.9,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
