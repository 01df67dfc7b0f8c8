pub mod handle;
pub mod vector;

pub use handle::IndexHandle;
pub use vector::{IndexEntry, IndexManifest, VectorIndex};
