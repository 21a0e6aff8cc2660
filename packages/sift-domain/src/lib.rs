pub mod analysis;
pub mod preprocess;

pub use analysis::{AttributeKind, AttributeRef, QueryAnalysis, SearchMethod, analyze};
pub use preprocess::preprocess;
