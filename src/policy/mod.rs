pub mod analysis;
pub mod constraints;

pub use analysis::{MutationClass, SemanticAnalyzer};
pub use constraints::{ConstraintValidator, ConstraintVerdict};
