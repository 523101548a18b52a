pub mod paths;

pub use paths::{OrchestrationPaths, PathUtils};
