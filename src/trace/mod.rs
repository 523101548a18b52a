pub mod knowledge;
pub mod ledger;
pub mod spatial;
pub mod store;

pub use knowledge::{KnowledgeFile, KnowledgeKind};
pub use ledger::{TraceLedger, TraceRecord};
pub use spatial::{OperationType, SpatialMap, SpatialMapEntry};
pub use store::{JsonLog, WriteStrategy};
