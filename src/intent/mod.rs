pub mod schema;
pub mod store;

pub use schema::{parse_spec, ActiveIntentsSpec, IntentDefinition, IntentStatus};
pub use store::{IntentStore, SelectedIntent};
