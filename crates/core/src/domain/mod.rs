// Domain Layer - Pure fact document types and text parsing

pub mod facts;

// Re-exports
pub use facts::{parse_delimited_map, parse_delimited_records};
pub use facts::{HostFacts, OsFacts, ProcessFacts};
