// Capstan Core - Transport Contract & Domain Types
// NO infrastructure dependencies (Hexagonal Architecture)

pub mod context;
pub mod domain;
pub mod error;
pub mod port;

pub use context::Context;
pub use error::{ConnectorError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
