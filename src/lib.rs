pub mod config;
pub mod error;
pub mod query;
pub mod schema;

pub use config::StreamSettings;
pub use error::{QueryDslError, Result};
pub use query::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
