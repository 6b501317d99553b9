pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "lease_accounting")]
pub mod lease_accounting;

pub use error::LeaseEngineError;
pub use types::*;

/// Standard result type for all lease-engine operations
pub type LeaseEngineResult<T> = Result<T, LeaseEngineError>;
