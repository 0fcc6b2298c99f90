//! Configuration validation
//!
//! Rejects out-of-range settings before any data is read or weights are
//! allocated.

mod error;
mod validator;

#[cfg(test)]
mod tests;

pub use error::ValidationError;
pub use validator::validate_config;
