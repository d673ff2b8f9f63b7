//! Parameter compatibility between a request body and one endpoint.
//!
//! ```rust
//! use llm_catalog::params::{RequestBody, validate};
//! # fn example(endpoint: &llm_catalog::models::Endpoint) -> llm_catalog::Result<()> {
//! let body = RequestBody::try_from(serde_json::json!({
//!     "max_tokens": 1024,
//!     "frequency_penalty": 0.5,
//! }))?;
//! let result = validate(&body, endpoint);
//! if !result.is_compatible() {
//!     // try the next endpoint
//! }
//! # Ok(())
//! # }
//! ```

mod request;
mod validate;

pub use request::{RequestBody, STREAM_OPTIONS};
pub use validate::{ValidationResult, format_validation_errors, translate_legacy, validate};
