//! Request middleware.
//!
//! Purpose: define middleware components for request lifecycle concerns:
//! tracing, the response envelope, panic recovery, throttling and API key
//! authentication. The planet watcher lives with the HTTP adapter because
//! it drives a domain port.

pub mod api_key;
pub mod envelope;
pub mod recover;
pub mod throttle;
pub mod trace;

pub use api_key::{API_KEY_HEADER, RequireApiKey};
pub use envelope::{Envelope, EnvelopeStatus, ResponseEnvelope};
pub use recover::Recover;
pub use throttle::{Throttle, TokenBucket};
pub use trace::Trace;
