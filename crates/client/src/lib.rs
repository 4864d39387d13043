//! Read side of ReviewBot: the homework status API client and the
//! snapshot shape validation that guards the poll loop against
//! malformed third-party payloads.

pub mod api;
pub mod snapshot;

pub use api::{StatusClient, StatusSource};
