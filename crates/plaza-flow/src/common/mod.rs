//! Shared primitives used across feature slices.

mod request_id;

pub use request_id::{LatestOnly, RequestId};
