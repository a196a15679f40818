//! DNS module.
//!
//! This module decodes raw RIPE Atlas DNS results:
//! - Result objects (single `result` or `resultset`)
//! - Base64 answer buffers

pub mod abuf;
pub mod types;

pub use abuf::{AnswerBuffer, AnswerRecord};
pub use types::*;
