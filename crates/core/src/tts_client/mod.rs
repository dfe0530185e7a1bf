//! TTS vendor abstraction.
//!
//! This module provides a `TtsClient` trait covering the three calls the batch
//! needs (submit a job, poll it, fetch the finished asset) and a Play.ht
//! implementation over HTTP.

mod playht;
mod types;

pub use playht::{PlayHtClient, PlayHtConfig};
pub use types::*;
