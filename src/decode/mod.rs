//! Response envelope module
//!
//! Supports: bare lists and objects, `{"response": ...}`, `{"data": ...}`,
//! `{"items": ...}` and named-key envelopes
//!
//! # Overview
//!
//! Every controller wraps its list payloads differently. The decode module
//! unwraps a response body into a [`Payload`]: an ordered list of items, a
//! single object, or nothing. It also hosts the small JSON helpers shared by
//! the rest of the crate (dot-path lookup and deep merge).

mod decoders;
mod types;

pub use decoders::{merge_values, value_at_path};
pub use types::{Envelope, EnvelopeDecoder, Payload};
