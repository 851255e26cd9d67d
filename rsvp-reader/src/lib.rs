//! RSVP speed reader: a file-backed bookshelf plus a word-at-a-time pacer.
//!
//! Fully independent of the listing pipeline; keep it or drop it without
//! touching anything else.

mod reader;
mod store;

pub use reader::*;
pub use store::*;
