//!
//! Utility module for the guestbook client.
//!
//! Re-exports formatting helpers for presentation layers.
/// Display formatting for timestamps and addresses
pub mod index;

pub use index::{format_timestamp, shorten_address};
