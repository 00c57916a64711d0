//! Shared utility functions.

mod text;

pub use text::{contains_all, normalize_for_match};
