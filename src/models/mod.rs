//! Data models for ENEM acquisition.

mod exam;

pub use exam::{DocumentCategory, DocumentKind, DocumentLink, Sitting, Year};
