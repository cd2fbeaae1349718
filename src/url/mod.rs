//! URL handling module for Dynascrape
//!
//! This module resolves links found on fetched pages to absolute URLs and
//! derives the visit keys used to recognise a URL that was already queued.

mod normalize;
mod resolve;

pub use normalize::visit_key;
pub use resolve::{is_absolute, resolve_link};
