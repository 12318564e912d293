//! URL handling module for Crawlet
//!
//! This module provides link normalization, host extraction, and the
//! allow-list / blacklist filter applied to every discovered link.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::extract_domain;
pub use filter::{is_allowed, is_blacklisted, is_domain_allowed};
pub use normalize::{has_scheme, is_http_url, normalize_link};
