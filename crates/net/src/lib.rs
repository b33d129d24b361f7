#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for modman
//!
//! This crate defines the two collaborator seams the core depends on
//! ([`CatalogSource`] and [`ArchiveSource`]) and their HTTP implementation
//! with retry logic and compressed-payload decoding.

mod client;
mod http;
mod memory;
mod payload;
mod source;

pub use client::{NetClient, NetConfig};
pub use http::HttpCatalog;
pub use memory::MemorySource;
pub use payload::{decode_listing, inflate, PayloadEncoding};
pub use source::{ArchiveSource, CatalogQuery, CatalogSource};

use modman_errors::{Error, NetworkError};
use url::Url;

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()).into())
}
