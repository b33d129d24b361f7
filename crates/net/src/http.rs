//! HTTP-backed catalog and archive source

use crate::client::{NetClient, NetConfig};
use crate::payload::decode_listing;
use crate::source::{ArchiveSource, CatalogQuery, CatalogSource};
use async_trait::async_trait;
use modman_config::NetworkConfig;
use modman_errors::{Error, NetworkError};
use modman_types::ListingEntry;
use url::Url;

/// Catalog endpoint, relative to the API root
const MOD_ENDPOINT: &str = "mod";

/// Remote catalog reached over HTTP
#[derive(Clone)]
pub struct HttpCatalog {
    client: NetClient,
    api_url: Url,
    download_base_url: Url,
}

impl HttpCatalog {
    /// Create a catalog client
    ///
    /// # Errors
    ///
    /// Returns an error if either URL is malformed or the client cannot be built.
    pub fn new(client: NetClient, api_url: &str, download_base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            client,
            api_url: parse_base(api_url)?,
            download_base_url: parse_base(download_base_url)?,
        })
    }

    /// Create a catalog client from network settings
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URLs are malformed or the client cannot be built.
    pub fn from_config(config: &NetworkConfig) -> Result<Self, Error> {
        let client = NetClient::new(NetConfig::from(config))?;
        Self::new(client, &config.api_url, &config.download_base_url)
    }

    /// URL of a catalog search
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be joined onto the API root.
    pub fn query_url(&self, query: &CatalogQuery) -> Result<Url, Error> {
        let mut url = self
            .api_url
            .join(MOD_ENDPOINT)
            .map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("search", &query.search)
            .append_pair("status", &query.status)
            .append_pair("sort", &query.sort_field)
            .append_pair("sortDirection", &query.sort_direction.to_string());
        Ok(url)
    }

    /// Resolve a listing download URL
    ///
    /// Listings carry path fragments such as `/uploads/<id>/steam/x.zip`;
    /// those are joined onto the download base. Absolute URLs pass through.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is not a valid URL.
    pub fn download_url(&self, fragment: &str) -> Result<Url, Error> {
        if let Ok(absolute) = Url::parse(fragment) {
            return Ok(absolute);
        }
        self.download_base_url
            .join(fragment.trim_start_matches('/'))
            .map_err(|e| NetworkError::InvalidUrl(format!("{fragment}: {e}")).into())
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<ListingEntry>, Error> {
        let url = self.query_url(query)?;
        let body = self.client.get_bytes(url.as_str()).await?;
        decode_listing(&body)
    }
}

#[async_trait]
impl ArchiveSource for HttpCatalog {
    async fn fetch_archive(&self, url: &str) -> Result<Vec<u8>, Error> {
        let url = self.download_url(url)?;
        self.client.get_bytes(url.as_str()).await
    }
}

/// Parse a base URL so that relative joins append to its path
fn parse_base(raw: &str) -> Result<Url, Error> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&with_slash).map_err(|e| NetworkError::InvalidUrl(format!("{raw}: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> HttpCatalog {
        let client = NetClient::with_defaults().unwrap();
        HttpCatalog::new(client, "https://beatmods.com/api/v1", "https://beatmods.com").unwrap()
    }

    #[test]
    fn test_query_url() {
        let query = CatalogQuery::default().with_search("song core");
        let url = catalog().query_url(&query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://beatmods.com/api/v1/mod?search=song+core&status=approved&sort=name_lower&sortDirection=1"
        );
    }

    #[test]
    fn test_download_url_joins_fragment() {
        let url = catalog()
            .download_url("/uploads/5e1a/steam/SongCore.zip")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://beatmods.com/uploads/5e1a/steam/SongCore.zip"
        );

        let absolute = catalog()
            .download_url("https://mirror.example/x.zip")
            .unwrap();
        assert_eq!(absolute.host_str(), Some("mirror.example"));
    }

    #[test]
    fn test_invalid_base_url() {
        let client = NetClient::with_defaults().unwrap();
        assert!(HttpCatalog::new(client, "not a url", "https://beatmods.com").is_err());
    }
}
