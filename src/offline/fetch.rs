/// Network access for the offline layer
///
/// The dispatcher only sees the `Fetcher` trait, so the HTTP client can be
/// swapped for a scripted one.

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::Result;

pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return the response body
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;
}

/// `Fetcher` backed by a shared reqwest client
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        async move {
            let response = self.client.get(url).send().await?.error_for_status()?;
            let body = response.bytes().await?;
            Ok(body.to_vec())
        }
        .boxed()
    }
}
