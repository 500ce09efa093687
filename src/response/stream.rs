//! Tunnel URL construction seam.
//!
//! Building a tunnel envelope needs a URL that proxies the upstream media.
//! How that URL is minted (signing, storage of the stream entry, expiry) is
//! owned by whoever implements [`StreamFactory`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::ResponseData;

/// Errors a stream factory may report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("unsupported stream: {0}")]
    Unsupported(String),

    #[error("tunnel data has no url")]
    MissingUrl,

    #[error("stream creation failed: {0}")]
    Failed(String),
}

/// Produces the public URL for a tunnel response.
#[async_trait]
pub trait StreamFactory: Send + Sync {
    async fn create_stream(&self, data: &ResponseData) -> Result<String, StreamError>;
}

#[async_trait]
impl<T: StreamFactory + ?Sized> StreamFactory for &T {
    async fn create_stream(&self, data: &ResponseData) -> Result<String, StreamError> {
        (**self).create_stream(data).await
    }
}

#[async_trait]
impl<T: StreamFactory + ?Sized> StreamFactory for Arc<T> {
    async fn create_stream(&self, data: &ResponseData) -> Result<String, StreamError> {
        (**self).create_stream(data).await
    }
}

#[async_trait]
impl<T: StreamFactory + ?Sized> StreamFactory for Box<T> {
    async fn create_stream(&self, data: &ResponseData) -> Result<String, StreamError> {
        (**self).create_stream(data).await
    }
}

/// Adapts a synchronous closure into a [`StreamFactory`].
#[derive(Debug, Clone)]
pub struct FnStreamFactory<F>(pub F);

#[async_trait]
impl<F> StreamFactory for FnStreamFactory<F>
where
    F: Fn(&ResponseData) -> Result<String, StreamError> + Send + Sync,
{
    async fn create_stream(&self, data: &ResponseData) -> Result<String, StreamError> {
        (self.0)(data)
    }
}

/// Shorthand for [`FnStreamFactory`].
pub fn stream_fn<F>(f: F) -> FnStreamFactory<F>
where
    F: Fn(&ResponseData) -> Result<String, StreamError> + Send + Sync,
{
    FnStreamFactory(f)
}
