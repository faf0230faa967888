//! Sources of order records.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::order::{orders_from_json, Order};

/// Errors raised while fetching orders.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    /// The request did not complete (connection, timeout, body read).
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    /// The payload is not a JSON array of orders.
    #[error("malformed order payload from {origin}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    /// A local order file could not be read.
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Supplies the list of orders shown to the user.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Fetches every order, in the order the source returns them.
    async fn fetch_orders(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Human readable origin, used in log lines and notices.
    fn describe(&self) -> String;
}

/// Fetches orders with `GET <endpoint>`.
#[derive(Clone, Debug)]
pub struct HttpOrderRepository {
    client: Client,
    endpoint: Url,
}

impl HttpOrderRepository {
    /// Creates a repository whose requests give up after `timeout`.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RepositoryError::Client)?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl OrderRepository for HttpOrderRepository {
    async fn fetch_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let url = self.endpoint.to_string();
        let transport = |source| RepositoryError::Transport {
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        orders_from_json(&body).map_err(|source| RepositoryError::Decode {
            origin: url.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}

/// Reads orders from a local JSON file with the same schema as the API.
#[derive(Clone, Debug)]
pub struct FileOrderRepository {
    path: PathBuf,
}

impl FileOrderRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl OrderRepository for FileOrderRepository {
    async fn fetch_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| RepositoryError::Io {
                path: self.path.clone(),
                source,
            })?;
        orders_from_json(&bytes).map_err(|source| RepositoryError::Decode {
            origin: self.path.display().to_string(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Result of a fetch that may be abandoned.
#[derive(Debug)]
pub enum FetchOutcome {
    Loaded(Vec<Order>),
    Failed(RepositoryError),
    /// The caller went away before the fetch finished; nothing should be updated.
    Cancelled,
}

/// Fetches orders from `repository` unless `cancel` resolves first.
pub async fn load_orders<R, C>(repository: &R, cancel: C) -> FetchOutcome
where
    R: OrderRepository + ?Sized,
    C: Future<Output = ()>,
{
    tokio::select! {
        result = repository.fetch_orders() => match result {
            Ok(orders) => {
                info!("fetched {} order(s) from {}", orders.len(), repository.describe());
                FetchOutcome::Loaded(orders)
            }
            Err(err) => {
                error!("error fetching orders from {}: {}", repository.describe(), err);
                FetchOutcome::Failed(err)
            }
        },
        _ = cancel => {
            info!("fetch from {} cancelled", repository.describe());
            FetchOutcome::Cancelled
        }
    }
}
