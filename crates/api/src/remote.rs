//! HTTP client for a catalog service running in another process.

use std::time::Duration;

use async_trait::async_trait;
use common::{ErrorBody, ErrorKind, Money, OrderLine, ProductId, ReservationToken, StockRequest};
use domain::{LookupError, ProductInfo, ProductLookup};
use reqwest::StatusCode;
use saga::{StockError, StockService};
use serde::Deserialize;
use thiserror::Error;

use crate::routes::stock::{FinalizeStock, ReleaseStock};

/// Where the catalog lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Error)]
#[error("failed to build catalog client: {0}")]
pub struct RemoteError(#[from] reqwest::Error);

/// Product lookups and stock calls against a remote catalog.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

/// The product fields the shop reads; the rest of the payload is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteProduct {
    id: ProductId,
    price: Money,
    stock_amount: u32,
}

impl CatalogClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Whether a failed send could have reached the catalog.
fn send_failure(e: reqwest::Error) -> StockError {
    if e.is_connect() {
        StockError::Unreachable(e.to_string())
    } else {
        StockError::OutcomeUnknown(e.to_string())
    }
}

async fn refusal(response: reqwest::Response) -> StockError {
    let status = response.status();
    if status.is_server_error() {
        return StockError::OutcomeUnknown(format!("catalog answered {status}"));
    }
    match response.json::<ErrorBody>().await {
        Ok(body) => StockError::Rejected {
            kind: body.kind,
            message: body.message,
        },
        Err(_) => StockError::Rejected {
            kind: ErrorKind::Rejected,
            message: format!("catalog answered {status}"),
        },
    }
}

#[async_trait]
impl StockService for CatalogClient {
    #[tracing::instrument(skip(self, requests), fields(lines = requests.len()))]
    async fn finalize(
        &self,
        token: ReservationToken,
        requests: &[StockRequest],
    ) -> Result<Vec<OrderLine>, StockError> {
        let response = self
            .client
            .post(self.url("/api/stock/finalize"))
            .json(&FinalizeStock {
                token,
                requests: requests.to_vec(),
            })
            .send()
            .await
            .map_err(send_failure)?;

        if !response.status().is_success() {
            return Err(refusal(response).await);
        }
        response
            .json::<Vec<OrderLine>>()
            .await
            .map_err(|e| StockError::OutcomeUnknown(format!("unreadable stock reply: {e}")))
    }

    #[tracing::instrument(skip(self))]
    async fn release(&self, token: ReservationToken) -> Result<(), StockError> {
        let response = self
            .client
            .post(self.url("/api/stock/release"))
            .json(&ReleaseStock { token })
            .send()
            .await
            .map_err(send_failure)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(refusal(response).await)
        }
    }
}

#[async_trait]
impl ProductLookup for CatalogClient {
    async fn product(&self, id: ProductId) -> Result<Option<ProductInfo>, LookupError> {
        let response = self
            .client
            .get(self.url(&format!("/api/products/{id}")))
            .send()
            .await
            .map_err(|e| LookupError(e.to_string()))?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let product = response
                    .json::<RemoteProduct>()
                    .await
                    .map_err(|e| LookupError(e.to_string()))?;
                Ok(Some(ProductInfo {
                    id: product.id,
                    price: product.price,
                    stock_amount: product.stock_amount,
                }))
            }
            status => Err(LookupError(format!("catalog answered {status}"))),
        }
    }
}
