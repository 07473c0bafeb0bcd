// ===============================
// src/gateway.rs (venue seam + trading facade)
// ===============================
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn, Instrument, Span};

use crate::domain::{AssetBalance, OrderId, OrderRequest, OrderResult, Symbol};

#[derive(Debug, Error)]
pub enum VenueError {
    /// Venue answered with a non-2xx status (order or request rejected).
    #[error("venue rejected request (http {status}): {msg}")]
    Api { status: u16, code: Option<i64>, msg: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Remote operations the facade needs. Implemented by the Binance client and
/// by test fakes.
#[async_trait]
pub trait TradingVenue: Send + Sync {
    fn endpoint(&self) -> &str;
    async fn ping(&self) -> Result<(), VenueError>;
    async fn create_order(&self, req: &OrderRequest) -> Result<Value, VenueError>;
    async fn query_order(&self, symbol: &Symbol, order_id: &OrderId) -> Result<Value, VenueError>;
    async fn balances(&self) -> Result<Vec<AssetBalance>, VenueError>;
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("liveness check against {endpoint} failed: {source}")]
    Ping {
        endpoint: String,
        #[source]
        source: VenueError,
    },
    #[error("initial {asset} balance read failed: {source}")]
    Balance {
        asset: String,
        #[source]
        source: VenueError,
    },
}

/// Single live session to the venue.
///
/// Every remote failure after [`Trader::initialize`] is logged and turned
/// into `None`; nothing here returns an error to the menu loop.
pub struct Trader<V> {
    venue: V,
    asset: String,
    span: Span,
}

fn log_venue_error(e: &VenueError, what: &str) {
    match e {
        VenueError::Api { status, code, msg } => {
            error!(http_status = status, code = ?code, msg = %msg, "API error {what}")
        }
        other => error!(error = %other, "unexpected error {what}"),
    }
}

fn pick_available(balances: &[AssetBalance], asset: &str) -> Option<Decimal> {
    balances.iter().find(|b| b.asset == asset).map(|b| b.available_balance)
}

impl<V: TradingVenue> Trader<V> {
    /// Ping plus one balance read. Either failing means no usable session.
    pub async fn initialize(venue: V, asset: impl Into<String>, span: Span) -> Result<Self, ConnectionError> {
        let asset = asset.into();
        async {
            info!(endpoint = venue.endpoint(), asset = %asset, "initializing trading client");
            venue.ping().await.map_err(|source| {
                error!(error = %source, "liveness check failed, check API keys and network");
                ConnectionError::Ping { endpoint: venue.endpoint().to_string(), source }
            })?;
            let balances = venue.balances().await.map_err(|source| {
                error!(error = %source, "initial balance read failed");
                ConnectionError::Balance { asset: asset.clone(), source }
            })?;
            match pick_available(&balances, &asset) {
                Some(avail) => info!(asset = %asset, available = %avail, "available balance"),
                None => warn!(asset = %asset, "asset not found in futures account balance"),
            }
            info!("client initialized and connection successful");
            Ok::<_, ConnectionError>(())
        }
        .instrument(span.clone())
        .await?;

        Ok(Self { venue, asset, span })
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub async fn place_order(&self, req: &OrderRequest) -> Option<OrderResult> {
        async {
            info!(
                symbol = %req.symbol,
                side = %req.side,
                order_type = %req.order_type,
                quantity = %req.quantity,
                price = ?req.price,
                stop_price = ?req.stop_price,
                "placing order"
            );
            match self.venue.create_order(req).await {
                Ok(v) => {
                    let res = OrderResult(v);
                    info!(order_id = ?res.order_id(), status = ?res.status(), "order placed successfully");
                    debug!(response = %res.0, "order response");
                    Some(res)
                }
                Err(e) => {
                    log_venue_error(&e, "placing order");
                    None
                }
            }
        }
        .instrument(self.span.clone())
        .await
    }

    /// Available balance of the margin asset; zero when the venue does not
    /// list it at all.
    pub async fn get_balance(&self) -> Option<Decimal> {
        async {
            info!(asset = %self.asset, "fetching account balance");
            match self.venue.balances().await {
                Ok(balances) => match pick_available(&balances, &self.asset) {
                    Some(avail) => {
                        info!(asset = %self.asset, available = %avail, "available balance");
                        Some(avail)
                    }
                    None => {
                        warn!(asset = %self.asset, "asset not found in futures account balance");
                        Some(Decimal::ZERO)
                    }
                },
                Err(e) => {
                    log_venue_error(&e, "fetching balance");
                    None
                }
            }
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn get_order_status(&self, symbol: &Symbol, order_id: &OrderId) -> Option<OrderResult> {
        async {
            info!(symbol = %symbol, order_id = %order_id, "fetching order status");
            match self.venue.query_order(symbol, order_id).await {
                Ok(v) => {
                    let res = OrderResult(v);
                    info!(status = ?res.status(), "order status");
                    Some(res)
                }
                Err(e) => {
                    log_venue_error(&e, "fetching order");
                    None
                }
            }
        }
        .instrument(self.span.clone())
        .await
    }
}

#[cfg(test)]
impl<V> Trader<V> {
    pub fn venue(&self) -> &V {
        &self.venue
    }
}
