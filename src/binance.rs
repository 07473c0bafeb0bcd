// ===============================
// src/binance.rs
// ===============================
//
// Binance USDⓈ-M Futures REST: signer + client. Semua request private
// ditandatangani HMAC-SHA256 atas query string (timestamp + recvWindow).
//
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use crate::config::Credentials;
use crate::domain::{AssetBalance, OrderId, OrderRequest, OrderType, Symbol};
use crate::gateway::{TradingVenue, VenueError};

pub fn timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn sign_query(secret: &str, query: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(query.as_bytes());
    let sig = mac.finalize().into_bytes();
    hex::encode(sig)
}

pub fn encode_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Futures calls its stop-limit order `STOP` (price + stopPrice).
fn wire_order_type(t: OrderType) -> &'static str {
    match t {
        OrderType::Market => "MARKET",
        OrderType::Limit => "LIMIT",
        OrderType::StopLimit => "STOP",
    }
}

/// Request fields in venue shape. Decimals go out via `Display`, which keeps
/// the scale the user typed ("0.0010" stays "0.0010").
pub fn order_params(req: &OrderRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("symbol", req.symbol.to_string()),
        ("side", req.side.to_string()),
        ("type", wire_order_type(req.order_type).to_string()),
        ("quantity", req.quantity.to_string()),
    ];
    if let Some(px) = req.price {
        params.push(("price", px.to_string()));
    }
    if let Some(stop) = req.stop_price {
        params.push(("stopPrice", stop.to_string()));
    }
    if let Some(tif) = req.time_in_force {
        params.push(("timeInForce", tif.as_str().to_string()));
    }
    params
}

// ---- Error body: {"code": -2019, "msg": "Margin is insufficient."} ----
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

pub struct BinanceFutures {
    http: reqwest::Client,
    rest_base: String,
    creds: Credentials,
    recv_window: u64,
}

impl BinanceFutures {
    pub fn new(rest_base: impl Into<String>, creds: Credentials, recv_window: u64) -> Self {
        let rest_base = rest_base.into().trim_end_matches('/').to_string();
        Self { http: reqwest::Client::new(), rest_base, creds, recv_window }
    }

    async fn signed(
        &self,
        method: Method,
        path: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<Value, VenueError> {
        params.push(("recvWindow", self.recv_window.to_string()));
        params.push(("timestamp", timestamp_ms().to_string()));

        let query = encode_query(&params);
        let sig = sign_query(&self.creds.api_secret, &query);
        let url = format!("{}{}?{}&signature={}", self.rest_base, path, query, sig);

        let rsp = self
            .http
            .request(method, url)
            .header("X-MBX-APIKEY", &self.creds.api_key)
            .send()
            .await?;
        read_json(rsp).await
    }
}

async fn read_json(rsp: reqwest::Response) -> Result<Value, VenueError> {
    let status = rsp.status();
    let body = rsp.text().await?;
    if status.is_success() {
        return serde_json::from_str(&body).map_err(|e| VenueError::Decode(format!("{e}: {body}")));
    }
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(err) => Err(VenueError::Api { status: status.as_u16(), code: Some(err.code), msg: err.msg }),
        Err(_) => Err(VenueError::Api { status: status.as_u16(), code: None, msg: body }),
    }
}

#[async_trait]
impl TradingVenue for BinanceFutures {
    fn endpoint(&self) -> &str {
        &self.rest_base
    }

    async fn ping(&self) -> Result<(), VenueError> {
        let url = format!("{}/fapi/v1/ping", self.rest_base);
        let rsp = self.http.get(url).send().await?;
        read_json(rsp).await.map(|_| ())
    }

    async fn create_order(&self, req: &OrderRequest) -> Result<Value, VenueError> {
        self.signed(Method::POST, "/fapi/v1/order", order_params(req)).await
    }

    async fn query_order(&self, symbol: &Symbol, order_id: &OrderId) -> Result<Value, VenueError> {
        let params = vec![("symbol", symbol.to_string()), ("orderId", order_id.to_string())];
        self.signed(Method::GET, "/fapi/v1/order", params).await
    }

    async fn balances(&self) -> Result<Vec<AssetBalance>, VenueError> {
        let v = self.signed(Method::GET, "/fapi/v2/balance", Vec::new()).await?;
        serde_json::from_value(v).map_err(|e| VenueError::Decode(e.to_string()))
    }
}
