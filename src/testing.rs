// ===============================
// src/testing.rs (test doubles)
// ===============================
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::subscriber::DefaultGuard;

use crate::domain::{AssetBalance, OrderId, OrderRequest, Symbol};
use crate::gateway::{TradingVenue, VenueError};
use crate::session::Terminal;

/// In-memory venue. `balances: None` makes balance reads fail;
/// `reject_orders` makes order create/query fail with -2019 / -2013.
pub struct FakeVenue {
    pub ping_ok: bool,
    pub balances: Option<Vec<AssetBalance>>,
    pub reject_orders: bool,
    pub(crate) balances_offline: AtomicBool,
    pub(crate) placed: Mutex<Vec<OrderRequest>>,
}

impl Default for FakeVenue {
    fn default() -> Self {
        Self {
            ping_ok: true,
            balances: Some(Vec::new()),
            reject_orders: false,
            balances_offline: AtomicBool::new(false),
            placed: Mutex::new(Vec::new()),
        }
    }
}

impl FakeVenue {
    pub fn with_balances(rows: &[(&str, Decimal)]) -> Self {
        let balances = rows
            .iter()
            .map(|(asset, avail)| AssetBalance {
                asset: asset.to_string(),
                available_balance: *avail,
            })
            .collect();
        Self { balances: Some(balances), ..Self::default() }
    }

    /// Make every later balance read fail, e.g. after a successful startup.
    pub fn take_balances_offline(&self) {
        self.balances_offline.store(true, Ordering::SeqCst);
    }

    pub fn placed(&self) -> Vec<OrderRequest> {
        self.placed.lock().unwrap().clone()
    }
}

fn rejected(code: i64, msg: &str) -> VenueError {
    VenueError::Api { status: 400, code: Some(code), msg: msg.to_string() }
}

#[async_trait]
impl TradingVenue for FakeVenue {
    fn endpoint(&self) -> &str {
        "fake://venue"
    }

    async fn ping(&self) -> Result<(), VenueError> {
        if self.ping_ok {
            Ok(())
        } else {
            Err(VenueError::Decode("ping refused".into()))
        }
    }

    async fn create_order(&self, req: &OrderRequest) -> Result<Value, VenueError> {
        if self.reject_orders {
            return Err(rejected(-2019, "Margin is insufficient."));
        }
        let mut placed = self.placed.lock().unwrap();
        placed.push(req.clone());
        Ok(json!({
            "orderId": placed.len() as u64,
            "symbol": req.symbol.as_str(),
            "status": "NEW",
            "origQty": req.quantity.to_string(),
        }))
    }

    async fn query_order(&self, symbol: &Symbol, order_id: &OrderId) -> Result<Value, VenueError> {
        if self.reject_orders {
            return Err(rejected(-2013, "Order does not exist."));
        }
        Ok(json!({"orderId": order_id.as_str(), "symbol": symbol.as_str(), "status": "FILLED"}))
    }

    async fn balances(&self) -> Result<Vec<AssetBalance>, VenueError> {
        if self.balances_offline.load(Ordering::SeqCst) {
            return Err(VenueError::Decode("balance endpoint offline".into()));
        }
        self.balances.clone().ok_or_else(|| rejected(-1022, "Signature for this request is not valid."))
    }
}

/// Feeds canned lines and records everything written, prompts included.
#[derive(Default)]
pub struct ScriptedTerminal {
    inputs: VecDeque<String>,
    pub output: String,
}

impl ScriptedTerminal {
    pub fn new(lines: &[&str]) -> Self {
        Self { inputs: lines.iter().map(|s| s.to_string()).collect(), output: String::new() }
    }
}

impl Terminal for ScriptedTerminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.output.push_str(prompt);
        let line = self.inputs.pop_front();
        if let Some(l) = &line {
            self.output.push_str(l);
            self.output.push('\n');
        }
        Ok(line)
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.output.push_str(line);
        self.output.push('\n');
        Ok(())
    }
}

/// In-memory log sink. `install` scopes a plain fmt subscriber to the current
/// thread for as long as the guard lives.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap()).lines().map(str::to_string).collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
