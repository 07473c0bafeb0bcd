// ===============================
// src/session.rs (menu loop)
// ===============================
use std::io::{self, BufRead, Write};

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use tracing::warn;

use crate::builder::{build_order, OrderInput};
use crate::domain::OrderType;
use crate::gateway::{Trader, TradingVenue};
use crate::validate::{self, ValidationError};

/// Line-oriented terminal. `read_line` yields `None` once input is closed.
pub trait Terminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// stdin / stdout.
pub struct StdTerminal;

impl Terminal for StdTerminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        {
            let mut out = io::stdout().lock();
            out.write_all(prompt.as_bytes())?;
            out.flush()?;
        }
        let mut buf = String::new();
        match io::stdin().lock().read_line(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string())),
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{line}")
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("input closed")]
    InputClosed,
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    PlacingOrder,
    CheckingOrder,
    CheckingBalance,
    Exit,
}

impl Screen {
    pub fn from_choice(choice: &str) -> Option<Screen> {
        match choice {
            "1" => Some(Screen::PlacingOrder),
            "2" => Some(Screen::CheckingOrder),
            "3" => Some(Screen::CheckingBalance),
            "4" => Some(Screen::Exit),
            _ => None,
        }
    }
}

/// Run the menu until the user picks Exit.
///
/// Only terminal failures come back as errors, closed input included; venue
/// and validation failures are reported inline and the loop returns to the
/// main menu.
pub async fn run<V: TradingVenue, T: Terminal>(trader: &Trader<V>, term: &mut T) -> Result<(), SessionError> {
    let mut screen = Screen::MainMenu;
    loop {
        let step = match screen {
            Screen::MainMenu => main_menu(trader, term),
            Screen::PlacingOrder => place_order(trader, term).await.map(|_| Screen::MainMenu),
            Screen::CheckingOrder => check_order(trader, term).await.map(|_| Screen::MainMenu),
            Screen::CheckingBalance => check_balance(trader, term).await.map(|_| Screen::MainMenu),
            Screen::Exit => {
                term.write_line("Exiting. Goodbye!")?;
                return Ok(());
            }
        };
        screen = step?;
    }
}

fn main_menu<V: TradingVenue, T: Terminal>(trader: &Trader<V>, term: &mut T) -> Result<Screen, SessionError> {
    term.write_line("\n--- Main Menu ---")?;
    term.write_line("1: Place New Order")?;
    term.write_line("2: Check Order Status")?;
    term.write_line(&format!("3: Check {} Balance", trader.asset()))?;
    term.write_line("4: Exit")?;
    let choice = term.read_line("Enter your choice (1-4): ")?.ok_or(SessionError::InputClosed)?;
    match Screen::from_choice(choice.trim()) {
        Some(next) => Ok(next),
        None => {
            term.write_line("Invalid choice. Please enter a number between 1 and 4.")?;
            Ok(Screen::MainMenu)
        }
    }
}

/// Prompt until `parse` accepts the trimmed line.
fn ask<T: Terminal, R>(
    term: &mut T,
    prompt: &str,
    hint: &str,
    parse: impl Fn(&str) -> Result<R, ValidationError>,
) -> Result<R, SessionError> {
    loop {
        let line = term.read_line(prompt)?.ok_or(SessionError::InputClosed)?;
        match parse(line.trim()) {
            Ok(v) => return Ok(v),
            Err(e) => term.write_line(&format!("Invalid input: {hint}. Error: {e}. Please try again."))?,
        }
    }
}

async fn place_order<V: TradingVenue, T: Terminal>(trader: &Trader<V>, term: &mut T) -> Result<(), SessionError> {
    term.write_line("\n--- Place New Order ---")?;

    let symbol = ask(term, "Enter symbol (e.g., BTCUSDT): ", "Must be a valid symbol", validate::symbol)?;
    let side = ask(term, "Enter side (BUY / SELL): ", "Must be 'BUY' or 'SELL'", validate::side)?;

    let raw_type = term
        .read_line("Enter order type (MARKET / LIMIT / STOP_LIMIT): ")?
        .ok_or(SessionError::InputClosed)?;
    let order_type = match validate::order_type(raw_type.trim()) {
        Ok(t) => t,
        Err(e) => {
            warn!(input = %raw_type.trim(), "{e}");
            term.write_line("Invalid order type. Aborting.")?;
            return Ok(());
        }
    };

    let quantity = ask(term, "Enter quantity (e.g., 0.001): ", "Must be a positive number", validate::positive_decimal)?;

    let (price, stop_price) = match order_type {
        OrderType::Market => (None, None),
        OrderType::Limit => {
            let px = ask(term, "Enter limit price: ", "Must be a positive number", validate::positive_decimal)?;
            (Some(px), None)
        }
        OrderType::StopLimit => {
            let stop = ask(term, "Enter stop/trigger price: ", "Must be a positive number", validate::positive_decimal)?;
            let px = ask(
                term,
                "Enter limit price (once triggered): ",
                "Must be a positive number",
                validate::positive_decimal,
            )?;
            (Some(px), Some(stop))
        }
    };

    let built = match build_order(OrderInput { symbol, side, order_type, quantity, price, stop_price }) {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "invalid input during order creation");
            term.write_line(&format!("Invalid order: {e}"))?;
            return Ok(());
        }
    };
    if !built.warnings.is_empty() {
        term.write_line("Warning: Prices may lead to immediate or no fill. Proceeding...")?;
    }

    match trader.place_order(&built.request).await {
        Some(res) => {
            term.write_line("\n--- Order Placed Successfully ---")?;
            term.write_line(&res.pretty())?;
        }
        None => term.write_line("\n--- Order Failed to Place ---")?,
    }
    Ok(())
}

async fn check_order<V: TradingVenue, T: Terminal>(trader: &Trader<V>, term: &mut T) -> Result<(), SessionError> {
    term.write_line("\n--- Check Order Status ---")?;
    let symbol = ask(term, "Enter symbol (e.g., BTCUSDT): ", "Must be a valid symbol", validate::symbol)?;
    let order_id = ask(term, "Enter Order ID: ", "Must be numeric", validate::order_id)?;

    match trader.get_order_status(&symbol, &order_id).await {
        Some(res) => {
            term.write_line("\n--- Order Details ---")?;
            term.write_line(&res.pretty())?;
        }
        None => {
            term.write_line("\n--- Could not retrieve order ---")?;
            term.write_line("Please check the symbol and Order ID. See logs for details.")?;
        }
    }
    Ok(())
}

async fn check_balance<V: TradingVenue, T: Terminal>(trader: &Trader<V>, term: &mut T) -> Result<(), SessionError> {
    term.write_line("\n--- Checking Account Balance ---")?;
    match trader.get_balance().await {
        Some(bal) => term.write_line(&format!("Available {} Balance: {}", trader.asset(), format_amount(bal)))?,
        None => term.write_line("Could not retrieve balance. Check logs.")?,
    }
    Ok(())
}

/// 8 decimal places, comma-grouped integer part: `1,234.50000000`.
pub fn format_amount(value: Decimal) -> String {
    let mut v = value.round_dp_with_strategy(8, RoundingStrategy::MidpointNearestEven);
    v.rescale(8);
    let s = v.abs().to_string();
    let (int_part, frac) = s.split_once('.').unwrap_or((s.as_str(), "00000000"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if v.is_sign_negative() && !v.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}
