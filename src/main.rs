// ===============================
// src/main.rs
// ===============================
/*
 cd ~/rust/futures_cli

 # testnet (default), kredensial dari .env:
 #   BINANCE_TEST_KEY=...   BINANCE_TEST_SECRET=...
 cargo run

 # mainnet, log ke lokasi lain
 cargo run -- --mode mainnet --log-file /var/log/futures_cli.log
*/
/*
=============================================================================
Project : futures_cli — interactive Binance Futures order client in Rust
Module  : main.rs
Version : 0.1.0
Author  : futures_cli contributors
License : MIT (see LICENSE)

Summary : Menu-driven CLI that validates user input, places MARKET / LIMIT /
          STOP_LIMIT orders on Binance USDⓈ-M Futures (testnet by default),
          looks up order status and margin balance, and logs every call.

(c) 2025 futures_cli contributors.
=============================================================================
*/
mod domain;
mod config;
mod logging;
mod validate;
mod builder;
mod binance;          // signer + REST client Binance Futures
mod gateway;          // TradingVenue seam + Trader facade
mod session;          // menu loop
#[cfg(test)]
mod testing;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use console::style;
use tracing::{error, info};

use crate::binance::BinanceFutures;
use crate::config::{Cli, Credentials};
use crate::gateway::Trader;
use crate::logging::LogContext;
use crate::session::StdTerminal;

#[tokio::main]
async fn main() -> ExitCode {
    // .env dulu, supaya clap bisa baca env fallback-nya
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // ---- Logging ----
    let log = match logging::init(&cli.log_file) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("failed to configure logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli, &log).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "critical error, exiting");
            println!(
                "A critical error occurred: {e:#}. Check {} for details.",
                log.file().display()
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, log: &LogContext) -> anyhow::Result<()> {
    println!("=========================================");
    println!("{}", style("=   Binance Futures Trading CLI        =").bold());
    println!("=========================================");

    // ---- Credentials ----
    let creds = Credentials::resolve(cli.mode, config::env_var, |var| {
        println!("{var} not found in .env file.");
        config::prompt_secret(&format!("Enter {var}: "))
    })?;

    let rest_url = cli.rest_url();
    info!(
        mode = %cli.mode,
        rest = %rest_url,
        asset = %cli.asset,
        recv_window = cli.recv_window,
        log_file = %log.file().display(),
        "startup config"
    );

    // ---- Session ----
    let venue = BinanceFutures::new(rest_url.clone(), creds, cli.recv_window);
    let span = log.venue_span(cli.mode, &rest_url);
    let trader = Trader::initialize(venue, cli.asset.clone(), span)
        .await
        .context("could not establish a session with the venue")?;

    let mut term = StdTerminal;
    session::run(&trader, &mut term).await?;
    Ok(())
}
