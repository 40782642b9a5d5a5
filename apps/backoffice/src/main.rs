//! # Threadline Back Office
//!
//! Command-line client for the Threadline clothing retail backend. Each role
//! sees its own dashboard; customers get the storefront and cart.
//!
//! ## Invocation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  threadline <command>                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  init_tracing (RUST_LOG, stderr)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppContext::initialize                                                 │
//! │  ├── ClientConfig::load   defaults → threadline.toml → THREADLINE_*     │
//! │  ├── SessionHandle::restore   session.json                              │
//! │  └── ApiClient::new                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  command handler ──► message on stdout, exit 0                          │
//! │       │                                                                 │
//! │       └── error ──► message on stderr, exit 1                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cli;
mod commands;
mod context;
mod render;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::{account, alerts, records, storefront, tools};
use crate::context::AppContext;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "Command failed");
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        config,
        json,
        command,
    } = cli;

    // Needs neither config nor session.
    let command = match command {
        Command::Profit(args) => {
            tools::profit(args);
            return Ok(());
        }
        other => other,
    };

    let ctx = AppContext::initialize(config, json).await?;

    match command {
        Command::Login(args) => account::login(&ctx, args).await,
        Command::Logout => account::logout(&ctx).await,
        Command::Register(args) => account::register(&ctx, args).await,
        Command::Password(args) => account::change_password(&ctx, args).await,
        Command::Whoami => account::whoami(&ctx).await,

        Command::List(args) => records::list(&ctx, args).await,
        Command::Show(args) => records::show(&ctx, args).await,
        Command::Search(args) => records::search(&ctx, args).await,
        Command::Create(args) => records::create(&ctx, args).await,
        Command::Update(args) => records::update(&ctx, args).await,
        Command::Delete(args) => records::delete(&ctx, args).await,
        Command::Lookup(args) => records::lookup(&ctx, args).await,

        Command::Alerts(args) => alerts::alerts(&ctx, args).await,

        Command::Shop => storefront::shop(&ctx).await,
        Command::Cart(command) => storefront::cart(&ctx, command).await,
        Command::Checkout(args) => storefront::checkout(&ctx, args).await,
        Command::MyOrders => storefront::my_orders(&ctx).await,

        Command::Config(command) => tools::config(&ctx, command),
        Command::Profit(_) => Ok(()),
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so command output on stdout stays clean.
/// Default level is INFO, with DEBUG for the threadline crates.
/// Override with `RUST_LOG` environment variable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,threadline=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
