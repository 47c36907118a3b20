//! RocketShoes CLI - a terminal shopping cart backed by the catalog API.
//!
//! # Usage
//!
//! ```bash
//! # List catalog products with the amount already in the cart
//! rs-cart products
//!
//! # Show the cart with line totals and subtotal
//! rs-cart show
//!
//! # Add one unit of product 3
//! rs-cart add 3
//!
//! # Set the amount of product 3
//! rs-cart update 3 4
//!
//! # Remove product 3
//! rs-cart remove 3
//! ```
//!
//! The cart is kept in `CART_STORE_DIR` between invocations; see
//! [`rocketshoes_cart::config`] for every environment variable.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocketshoes_cart::{CartConfig, CartContext};
use rocketshoes_core::ProductId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "RocketShoes shopping cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products,
    /// Show the cart contents
    Show,
    /// Add one unit of a product
    Add {
        /// Catalog product id
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Catalog product id
        id: ProductId,
    },
    /// Set the amount of a product
    Update {
        /// Catalog product id
        id: ProductId,

        /// New amount; zero or below is ignored
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration is needed for Sentry init, which must precede tracing
    let config = CartConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_cart=info,rocketshoes_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CartConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = CartContext::from_config(config)?;

    match cli.command {
        Commands::Products => commands::catalog::list(&ctx).await?,
        Commands::Show => commands::cart::show(&ctx).await,
        Commands::Add { id } => commands::cart::add(&ctx, id).await?,
        Commands::Remove { id } => commands::cart::remove(&ctx, id).await?,
        Commands::Update { id, amount } => commands::cart::update(&ctx, id, amount).await?,
    }
    Ok(())
}
