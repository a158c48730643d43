//! Dapur CLI - Browse the menu, manage the cart and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! dapur products list --category Minuman
//! dapur products show 665f1c2b9a
//!
//! # Manage the cart
//! dapur cart add 665f1c2b9a -q 2
//! dapur cart update 665f1c2b9a 3
//! dapur cart show --payment qris-mandiri
//!
//! # Place an order
//! dapur checkout -n "Siti Aminah" -p 0813... -a "Jl. Sudirman 5" -c Jakarta -z 10220
//!
//! # Order history
//! dapur orders list
//! ```
//!
//! # Commands
//!
//! - `products` - List, search and show products
//! - `cart` - Show and change the persisted cart
//! - `checkout` - Submit the cart as an order
//! - `orders` - Show the customer's orders
//!
//! Configuration comes from the environment (see `dapur_storefront::config`).
//! `DAPUR_API_URL` must be set for every command, including the cart
//! commands that never contact the backend, because configuration is loaded
//! before the command runs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dapur_core::{OrderId, PaymentMethod, ProductId};
use dapur_storefront::config::StorefrontConfig;
use dapur_storefront::error::AppError;
use dapur_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "dapur")]
#[command(author, version, about = "Dapur storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for everything in the cart
    Checkout(commands::checkout::CheckoutArgs),
    /// Show past orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Search text
        #[arg(short, long)]
        search: Option<String>,

        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only featured products
        #[arg(short, long)]
        featured: bool,

        /// Maximum number of products
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show one product and related products
    Show {
        /// Product ID
        id: String,
    },
    /// List categories
    Categories,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show {
        /// Payment method used to price shipping
        #[arg(short, long, default_value_t = PaymentMethod::Cod)]
        payment: PaymentMethod,
    },
    /// Add a product
    Add {
        /// Product ID
        id: String,

        /// Units to add (at least 1)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        id: String,

        /// New quantity (at least 1)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Remove a product
    Remove {
        /// Product ID
        id: String,
    },
    /// Remove everything
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List the customer's orders
    List,
    /// Show one order
    Show {
        /// Order ID
        id: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration is loaded first so Sentry can start before tracing
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dapur=info,dapur_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            tracing::error!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let mut state = AppState::new(config)?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List {
                search,
                category,
                featured,
                limit,
            } => {
                let filter = commands::products::ListFilter {
                    search,
                    category,
                    featured,
                    limit,
                };
                commands::products::list(&state, filter).await?;
            }
            ProductsAction::Show { id } => {
                commands::products::show(&state, &ProductId::new(id)).await?;
            }
            ProductsAction::Categories => commands::products::categories(&state).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show { payment } => commands::cart::show(&state, payment),
            CartAction::Add { id, quantity } => {
                commands::cart::add(&mut state, &ProductId::new(id), quantity).await?;
            }
            CartAction::Update { id, quantity } => {
                commands::cart::update(&mut state, &ProductId::new(id), quantity)?;
            }
            CartAction::Remove { id } => commands::cart::remove(&mut state, &ProductId::new(id))?,
            CartAction::Clear => commands::cart::clear(&mut state)?,
        },
        Commands::Checkout(args) => commands::checkout::run(&mut state, args).await?,
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(&state).await?,
            OrdersAction::Show { id } => commands::orders::show(&state, &OrderId::new(id)).await?,
        },
    }
    Ok(())
}
