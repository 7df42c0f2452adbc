//! IWB CLI - Checkout and customer-query tools for the storefront.
//!
//! # Usage
//!
//! ```bash
//! # Stage a cart the way the cart page would
//! iwb cart stage --item "Lavender Soap:2:4.50" --item "Loofah:1:3.00"
//!
//! # Fill in the buyer draft (persisted between runs)
//! iwb draft set --name "Ada Lovelace" --email ada@example.com \
//!     --address "1 Analytical Way" --payment-info 4111111111111111
//!
//! # Place the order
//! iwb checkout
//!
//! # Send a query and see the automated reply
//! iwb query submit --name Grace --email grace@example.com --message "Where is my delivery?"
//!
//! # Browse previous queries
//! iwb query list --page 2
//! ```
//!
//! # Commands
//!
//! - `draft` - Show, edit or clear the buyer draft
//! - `cart` - Show or stage the cart snapshot
//! - `checkout` - Validate the draft and place the order
//! - `query` - List or submit customer queries
//! - `responses` - Inspect the automated-response rules

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iwb_client::ClientConfig;

mod commands;
mod output;

use commands::Context;
use commands::cart::CartLine;

#[derive(Parser)]
#[command(name = "iwb")]
#[command(author, version, about = "IWB storefront checkout and query tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show, edit or clear the buyer draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
    /// Show or stage the cart snapshot used by checkout
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Validate the buyer draft and place the order
    Checkout,
    /// List or submit customer queries
    Query {
        #[command(subcommand)]
        action: QueryAction,
    },
    /// Inspect the automated-response rules
    Responses {
        #[command(subcommand)]
        action: ResponsesAction,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    /// Print the saved draft
    Show,
    /// Update one or more draft fields
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        payment_info: Option<String>,
    },
    /// Forget the saved draft
    Clear,
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the staged cart
    Show,
    /// Record a cart snapshot for checkout
    Stage {
        /// Cart line as `NAME:QUANTITY:UNIT_PRICE` (repeatable)
        #[arg(short, long = "item", required = true, value_parser = commands::cart::parse_line)]
        items: Vec<CartLine>,

        /// Order total (default: sum of the lines)
        #[arg(long)]
        total: Option<rust_decimal::Decimal>,

        /// Shopper the cart belongs to
        #[arg(long, default_value = iwb_core::UserId::GUEST)]
        user_id: String,
    },
}

#[derive(Subcommand)]
enum QueryAction {
    /// Show one page of previous queries
    List {
        /// Page to show (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Submit a query and print the automated reply
    Submit {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(short, long)]
        message: String,

        /// History page to show afterwards
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
}

#[derive(Subcommand)]
enum ResponsesAction {
    /// List the rules in matching order
    List,
    /// Show which reply a message would get
    Match {
        /// Message text to match
        message: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
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
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = ClientConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Logs go to stderr so command output on stdout stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "iwb_client=info,iwb_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Draft { action } => match action {
            DraftAction::Show => commands::draft::show(&ctx)?,
            DraftAction::Set {
                name,
                email,
                address,
                payment_info,
            } => commands::draft::set(
                &ctx,
                commands::draft::DraftUpdate {
                    name,
                    email,
                    address,
                    payment_info,
                },
            )?,
            DraftAction::Clear => commands::draft::clear(&ctx)?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx)?,
            CartAction::Stage {
                items,
                total,
                user_id,
            } => commands::cart::stage(&ctx, items, total, &user_id)?,
        },
        Commands::Checkout => commands::checkout::run(&ctx).await?,
        Commands::Query { action } => match action {
            QueryAction::List { page } => commands::query::list(&ctx, page).await?,
            QueryAction::Submit {
                name,
                email,
                message,
                page,
            } => commands::query::submit(&ctx, &name, &email, &message, page).await?,
        },
        Commands::Responses { action } => match action {
            ResponsesAction::List => commands::responses::list(&ctx).await?,
            ResponsesAction::Match { message } => {
                commands::responses::match_message(&ctx, &message).await;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_stage_items() {
        let cli = Cli::try_parse_from([
            "iwb",
            "cart",
            "stage",
            "--item",
            "Lavender Soap:2:4.50",
            "-i",
            "Loofah:1:3",
        ])
        .expect("valid arguments");

        let Commands::Cart {
            action: CartAction::Stage { items, total, user_id },
        } = cli.command
        else {
            panic!("expected cart stage");
        };
        assert_eq!(items.len(), 2);
        assert!(total.is_none());
        assert_eq!(user_id, "guest");
    }

    #[test]
    fn test_stage_requires_an_item() {
        assert!(Cli::try_parse_from(["iwb", "cart", "stage"]).is_err());
    }
}
