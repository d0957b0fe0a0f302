//! # Maligai Counter Library
//!
//! The operator command line for the Maligai shop counter.
//!
//! ## Module Organization
//! ```text
//! maligai_counter/
//! ├── lib.rs            ◄─── You are here (startup & dispatch)
//! ├── cli.rs            ◄─── clap command definitions
//! ├── state/
//! │   ├── mod.rs        ◄─── AppState { db, shop, config }
//! │   └── config.rs     ◄─── maligai.toml + MALIGAI_* overrides
//! ├── commands/
//! │   ├── catalog.rs    ◄─── Product list / save / remove
//! │   ├── cart.rs       ◄─── Cart manipulation
//! │   ├── customer.rs   ◄─── Customer registry
//! │   ├── checkout.rs   ◄─── Payment flow and order commit
//! │   └── history.rs    ◄─── Order history, detail, share
//! ├── collaborators/    ◄─── Code generator, scanner, operator prompt
//! ├── receipt.rs        ◄─── Receipt view
//! ├── output.rs         ◄─── Text rendering
//! └── error.rs          ◄─── ApiError for commands
//! ```

pub mod cli;
pub mod collaborators;
pub mod commands;
pub mod error;
pub mod output;
pub mod receipt;
pub mod state;

use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{CartCommand, CheckoutArgs, Cli, Command, CustomerCommand, OrderCommand, ProductCommand};
use collaborators::{
    Collaborators, ConsolePrompt, StdinCodeReader, TextCodeGenerator, UnavailableCodeReader,
};
use commands::checkout::CheckoutRequest;
use error::ApiError;
use maligai_core::history::HistoryQuery;
use maligai_core::PaymentMethod;
use maligai_store::seed::seed_if_empty;
use state::{AppState, ConfigState};

/// Runs the counter command line.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Command Startup                                   │
/// │                                                                         │
/// │  1. Parse Arguments ──────────────────────────────────────────────────► │
/// │     • clap; --help and usage errors exit here                           │
/// │                                                                         │
/// │  2. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: INFO, can be overridden with RUST_LOG                    │
/// │                                                                         │
/// │  3. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults ► maligai.toml ► MALIGAI_* ► --db                        │
/// │                                                                         │
/// │  4. Open the Shop ────────────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │     • Sample catalog when empty (if enabled)                            │
/// │     • All four collections loaded (older layouts back-filled)           │
/// │                                                                         │
/// │  5. Run the Command ──────────────────────────────────────────────────► │
/// │     • Output on stdout, errors on stderr with a non-zero exit           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let json = cli.json;
    match run_cli(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            if json {
                eprintln!(
                    "{}",
                    serde_json::to_string(&err).unwrap_or_else(|_| err.message.clone())
                );
            } else {
                eprintln!("error: {}", err);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run_cli(cli: Cli) -> Result<String, ApiError> {
    info!("Starting Maligai counter");

    let mut config = ConfigState::load(cli.config)?;
    if let Some(db) = cli.db {
        config.database_path = Some(db);
    }

    let mut state = AppState::open(config).await?;
    let result = execute(&mut state, cli.command, cli.json).await;
    state.db.close().await;
    result
}

/// Runs one command against an open shop and returns what to print.
pub async fn execute(
    state: &mut AppState,
    command: Command,
    json: bool,
) -> Result<String, ApiError> {
    let symbol = state.config.currency_symbol.clone();

    match command {
        Command::Product { action } => match action {
            ProductCommand::List { category } => {
                let list = commands::catalog::list_products(state, category.as_deref());
                render(&list, json, |l| output::product_list(l, &symbol))
            }
            ProductCommand::Save(args) => {
                let product = commands::catalog::save_product(state, args.into()).await?;
                render(&product, json, |p| format!("Saved {}", output::product(p, &symbol)))
            }
            ProductCommand::Remove { id } => {
                let product = commands::catalog::remove_product(state, id).await?;
                render(&product, json, |p| format!("Removed {} ({})", p.name, p.id))
            }
        },

        Command::Cart { action } => {
            let cart = match action {
                CartCommand::Show => commands::cart::get_cart(state),
                CartCommand::Add {
                    product_id,
                    quantity,
                } => commands::cart::add_to_cart(state, product_id, &quantity).await?,
                CartCommand::Remove { line } => match line.checked_sub(1) {
                    Some(index) => commands::cart::remove_from_cart(state, index).await?,
                    None => commands::cart::get_cart(state),
                },
                CartCommand::Clear => commands::cart::clear_cart(state).await?,
            };
            render(&cart, json, |c| output::cart(c, &symbol))
        }

        Command::Customer { action } => match action {
            CustomerCommand::List => {
                let customers = commands::customer::list_customers(state);
                render(&customers, json, |c| output::customers(c))
            }
            CustomerCommand::Save(args) => {
                let customer = commands::customer::save_customer(state, args.into()).await?;
                render(&customer, json, |c| format!("Saved {}", output::customer(c)))
            }
            CustomerCommand::Remove { id } => {
                let customer = commands::customer::remove_customer(state, id).await?;
                render(&customer, json, |c| format!("Removed {} ({})", c.name, c.id))
            }
        },

        Command::Checkout(args) => {
            let collaborators = console_collaborators(&args);
            let request = CheckoutRequest {
                customer_id: args.customer,
                payment_method: args.payment,
            };
            let outcome = commands::checkout::checkout(state, request, &collaborators).await?;
            render(&outcome, json, output::checkout)
        }

        Command::History(args) => {
            let query = HistoryQuery {
                customer_id: args.customer,
                month: args.month,
            };
            let history = commands::history::list_history(state, query);
            let offset = state.config.utc_offset();
            render(&history, json, |h| output::history(h, &symbol, offset))
        }

        Command::Order { action } => match action {
            OrderCommand::Show { id } => {
                let detail = commands::history::order_detail(state, id)?;
                render(&detail, json, output::order_detail)
            }
            OrderCommand::Share { id } => {
                let message = commands::history::share_order(state, id)?;
                render(&message, json, output::share)
            }
        },

        Command::Seed => {
            let added = seed_if_empty(&state.db).await?;
            state.reload().await?;
            let total = state.shop.catalog.len();
            debug!(added, total, "seed command");
            let text = if added == 0 {
                format!("Catalog already has {} products; nothing added.", total)
            } else {
                format!("Added {} sample products.", added)
            };
            render(&text, json, |t| t.clone())
        }
    }
}

/// Terminal collaborators for a checkout.
///
/// While the scanner owns standard input, questions get the fixed answer
/// from `--confirm-unverified`.
pub fn console_collaborators(args: &CheckoutArgs) -> Collaborators {
    let prompt = if args.payment == PaymentMethod::QrScan {
        ConsolePrompt::fixed(args.confirm_unverified)
    } else if args.yes {
        ConsolePrompt::fixed(true)
    } else {
        ConsolePrompt::interactive()
    };

    if args.no_scanner {
        Collaborators::new(TextCodeGenerator, UnavailableCodeReader, prompt)
    } else {
        Collaborators::new(TextCodeGenerator, StdinCodeReader, prompt)
    }
}

fn render<T: Serialize>(
    value: &T,
    json: bool,
    text: impl FnOnce(&T) -> String,
) -> Result<String, ApiError> {
    if json {
        serde_json::to_string_pretty(value).map_err(|e| ApiError::internal(e.to_string()))
    } else {
        Ok(text(value))
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=maligai=trace` - Show trace for maligai crates only
/// - Default: INFO, debug for maligai crates
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,maligai=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
