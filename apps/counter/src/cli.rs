//! # Command Line
//!
//! ```text
//! maligai [--config PATH] [--db PATH] [--json] <COMMAND>
//!
//!   product  list [--category C] | save --name .. --price .. | remove ID
//!   cart     show | add PRODUCT_ID [QTY] | remove LINE | clear
//!   customer list | save --name .. --phone .. | remove ID
//!   checkout [--customer ID] [--payment cash|card|qr|qr-scan]
//!   history  [--customer ID] [--month YYYY-MM]
//!   order    show ID | share ID
//!   seed
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use maligai_core::history::YearMonth;
use maligai_core::{CustomerDraft, Money, PaymentMethod, ProductDraft, Quantity};

/// Maligai shop counter.
#[derive(Debug, Parser)]
#[command(name = "maligai", version, about = "Point-of-sale counter for a grocery shop")]
pub struct Cli {
    /// Config file (default: maligai.toml in the platform config directory)
    #[arg(long, global = true, env = "MALIGAI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file, overriding the configured one
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Product catalog
    Product {
        #[command(subcommand)]
        action: ProductCommand,
    },
    /// Shopping cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
    /// Customer registry
    Customer {
        #[command(subcommand)]
        action: CustomerCommand,
    },
    /// Take payment for the cart and record the order
    Checkout(CheckoutArgs),
    /// Past orders with monthly totals
    History(HistoryArgs),
    /// A single past order
    Order {
        #[command(subcommand)]
        action: OrderCommand,
    },
    /// Load the sample catalog into an empty shop
    Seed,
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// List products
    List {
        /// Only this category (`all` for every product)
        #[arg(long)]
        category: Option<String>,
    },
    /// Create a product, or edit one with --id
    Save(ProductArgs),
    /// Delete a product
    Remove { id: i64 },
}

#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Existing product to edit
    #[arg(long)]
    pub id: Option<i64>,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub category: String,

    /// Price per unit, e.g. 45 or 42.50
    #[arg(long, value_parser = parse_money)]
    pub price: Money,

    /// Selling unit: kg, pack, pc
    #[arg(long, default_value = "pc")]
    pub unit: String,

    /// Units on hand, e.g. 50 or 12.5
    #[arg(long, value_parser = parse_quantity)]
    pub stock: Quantity,

    /// Picture path or URL
    #[arg(long, default_value = "")]
    pub image: String,
}

impl From<ProductArgs> for ProductDraft {
    fn from(args: ProductArgs) -> Self {
        ProductDraft {
            id: args.id,
            name: args.name,
            category: args.category,
            price: args.price,
            unit: args.unit,
            stock: args.stock,
            image: args.image,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        product_id: i64,
        /// Quantity; blank or unreadable means 1, minimum 0.5
        #[arg(default_value = "1")]
        quantity: String,
    },
    /// Remove a line by its number in `cart show` (starting at 1)
    Remove { line: usize },
    /// Empty the cart
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum CustomerCommand {
    /// List customers
    List,
    /// Create a customer, or edit one with --id
    Save(CustomerArgs),
    /// Delete a customer
    Remove { id: i64 },
}

#[derive(Debug, Args)]
pub struct CustomerArgs {
    /// Existing customer to edit
    #[arg(long)]
    pub id: Option<i64>,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub phone: String,
}

impl From<CustomerArgs> for CustomerDraft {
    fn from(args: CustomerArgs) -> Self {
        CustomerDraft {
            id: args.id,
            name: args.name,
            phone: args.phone,
        }
    }
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Customer id; walk-in when omitted
    #[arg(long)]
    pub customer: Option<i64>,

    /// cash, card, qr or qr-scan
    #[arg(long, default_value = "cash", value_parser = parse_payment_method)]
    pub payment: PaymentMethod,

    /// Answer yes to "Payment received?" without asking
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// With qr-scan: accept a code that is not a payment payload
    #[arg(long)]
    pub confirm_unverified: bool,

    /// This counter has no scanner
    #[arg(long)]
    pub no_scanner: bool,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Only orders of this customer
    #[arg(long)]
    pub customer: Option<i64>,

    /// Only orders of this month (YYYY-MM)
    #[arg(long, value_parser = parse_month)]
    pub month: Option<YearMonth>,
}

#[derive(Debug, Subcommand)]
pub enum OrderCommand {
    /// Order lines and receipt
    Show { id: i64 },
    /// Thank-you message for the customer
    Share { id: i64 },
}

fn parse_money(input: &str) -> Result<Money, String> {
    Money::parse(input).map_err(|e| e.to_string())
}

fn parse_quantity(input: &str) -> Result<Quantity, String> {
    Quantity::parse(input).map_err(|e| e.to_string())
}

fn parse_payment_method(input: &str) -> Result<PaymentMethod, String> {
    input.parse().map_err(|e: maligai_core::ValidationError| e.to_string())
}

fn parse_month(input: &str) -> Result<YearMonth, String> {
    input.parse().map_err(|e: maligai_core::ValidationError| e.to_string())
}
