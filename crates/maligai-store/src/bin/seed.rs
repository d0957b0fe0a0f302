//! # Seed Data Loader
//!
//! Loads the sample grocery and vegetable catalog into a shop database.
//!
//! ## Usage
//! ```bash
//! # Seed ./maligai_dev.db
//! cargo run -p maligai-store --bin seed
//!
//! # Specify database path
//! cargo run -p maligai-store --bin seed -- --db ./data/maligai.db
//! ```
//!
//! A catalog that already has products is never touched.

use std::env;
use std::process::ExitCode;

use maligai_store::seed::{sample_products, seed_if_empty};
use maligai_store::{Database, DbConfig, StoreResult};

const DEFAULT_DB: &str = "./maligai_dev.db";

const USAGE: &str = "\
Maligai sample catalog loader

Usage: seed [--db <PATH>]

  -d, --db <PATH>    Database file (default: ./maligai_dev.db)
  -h, --help         Show this help";

#[tokio::main]
async fn main() -> ExitCode {
    let mut db_path = DEFAULT_DB.to_string();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" | "-d" => match args.next() {
                Some(path) => db_path = path,
                None => {
                    eprintln!("--db needs a path\n\n{USAGE}");
                    return ExitCode::FAILURE;
                }
            },
            "--help" | "-h" => {
                println!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            other => {
                eprintln!("unknown argument '{other}'\n\n{USAGE}");
                return ExitCode::FAILURE;
            }
        }
    }

    match seed(&db_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}

async fn seed(db_path: &str) -> StoreResult<()> {
    println!("Database: {db_path}");

    let db = Database::new(DbConfig::new(db_path)).await?;
    let added = seed_if_empty(&db).await?;

    if added == 0 {
        let existing = db.collections().load_catalog().await?.len();
        println!("⚠ Catalog already has {existing} products, nothing added");
    } else {
        println!("✓ Added {added} of {} sample products", sample_products().len());
    }

    db.close().await;
    Ok(())
}
