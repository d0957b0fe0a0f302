//! # Maligai Counter Entry Point
//!
//! Thin binary wrapper; everything lives in the library.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    maligai_counter::run().await
}
