//! Full counter session against an on-disk shop: seed, sell, reopen.

use clap::Parser;

use maligai_counter::cli::Cli;
use maligai_counter::collaborators::{
    ChannelCodeReader, Collaborators, ConsolePrompt, TextCodeGenerator,
};
use maligai_counter::commands::checkout::{checkout, CheckoutOutcome, CheckoutRequest};
use maligai_counter::error::{ApiError, ErrorCode};
use maligai_counter::execute;
use maligai_counter::state::{AppState, ConfigState};
use maligai_core::{Money, PaymentMethod, Quantity};
use maligai_store::{Database, DbConfig};

fn config(dir: &tempfile::TempDir) -> ConfigState {
    ConfigState {
        database_path: Some(dir.path().join("shop.db")),
        scan_confirm_delay_ms: 10,
        scan_timeout_secs: 5,
        utc_offset_minutes: Some(330),
        ..Default::default()
    }
}

async fn open(dir: &tempfile::TempDir) -> AppState {
    AppState::open(config(dir)).await.unwrap()
}

async fn run(state: &mut AppState, args: &[&str]) -> Result<String, ApiError> {
    let cli = Cli::parse_from(std::iter::once("maligai").chain(args.iter().copied()));
    execute(state, cli.command, false).await
}

#[tokio::test]
async fn test_sale_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut state = open(&dir).await;
        assert_eq!(state.shop.catalog.len(), 12);

        let listing = run(&mut state, &["product", "list", "--category", "vegetables"])
            .await
            .unwrap();
        assert!(listing.contains("Onion"));
        assert!(!listing.contains("Rice"));

        run(&mut state, &["customer", "save", "--name", "Ravi", "--phone", "98400 12345"])
            .await
            .unwrap();
        run(&mut state, &["cart", "add", "1", "3"]).await.unwrap();
        let cart = run(&mut state, &["cart", "add", "1", "3"]).await.unwrap();
        assert!(cart.contains("Total: ₹270.00"));

        let receipt = run(&mut state, &["checkout", "--customer", "1", "--payment", "card"])
            .await
            .unwrap();
        assert!(receipt.contains("Receipt #1"));
        assert!(receipt.contains("Customer: Ravi"));
        assert!(receipt.contains("Payment:  CARD"));

        state.db.close().await;
    }

    let mut state = open(&dir).await;
    assert_eq!(state.shop.catalog.get(1).unwrap().stock, Quantity::from_units(44));
    assert!(state.shop.cart.is_empty());
    assert_eq!(state.shop.customers.get(1).unwrap().order_ids, vec![1]);

    let history = run(&mut state, &["history", "--customer", "1"]).await.unwrap();
    assert!(history.contains("#1"));
    assert!(history.contains("Monthly totals"));

    let share = run(&mut state, &["order", "share", "1"]).await.unwrap();
    assert!(share.starts_with("To: 9840012345"));
}

#[tokio::test]
async fn test_scanned_payment_and_errors() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(DbConfig::new(dir.path().join("shop.db")))
        .await
        .unwrap();
    let mut state = AppState::with_database(db, config(&dir)).await.unwrap();

    let err = run(&mut state, &["checkout"]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::EmptyCart);

    let err = run(&mut state, &["cart", "add", "6", "21"]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OutOfStock);

    run(&mut state, &["cart", "add", "2", "1.5"]).await.unwrap();
    assert_eq!(state.shop.cart.total(), Money::from_paise(9000));

    let collaborators = Collaborators::new(
        TextCodeGenerator,
        ChannelCodeReader::decoding(["hello", r#"{"amount":90,"shop":"Balu Maligai"}"#]),
        ConsolePrompt::fixed(false),
    );
    let request = CheckoutRequest {
        customer_id: None,
        payment_method: PaymentMethod::QrScan,
    };

    match checkout(&mut state, request, &collaborators).await.unwrap() {
        CheckoutOutcome::Completed { order, receipt } => {
            assert_eq!(order.total, Money::from_paise(9000));
            assert_eq!(receipt.payment, "QR-SCAN");
        }
        other => panic!("expected a sale, got {other:?}"),
    }

    let reloaded = state.collections().load_state().await.unwrap();
    assert_eq!(reloaded.orders.len(), 1);
    assert_eq!(
        reloaded.catalog.get(2).unwrap().stock,
        Quantity::from_milli(38_500)
    );
}
