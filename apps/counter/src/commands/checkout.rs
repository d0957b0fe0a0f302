//! # Checkout Command
//!
//! Runs one checkout from an open cart to a committed (or cancelled) sale.
//!
//! ## Payment Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutSession::open ──► select_customer ──► select_payment           │
//! │                                                     │                   │
//! │        ┌────────────────────┬───────────────────────┼──────────────┐    │
//! │        ▼                    ▼                       ▼              │    │
//! │   cash / card           qr                      qr-scan            │    │
//! │        │         generate code, show it     start scanner          │    │
//! │        │         "Payment received?"        review each code:      │    │
//! │        │           yes │     no ──► cancel    Verified ──► wait     │    │
//! │        │               │                      Mismatch ──► keep     │    │
//! │        │               │                      Unrecognized ──► ask  │    │
//! │        │               │                      timeout  ──► cancel   │    │
//! │        ▼               ▼                            │              │    │
//! │   commit: confirm on a copy ──► save_all (one tx) ──► swap in       │    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A cancelled checkout leaves the cart exactly as it was.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collaborators::{CollaboratorError, Collaborators, ScanEvent};
use crate::error::ApiError;
use crate::receipt::ReceiptView;
use crate::state::AppState;
use maligai_core::{
    CheckoutSession, Order, PaymentMethod, PaymentPrompt, PaymentRequest, ScanReview,
};

/// Scanned text longer than this is cut when shown to the operator.
const SCAN_PREVIEW_CHARS: usize = 50;

/// What the operator chose at the counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// `None` for a walk-in sale.
    pub customer_id: Option<i64>,
    pub payment_method: PaymentMethod,
}

/// How a checkout ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CheckoutOutcome {
    Completed { order: Order, receipt: ReceiptView },
    Cancelled { reason: String },
}

enum PaymentDecision {
    Confirm,
    Cancel(String),
}

/// Runs checkout over the current cart.
///
/// ## Errors
/// - `EMPTY_CART` when there is nothing to sell
/// - `NOT_FOUND` for an unknown customer
/// - `COLLABORATOR_UNAVAILABLE` when the code generator or scanner fails
/// - `STORAGE_ERROR` when the sale cannot be saved
///
/// None of these change the cart, the stock or the ledger.
pub async fn checkout(
    state: &mut AppState,
    request: CheckoutRequest,
    collaborators: &Collaborators,
) -> Result<CheckoutOutcome, ApiError> {
    info!(
        customer_id = ?request.customer_id,
        method = request.payment_method.as_str(),
        "checkout command"
    );

    let mut session = CheckoutSession::open(&state.shop)?;
    session.select_customer(request.customer_id)?;
    let prompt = session.select_payment(
        request.payment_method,
        &state.config.shop_name,
        Utc::now(),
    )?;

    let decision = match prompt {
        PaymentPrompt::None => PaymentDecision::Confirm,
        PaymentPrompt::ShowCode(payment) => show_payment_code(state, &payment, collaborators)?,
        PaymentPrompt::StartScanner => {
            await_scanned_payment(state, &session, collaborators).await?
        }
    };

    match decision {
        PaymentDecision::Confirm => commit(state, &mut session).await,
        PaymentDecision::Cancel(reason) => {
            session.cancel();
            info!(%reason, "Checkout cancelled");
            Ok(CheckoutOutcome::Cancelled { reason })
        }
    }
}

/// Applies the sale to a copy of the shop, saves the copy in one
/// transaction, then makes it current.
async fn commit(
    state: &mut AppState,
    session: &mut CheckoutSession,
) -> Result<CheckoutOutcome, ApiError> {
    let mut next = state.shop.clone();
    let order = session.confirm(&mut next, Utc::now())?;

    state.collections().save_all(&next).await?;
    state.shop = next;

    info!(
        order_id = order.id,
        total = %order.total,
        method = order.payment_method.as_str(),
        lines = order.item_count(),
        "Order committed"
    );

    let receipt = ReceiptView::new(&order, &state.config);
    Ok(CheckoutOutcome::Completed { order, receipt })
}

fn show_payment_code(
    state: &AppState,
    payment: &PaymentRequest,
    collaborators: &Collaborators,
) -> Result<PaymentDecision, ApiError> {
    let payload = payment.to_payload()?;
    let code = collaborators.generator.generate(&payload)?;
    debug!(payload = %code.payload, "Payment code generated");

    let prompt = &collaborators.prompt;
    prompt.notify(&code.text);
    prompt.notify(&format!(
        "Scan to pay {} at {}",
        payment.amount.format_with(&state.config.currency_symbol),
        payment.shop
    ));

    Ok(if prompt.confirm("Payment received?") {
        PaymentDecision::Confirm
    } else {
        PaymentDecision::Cancel("payment not received".to_string())
    })
}

/// Reads codes until one is accepted, the operator gives up, or the scan
/// times out. The subscription is cancelled on every exit path.
async fn await_scanned_payment(
    state: &AppState,
    session: &CheckoutSession,
    collaborators: &Collaborators,
) -> Result<PaymentDecision, ApiError> {
    let config = &state.config;
    let symbol = config.currency_symbol.as_str();
    let prompt = &collaborators.prompt;

    let mut subscription = collaborators.reader.start()?;
    info!(subscription = %subscription.id(), "Scanner started");
    prompt.notify(&format!(
        "Scan the customer's payment code for {}",
        session.total().format_with(symbol)
    ));

    let deadline = tokio::time::sleep(config.scan_timeout());
    tokio::pin!(deadline);

    let decision = loop {
        let event = tokio::select! {
            event = subscription.next() => event,
            _ = &mut deadline => {
                warn!(subscription = %subscription.id(), "Scan timed out");
                break PaymentDecision::Cancel("scan timed out".to_string());
            }
        };

        let raw = match event {
            Some(ScanEvent::Decoded(raw)) => raw,
            Some(ScanEvent::Failed(reason)) => {
                subscription.cancel();
                return Err(CollaboratorError::Failed {
                    what: "Scanner".to_string(),
                    reason,
                }
                .into());
            }
            None => break PaymentDecision::Cancel("scanner closed".to_string()),
        };

        match session.review_scan(&raw, &state.shop.cart)? {
            ScanReview::Verified { amount } => {
                prompt.notify(&format!(
                    "Payment verified! Amount matches: {}",
                    amount.format_with(symbol)
                ));
                tokio::time::sleep(config.scan_confirm_delay()).await;
                break PaymentDecision::Confirm;
            }
            ScanReview::AmountMismatch { scanned, expected } => {
                debug!(?scanned, %expected, "Scanned amount does not match");
                let scanned = scanned.map_or_else(|| "N/A".to_string(), |a| a.format_with(symbol));
                prompt.notify(&format!("Payment code scanned. Amount: {}", scanned));
            }
            ScanReview::Unrecognized { raw, reason } => {
                debug!(%reason, "Scanned code is not a payment payload");
                prompt.notify(&format!("Code scanned: {}", preview(&raw)));
                if prompt.confirm("Code scanned. Complete payment?") {
                    break PaymentDecision::Confirm;
                }
            }
        }
    };

    subscription.cancel();
    Ok(decision)
}

fn preview(raw: &str) -> String {
    if raw.chars().count() <= SCAN_PREVIEW_CHARS {
        return raw.to_string();
    }
    let head: String = raw.chars().take(SCAN_PREVIEW_CHARS).collect();
    format!("{}...", head)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{
        ChannelCodeReader, CodeGenerator, CodeReader, OperatorPrompt, RenderedCode,
        TextCodeGenerator, UnavailableCodeReader,
    };
    use crate::commands::{cart, test_support};
    use crate::error::ErrorCode;
    use maligai_core::{Money, Quantity};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records every message and answers questions from a script.
    #[derive(Clone, Default)]
    struct ScriptedPrompt {
        answers: Arc<Mutex<Vec<bool>>>,
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedPrompt {
        fn answering(answers: &[bool]) -> Self {
            let prompt = ScriptedPrompt::default();
            *prompt.answers.lock().unwrap() = answers.iter().rev().copied().collect();
            prompt
        }

        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl OperatorPrompt for ScriptedPrompt {
        fn notify(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }

        fn confirm(&self, question: &str) -> bool {
            self.notify(question);
            self.answers.lock().unwrap().pop().unwrap_or(false)
        }
    }

    struct BrokenGenerator;

    impl CodeGenerator for BrokenGenerator {
        fn generate(&self, _payload: &str) -> Result<RenderedCode, CollaboratorError> {
            Err(CollaboratorError::Unavailable("Code generator".to_string()))
        }
    }

    fn with_reader(reader: impl CodeReader + 'static, prompt: ScriptedPrompt) -> Collaborators {
        Collaborators::new(TextCodeGenerator, reader, prompt)
    }

    fn request(method: PaymentMethod) -> CheckoutRequest {
        CheckoutRequest {
            customer_id: None,
            payment_method: method,
        }
    }

    async fn shop_with_cart() -> AppState {
        let mut state = test_support::shop().await;
        cart::add_to_cart(&mut state, 1, "3").await.unwrap();
        cart::add_to_cart(&mut state, 1, "3").await.unwrap();
        state
    }

    fn completed(outcome: CheckoutOutcome) -> Order {
        match outcome {
            CheckoutOutcome::Completed { order, .. } => order,
            other => panic!("expected a completed checkout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cash_checkout_commits_everything() {
        let mut state = shop_with_cart().await;
        let collaborators = with_reader(UnavailableCodeReader, ScriptedPrompt::default());

        let order = completed(
            checkout(&mut state, request(PaymentMethod::Cash), &collaborators)
                .await
                .unwrap(),
        );

        assert_eq!(order.id, 1);
        assert_eq!(order.total, Money::from_paise(27000));
        assert_eq!(order.customer_name, "Walk-in Customer");
        assert_eq!(state.shop.catalog.get(1).unwrap().stock, Quantity::from_units(4));
        assert!(state.shop.cart.is_empty());

        let stored = state.collections().load_state().await.unwrap();
        assert_eq!(stored, state.shop);
    }

    #[tokio::test]
    async fn test_customer_checkout_records_history() {
        let mut state = shop_with_cart().await;
        let collaborators = with_reader(UnavailableCodeReader, ScriptedPrompt::default());
        let request = CheckoutRequest {
            customer_id: Some(1),
            payment_method: PaymentMethod::Card,
        };

        let order = completed(checkout(&mut state, request, &collaborators).await.unwrap());
        assert_eq!(order.customer_phone, "98400 12345");
        assert_eq!(state.shop.customers.get(1).unwrap().order_ids, vec![1]);
    }

    #[tokio::test]
    async fn test_empty_cart_and_unknown_customer() {
        let mut state = test_support::shop().await;
        let collaborators = with_reader(UnavailableCodeReader, ScriptedPrompt::default());

        let err = checkout(&mut state, request(PaymentMethod::Cash), &collaborators)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);

        cart::add_to_cart(&mut state, 1, "1").await.unwrap();
        let request = CheckoutRequest {
            customer_id: Some(42),
            payment_method: PaymentMethod::Cash,
        };
        let err = checkout(&mut state, request, &collaborators).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(state.shop.orders.is_empty());
    }

    #[tokio::test]
    async fn test_qr_code_shown_then_confirmed() {
        let mut state = shop_with_cart().await;
        let prompt = ScriptedPrompt::answering(&[true]);
        let collaborators = with_reader(UnavailableCodeReader, prompt.clone());

        let order = completed(
            checkout(&mut state, request(PaymentMethod::Qr), &collaborators)
                .await
                .unwrap(),
        );
        assert_eq!(order.payment_method, PaymentMethod::Qr);

        let messages = prompt.messages();
        assert!(messages[0].contains("\"amount\":270.0"));
        assert!(messages[1].contains("₹270.00"));
    }

    #[tokio::test]
    async fn test_qr_declined_keeps_cart() {
        let mut state = shop_with_cart().await;
        let collaborators = with_reader(UnavailableCodeReader, ScriptedPrompt::answering(&[false]));

        let outcome = checkout(&mut state, request(PaymentMethod::Qr), &collaborators)
            .await
            .unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Cancelled { .. }));
        assert_eq!(state.shop.cart.total(), Money::from_paise(27000));
        assert!(state.shop.orders.is_empty());
    }

    #[tokio::test]
    async fn test_generator_failure_is_reported() {
        let mut state = shop_with_cart().await;
        let collaborators =
            Collaborators::new(BrokenGenerator, UnavailableCodeReader, ScriptedPrompt::default());

        let err = checkout(&mut state, request(PaymentMethod::Qr), &collaborators)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CollaboratorUnavailable);
        assert_eq!(state.shop.cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_scan_skips_mismatch_then_verifies() {
        let mut state = shop_with_cart().await;
        let prompt = ScriptedPrompt::default();
        let reader = ChannelCodeReader::decoding([
            r#"{"amount":100,"shop":"Balu Maligai"}"#,
            r#"{"amount":270,"shop":"Balu Maligai"}"#,
        ]);
        let collaborators = with_reader(reader, prompt.clone());

        let order = completed(
            checkout(&mut state, request(PaymentMethod::QrScan), &collaborators)
                .await
                .unwrap(),
        );
        assert_eq!(order.payment_method, PaymentMethod::QrScan);

        let messages = prompt.messages();
        assert!(messages.iter().any(|m| m == "Payment code scanned. Amount: ₹100.00"));
        assert!(messages.iter().any(|m| m.starts_with("Payment verified!")));
    }

    #[tokio::test]
    async fn test_unrecognized_scan_needs_operator() {
        let mut state = shop_with_cart().await;
        let raw = format!("upi://pay?pa=shop@bank&am=270&tn={}", "x".repeat(60));
        let prompt = ScriptedPrompt::answering(&[true]);
        let collaborators = with_reader(ChannelCodeReader::decoding([raw]), prompt.clone());

        completed(
            checkout(&mut state, request(PaymentMethod::QrScan), &collaborators)
                .await
                .unwrap(),
        );
        let shown = prompt
            .messages()
            .into_iter()
            .find(|m| m.starts_with("Code scanned: "))
            .unwrap();
        assert!(shown.ends_with("..."));
    }

    #[tokio::test]
    async fn test_scan_timeout_cancels() {
        let mut state = shop_with_cart().await;
        let reader = ChannelCodeReader::decoding([r#"{"amount":1}"#]);
        let collaborators = with_reader(reader, ScriptedPrompt::default());

        let outcome = checkout(&mut state, request(PaymentMethod::QrScan), &collaborators)
            .await
            .unwrap();
        match outcome {
            CheckoutOutcome::Cancelled { reason } => assert_eq!(reason, "scan timed out"),
            other => panic!("expected cancel, got {other:?}"),
        }
        assert_eq!(state.shop.cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_scanner_unavailable() {
        let mut state = shop_with_cart().await;
        let collaborators = with_reader(UnavailableCodeReader, ScriptedPrompt::default());

        let err = checkout(&mut state, request(PaymentMethod::QrScan), &collaborators)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CollaboratorUnavailable);
    }

    #[tokio::test]
    async fn test_scanner_device_error() {
        let mut state = shop_with_cart().await;
        let reader = ChannelCodeReader::new(vec![ScanEvent::Failed("camera unplugged".to_string())])
            .interval(Duration::from_millis(1));
        let collaborators = with_reader(reader, ScriptedPrompt::default());

        let err = checkout(&mut state, request(PaymentMethod::QrScan), &collaborators)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CollaboratorUnavailable);
        assert!(err.message.contains("camera unplugged"));
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short"), "short");
        let long = "y".repeat(80);
        assert_eq!(preview(&long).chars().count(), SCAN_PREVIEW_CHARS + 3);
    }
}
