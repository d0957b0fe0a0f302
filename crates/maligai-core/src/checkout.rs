//! # Checkout Engine
//!
//! Turns the cart into an order: the one place where the catalog, the cart,
//! the customer registry and the ledger change together.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Idle ──open()──► CartPopulated ──select_payment()──► PaymentSelected  │
//! │    ▲                  │      ▲                              │           │
//! │    │                  │      └──────── select_payment() ────┤           │
//! │    │                  │                                     │           │
//! │    └──── cancel() ────┴─────────────── cancel() ────────────┤           │
//! │                       │                                     │           │
//! │                       └────────────── confirm() ────────────┴──►        │
//! │                                                          Confirmed      │
//! │                                                                         │
//! │   open() on an empty cart: EmptyCart, no session, nothing touched.      │
//! │   confirm() that finds the cart emptied since open(): Aborted.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Payment Prompts
//! | Method   | Prompt                  | Who acts next                    |
//! |----------|-------------------------|----------------------------------|
//! | cash     | `None`                  | operator confirms                |
//! | card     | `None`                  | operator confirms                |
//! | qr       | `ShowCode(request)`     | code generator, then operator    |
//! | qr-scan  | `StartScanner`          | code reader feeds `review_scan`  |
//!
//! The session itself performs no I/O. Starting and stopping the scanner,
//! waiting out the auto-confirm delay and persisting the result all happen
//! in the app layer.

use chrono::{DateTime, Utc};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::payment::{parse_scanned, PaymentRequest};
use crate::shop::ShopState;
use crate::types::{CartLine, Customer, Order, PaymentMethod, WALK_IN_CUSTOMER_NAME};

/// Where a checkout session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    CartPopulated,
    PaymentSelected,
    Confirmed,
    Aborted,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::CartPopulated => "cart populated",
            CheckoutState::PaymentSelected => "payment selected",
            CheckoutState::Confirmed => "confirmed",
            CheckoutState::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Confirmed | CheckoutState::Aborted)
    }
}

/// What the app layer must do after a payment method is picked.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentPrompt {
    /// Nothing to show; wait for the operator.
    None,
    /// Render this request as a scannable code.
    ShowCode(PaymentRequest),
    /// Start the code reader and feed decoded text to `review_scan`.
    StartScanner,
}

/// Outcome of checking one scanned code against the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanReview {
    /// Amount matches the cart total; confirm after the auto-confirm delay.
    Verified { amount: Money },
    /// Looks like a payment payload but the amount is missing or different.
    /// Keep scanning.
    AmountMismatch {
        scanned: Option<Money>,
        expected: Money,
    },
    /// Not a payment payload at all. The operator decides.
    Unrecognized { raw: String, reason: String },
}

/// One pass through checkout.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    state: CheckoutState,
    customers: Vec<Customer>,
    lines: Vec<CartLine>,
    customer_id: Option<i64>,
    payment_method: Option<PaymentMethod>,
}

impl CheckoutSession {
    /// Opens checkout over the current cart.
    ///
    /// ## Errors
    /// `EmptyCart` when the cart has no lines. Nothing is modified either way.
    pub fn open(shop: &ShopState) -> CoreResult<Self> {
        if shop.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        Ok(CheckoutSession {
            state: CheckoutState::CartPopulated,
            customers: shop.customers.customers().to_vec(),
            lines: shop.cart.lines().to_vec(),
            customer_id: None,
            payment_method: None,
        })
    }

    /// Picks the customer for the order; `None` means walk-in.
    pub fn select_customer(&mut self, customer_id: Option<i64>) -> CoreResult<()> {
        self.require_open("select a customer")?;

        if let Some(id) = customer_id {
            if !self.customers.iter().any(|c| c.id == id) {
                return Err(CoreError::CustomerNotFound(id));
            }
        }
        self.customer_id = customer_id;
        Ok(())
    }

    /// Picks the payment method and tells the caller what to show.
    ///
    /// Choosing again replaces the earlier choice.
    pub fn select_payment(
        &mut self,
        method: PaymentMethod,
        shop_name: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<PaymentPrompt> {
        self.require_open("select a payment method")?;

        self.payment_method = Some(method);
        self.state = CheckoutState::PaymentSelected;

        Ok(match method {
            PaymentMethod::Cash | PaymentMethod::Card => PaymentPrompt::None,
            PaymentMethod::Qr => {
                PaymentPrompt::ShowCode(PaymentRequest::new(self.total(), shop_name, now))
            }
            PaymentMethod::QrScan => PaymentPrompt::StartScanner,
        })
    }

    /// Checks decoded scanner text against the live cart total.
    pub fn review_scan(&self, raw: &str, cart: &Cart) -> CoreResult<ScanReview> {
        if self.state != CheckoutState::PaymentSelected {
            return Err(self.invalid("review a scanned code"));
        }

        let expected = cart.total();
        Ok(match parse_scanned(raw) {
            Ok(scanned) if scanned.matches(expected) => ScanReview::Verified { amount: expected },
            Ok(scanned) => ScanReview::AmountMismatch {
                scanned: scanned.amount,
                expected,
            },
            Err(CoreError::DecodeSchemaMismatch { reason }) => ScanReview::Unrecognized {
                raw: raw.to_string(),
                reason,
            },
            Err(other) => return Err(other),
        })
    }

    /// Commits the sale.
    ///
    /// ## Steps
    /// 1. Next order id from the ledger
    /// 2. Order built from a deep copy of the cart lines
    /// 3. Order id appended to the selected customer's history
    /// 4. Stock decremented per line, floored at 0 (not re-checked)
    /// 5. Cart cleared
    ///
    /// Every check runs before the first mutation, so an error leaves `shop`
    /// untouched.
    ///
    /// ## Errors
    /// - `EmptyCart` if the cart was emptied after `open` (session aborts)
    /// - `CustomerNotFound` if the selected customer was deleted meanwhile
    pub fn confirm(&mut self, shop: &mut ShopState, now: DateTime<Utc>) -> CoreResult<Order> {
        self.require_open("confirm")?;

        if shop.cart.is_empty() {
            self.state = CheckoutState::Aborted;
            return Err(CoreError::EmptyCart);
        }

        let (customer_name, customer_phone) = match self.customer_id {
            Some(id) => {
                let customer = shop
                    .customers
                    .get(id)
                    .ok_or(CoreError::CustomerNotFound(id))?;
                (customer.name.clone(), customer.phone.clone())
            }
            None => (WALK_IN_CUSTOMER_NAME.to_string(), String::new()),
        };

        let order = Order {
            id: shop.orders.next_id(),
            customer_id: self.customer_id,
            customer_name,
            customer_phone,
            items: shop.cart.lines().to_vec(),
            total: shop.cart.total(),
            payment_method: self.payment_method.unwrap_or_default(),
            date: now,
            epoch_millis: now.timestamp_millis(),
        };

        if let Some(id) = self.customer_id {
            shop.customers.record_order(id, order.id)?;
        }
        for line in &order.items {
            // Lines for deleted products have nothing left to decrement.
            shop.catalog.decrement_stock(line.product_id, line.quantity);
        }
        shop.cart.clear();
        shop.orders.append(order.clone());

        self.state = CheckoutState::Confirmed;
        Ok(order)
    }

    /// Leaves checkout. The payment choice is dropped, the cart is kept.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.payment_method = None;
        self.state = CheckoutState::Idle;
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Customers available for selection, as of `open`.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Cart lines as of `open`.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.total).sum()
    }

    pub fn selected_customer(&self) -> Option<i64> {
        self.customer_id
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    fn require_open(&self, action: &'static str) -> CoreResult<()> {
        match self.state {
            CheckoutState::CartPopulated | CheckoutState::PaymentSelected => Ok(()),
            _ => Err(self.invalid(action)),
        }
    }

    fn invalid(&self, action: &'static str) -> CoreError {
        CoreError::InvalidCheckoutState {
            current: self.state.as_str(),
            action,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Quantity;
    use crate::types::{CustomerDraft, Product, ProductDraft};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn product(shop: &mut ShopState, name: &str, price_paise: i64, stock_units: i64) -> Product {
        shop.catalog
            .upsert(ProductDraft {
                id: None,
                name: name.to_string(),
                category: "vegetables".to_string(),
                price: Money::from_paise(price_paise),
                unit: "kg".to_string(),
                stock: Quantity::from_units(stock_units),
                image: String::new(),
            })
            .unwrap()
    }

    fn customer(shop: &mut ShopState, name: &str, phone: &str) -> Customer {
        shop.customers
            .upsert(CustomerDraft {
                id: None,
                name: name.to_string(),
                phone: phone.to_string(),
            })
            .unwrap()
    }

    #[test]
    fn test_end_to_end_walk_in_sale() {
        let mut shop = ShopState::new();
        let onion = product(&mut shop, "Onion", 4500, 10);
        assert_eq!(onion.id, 1);

        shop.add_to_cart(1, Quantity::from_units(3)).unwrap();
        assert_eq!(shop.cart.item_count(), 1);
        assert_eq!(shop.cart.total(), Money::from_paise(13500));

        shop.add_to_cart(1, Quantity::from_units(3)).unwrap();
        assert_eq!(shop.cart.line_for(1).unwrap().quantity, Quantity::from_units(6));
        assert_eq!(shop.cart.total(), Money::from_paise(27000));

        let mut session = CheckoutSession::open(&shop).unwrap();
        let order = session.confirm(&mut shop, now()).unwrap();

        assert_eq!(order.id, 1);
        assert_eq!(order.total, Money::from_paise(27000));
        assert_eq!(order.customer_name, "Walk-in Customer");
        assert_eq!(order.customer_phone, "");
        assert_eq!(order.customer_id, None);
        assert_eq!(order.payment_method, PaymentMethod::Cash);
        assert_eq!(shop.catalog.get(1).unwrap().stock, Quantity::from_units(4));
        assert!(shop.cart.is_empty());
        assert_eq!(session.state(), CheckoutState::Confirmed);
    }

    #[test]
    fn test_open_on_empty_cart_has_no_side_effects() {
        let mut shop = ShopState::new();
        product(&mut shop, "Onion", 4500, 10);
        let before = shop.clone();

        assert!(matches!(CheckoutSession::open(&shop), Err(CoreError::EmptyCart)));
        assert_eq!(shop, before);
    }

    #[test]
    fn test_confirm_with_customer_records_history() {
        let mut shop = ShopState::new();
        product(&mut shop, "Rice", 12000, 100);
        let ravi = customer(&mut shop, "Ravi", "9840011111");
        shop.add_to_cart(1, Quantity::from_units(2)).unwrap();

        let mut session = CheckoutSession::open(&shop).unwrap();
        session.select_customer(Some(ravi.id)).unwrap();
        session
            .select_payment(PaymentMethod::Card, "Shop", now())
            .unwrap();
        let order = session.confirm(&mut shop, now()).unwrap();

        assert_eq!(order.customer_name, "Ravi");
        assert_eq!(order.customer_phone, "9840011111");
        assert_eq!(order.payment_method, PaymentMethod::Card);
        assert_eq!(shop.customers.get(ravi.id).unwrap().order_ids, vec![order.id]);
        assert_eq!(shop.orders.get(order.id), Some(&order));
    }

    #[test]
    fn test_order_is_a_deep_copy_of_cart() {
        let mut shop = ShopState::new();
        product(&mut shop, "Tomato", 6000, 40);
        shop.add_to_cart(1, Quantity::from_units(2)).unwrap();
        let lines_before = shop.cart.lines().to_vec();

        let mut session = CheckoutSession::open(&shop).unwrap();
        let order = session.confirm(&mut shop, now()).unwrap();
        assert_eq!(order.items, lines_before);

        shop.add_to_cart(1, Quantity::from_units(5)).unwrap();
        assert_eq!(shop.orders.get(order.id).unwrap().items, lines_before);
    }

    #[test]
    fn test_stock_floors_at_zero_without_recheck() {
        let mut shop = ShopState::new();
        product(&mut shop, "Carrot", 5500, 5);
        shop.add_to_cart(1, Quantity::from_units(4)).unwrap();

        // stock corrected downwards after the item went into the cart
        shop.catalog.get_mut(1).unwrap().stock = Quantity::from_units(1);

        let mut session = CheckoutSession::open(&shop).unwrap();
        session.confirm(&mut shop, now()).unwrap();
        assert_eq!(shop.catalog.get(1).unwrap().stock, Quantity::zero());
    }

    #[test]
    fn test_deleted_product_line_still_sells() {
        let mut shop = ShopState::new();
        product(&mut shop, "Potato", 3500, 60);
        shop.add_to_cart(1, Quantity::from_units(2)).unwrap();
        shop.catalog.remove(1);

        let mut session = CheckoutSession::open(&shop).unwrap();
        let order = session.confirm(&mut shop, now()).unwrap();
        assert_eq!(order.items[0].name, "Potato");
        assert_eq!(order.total, Money::from_paise(7000));
    }

    #[test]
    fn test_deleted_product_line_leaves_new_product_stock_alone() {
        let mut shop = ShopState::new();
        product(&mut shop, "Potato", 3500, 60);
        shop.add_to_cart(1, Quantity::from_units(2)).unwrap();
        shop.catalog.remove(1);
        let sugar = product(&mut shop, "Sugar", 4200, 5);
        assert_ne!(sugar.id, 1);

        let mut session = CheckoutSession::open(&shop).unwrap();
        let order = session.confirm(&mut shop, now()).unwrap();

        assert_eq!(order.items[0].product_id, 1);
        assert_eq!(
            shop.catalog.get(sugar.id).unwrap().stock,
            Quantity::from_units(5)
        );
    }

    #[test]
    fn test_order_ids_strictly_increase() {
        let mut shop = ShopState::new();
        product(&mut shop, "Salt", 2500, 50);
        let ravi = customer(&mut shop, "Ravi", "9840011111");

        let mut ids = Vec::new();
        for _ in 0..3 {
            shop.add_to_cart(1, Quantity::ONE).unwrap();
            let mut session = CheckoutSession::open(&shop).unwrap();
            ids.push(session.confirm(&mut shop, now()).unwrap().id);
        }
        shop.customers.remove(ravi.id);
        shop.catalog.remove(1);
        product(&mut shop, "Sugar", 4500, 30);
        shop.add_to_cart(2, Quantity::ONE).unwrap();
        let mut session = CheckoutSession::open(&shop).unwrap();
        ids.push(session.confirm(&mut shop, now()).unwrap().id);

        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_cancel_keeps_cart_and_drops_payment() {
        let mut shop = ShopState::new();
        product(&mut shop, "Onion", 4500, 10);
        shop.add_to_cart(1, Quantity::ONE).unwrap();

        let mut session = CheckoutSession::open(&shop).unwrap();
        session
            .select_payment(PaymentMethod::QrScan, "Shop", now())
            .unwrap();
        session.cancel();

        assert_eq!(session.state(), CheckoutState::Idle);
        assert_eq!(session.payment_method(), None);
        assert_eq!(shop.cart.item_count(), 1);
        assert!(matches!(
            session.confirm(&mut shop, now()),
            Err(CoreError::InvalidCheckoutState { .. })
        ));
    }

    #[test]
    fn test_qr_prompt_carries_cart_total() {
        let mut shop = ShopState::new();
        product(&mut shop, "Onion", 4500, 10);
        shop.add_to_cart(1, Quantity::from_units(2)).unwrap();

        let mut session = CheckoutSession::open(&shop).unwrap();
        let prompt = session
            .select_payment(PaymentMethod::Qr, "Balu Maligai", now())
            .unwrap();
        match prompt {
            PaymentPrompt::ShowCode(request) => {
                assert_eq!(request.amount, Money::from_paise(9000));
                assert_eq!(request.shop, "Balu Maligai");
            }
            other => panic!("unexpected prompt: {other:?}"),
        }
        assert_eq!(
            session.select_payment(PaymentMethod::Cash, "Balu Maligai", now()).unwrap(),
            PaymentPrompt::None
        );
    }

    #[test]
    fn test_review_scan_outcomes() {
        let mut shop = ShopState::new();
        product(&mut shop, "Onion", 4500, 10);
        shop.add_to_cart(1, Quantity::from_units(6)).unwrap();

        let mut session = CheckoutSession::open(&shop).unwrap();
        assert_eq!(
            session
                .select_payment(PaymentMethod::QrScan, "Shop", now())
                .unwrap(),
            PaymentPrompt::StartScanner
        );

        let verified = session.review_scan(r#"{"amount":270}"#, &shop.cart).unwrap();
        assert_eq!(verified, ScanReview::Verified { amount: Money::from_paise(27000) });

        let mismatch = session.review_scan(r#"{"amount":100}"#, &shop.cart).unwrap();
        assert!(matches!(mismatch, ScanReview::AmountMismatch { .. }));

        let raw = "upi://pay?pa=balu@upi";
        match session.review_scan(raw, &shop.cart).unwrap() {
            ScanReview::Unrecognized { raw: text, .. } => assert_eq!(text, raw),
            other => panic!("unexpected review: {other:?}"),
        }
    }

    #[test]
    fn test_review_scan_before_payment_selected() {
        let mut shop = ShopState::new();
        product(&mut shop, "Onion", 4500, 10);
        shop.add_to_cart(1, Quantity::ONE).unwrap();

        let session = CheckoutSession::open(&shop).unwrap();
        assert!(session.review_scan("{}", &shop.cart).is_err());
    }

    #[test]
    fn test_select_unknown_customer() {
        let mut shop = ShopState::new();
        product(&mut shop, "Onion", 4500, 10);
        shop.add_to_cart(1, Quantity::ONE).unwrap();

        let mut session = CheckoutSession::open(&shop).unwrap();
        assert!(matches!(
            session.select_customer(Some(5)),
            Err(CoreError::CustomerNotFound(5))
        ));
    }

    #[test]
    fn test_confirm_after_cart_emptied_aborts() {
        let mut shop = ShopState::new();
        product(&mut shop, "Onion", 4500, 10);
        shop.add_to_cart(1, Quantity::ONE).unwrap();

        let mut session = CheckoutSession::open(&shop).unwrap();
        shop.cart.clear();
        let before = shop.clone();

        assert!(matches!(session.confirm(&mut shop, now()), Err(CoreError::EmptyCart)));
        assert_eq!(session.state(), CheckoutState::Aborted);
        assert_eq!(shop, before);
    }
}
