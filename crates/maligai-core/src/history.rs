//! # Purchase History
//!
//! Read-only views over the order ledger: filtered listings, monthly
//! summaries, per-order detail lines and the share text.
//!
//! ## Month Buckets
//! Orders are stored in UTC but the shop thinks in local months. Every
//! function that buckets by month takes the shop's UTC offset; the app
//! layer passes the machine's local offset.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Order;

// =============================================================================
// Year-Month
// =============================================================================

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    /// Month `at` falls in, seen from `offset`.
    pub fn of(at: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = at.with_timezone(&offset);
        YearMonth {
            year: local.year(),
            month: local.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Long form for summaries, e.g. `March 2026`.
    pub fn long_name(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(date) => date.format("%B %Y").to_string(),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "month".to_string(),
            reason: format!("'{}' is not YYYY-MM", s),
        };

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

// =============================================================================
// Filtering
// =============================================================================

/// History filter. Empty fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub customer_id: Option<i64>,
    pub month: Option<YearMonth>,
}

/// Orders matching `query`, newest first.
pub fn filter_orders<'a>(
    orders: &'a [Order],
    query: &HistoryQuery,
    offset: FixedOffset,
) -> Vec<&'a Order> {
    let mut matched: Vec<&Order> = orders
        .iter()
        .filter(|o| query.customer_id.map_or(true, |id| o.customer_id == Some(id)))
        .filter(|o| {
            query
                .month
                .map_or(true, |m| YearMonth::of(o.date, offset) == m)
        })
        .collect();

    matched.sort_by(|a, b| b.epoch_millis.cmp(&a.epoch_millis));
    matched
}

// =============================================================================
// Summaries
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTotal {
    pub month: YearMonth,
    pub order_count: usize,
    pub total: Money,
}

/// Per-month totals of `orders`, newest month first.
pub fn monthly_totals(orders: &[&Order], offset: FixedOffset) -> Vec<MonthlyTotal> {
    let mut totals: Vec<MonthlyTotal> = Vec::new();

    for order in orders {
        let month = YearMonth::of(order.date, offset);
        match totals.iter_mut().find(|t| t.month == month) {
            Some(entry) => {
                entry.order_count += 1;
                entry.total += order.total;
            }
            None => totals.push(MonthlyTotal {
                month,
                order_count: 1,
                total: order.total,
            }),
        }
    }

    totals.sort_by(|a, b| b.month.cmp(&a.month));
    totals
}

/// Distinct months that have orders, newest first.
pub fn months(orders: &[Order], offset: FixedOffset) -> Vec<YearMonth> {
    let mut months: Vec<YearMonth> = orders
        .iter()
        .map(|o| YearMonth::of(o.date, offset))
        .collect();
    months.sort_by(|a, b| b.cmp(a));
    months.dedup();
    months
}

/// A filtered listing plus the summary of exactly those orders.
#[derive(Debug, Clone)]
pub struct HistoryView<'a> {
    pub orders: Vec<&'a Order>,
    pub monthly: Vec<MonthlyTotal>,
}

pub fn history_view<'a>(
    orders: &'a [Order],
    query: &HistoryQuery,
    offset: FixedOffset,
) -> HistoryView<'a> {
    let orders = filter_orders(orders, query, offset);
    let monthly = monthly_totals(&orders, offset);
    HistoryView { orders, monthly }
}

// =============================================================================
// Per-order Text
// =============================================================================

/// One line per item: `Onion - 6 kg × ₹45.00 = ₹270.00`.
pub fn detail_lines(order: &Order, symbol: &str) -> Vec<String> {
    order
        .items
        .iter()
        .map(|item| {
            format!(
                "{} - {} {} × {} = {}",
                item.name,
                item.quantity,
                item.unit,
                item.price.format_with(symbol),
                item.total.format_with(symbol)
            )
        })
        .collect()
}

/// Plain-text thank-you message for sending to the customer.
pub fn share_text(order: &Order, shop_name: &str, symbol: &str, offset: FixedOffset) -> String {
    let date = order.date.with_timezone(&offset);
    format!(
        "Thank you for shopping at {}!\n\nReceipt #{}\nDate: {}\nTotal: {}\n\nThank you!",
        shop_name,
        order.id,
        date.format("%d/%m/%Y %H:%M"),
        order.total.format_with(symbol)
    )
}

/// Phone number reduced to digits, for messaging links. Empty for walk-ins.
pub fn share_phone(order: &Order) -> String {
    order
        .customer_phone
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
