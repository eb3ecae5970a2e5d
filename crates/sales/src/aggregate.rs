//! Order totals derived from line items.

use doorsales_core::{Decimal, DomainError, DomainResult, MAX_MONEY};

/// Anything that contributes `quantity × unit price` to an order.
pub trait LineItem {
    fn unit_price(&self) -> Decimal;
    fn quantity(&self) -> i32;
}

/// Derived totals of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderTotals {
    /// Σ count over all line items.
    pub count: i64,
    /// Σ price × count over all line items.
    pub price: Decimal,
}

/// Compute order totals from its line items.
///
/// Pure and deterministic. An empty slice yields zero totals; callers reject
/// empty orders before getting here. Overflow is reported instead of wrapping,
/// and so is any line or order total above [`MAX_MONEY`].
pub fn aggregate<L: LineItem>(items: &[L]) -> DomainResult<OrderTotals> {
    items.iter().try_fold(OrderTotals::default(), |acc, item| {
        let count = acc
            .count
            .checked_add(i64::from(item.quantity()))
            .ok_or_else(|| DomainError::validation("total door count is too large"))?;
        let line_price = item
            .unit_price()
            .checked_mul(Decimal::from(item.quantity()))
            .filter(|p| *p <= MAX_MONEY)
            .ok_or_else(|| DomainError::validation("door price × count is too large"))?;
        let price = acc
            .price
            .checked_add(line_price)
            .filter(|p| *p <= MAX_MONEY)
            .ok_or_else(|| DomainError::validation("order total price is too large"))?;
        Ok(OrderTotals { count, price })
    })
}
