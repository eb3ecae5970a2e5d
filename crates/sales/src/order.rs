use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use doorsales_core::{
    Decimal, DomainError, DomainResult, DoorId, MAX_MONEY, OrderId, normalize_money,
};

use crate::aggregate::{LineItem, OrderTotals, aggregate};

/// Door specification as submitted by a client (one line item, not yet stored).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorSpec {
    pub door_type: String,
    pub model: String,
    /// Unit price.
    pub price: Decimal,
    pub color: String,
    pub width: i32,
    pub height: i32,
    pub leaf_type: String,
    pub count: i32,
}

impl DoorSpec {
    /// Validate and normalize (trim strings, round money) a line item.
    ///
    /// `index` is the position in the request and only shows up in messages.
    fn normalized(self, index: usize) -> DomainResult<Self> {
        let field = |name: &str| format!("orders[{index}].{name}");

        // Checked after rounding: 0.004 would otherwise be stored as 0.00.
        let price = normalize_money(self.price);
        if price <= Decimal::ZERO {
            return Err(DomainError::validation(format!("{} must be positive", field("price"))));
        }
        if price > MAX_MONEY {
            return Err(DomainError::validation(format!(
                "{} must not exceed {MAX_MONEY}",
                field("price")
            )));
        }
        if self.width <= 0 {
            return Err(DomainError::validation(format!("{} must be positive", field("width"))));
        }
        if self.height <= 0 {
            return Err(DomainError::validation(format!("{} must be positive", field("height"))));
        }
        if self.count < 1 {
            return Err(DomainError::validation(format!("{} must be at least 1", field("count"))));
        }

        Ok(Self {
            door_type: require_text(&field("type"), &self.door_type)?,
            model: require_text(&field("model"), &self.model)?,
            price,
            color: require_text(&field("color"), &self.color)?,
            width: self.width,
            height: self.height,
            leaf_type: require_text(&field("leafType"), &self.leaf_type)?,
            count: self.count,
        })
    }
}

impl LineItem for DoorSpec {
    fn unit_price(&self) -> Decimal {
        self.price
    }

    fn quantity(&self) -> i32 {
        self.count
    }
}

/// Mutable, client-owned fields of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHeader {
    pub customer: String,
    pub phone: String,
    /// Free-form date string, stored verbatim.
    pub date: String,
    pub prepayment: Decimal,
    pub comment: Option<String>,
    pub status: String,
}

impl OrderHeader {
    fn normalized(self) -> DomainResult<Self> {
        let prepayment = normalize_money(self.prepayment);
        if prepayment < Decimal::ZERO {
            return Err(DomainError::validation("prepayment must not be negative"));
        }
        if prepayment > MAX_MONEY {
            return Err(DomainError::validation(format!("prepayment must not exceed {MAX_MONEY}")));
        }

        Ok(Self {
            customer: require_text("customer", &self.customer)?,
            phone: require_text("phone", &self.phone)?,
            date: require_text("date", &self.date)?,
            prepayment,
            comment: self
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            status: require_text("status", &self.status)?,
        })
    }
}

/// A validated order ready to be written: header, doors, and the totals
/// derived from those doors.
///
/// The only way to build one is [`OrderDraft::new`], so `totals` always
/// matches `doors`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    header: OrderHeader,
    doors: Vec<DoorSpec>,
    totals: OrderTotals,
}

impl OrderDraft {
    pub fn new(header: OrderHeader, doors: Vec<DoorSpec>) -> DomainResult<Self> {
        let header = header.normalized()?;

        if doors.is_empty() {
            return Err(DomainError::validation("order must contain at least one door"));
        }

        let doors = doors
            .into_iter()
            .enumerate()
            .map(|(idx, door)| door.normalized(idx))
            .collect::<DomainResult<Vec<_>>>()?;

        let totals = aggregate(&doors)?;

        Ok(Self {
            header,
            doors,
            totals,
        })
    }

    pub fn header(&self) -> &OrderHeader {
        &self.header
    }

    pub fn doors(&self) -> &[DoorSpec] {
        &self.doors
    }

    pub fn totals(&self) -> OrderTotals {
        self.totals
    }
}

/// Stored door line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub id: DoorId,
    pub order_id: OrderId,
    #[serde(rename = "type")]
    pub door_type: String,
    pub model: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub color: String,
    pub width: i32,
    pub height: i32,
    #[serde(rename = "leafType")]
    pub leaf_type: String,
    pub count: i32,
}

impl Door {
    pub fn from_spec(id: DoorId, order_id: OrderId, spec: &DoorSpec) -> Self {
        Self {
            id,
            order_id,
            door_type: spec.door_type.clone(),
            model: spec.model.clone(),
            price: spec.price,
            color: spec.color.clone(),
            width: spec.width,
            height: spec.height,
            leaf_type: spec.leaf_type.clone(),
            count: spec.count,
        }
    }
}

impl LineItem for Door {
    fn unit_price(&self) -> Decimal {
        self.price
    }

    fn quantity(&self) -> i32 {
        self.count
    }
}

/// Stored order with its doors attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer: String,
    pub phone: String,
    pub date: String,
    pub count: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub prepayment: Decimal,
    pub comment: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub doors: Vec<Door>,
}

fn require_text(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
