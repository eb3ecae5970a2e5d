//! Request/response bodies and their mapping to domain types.
//!
//! Request fields are optional at the serde level so that a missing field
//! produces a readable 400 instead of a generic deserialization failure.

use serde::{Deserialize, Serialize};

use doorsales_core::{Decimal, DomainError, DomainResult};
use doorsales_sales::{DoorSpec, OrderDraft, OrderHeader};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// `(login, password)`, both required and non-empty.
    pub fn into_credentials(self) -> DomainResult<(String, String)> {
        let login = self
            .login
            .filter(|l| !l.is_empty())
            .ok_or_else(|| DomainError::validation("login is required"))?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DomainError::validation("password is required"))?;
        Ok((login, password))
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Body of `POST /orders` and `PUT /orders/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderRequest {
    pub customer: Option<String>,
    pub phone: Option<String>,
    pub date: Option<String>,
    pub prepayment: Option<Decimal>,
    pub comment: Option<String>,
    pub status: Option<String>,
    pub orders: Option<Vec<DoorRequest>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DoorRequest {
    #[serde(rename = "type")]
    pub door_type: Option<String>,
    pub model: Option<String>,
    pub price: Option<Decimal>,
    pub color: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    #[serde(rename = "leafType")]
    pub leaf_type: Option<String>,
    pub count: Option<i32>,
}

fn required<T>(value: Option<T>, field: &str) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::validation(format!("{field} is required")))
}

impl DoorRequest {
    fn into_spec(self, index: usize) -> DomainResult<DoorSpec> {
        let field = |name: &str| format!("orders[{index}].{name}");
        Ok(DoorSpec {
            door_type: required(self.door_type, &field("type"))?,
            model: required(self.model, &field("model"))?,
            price: required(self.price, &field("price"))?,
            color: required(self.color, &field("color"))?,
            width: required(self.width, &field("width"))?,
            height: required(self.height, &field("height"))?,
            leaf_type: required(self.leaf_type, &field("leafType"))?,
            count: required(self.count, &field("count"))?,
        })
    }
}

impl TryFrom<OrderRequest> for OrderDraft {
    type Error = DomainError;

    fn try_from(req: OrderRequest) -> DomainResult<Self> {
        let header = OrderHeader {
            customer: required(req.customer, "customer")?,
            phone: required(req.phone, "phone")?,
            date: required(req.date, "date")?,
            prepayment: required(req.prepayment, "prepayment")?,
            comment: req.comment,
            status: required(req.status, "status")?,
        };

        let doors = required(req.orders, "orders")?
            .into_iter()
            .enumerate()
            .map(|(idx, door)| door.into_spec(idx))
            .collect::<DomainResult<Vec<_>>>()?;

        OrderDraft::new(header, doors)
    }
}
