//! Postgres-backed order repository.
//!
//! Every write runs in an explicit transaction. Dropping a `Transaction`
//! without committing rolls it back, so any `?` inside a write path leaves
//! the database as it was.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder, Row};
use tracing::{Span, instrument};

use doorsales_core::{DoorId, OrderId};
use doorsales_sales::{Door, DoorSpec, Order, OrderDraft};

use super::OrderRepository;
use crate::error::{RepositoryError, map_sqlx_error};

const ORDER_COLUMNS: &str =
    "id, customer, phone, date, count, price, prepayment, comment, status, created_at";

const DOOR_COLUMNS: &str =
    "id, order_id, door_type, model, price, color, width, height, leaf_type, count";

/// Orders and doors stored in the `orders` / `doors` tables.
#[derive(Debug, Clone)]
pub struct PostgresOrderRepository {
    pool: Arc<PgPool>,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl OrderRepository for PostgresOrderRepository {
    #[instrument(skip(self, draft), fields(doors = draft.doors().len(), order_id), err)]
    async fn create(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let header = draft.header();
        let totals = draft.totals();

        let row = sqlx::query(
            r#"
            INSERT INTO orders (customer, phone, date, count, price, prepayment, comment, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&header.customer)
        .bind(&header.phone)
        .bind(&header.date)
        .bind(totals.count)
        .bind(totals.price)
        .bind(header.prepayment)
        .bind(header.comment.as_deref())
        .bind(&header.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        let id = OrderId::new(
            row.try_get("id")
                .map_err(|e| map_sqlx_error("insert_order", e))?,
        );

        insert_doors(&mut tx, id, draft.doors()).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("order_id", id.get());
        self.get(id).await
    }

    #[instrument(skip(self), fields(count), err)]
    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        // One snapshot for both reads so orders and doors agree.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_isolation", e))?;

        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id DESC"
        ))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        let orders = rows
            .iter()
            .map(OrderRow::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("decode_order", e))?;

        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let door_rows = sqlx::query(&format!(
            "SELECT {DOOR_COLUMNS} FROM doors WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("list_doors", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        let mut doors_by_order: HashMap<i64, Vec<Door>> = HashMap::new();
        for row in &door_rows {
            let door = DoorRow::from_row(row).map_err(|e| map_sqlx_error("decode_door", e))?;
            doors_by_order
                .entry(door.order_id)
                .or_default()
                .push(door.into());
        }

        Span::current().record("count", orders.len());
        Ok(orders
            .into_iter()
            .map(|o| {
                let doors = doors_by_order.remove(&o.id).unwrap_or_default();
                o.into_order(doors)
            })
            .collect())
    }

    #[instrument(skip(self), fields(order_id = id.get()), err)]
    async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire_connection", e))?;

        fetch_order(&mut conn, id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip(self, draft), fields(order_id = id.get(), doors = draft.doors().len()), err)]
    async fn update(&self, id: OrderId, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // Row lock serializes concurrent updates of the same order.
        let existing = sqlx::query("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_order", e))?;

        if existing.is_none() {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(RepositoryError::NotFound);
        }

        let header = draft.header();
        let totals = draft.totals();

        sqlx::query(
            r#"
            UPDATE orders
            SET customer = $2,
                phone = $3,
                date = $4,
                count = $5,
                price = $6,
                prepayment = $7,
                comment = $8,
                status = $9
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(&header.customer)
        .bind(&header.phone)
        .bind(&header.date)
        .bind(totals.count)
        .bind(totals.price)
        .bind(header.prepayment)
        .bind(header.comment.as_deref())
        .bind(&header.status)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_order", e))?;

        sqlx::query("DELETE FROM doors WHERE order_id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_doors", e))?;

        insert_doors(&mut tx, id, draft.doors()).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        self.get(id).await
    }

    #[instrument(skip(self), fields(order_id = id.get()), err)]
    async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        // doors.order_id is ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_order", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

async fn insert_doors(
    conn: &mut PgConnection,
    order_id: OrderId,
    doors: &[DoorSpec],
) -> Result<(), RepositoryError> {
    if doors.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO doors (order_id, door_type, model, price, color, width, height, leaf_type, count) ",
    );
    builder.push_values(doors, |mut b, door| {
        b.push_bind(order_id.get())
            .push_bind(door.door_type.clone())
            .push_bind(door.model.clone())
            .push_bind(door.price)
            .push_bind(door.color.clone())
            .push_bind(door.width)
            .push_bind(door.height)
            .push_bind(door.leaf_type.clone())
            .push_bind(door.count);
    });

    builder
        .build()
        .execute(conn)
        .await
        .map_err(|e| map_sqlx_error("insert_doors", e))?;
    Ok(())
}

async fn fetch_order(conn: &mut PgConnection, id: OrderId) -> Result<Option<Order>, RepositoryError> {
    let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("get_order", e))?;

    let Some(row) = row else {
        return Ok(None);
    };
    let order = OrderRow::from_row(&row).map_err(|e| map_sqlx_error("decode_order", e))?;

    let door_rows = sqlx::query(&format!(
        "SELECT {DOOR_COLUMNS} FROM doors WHERE order_id = $1 ORDER BY id"
    ))
    .bind(id.get())
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("get_doors", e))?;

    let doors = door_rows
        .iter()
        .map(|r| DoorRow::from_row(r).map(Door::from))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_sqlx_error("decode_door", e))?;

    Ok(Some(order.into_order(doors)))
}

#[derive(Debug)]
struct OrderRow {
    id: i64,
    customer: String,
    phone: String,
    date: String,
    count: i64,
    price: Decimal,
    prepayment: Decimal,
    comment: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderRow {
            id: row.try_get("id")?,
            customer: row.try_get("customer")?,
            phone: row.try_get("phone")?,
            date: row.try_get("date")?,
            count: row.try_get("count")?,
            price: row.try_get("price")?,
            prepayment: row.try_get("prepayment")?,
            comment: row.try_get("comment")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl OrderRow {
    fn into_order(self, doors: Vec<Door>) -> Order {
        Order {
            id: OrderId::new(self.id),
            customer: self.customer,
            phone: self.phone,
            date: self.date,
            count: self.count,
            price: self.price,
            prepayment: self.prepayment,
            comment: self.comment,
            status: self.status,
            created_at: self.created_at,
            doors,
        }
    }
}

#[derive(Debug)]
struct DoorRow {
    id: i64,
    order_id: i64,
    door_type: String,
    model: String,
    price: Decimal,
    color: String,
    width: i32,
    height: i32,
    leaf_type: String,
    count: i32,
}

impl<'r> FromRow<'r, PgRow> for DoorRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(DoorRow {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            door_type: row.try_get("door_type")?,
            model: row.try_get("model")?,
            price: row.try_get("price")?,
            color: row.try_get("color")?,
            width: row.try_get("width")?,
            height: row.try_get("height")?,
            leaf_type: row.try_get("leaf_type")?,
            count: row.try_get("count")?,
        })
    }
}

impl From<DoorRow> for Door {
    fn from(row: DoorRow) -> Self {
        Door {
            id: DoorId::new(row.id),
            order_id: OrderId::new(row.order_id),
            door_type: row.door_type,
            model: row.model,
            price: row.price,
            color: row.color,
            width: row.width,
            height: row.height,
            leaf_type: row.leaf_type,
            count: row.count,
        }
    }
}
