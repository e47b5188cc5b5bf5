//! PostgreSQL storage backend using sqlx.
//!
//! Provides [`PgOrdersRepository`] and [`PgLoanTypeRepository`] backed
//! by a PostgreSQL database via `sqlx::PgPool`.
//!
//! # Schema
//!
//! Orders live in an `orders` table keyed by UUID with one column per
//! entity attribute and foreign keys into the `statuses` and
//! `loan_types` catalogs. The primary key on `orders.id` is the last
//! line of defense against duplicate writes racing the upsert logic.
//!
//! # Upsert-safe save
//!
//! Postgres is driven through a row-count-returning insert and a
//! separate update path rather than `ON CONFLICT`: `save` opens a
//! transaction, checks existence, then inserts or full-row updates,
//! reads the row back and commits. The existence check and the write
//! are atomic with respect to concurrent writers on the same id.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::OrderError;
use crate::core::loan_type::LoanType;
use crate::core::order::Order;
use crate::core::pending::{PendingLoanRequest, monthly_installment};
use crate::core::repository::{
    LoanTypeRepository, OrdersRepository, PageRequest, PendingFilter,
};

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required tables and indexes (idempotent).
///
/// Creates the `statuses` and `loan_types` catalogs and the `orders`
/// table. Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS statuses (
            id UUID PRIMARY KEY,
            name VARCHAR(50) NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT ''
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create statuses table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS loan_types (
            id UUID PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            minimum_amount NUMERIC(15,2) NOT NULL,
            maximum_amount NUMERIC(15,2) NOT NULL,
            interest_rate NUMERIC(8,6) NOT NULL,
            automatic_validation BOOLEAN NOT NULL DEFAULT FALSE
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create loan_types table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
            id UUID PRIMARY KEY,
            document_id VARCHAR(12) NOT NULL,
            amount NUMERIC(15,2) NOT NULL,
            deadline_months INTEGER NOT NULL,
            email_address VARCHAR(255) NOT NULL,
            loan_type_id UUID NOT NULL REFERENCES loan_types(id),
            status_id UUID NOT NULL REFERENCES statuses(id),
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create orders table: {}", e))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_document_id ON orders (document_id)")
        .execute(pool)
        .await
        .map_err(|e| anyhow!("Failed to create document index: {}", e))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_email_address ON orders (email_address)")
        .execute(pool)
        .await
        .map_err(|e| anyhow!("Failed to create email index: {}", e))?;

    Ok(())
}

fn persistence(e: sqlx::Error) -> OrderError {
    OrderError::Persistence(anyhow::Error::new(e))
}

// ---------------------------------------------------------------------------
// PgOrdersRepository
// ---------------------------------------------------------------------------

type OrderTuple = (
    Uuid,
    String,
    Decimal,
    i32,
    String,
    Uuid,
    Uuid,
    DateTime<Utc>,
    DateTime<Utc>,
);

const ORDER_COLUMNS: &str = "id, document_id, amount, deadline_months, email_address, \
     loan_type_id, status_id, created_at, updated_at";

fn order_from_tuple(row: OrderTuple) -> Order {
    let (
        id,
        document_id,
        amount,
        deadline_months,
        email_address,
        loan_type_id,
        status_id,
        created_at,
        updated_at,
    ) = row;
    Order {
        id,
        document_id,
        amount,
        deadline_months,
        email_address,
        loan_type_id,
        status_id,
        created_at,
        updated_at,
    }
}

/// Order storage backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PgOrdersRepository {
    pool: PgPool,
}

impl PgOrdersRepository {
    /// Create a repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrdersRepository for PgOrdersRepository {
    async fn save(&self, order: Order) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
            .bind(order.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(persistence)?;

        if exists {
            // Full-row replace; the save path owns the updated_at refresh.
            let result = sqlx::query(
                "UPDATE orders SET document_id = $2, amount = $3, deadline_months = $4, \
                 email_address = $5, loan_type_id = $6, status_id = $7, updated_at = $8 \
                 WHERE id = $1",
            )
            .bind(order.id)
            .bind(&order.document_id)
            .bind(order.amount)
            .bind(order.deadline_months)
            .bind(&order.email_address)
            .bind(order.loan_type_id)
            .bind(order.status_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;

            if result.rows_affected() != 1 {
                return Err(OrderError::Persistence(anyhow!(
                    "update of order {} affected {} rows",
                    order.id,
                    result.rows_affected()
                )));
            }
        } else {
            let result = sqlx::query(
                "INSERT INTO orders (id, document_id, amount, deadline_months, email_address, \
                 loan_type_id, status_id, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(order.id)
            .bind(&order.document_id)
            .bind(order.amount)
            .bind(order.deadline_months)
            .bind(&order.email_address)
            .bind(order.loan_type_id)
            .bind(order.status_id)
            .bind(order.created_at)
            .bind(order.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;

            if result.rows_affected() != 1 {
                return Err(OrderError::Persistence(anyhow!(
                    "insert of order {} affected {} rows",
                    order.id,
                    result.rows_affected()
                )));
            }
        }

        // Read back inside the same transaction so the returned entity
        // is exactly what was persisted.
        let row = sqlx::query_as::<_, OrderTuple>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(order.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(persistence)?;

        tx.commit().await.map_err(persistence)?;

        Ok(order_from_tuple(row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderError> {
        let row = sqlx::query_as::<_, OrderTuple>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(row.map(order_from_tuple))
    }

    async fn find_by_document_id(&self, document_id: &str) -> Result<Option<Order>, OrderError> {
        let row = sqlx::query_as::<_, OrderTuple>(&format!(
            "SELECT {} FROM orders WHERE document_id = $1 ORDER BY created_at DESC LIMIT 1",
            ORDER_COLUMNS
        ))
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(row.map(order_from_tuple))
    }

    async fn find_by_email_address(&self, email: &str) -> Result<Vec<Order>, OrderError> {
        let rows = sqlx::query_as::<_, OrderTuple>(&format!(
            "SELECT {} FROM orders WHERE email_address = $1 ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(rows.into_iter().map(order_from_tuple).collect())
    }

    async fn exists_by_document_id_and_status(
        &self,
        document_id: &str,
        status_id: Uuid,
    ) -> Result<bool, OrderError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE document_id = $1 AND status_id = $2)",
        )
        .bind(document_id)
        .bind(status_id)
        .fetch_one(&self.pool)
        .await
        .map_err(persistence)
    }

    async fn find_pending_status_id(&self) -> Result<Option<Uuid>, OrderError> {
        sqlx::query_scalar("SELECT id FROM statuses WHERE UPPER(name) = 'PENDING' LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)
    }

    async fn find_pending_orders(
        &self,
        filter: &PendingFilter,
        page: &PageRequest,
    ) -> Result<Vec<PendingLoanRequest>, OrderError> {
        let rows = sqlx::query_as::<_, (Decimal, i32, String, String, Decimal, String)>(
            "SELECT o.amount, o.deadline_months, o.email_address, \
                    lt.name AS loan_type, lt.interest_rate, s.name AS status \
             FROM orders o \
             JOIN loan_types lt ON lt.id = o.loan_type_id \
             JOIN statuses s ON s.id = o.status_id \
             WHERE ($1::uuid IS NULL OR o.status_id = $1) \
               AND ($2::varchar IS NULL OR o.email_address = $2) \
             ORDER BY o.created_at DESC \
             LIMIT $3 OFFSET $4",
        )
        .bind(filter.status_id)
        .bind(filter.email_address.as_deref())
        .bind(i64::from(page.size))
        .bind(page.sql_offset()?)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(rows
            .into_iter()
            .map(
                |(amount, deadline_months, email_address, loan_type, interest_rate, status)| {
                    PendingLoanRequest {
                        total_monthly_debt: monthly_installment(
                            amount,
                            interest_rate,
                            deadline_months,
                        ),
                        amount,
                        deadline_months,
                        email_address,
                        loan_type,
                        interest_rate,
                        status,
                        applicant_name: None,
                        base_salary: None,
                    }
                },
            )
            .collect())
    }
}

// ---------------------------------------------------------------------------
// PgLoanTypeRepository
// ---------------------------------------------------------------------------

/// Loan-type catalog reads backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PgLoanTypeRepository {
    pool: PgPool,
}

impl PgLoanTypeRepository {
    /// Create a repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanTypeRepository for PgLoanTypeRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LoanType>, OrderError> {
        let row = sqlx::query_as::<_, (Uuid, String, Decimal, Decimal, Decimal, bool)>(
            "SELECT id, name, minimum_amount, maximum_amount, interest_rate, automatic_validation \
             FROM loan_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(row.map(
            |(id, name, minimum_amount, maximum_amount, interest_rate, automatic_validation)| {
                LoanType {
                    id,
                    name,
                    minimum_amount,
                    maximum_amount,
                    interest_rate,
                    automatic_validation,
                }
            },
        ))
    }
}
