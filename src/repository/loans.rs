//! Loans repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanDetails, LoanDetailsRow, LoanStatus, NewLoan},
};

const LOAN_COLUMNS: &str =
    "l.id, l.user_id, l.item_id, l.qty, l.start_date, l.end_date, l.status, l.created_at";

/// Persistence operations on loans
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoansRepository: Send + Sync {
    /// Insert an `Active` loan
    async fn create(&self, loan: &NewLoan) -> AppResult<Loan>;

    /// Get loan by ID, `NotFound` on miss
    async fn get_by_id(&self, id: i32) -> AppResult<Loan>;

    /// Get loan by ID joined with user and item names
    async fn get_details(&self, id: i32) -> AppResult<LoanDetails>;

    /// All loans with user and item names, most recent first
    async fn list(&self) -> AppResult<Vec<LoanDetails>>;

    async fn update_status(&self, id: i32, status: LoanStatus) -> AppResult<Loan>;

    /// Number of loans (any status) referencing a user
    async fn count_for_user(&self, user_id: i32) -> AppResult<i64>;

    /// Number of loans (any status) referencing an item
    async fn count_for_item(&self, item_id: i32) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct PgLoansRepository {
    pool: Pool<Postgres>,
}

impl PgLoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn details_query(filter: &str) -> String {
        format!(
            r#"
            SELECT {LOAN_COLUMNS}, u.name AS user_name, i.name AS item_name
            FROM loans l
            JOIN users u ON l.user_id = u.id
            JOIN items i ON l.item_id = i.id
            {filter}
            "#
        )
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Loan with id {} not found", id))
}

#[async_trait]
impl LoansRepository for PgLoansRepository {
    async fn create(&self, loan: &NewLoan) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, item_id, qty, start_date, end_date, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, item_id, qty, start_date, end_date, status, created_at
            "#,
        )
        .bind(loan.user_id)
        .bind(loan.item_id)
        .bind(loan.qty)
        .bind(loan.start_date)
        .bind(loan.end_date)
        .bind(LoanStatus::Active)
        .bind(loan.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from_write)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(&format!("SELECT {LOAN_COLUMNS} FROM loans l WHERE l.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        sqlx::query_as::<_, LoanDetailsRow>(&Self::details_query("WHERE l.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(LoanDetails::from)
            .ok_or_else(|| not_found(id))
    }

    async fn list(&self) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query_as::<_, LoanDetailsRow>(&Self::details_query(
            "ORDER BY l.created_at DESC, l.id DESC",
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LoanDetails::from).collect())
    }

    async fn update_status(&self, id: i32, status: LoanStatus) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET status = $1 WHERE id = $2
            RETURNING id, user_id, item_id, qty, start_date, end_date, status, created_at
            "#,
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from_write)?
        .ok_or_else(|| not_found(id))
    }

    async fn count_for_user(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_for_item(&self, item_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE item_id = $1")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
