//! Loan lifecycle service
//!
//! Loans are created `Active` and can only move to `Returned`. Input is
//! validated here, before anything reaches the repository.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan, LoanDetails, LoanStatus, NewLoan},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All loans with user and item names, most recent first
    pub async fn list_loans(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list().await
    }

    pub async fn get_loan(&self, loan_id: i32) -> AppResult<LoanDetails> {
        self.repository.loans.get_details(loan_id).await
    }

    /// Create a new loan in the `Active` state
    pub async fn create_loan(&self, loan: CreateLoan) -> AppResult<Loan> {
        if loan.qty < 1 {
            return Err(AppError::Validation(format!(
                "Quantity must be at least 1 (got {})",
                loan.qty
            )));
        }
        if loan.end_date < loan.start_date {
            return Err(AppError::Validation(format!(
                "End date {} is before start date {}",
                loan.end_date, loan.start_date
            )));
        }

        // Referenced records must exist; a miss is bad input, not a missing loan
        self.repository
            .users
            .get_by_id(loan.user_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(msg) => AppError::Validation(msg),
                other => other,
            })?;
        self.repository
            .items
            .get_by_id(loan.item_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(msg) => AppError::Validation(msg),
                other => other,
            })?;

        let created = self
            .repository
            .loans
            .create(&NewLoan {
                user_id: loan.user_id,
                item_id: loan.item_id,
                qty: loan.qty,
                start_date: loan.start_date,
                end_date: Some(loan.end_date),
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            loan_id = created.id,
            user_id = created.user_id,
            item_id = created.item_id,
            qty = created.qty,
            "Loan created"
        );
        Ok(created)
    }

    /// Mark a loan as returned. Returning an already returned loan is a no-op.
    pub async fn mark_returned(&self, loan_id: i32) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;

        if loan.status == LoanStatus::Returned {
            tracing::debug!(loan_id, "Loan already returned");
            return Ok(loan);
        }

        let updated = self
            .repository
            .loans
            .update_status(loan_id, LoanStatus::Returned)
            .await?;
        tracing::info!(loan_id, "Loan returned");
        Ok(updated)
    }

    /// Apply a requested status. Only `Active -> Returned` changes anything;
    /// asking to reactivate a returned loan is rejected.
    pub async fn update_status(&self, loan_id: i32, status: LoanStatus) -> AppResult<Loan> {
        match status {
            LoanStatus::Returned => self.mark_returned(loan_id).await,
            LoanStatus::Active => {
                let loan = self.repository.loans.get_by_id(loan_id).await?;
                if loan.status == LoanStatus::Returned {
                    return Err(AppError::InvalidTransition(format!(
                        "Loan {} is already returned and cannot be reactivated",
                        loan_id
                    )));
                }
                Ok(loan)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use mockall::predicate::eq;

    use super::*;
    use crate::models::{item::Item, user::User};
    use crate::repository::{
        health::MockHealthRepository, items::MockItemsRepository, loans::MockLoansRepository,
        users::MockUsersRepository,
    };

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn service(
        users: MockUsersRepository,
        items: MockItemsRepository,
        loans: MockLoansRepository,
    ) -> LoansService {
        LoansService::new(Repository::new(
            Arc::new(users),
            Arc::new(items),
            Arc::new(loans),
            Arc::new(MockHealthRepository::new()),
        ))
    }

    fn existing_user(id: i32) -> MockUsersRepository {
        let mut users = MockUsersRepository::new();
        users.expect_get_by_id().with(eq(id)).returning(|id| {
            Ok(User {
                id,
                name: "Alice".to_string(),
            })
        });
        users
    }

    fn existing_item(id: i32) -> MockItemsRepository {
        let mut items = MockItemsRepository::new();
        items.expect_get_by_id().with(eq(id)).returning(|id| {
            Ok(Item {
                id,
                name: "Drill".to_string(),
            })
        });
        items
    }

    fn stored(new: &NewLoan, id: i32) -> Loan {
        Loan {
            id,
            user_id: new.user_id,
            item_id: new.item_id,
            qty: new.qty,
            start_date: new.start_date,
            end_date: new.end_date,
            status: LoanStatus::Active,
            created_at: new.created_at,
        }
    }

    fn loan_with_status(id: i32, status: LoanStatus) -> Loan {
        Loan {
            id,
            user_id: 1,
            item_id: 2,
            qty: 2,
            start_date: date("2024-01-01"),
            end_date: Some(date("2024-01-10")),
            status,
            created_at: Utc::now(),
        }
    }

    fn request(qty: i32, start: &str, end: &str) -> CreateLoan {
        CreateLoan {
            user_id: 1,
            item_id: 2,
            qty,
            start_date: date(start),
            end_date: date(end),
        }
    }

    #[tokio::test]
    async fn create_loan_starts_active() {
        let mut loans = MockLoansRepository::new();
        loans
            .expect_create()
            .times(1)
            .withf(|new| new.qty == 2 && new.end_date == Some(date("2024-01-10")))
            .returning(|new| Ok(stored(new, 42)));

        let service = service(existing_user(1), existing_item(2), loans);
        let loan = service
            .create_loan(request(2, "2024-01-01", "2024-01-10"))
            .await
            .unwrap();

        assert_eq!(loan.id, 42);
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.qty, 2);
    }

    #[tokio::test]
    async fn create_loan_allows_single_day_range() {
        let mut loans = MockLoansRepository::new();
        loans.expect_create().times(1).returning(|new| Ok(stored(new, 1)));

        let service = service(existing_user(1), existing_item(2), loans);
        let loan = service
            .create_loan(request(1, "2024-03-05", "2024-03-05"))
            .await
            .unwrap();
        assert_eq!(loan.start_date, loan.end_date.unwrap());
    }

    #[tokio::test]
    async fn create_loan_rejects_end_before_start_without_persisting() {
        let mut loans = MockLoansRepository::new();
        loans.expect_create().never();

        let service = service(MockUsersRepository::new(), MockItemsRepository::new(), loans);
        let err = service
            .create_loan(request(1, "2024-01-10", "2024-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_loan_rejects_non_positive_quantity() {
        for qty in [0, -3] {
            let mut loans = MockLoansRepository::new();
            loans.expect_create().never();

            let service = service(MockUsersRepository::new(), MockItemsRepository::new(), loans);
            let err = service
                .create_loan(request(qty, "2024-01-01", "2024-01-02"))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "qty {}", qty);
        }
    }

    #[tokio::test]
    async fn create_loan_rejects_unknown_user() {
        let mut users = MockUsersRepository::new();
        users
            .expect_get_by_id()
            .returning(|id| Err(AppError::NotFound(format!("User with id {} not found", id))));
        let mut loans = MockLoansRepository::new();
        loans.expect_create().never();

        let service = service(users, MockItemsRepository::new(), loans);
        let mut req = request(1, "2024-01-01", "2024-01-02");
        req.user_id = 999;
        req.item_id = 999;
        let err = service.create_loan(req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_loan_rejects_unknown_item() {
        let mut items = MockItemsRepository::new();
        items
            .expect_get_by_id()
            .returning(|id| Err(AppError::NotFound(format!("Item with id {} not found", id))));
        let mut loans = MockLoansRepository::new();
        loans.expect_create().never();

        let service = service(existing_user(1), items, loans);
        let err = service
            .create_loan(request(1, "2024-01-01", "2024-01-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_loan_passes_through_constraint_violations() {
        let mut loans = MockLoansRepository::new();
        loans
            .expect_create()
            .returning(|_| Err(AppError::ConstraintViolation("loans_user_id_fkey".to_string())));

        let service = service(existing_user(1), existing_item(2), loans);
        let err = service
            .create_loan(request(1, "2024-01-01", "2024-01-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn mark_returned_flips_active_loan() {
        let mut loans = MockLoansRepository::new();
        loans
            .expect_get_by_id()
            .with(eq(5))
            .returning(|id| Ok(loan_with_status(id, LoanStatus::Active)));
        loans
            .expect_update_status()
            .with(eq(5), eq(LoanStatus::Returned))
            .times(1)
            .returning(|id, status| Ok(loan_with_status(id, status)));

        let service = service(MockUsersRepository::new(), MockItemsRepository::new(), loans);
        let loan = service.mark_returned(5).await.unwrap();

        assert_eq!(loan.status, LoanStatus::Returned);
        assert_eq!(loan.qty, 2);
        assert_eq!(loan.start_date, date("2024-01-01"));
        assert_eq!(loan.end_date, Some(date("2024-01-10")));
    }

    #[tokio::test]
    async fn mark_returned_is_idempotent() {
        let mut loans = MockLoansRepository::new();
        loans
            .expect_get_by_id()
            .returning(|id| Ok(loan_with_status(id, LoanStatus::Returned)));
        loans.expect_update_status().never();

        let service = service(MockUsersRepository::new(), MockItemsRepository::new(), loans);
        let loan = service.mark_returned(5).await.unwrap();
        assert_eq!(loan.status, LoanStatus::Returned);
    }

    #[tokio::test]
    async fn mark_returned_unknown_loan_is_not_found() {
        let mut loans = MockLoansRepository::new();
        loans
            .expect_get_by_id()
            .returning(|id| Err(AppError::NotFound(format!("Loan with id {} not found", id))));

        let service = service(MockUsersRepository::new(), MockItemsRepository::new(), loans);
        let err = service.mark_returned(404).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn reactivating_returned_loan_is_rejected() {
        let mut loans = MockLoansRepository::new();
        loans
            .expect_get_by_id()
            .returning(|id| Ok(loan_with_status(id, LoanStatus::Returned)));
        loans.expect_update_status().never();

        let service = service(MockUsersRepository::new(), MockItemsRepository::new(), loans);
        let err = service.update_status(5, LoanStatus::Active).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn active_status_on_active_loan_is_a_no_op() {
        let mut loans = MockLoansRepository::new();
        loans
            .expect_get_by_id()
            .returning(|id| Ok(loan_with_status(id, LoanStatus::Active)));
        loans.expect_update_status().never();

        let service = service(MockUsersRepository::new(), MockItemsRepository::new(), loans);
        let loan = service.update_status(5, LoanStatus::Active).await.unwrap();
        assert_eq!(loan.status, LoanStatus::Active);
    }
}
