//! User management service

use crate::{
    error::{AppError, AppResult},
    models::user::User,
    repository::Repository,
};

use super::normalize_name;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn create_user(&self, name: &str) -> AppResult<User> {
        let name = normalize_name(name)?;
        let user = self.repository.users.create(name).await?;
        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    pub async fn rename_user(&self, id: i32, name: &str) -> AppResult<User> {
        let name = normalize_name(name)?;
        self.repository.users.update(id, name).await
    }

    /// Delete a user. Users referenced by any loan are kept.
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repository.users.get_by_id(id).await?;

        let loans = self.repository.loans.count_for_user(id).await?;
        if loans > 0 {
            return Err(AppError::ConstraintViolation(format!(
                "User {} is referenced by {} loan(s)",
                id, loans
            )));
        }

        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockall::predicate::eq;

    use super::*;
    use crate::repository::{
        health::MockHealthRepository, items::MockItemsRepository, loans::MockLoansRepository,
        users::MockUsersRepository,
    };

    fn service(users: MockUsersRepository, loans: MockLoansRepository) -> UsersService {
        UsersService::new(Repository::new(
            Arc::new(users),
            Arc::new(MockItemsRepository::new()),
            Arc::new(loans),
            Arc::new(MockHealthRepository::new()),
        ))
    }

    #[tokio::test]
    async fn create_user_trims_name() {
        let mut users = MockUsersRepository::new();
        users
            .expect_create()
            .withf(|name| name == "Alice")
            .times(1)
            .returning(|name| {
                Ok(User {
                    id: 1,
                    name: name.to_string(),
                })
            });

        let user = service(users, MockLoansRepository::new())
            .create_user("  Alice ")
            .await
            .unwrap();
        assert_eq!(user.name, "Alice");
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let mut users = MockUsersRepository::new();
        users.expect_create().never();
        users.expect_update().never();
        let service = service(users, MockLoansRepository::new());

        assert!(matches!(
            service.create_user("   ").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.rename_user(1, "").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_referenced_user_is_refused() {
        let mut users = MockUsersRepository::new();
        users.expect_get_by_id().returning(|id| {
            Ok(User {
                id,
                name: "Alice".to_string(),
            })
        });
        users.expect_delete().never();
        let mut loans = MockLoansRepository::new();
        loans.expect_count_for_user().with(eq(1)).returning(|_| Ok(2));

        let err = service(users, loans).delete_user(1).await.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn delete_unreferenced_user() {
        let mut users = MockUsersRepository::new();
        users.expect_get_by_id().returning(|id| {
            Ok(User {
                id,
                name: "Bob".to_string(),
            })
        });
        users.expect_delete().with(eq(3)).times(1).returning(|_| Ok(()));
        let mut loans = MockLoansRepository::new();
        loans.expect_count_for_user().returning(|_| Ok(0));

        service(users, loans).delete_user(3).await.unwrap();
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let mut users = MockUsersRepository::new();
        users
            .expect_get_by_id()
            .returning(|id| Err(AppError::NotFound(format!("User with id {} not found", id))));
        let mut loans = MockLoansRepository::new();
        loans.expect_count_for_user().never();

        let err = service(users, loans).delete_user(9).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
