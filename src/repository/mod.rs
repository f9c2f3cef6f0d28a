//! Repository layer for database operations

pub mod health;
pub mod items;
pub mod loans;
pub mod users;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub use health::HealthRepository;
pub use items::ItemsRepository;
pub use loans::LoansRepository;
pub use users::UsersRepository;

/// Persistence gateway: one repository per record kind
#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UsersRepository>,
    pub items: Arc<dyn ItemsRepository>,
    pub loans: Arc<dyn LoansRepository>,
    pub health: Arc<dyn HealthRepository>,
}

impl Repository {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        items: Arc<dyn ItemsRepository>,
        loans: Arc<dyn LoansRepository>,
        health: Arc<dyn HealthRepository>,
    ) -> Self {
        Self {
            users,
            items,
            loans,
            health,
        }
    }

    /// Create PostgreSQL-backed repositories sharing the given pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self::new(
            Arc::new(users::PgUsersRepository::new(pool.clone())),
            Arc::new(items::PgItemsRepository::new(pool.clone())),
            Arc::new(loans::PgLoansRepository::new(pool.clone())),
            Arc::new(health::PgHealthRepository::new(pool)),
        )
    }
}
