//! Inventory item service

use crate::{
    error::{AppError, AppResult},
    models::item::Item,
    repository::Repository,
};

use super::normalize_name;

#[derive(Clone)]
pub struct ItemsService {
    repository: Repository,
}

impl ItemsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_items(&self) -> AppResult<Vec<Item>> {
        self.repository.items.list().await
    }

    pub async fn get_item(&self, id: i32) -> AppResult<Item> {
        self.repository.items.get_by_id(id).await
    }

    pub async fn create_item(&self, name: &str) -> AppResult<Item> {
        let name = normalize_name(name)?;
        let item = self.repository.items.create(name).await?;
        tracing::info!(item_id = item.id, "Item created");
        Ok(item)
    }

    pub async fn rename_item(&self, id: i32, name: &str) -> AppResult<Item> {
        let name = normalize_name(name)?;
        self.repository.items.update(id, name).await
    }

    /// Delete an item. Items referenced by any loan are kept.
    pub async fn delete_item(&self, id: i32) -> AppResult<()> {
        self.repository.items.get_by_id(id).await?;

        let loans = self.repository.loans.count_for_item(id).await?;
        if loans > 0 {
            return Err(AppError::ConstraintViolation(format!(
                "Item {} is referenced by {} loan(s)",
                id, loans
            )));
        }

        self.repository.items.delete(id).await?;
        tracing::info!(item_id = id, "Item deleted");
        Ok(())
    }
}
