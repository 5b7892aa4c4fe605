use crate::{
    db::{DatabaseAccess, DbPool},
    entities::item::{self, Entity as ItemEntity, Model as ItemModel},
    errors::ServiceError,
    models::AddItemRequest,
};
use chrono::Utc;
use sea_orm::{
    sea_query::{extension::postgres::PgExpr, Expr, LikeExpr},
    ConnectionTrait, DatabaseBackend, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Escapes LIKE wildcards so the keyword matches literally.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for ch in keyword.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// CRUD operations over the `items` table.
#[derive(Debug, Clone)]
pub struct ItemService {
    db: DatabaseAccess,
}

impl ItemService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            db: DatabaseAccess::new(db_pool),
        }
    }

    /// Mints a fresh identifier for an item that has not been stored yet.
    pub fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Validates and stores a new item, returning the stored row.
    #[instrument(skip(self, request), fields(item_id = %request.id))]
    pub async fn add_item(&self, request: AddItemRequest) -> Result<ItemModel, ServiceError> {
        request.validate()?;

        let id = request.id.trim().to_string();
        let existing = self
            .db
            .execute("find_item", |db| ItemEntity::find_by_id(id.clone()).one(db))
            .await?;
        if existing.is_some() {
            warn!(item_id = %id, "Rejected duplicate item id");
            return Err(ServiceError::Conflict(format!(
                "Item with ID {} already exists",
                id
            )));
        }

        let model = request.item.into_model(id.clone(), Utc::now());
        let active = model.clone().into_active_model();
        self.db
            .execute("insert_item", |db| {
                ItemEntity::insert(active).exec_without_returning(db)
            })
            .await
            .map_err(|e| ServiceError::from_insert_error(e, &id))?;

        info!(item_id = %model.id, name = %model.name, "Item added");
        Ok(model)
    }

    /// Items whose name contains `keyword`, ignoring case. A blank keyword matches nothing.
    ///
    /// Postgres folds case with `ILIKE`. SQLite's `LIKE` only folds ASCII, so a
    /// keyword with other characters is matched on the loaded rows instead.
    #[instrument(skip(self))]
    pub async fn search_items(&self, keyword: &str) -> Result<Vec<ItemModel>, ServiceError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = LikeExpr::new(format!("%{}%", escape_like(keyword))).escape('\\');
        let condition = match self.db.get_pool().get_database_backend() {
            DatabaseBackend::Postgres => Some(Expr::col(item::Column::Name).ilike(pattern)),
            _ if keyword.is_ascii() => Some(Expr::col(item::Column::Name).like(pattern)),
            _ => None,
        };
        let folded_in_store = condition.is_some();

        let mut query = ItemEntity::find().order_by_asc(item::Column::CreatedAt);
        if let Some(condition) = condition {
            query = query.filter(condition);
        }
        let mut results = self
            .db
            .execute("search_items", |db| query.all(db))
            .await?;

        if !folded_in_store {
            let needle = keyword.to_lowercase();
            results.retain(|item| item.name.to_lowercase().contains(&needle));
        }
        Ok(results)
    }

    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<ItemModel>, ServiceError> {
        let items = self
            .db
            .execute("list_items", |db| {
                ItemEntity::find()
                    .order_by_asc(item::Column::CreatedAt)
                    .order_by_asc(item::Column::Id)
                    .all(db)
            })
            .await?;
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn count_items(&self) -> Result<u64, ServiceError> {
        let count = self
            .db
            .execute("count_items", |db| ItemEntity::find().count(db))
            .await?;
        Ok(count)
    }

    /// Deletes one item. An id that matches nothing is `NotFound` and changes nothing.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: &str) -> Result<(), ServiceError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ServiceError::ValidationError("Item ID is required".to_string()));
        }

        let owned = id.to_string();
        let result = self
            .db
            .execute("delete_item", |db| ItemEntity::delete_by_id(owned).exec(db))
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Item with ID {} not found", id)));
        }

        info!(item_id = %id, "Item deleted");
        Ok(())
    }

    /// Removes every item and returns how many were deleted.
    #[instrument(skip(self))]
    pub async fn clear_items(&self) -> Result<u64, ServiceError> {
        let result = self
            .db
            .execute("clear_items", |db| ItemEntity::delete_many().exec(db))
            .await?;

        info!(deleted = result.rows_affected, "Item list cleared");
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection_with_config, run_migrations, DbConfig};
    use crate::models::NewItem;
    use assert_matches::assert_matches;

    async fn service() -> ItemService {
        let pool = establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .expect("in-memory sqlite");
        run_migrations(&pool).await.expect("migrations");
        ItemService::new(Arc::new(pool))
    }

    async fn add(service: &ItemService, name: &str) -> ItemModel {
        let id = service.generate_id();
        service
            .add_item(AddItemRequest::new(id, NewItem::new(name, 2)))
            .await
            .expect("add item")
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn generated_ids_are_unique_uuids() {
        let service = ItemService {
            db: DatabaseAccess::new(Arc::new(DbPool::Disconnected)),
        };
        let a = service.generate_id();
        let b = service.generate_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[tokio::test]
    async fn add_then_list_and_count() {
        let service = service().await;
        let stored = add(&service, "Widget").await;
        assert_eq!(stored.category, "Uncategorized");

        let items = service.list_items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, stored.id);
        assert_eq!(service.count_items().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_id_is_a_conflict() {
        let service = service().await;
        let stored = add(&service, "Widget").await;

        let err = service
            .add_item(AddItemRequest::new(stored.id.clone(), NewItem::new("Gadget", 1)))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::Conflict(_));
        assert_eq!(service.count_items().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn invalid_item_is_rejected_before_storage() {
        let service = service().await;
        let err = service
            .add_item(AddItemRequest::new("x", NewItem::new("  ", 1)))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
        assert_eq!(service.count_items().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let service = service().await;
        add(&service, "Blue Widget").await;
        add(&service, "Gadget").await;

        let results = service.search_items("WIDG").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Blue Widget");

        assert!(service.search_items("").await.unwrap().is_empty());
        assert!(service.search_items("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let service = service().await;
        add(&service, "ÉCLAIR au chocolat").await;
        add(&service, "Eclair plain").await;

        for keyword in ["ÉCLAIR", "Éclair", "éclair"] {
            let results = service.search_items(keyword).await.unwrap();
            assert_eq!(results.len(), 1, "keyword {keyword}");
            assert_eq!(results[0].name, "ÉCLAIR au chocolat");
        }
        assert_eq!(service.search_items("eclair").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let service = service().await;
        add(&service, "100% cotton").await;
        add(&service, "Plain shirt").await;

        assert_eq!(service.search_items("%").await.unwrap().len(), 1);
        assert!(service.search_items("_").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_item_is_not_found() {
        let service = service().await;
        add(&service, "Widget").await;

        let err = service.delete_item("no-such-id").await.unwrap_err();
        assert_matches!(err, ServiceError::NotFound(_));
        assert_eq!(service.count_items().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_and_clear_remove_rows() {
        let service = service().await;
        let first = add(&service, "Widget").await;
        add(&service, "Gadget").await;
        add(&service, "Gizmo").await;

        service.delete_item(&first.id).await.unwrap();
        assert_eq!(service.count_items().await.unwrap(), 2);

        assert_eq!(service.clear_items().await.unwrap(), 2);
        assert_eq!(service.count_items().await.unwrap(), 0);
        assert_eq!(service.clear_items().await.unwrap(), 0);
    }
}
