//! Product Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Product;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, product: Product) -> RepoResult<Product> {
        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(id.clone()).await?;
        Ok(product)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Outstanding purchase lines for one supplier, oldest first
    ///
    /// The ordering is the FIFO settlement order — do not change it.
    pub async fn list_outstanding_by_supplier(
        &self,
        supplier: &RecordId,
    ) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE supplier = $supplier AND remaining_amount > 0 ORDER BY created_at ASC")
            .bind(("supplier", supplier.clone()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Total product-side due for one supplier
    pub async fn sum_outstanding_by_supplier(&self, supplier: &RecordId) -> RepoResult<f64> {
        let sum: Option<f64> = self
            .base
            .db()
            .query("RETURN math::sum((SELECT VALUE remaining_amount FROM product WHERE supplier = $supplier AND remaining_amount > 0)) OR 0")
            .bind(("supplier", supplier.clone()))
            .await?
            .take(0)?;
        Ok(sum.unwrap_or(0.0))
    }

    /// Total product-side due across all suppliers, optionally per shop
    pub async fn sum_outstanding_all(&self, shop_id: Option<String>) -> RepoResult<f64> {
        let sql = if shop_id.is_some() {
            "RETURN math::sum((SELECT VALUE remaining_amount FROM product WHERE remaining_amount > 0 AND shop_id = $shop_id)) OR 0"
        } else {
            "RETURN math::sum((SELECT VALUE remaining_amount FROM product WHERE remaining_amount > 0)) OR 0"
        };

        let mut query = self.base.db().query(sql);
        if let Some(shop) = shop_id {
            query = query.bind(("shop_id", shop));
        }

        let sum: Option<f64> = query.await?.take(0)?;
        Ok(sum.unwrap_or(0.0))
    }

    /// Decrement stock after a sale line is written
    pub async fn decrement_stock(&self, id: &RecordId, quantity: i64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $id SET quantity -= $quantity")
            .bind(("id", id.clone()))
            .bind(("quantity", quantity))
            .await?
            .check()?;
        Ok(())
    }
}
