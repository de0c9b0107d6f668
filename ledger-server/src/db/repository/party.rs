//! Customer / Supplier Repositories

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Customer, CustomerCreate, Supplier, SupplierCreate};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct CustomerRepository {
    base: BaseRepository,
}

impl CustomerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: CustomerCreate) -> RepoResult<Customer> {
        let customer = Customer {
            id: None,
            name: data.name,
            phone: data.phone,
            address: data.address,
            created_at: shared::util::now_millis(),
        };
        let created: Option<Customer> = self.base.db().create("customer").content(customer).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create customer".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Customer>> {
        let customer: Option<Customer> = self.base.db().select(id.clone()).await?;
        Ok(customer)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Customer>> {
        let customers: Vec<Customer> = self
            .base
            .db()
            .query("SELECT * FROM customer ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(customers)
    }
}

#[derive(Clone)]
pub struct SupplierRepository {
    base: BaseRepository,
}

impl SupplierRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: SupplierCreate) -> RepoResult<Supplier> {
        let supplier = Supplier {
            id: None,
            name: data.name,
            phone: data.phone,
            address: data.address,
            created_at: shared::util::now_millis(),
        };
        let created: Option<Supplier> = self.base.db().create("supplier").content(supplier).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create supplier".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Supplier>> {
        let supplier: Option<Supplier> = self.base.db().select(id.clone()).await?;
        Ok(supplier)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Supplier>> {
        let suppliers: Vec<Supplier> = self
            .base
            .db()
            .query("SELECT * FROM supplier ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(suppliers)
    }
}
