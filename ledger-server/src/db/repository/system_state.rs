//! System State Repository (Singleton)

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::SystemState;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct SystemStateRepository {
    base: BaseRepository,
}

impl SystemStateRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Atomically increment the invoice counter and return the new value
    pub async fn next_invoice_number(&self) -> RepoResult<i64> {
        let now = shared::util::now_millis();
        let state: Option<SystemState> = self
            .base
            .db()
            .query(
                r#"
                UPSERT system_state:main SET
                    invoice_count = (invoice_count OR 0) + 1,
                    created_at = created_at OR $now,
                    updated_at = $now
                "#,
            )
            .bind(("now", now))
            .await?
            .take(0)?;

        state
            .map(|s| s.invoice_count)
            .ok_or_else(|| RepoError::Database("Failed to increment invoice counter".to_string()))
    }
}
