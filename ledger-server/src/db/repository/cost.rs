//! Expense Feed Repository (other costs + salary payments)

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{OtherCost, SalaryPayment};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct CostRepository {
    base: BaseRepository,
}

impl CostRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create_cost(&self, cost: OtherCost) -> RepoResult<OtherCost> {
        let created: Option<OtherCost> = self.base.db().create("other_cost").content(cost).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create cost".to_string()))
    }

    pub async fn list_costs(&self) -> RepoResult<Vec<OtherCost>> {
        let costs: Vec<OtherCost> = self
            .base
            .db()
            .query("SELECT * FROM other_cost ORDER BY cost_date DESC")
            .await?
            .take(0)?;
        Ok(costs)
    }

    /// Costs dated within `[from, to)`
    pub async fn list_costs_between(&self, from: i64, to: i64) -> RepoResult<Vec<OtherCost>> {
        let costs: Vec<OtherCost> = self
            .base
            .db()
            .query("SELECT * FROM other_cost WHERE cost_date >= $from AND cost_date < $to")
            .bind(("from", from))
            .bind(("to", to))
            .await?
            .take(0)?;
        Ok(costs)
    }

    pub async fn create_salary(&self, salary: SalaryPayment) -> RepoResult<SalaryPayment> {
        let created: Option<SalaryPayment> = self
            .base
            .db()
            .create("salary_payment")
            .content(salary)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create salary payment".to_string()))
    }

    pub async fn list_salaries(&self) -> RepoResult<Vec<SalaryPayment>> {
        let salaries: Vec<SalaryPayment> = self
            .base
            .db()
            .query("SELECT * FROM salary_payment ORDER BY payment_date DESC")
            .await?
            .take(0)?;
        Ok(salaries)
    }

    /// Salary payments dated within `[from, to)`
    pub async fn list_salaries_between(&self, from: i64, to: i64) -> RepoResult<Vec<SalaryPayment>> {
        let salaries: Vec<SalaryPayment> = self
            .base
            .db()
            .query("SELECT * FROM salary_payment WHERE payment_date >= $from AND payment_date < $to")
            .bind(("from", from))
            .bind(("to", to))
            .await?
            .take(0)?;
        Ok(salaries)
    }
}
