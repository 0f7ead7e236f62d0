use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use rentdesk_core::domain::car::{CarRecord, PriceOperator};
use rentdesk_core::domain::preferences::PreferenceSet;
use rentdesk_core::parsing::EntityKind;

pub mod catalog;
pub mod memory;

pub use catalog::SqlCatalogRepository;
pub use memory::{InMemoryCatalogRepository, NewCar};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read-only lookups over cars, the shops holding them, and their availability windows.
///
/// Multi-row results come back in car id order. Text comparisons on color, brand, model,
/// and location ignore case.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Distinct values of one catalog column, in order of first appearance.
    async fn find_distinct_values(&self, kind: EntityKind) -> Result<Vec<String>, RepositoryError>;

    /// Combined lookup over every set field of `filters`. Only cars with at least one
    /// availability window qualify; when both dates are set, a window must overlap them.
    /// Identical rows are collapsed.
    async fn find_by_filters(
        &self,
        filters: &PreferenceSet,
    ) -> Result<Vec<CarRecord>, RepositoryError>;

    /// Relaxed lookup on the first set field among color, brand, location. Ignores
    /// availability. Returns nothing when none of the three is set.
    async fn find_by_any_one_filter(
        &self,
        filters: &PreferenceSet,
    ) -> Result<Vec<CarRecord>, RepositoryError>;

    async fn find_by_price_comparison(
        &self,
        amount: Decimal,
        operator: PriceOperator,
    ) -> Result<Vec<CarRecord>, RepositoryError>;

    async fn find_by_year(&self, year: i32) -> Result<Vec<CarRecord>, RepositoryError>;

    async fn find_by_brand(&self, brand: &str) -> Result<Vec<CarRecord>, RepositoryError>;

    async fn find_by_model(&self, model: &str) -> Result<Vec<CarRecord>, RepositoryError>;

    async fn find_by_color(&self, color: &str) -> Result<Vec<CarRecord>, RepositoryError>;

    async fn find_by_location(&self, location: &str) -> Result<Vec<CarRecord>, RepositoryError>;

    /// Cars with an availability window overlapping `[start, end]`, one row per car.
    async fn find_available(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CarRecord>, RepositoryError>;
}
