use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use rentdesk_core::domain::car::{AvailabilityWindow, CarRecord, PriceOperator};
use rentdesk_core::domain::preferences::{FallbackFilter, PreferenceSet};
use rentdesk_core::parsing::EntityKind;

use super::{CatalogRepository, RepositoryError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCar {
    pub car_id: i64,
    pub model: String,
    pub brand: String,
    pub year: i32,
    pub color: String,
    pub price_per_day: Decimal,
    pub price_per_month: Option<Decimal>,
    pub shop_id: i64,
}

#[derive(Default)]
struct CatalogState {
    shops: BTreeMap<i64, String>,
    cars: BTreeMap<i64, NewCar>,
    availability: Vec<AvailabilityWindow>,
}

impl CatalogState {
    /// Car x shop inner join in car id order.
    fn joined(&self) -> impl Iterator<Item = (&NewCar, CarRecord)> + '_ {
        self.cars.values().filter_map(|car| {
            self.shops.get(&car.shop_id).map(|location| {
                let record = CarRecord {
                    model: car.model.clone(),
                    brand: car.brand.clone(),
                    year: car.year,
                    color: car.color.clone(),
                    price_per_day: car.price_per_day,
                    price_per_month: car.price_per_month,
                    location: location.clone(),
                };
                (car, record)
            })
        })
    }

    fn has_window(&self, car_id: i64, range: Option<(NaiveDate, NaiveDate)>) -> bool {
        self.availability.iter().any(|window| {
            window.car_id == car_id
                && range.map_or(true, |(start, end)| window.overlaps(start, end))
        })
    }
}

/// In-process catalog with the same lookup semantics as the SQL repository.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalogRepository {
    pub async fn add_shop(&self, shop_id: i64, location: impl Into<String>) {
        self.state.write().await.shops.insert(shop_id, location.into());
    }

    pub async fn add_car(&self, car: NewCar) {
        self.state.write().await.cars.insert(car.car_id, car);
    }

    pub async fn add_availability(&self, car_id: i64, start_date: NaiveDate, end_date: NaiveDate) {
        self.state.write().await.availability.push(AvailabilityWindow {
            car_id,
            start_date,
            end_date,
        });
    }

    async fn select<F>(&self, keep: F) -> Vec<CarRecord>
    where
        F: Fn(&CatalogState, &NewCar, &CarRecord) -> bool,
    {
        let guard = self.state.read().await;
        let state: &CatalogState = &guard;
        state
            .joined()
            .filter(|(car, record)| keep(state, car, record))
            .map(|(_, record)| record)
            .collect()
    }
}

#[async_trait::async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_distinct_values(&self, kind: EntityKind) -> Result<Vec<String>, RepositoryError> {
        let state = self.state.read().await;
        let values: Vec<String> = match kind {
            EntityKind::Location => state.shops.values().cloned().collect(),
            EntityKind::Brand => state.cars.values().map(|car| car.brand.clone()).collect(),
            EntityKind::Color => state.cars.values().map(|car| car.color.clone()).collect(),
            EntityKind::Model => state.cars.values().map(|car| car.model.clone()).collect(),
        };
        Ok(dedupe(values))
    }

    async fn find_by_filters(
        &self,
        filters: &PreferenceSet,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        let range = filters.date_range();
        let rows = self
            .select(|state, car, record| {
                state.has_window(car.car_id, range) && matches_filters(record, filters)
            })
            .await;
        Ok(dedupe_listings(rows))
    }

    async fn find_by_any_one_filter(
        &self,
        filters: &PreferenceSet,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        let Some(filter) = filters.fallback_filter() else {
            return Ok(Vec::new());
        };

        let rows = self
            .select(|_, _, record| match &filter {
                FallbackFilter::Color(color) => same_text(&record.color, color),
                FallbackFilter::Brand(brand) => same_text(&record.brand, brand),
                FallbackFilter::Location(location) => same_text(&record.location, location),
            })
            .await;
        Ok(dedupe_listings(rows))
    }

    async fn find_by_price_comparison(
        &self,
        amount: Decimal,
        operator: PriceOperator,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        Ok(self.select(|_, _, record| operator.matches(record.price_per_day, amount)).await)
    }

    async fn find_by_year(&self, year: i32) -> Result<Vec<CarRecord>, RepositoryError> {
        Ok(self.select(|_, _, record| record.year == year).await)
    }

    async fn find_by_brand(&self, brand: &str) -> Result<Vec<CarRecord>, RepositoryError> {
        Ok(self.select(|_, _, record| same_text(&record.brand, brand)).await)
    }

    async fn find_by_model(&self, model: &str) -> Result<Vec<CarRecord>, RepositoryError> {
        Ok(self.select(|_, _, record| same_text(&record.model, model)).await)
    }

    async fn find_by_color(&self, color: &str) -> Result<Vec<CarRecord>, RepositoryError> {
        Ok(self.select(|_, _, record| same_text(&record.color, color)).await)
    }

    async fn find_by_location(&self, location: &str) -> Result<Vec<CarRecord>, RepositoryError> {
        Ok(self.select(|_, _, record| same_text(&record.location, location)).await)
    }

    async fn find_available(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        let rows = self.select(|state, car, _| state.has_window(car.car_id, Some((start, end)))).await;
        Ok(dedupe_listings(rows))
    }
}

fn matches_filters(record: &CarRecord, filters: &PreferenceSet) -> bool {
    filters.color.as_deref().map_or(true, |color| same_text(&record.color, color))
        && filters.brand.as_deref().map_or(true, |brand| same_text(&record.brand, brand))
        && filters
            .location
            .as_deref()
            .map_or(true, |location| same_text(&record.location, location))
        && filters.year.map_or(true, |year| record.year == year)
        && filters.price.map_or(true, |price| record.price_per_day <= price)
}

/// ASCII-only case folding, matching SQLite's `LOWER`.
fn same_text(left: &str, right: &str) -> bool {
    left.eq_ignore_ascii_case(right)
}

/// Collapses listings that differ only in monthly rate, keeping the lowest car id.
fn dedupe_listings(rows: Vec<CarRecord>) -> Vec<CarRecord> {
    let mut unique: Vec<CarRecord> = Vec::with_capacity(rows.len());
    for row in rows {
        let seen = unique.iter().any(|kept| {
            kept.model == row.model
                && kept.brand == row.brand
                && kept.year == row.year
                && kept.color == row.color
                && kept.price_per_day == row.price_per_day
                && kept.location == row.location
        });
        if !seen {
            unique.push(row);
        }
    }
    unique
}

/// Keeps the first occurrence of each value, preserving order.
fn dedupe<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}
