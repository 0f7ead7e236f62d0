use chrono::NaiveDate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use rentdesk_core::domain::car::{CarRecord, PriceOperator};
use rentdesk_core::domain::preferences::{FallbackFilter, PreferenceSet};
use rentdesk_core::parsing::EntityKind;

use super::{CatalogRepository, RepositoryError};
use crate::DbPool;

const CAR_COLUMNS: &str = "SELECT c.model, c.brand, c.year, c.color, c.price_per_day, \
     c.price_per_month, s.location \
     FROM car c INNER JOIN shop s ON s.shop_id = c.shop_id";

/// Listing lookups collapse rows that read the same to a customer. The monthly rate is not
/// part of that identity; SQLite takes the bare `price_per_month` from the `MIN(car_id)` row.
const LISTING_COLUMNS: &str = "SELECT c.model, c.brand, c.year, c.color, c.price_per_day, \
     c.price_per_month, s.location, MIN(c.car_id) AS first_car_id \
     FROM car c INNER JOIN shop s ON s.shop_id = c.shop_id";

const LISTING_GROUPING: &str = " GROUP BY c.model, c.brand, c.year, c.color, \
     c.price_per_day, s.location ORDER BY first_car_id";

pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch_cars(
        &self,
        mut builder: QueryBuilder<'_, Sqlite>,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(car_from_row).collect()
    }

    async fn find_by_text_column(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(CAR_COLUMNS);
        builder.push(format!(" WHERE LOWER({column}) = LOWER("));
        builder.push_bind(value.to_string());
        builder.push(") ORDER BY c.car_id");
        self.fetch_cars(builder).await
    }
}

#[async_trait::async_trait]
impl CatalogRepository for SqlCatalogRepository {
    async fn find_distinct_values(&self, kind: EntityKind) -> Result<Vec<String>, RepositoryError> {
        let sql = match kind {
            EntityKind::Brand => "SELECT brand AS value FROM car GROUP BY brand ORDER BY MIN(car_id)",
            EntityKind::Color => "SELECT color AS value FROM car GROUP BY color ORDER BY MIN(car_id)",
            EntityKind::Model => "SELECT model AS value FROM car GROUP BY model ORDER BY MIN(car_id)",
            EntityKind::Location => {
                "SELECT location AS value FROM shop GROUP BY location ORDER BY MIN(shop_id)"
            }
        };

        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("value").map_err(RepositoryError::from))
            .collect()
    }

    async fn find_by_filters(
        &self,
        filters: &PreferenceSet,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(LISTING_COLUMNS);
        builder.push(" INNER JOIN car_availability a ON a.car_id = c.car_id WHERE 1 = 1");

        if let Some(color) = &filters.color {
            builder.push(" AND LOWER(c.color) = LOWER(").push_bind(color.clone()).push(")");
        }
        if let Some(brand) = &filters.brand {
            builder.push(" AND LOWER(c.brand) = LOWER(").push_bind(brand.clone()).push(")");
        }
        if let Some(location) = &filters.location {
            builder.push(" AND LOWER(s.location) = LOWER(").push_bind(location.clone()).push(")");
        }
        if let Some(year) = filters.year {
            builder.push(" AND c.year = ").push_bind(year);
        }
        if let Some(price) = filters.price {
            builder.push(" AND c.price_per_day <= ").push_bind(decimal_to_real(price)?);
        }
        if let Some((start, end)) = filters.date_range() {
            builder.push(" AND a.start_date <= ").push_bind(iso_date(end));
            builder.push(" AND a.end_date >= ").push_bind(iso_date(start));
        }

        builder.push(LISTING_GROUPING);
        self.fetch_cars(builder).await
    }

    async fn find_by_any_one_filter(
        &self,
        filters: &PreferenceSet,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        let Some(filter) = filters.fallback_filter() else {
            return Ok(Vec::new());
        };

        let (column, value) = match filter {
            FallbackFilter::Color(value) => ("c.color", value),
            FallbackFilter::Brand(value) => ("c.brand", value),
            FallbackFilter::Location(value) => ("s.location", value),
        };

        let mut builder = QueryBuilder::<Sqlite>::new(LISTING_COLUMNS);
        builder.push(format!(" WHERE LOWER({column}) = LOWER("));
        builder.push_bind(value);
        builder.push(")");
        builder.push(LISTING_GROUPING);
        self.fetch_cars(builder).await
    }

    async fn find_by_price_comparison(
        &self,
        amount: Decimal,
        operator: PriceOperator,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(CAR_COLUMNS);
        builder.push(format!(" WHERE c.price_per_day {} ", operator.sql_operator()));
        builder.push_bind(decimal_to_real(amount)?);
        builder.push(" ORDER BY c.car_id");
        self.fetch_cars(builder).await
    }

    async fn find_by_year(&self, year: i32) -> Result<Vec<CarRecord>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(CAR_COLUMNS);
        builder.push(" WHERE c.year = ").push_bind(year).push(" ORDER BY c.car_id");
        self.fetch_cars(builder).await
    }

    async fn find_by_brand(&self, brand: &str) -> Result<Vec<CarRecord>, RepositoryError> {
        self.find_by_text_column("c.brand", brand).await
    }

    async fn find_by_model(&self, model: &str) -> Result<Vec<CarRecord>, RepositoryError> {
        self.find_by_text_column("c.model", model).await
    }

    async fn find_by_color(&self, color: &str) -> Result<Vec<CarRecord>, RepositoryError> {
        self.find_by_text_column("c.color", color).await
    }

    async fn find_by_location(&self, location: &str) -> Result<Vec<CarRecord>, RepositoryError> {
        self.find_by_text_column("s.location", location).await
    }

    async fn find_available(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CarRecord>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(LISTING_COLUMNS);
        builder.push(" INNER JOIN car_availability a ON a.car_id = c.car_id");
        builder.push(" WHERE a.start_date <= ").push_bind(iso_date(end));
        builder.push(" AND a.end_date >= ").push_bind(iso_date(start));
        builder.push(LISTING_GROUPING);
        self.fetch_cars(builder).await
    }
}

fn car_from_row(row: &SqliteRow) -> Result<CarRecord, RepositoryError> {
    let price_per_month = row
        .try_get::<Option<f64>, _>("price_per_month")?
        .map(real_to_decimal)
        .transpose()?;

    Ok(CarRecord {
        model: row.try_get("model")?,
        brand: row.try_get("brand")?,
        year: row.try_get("year")?,
        color: row.try_get("color")?,
        price_per_day: real_to_decimal(row.try_get("price_per_day")?)?,
        price_per_month,
        location: row.try_get("location")?,
    })
}

pub(crate) fn decimal_to_real(value: Decimal) -> Result<f64, RepositoryError> {
    value.to_f64().ok_or_else(|| RepositoryError::Decode(format!("price {value} is not representable")))
}

fn real_to_decimal(value: f64) -> Result<Decimal, RepositoryError> {
    Decimal::from_f64(value)
        .map(|decimal| decimal.round_dp(2))
        .ok_or_else(|| RepositoryError::Decode(format!("price {value} is not a finite number")))
}

pub(crate) fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use rentdesk_core::domain::car::PriceOperator;
    use rentdesk_core::domain::preferences::PreferenceSet;
    use rentdesk_core::parsing::EntityKind;

    use super::SqlCatalogRepository;
    use crate::fixtures::DemoCatalog;
    use crate::repositories::CatalogRepository;
    use crate::{connect_with_settings, migrations};

    async fn seeded_repository() -> SqlCatalogRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        DemoCatalog::load(&pool).await.expect("seed");
        SqlCatalogRepository::new(pool)
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[tokio::test]
    async fn combined_lookup_collapses_rows_from_multiple_windows() {
        let repository = seeded_repository().await;
        let filters = PreferenceSet {
            brand: Some("toyota".to_string()),
            color: Some("RED".to_string()),
            ..PreferenceSet::default()
        };

        let cars = repository.find_by_filters(&filters).await.expect("lookup");
        let models: Vec<&str> = cars.iter().map(|car| car.model.as_str()).collect();

        assert_eq!(models, ["Camry", "Corolla"]);
    }

    #[tokio::test]
    async fn combined_lookup_applies_overlap_only_with_both_dates() {
        let repository = seeded_repository().await;
        let mut filters = PreferenceSet {
            brand: Some("Toyota".to_string()),
            color: Some("Red".to_string()),
            start_date: Some(date(2024, 12, 5)),
            ..PreferenceSet::default()
        };
        assert_eq!(repository.find_by_filters(&filters).await.expect("lookup").len(), 2);

        filters.end_date = Some(date(2024, 12, 8));
        let cars = repository.find_by_filters(&filters).await.expect("lookup");
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].model, "Camry");
    }

    #[tokio::test]
    async fn price_upper_bound_is_inclusive() {
        let repository = seeded_repository().await;
        let filters =
            PreferenceSet { price: Some(Decimal::new(40, 0)), ..PreferenceSet::default() };

        let cars = repository.find_by_filters(&filters).await.expect("lookup");
        assert!(cars.iter().any(|car| car.price_per_day == Decimal::new(40, 0)));
        assert!(cars.iter().all(|car| car.price_per_day <= Decimal::new(40, 0)));
    }

    #[tokio::test]
    async fn fallback_uses_only_first_available_field() {
        let repository = seeded_repository().await;
        let filters = PreferenceSet {
            brand: Some("Tesla".to_string()),
            location: Some("Chicago".to_string()),
            ..PreferenceSet::default()
        };

        let cars = repository.find_by_any_one_filter(&filters).await.expect("fallback");
        assert!(!cars.is_empty());
        assert!(cars.iter().all(|car| car.brand == "Tesla"));
        assert!(cars.iter().any(|car| car.location != "Chicago"));
    }

    #[tokio::test]
    async fn listings_differing_only_in_monthly_rate_collapse() {
        let repository = seeded_repository().await;
        sqlx::query(
            "INSERT INTO car (car_id, model, brand, year, color, price_per_day, price_per_month, shop_id)
             VALUES (100, 'Camry', 'Toyota', 2022, 'Red', 45.0, 1350.0, 1)",
        )
        .execute(&repository.pool)
        .await
        .expect("insert twin");
        sqlx::query(
            "INSERT INTO car_availability (availability_id, car_id, start_date, end_date)
             VALUES (100, 100, '2024-12-01', '2024-12-31')",
        )
        .execute(&repository.pool)
        .await
        .expect("insert window");

        let filters = PreferenceSet {
            brand: Some("Toyota".to_string()),
            color: Some("Red".to_string()),
            year: Some(2022),
            ..PreferenceSet::default()
        };
        let cars = repository.find_by_filters(&filters).await.expect("lookup");
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].model, "Camry");
        assert_eq!(cars[0].price_per_month, Some(Decimal::new(1200, 0)));

        let available =
            repository.find_available(date(2024, 12, 2), date(2024, 12, 3)).await.expect("window");
        assert_eq!(available.iter().filter(|car| car.model == "Camry").count(), 1);
        assert_eq!(repository.find_by_model("camry").await.expect("model").len(), 2);
    }

    #[tokio::test]
    async fn fallback_without_text_fields_returns_nothing() {
        let repository = seeded_repository().await;
        let filters = PreferenceSet { year: Some(2022), ..PreferenceSet::default() };

        assert!(repository.find_by_any_one_filter(&filters).await.expect("fallback").is_empty());
    }

    #[tokio::test]
    async fn price_comparisons_follow_operator() {
        let repository = seeded_repository().await;
        let hundred = Decimal::new(100, 0);

        let above = repository
            .find_by_price_comparison(hundred, PriceOperator::Above)
            .await
            .expect("above");
        assert!(!above.is_empty());
        assert!(above.iter().all(|car| car.price_per_day > hundred));

        let exact = repository
            .find_by_price_comparison(Decimal::new(45, 0), PriceOperator::Exactly)
            .await
            .expect("exact");
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].price_per_month, Some(Decimal::new(1200, 0)));
    }

    #[tokio::test]
    async fn distinct_values_follow_catalog_order() {
        let repository = seeded_repository().await;

        let brands = repository.find_distinct_values(EntityKind::Brand).await.expect("brands");
        assert_eq!(brands.first().map(String::as_str), Some("Toyota"));
        assert_eq!(brands.iter().filter(|brand| *brand == "Toyota").count(), 1);

        let locations =
            repository.find_distinct_values(EntityKind::Location).await.expect("locations");
        assert_eq!(locations, ["Chicago", "New York", "Los Angeles", "Miami"]);
    }

    #[tokio::test]
    async fn availability_uses_interval_overlap() {
        let repository = seeded_repository().await;

        let cars = repository
            .find_available(date(2025, 2, 10), date(2025, 2, 12))
            .await
            .expect("available");
        let models: Vec<&str> = cars.iter().map(|car| car.model.as_str()).collect();

        assert_eq!(models, ["Camry", "Mustang", "A4"]);
    }
}
