use rust_decimal::Decimal;
use sqlx::Row;

use crate::connection::DbPool;
use crate::repositories::catalog::decimal_to_real;
use crate::repositories::{InMemoryCatalogRepository, NewCar, RepositoryError};

pub struct DemoShop {
    pub shop_id: i64,
    pub location: &'static str,
}

pub struct DemoCar {
    pub car_id: i64,
    pub model: &'static str,
    pub brand: &'static str,
    pub year: i32,
    pub color: &'static str,
    pub price_per_day_cents: i64,
    pub price_per_month_cents: i64,
    pub shop_id: i64,
}

pub struct DemoAvailability {
    pub availability_id: i64,
    pub car_id: i64,
    pub start_date: &'static str,
    pub end_date: &'static str,
}

pub const DEMO_SHOPS: &[DemoShop] = &[
    DemoShop { shop_id: 1, location: "Chicago" },
    DemoShop { shop_id: 2, location: "New York" },
    DemoShop { shop_id: 3, location: "Los Angeles" },
    DemoShop { shop_id: 4, location: "Miami" },
];

#[rustfmt::skip]
pub const DEMO_CARS: &[DemoCar] = &[
    DemoCar { car_id: 1, model: "Camry", brand: "Toyota", year: 2022, color: "Red", price_per_day_cents: 4500, price_per_month_cents: 120000, shop_id: 1 },
    DemoCar { car_id: 2, model: "Corolla", brand: "Toyota", year: 2021, color: "Red", price_per_day_cents: 4000, price_per_month_cents: 105000, shop_id: 1 },
    DemoCar { car_id: 3, model: "Model 3", brand: "Tesla", year: 2023, color: "White", price_per_day_cents: 9500, price_per_month_cents: 250000, shop_id: 2 },
    DemoCar { car_id: 4, model: "X5", brand: "BMW", year: 2022, color: "Black", price_per_day_cents: 11000, price_per_month_cents: 290000, shop_id: 2 },
    DemoCar { car_id: 5, model: "Civic", brand: "Honda", year: 2020, color: "Blue", price_per_day_cents: 3800, price_per_month_cents: 100000, shop_id: 3 },
    DemoCar { car_id: 6, model: "Mustang", brand: "Ford", year: 2019, color: "Blue", price_per_day_cents: 7500, price_per_month_cents: 190000, shop_id: 4 },
    DemoCar { car_id: 7, model: "RAV4", brand: "Toyota", year: 2022, color: "Blue", price_per_day_cents: 5500, price_per_month_cents: 145000, shop_id: 3 },
    DemoCar { car_id: 8, model: "Accord", brand: "Honda", year: 2022, color: "Red", price_per_day_cents: 5000, price_per_month_cents: 130000, shop_id: 1 },
    DemoCar { car_id: 9, model: "A4", brand: "Audi", year: 2021, color: "Silver", price_per_day_cents: 8500, price_per_month_cents: 220000, shop_id: 4 },
    DemoCar { car_id: 10, model: "Model Y", brand: "Tesla", year: 2024, color: "Red", price_per_day_cents: 10500, price_per_month_cents: 275000, shop_id: 3 },
];

pub const DEMO_AVAILABILITY: &[DemoAvailability] = &[
    DemoAvailability { availability_id: 1, car_id: 1, start_date: "2024-12-01", end_date: "2024-12-07" },
    DemoAvailability { availability_id: 2, car_id: 1, start_date: "2025-01-10", end_date: "2025-02-28" },
    DemoAvailability { availability_id: 3, car_id: 2, start_date: "2024-12-11", end_date: "2024-12-20" },
    DemoAvailability { availability_id: 4, car_id: 3, start_date: "2024-12-01", end_date: "2024-12-31" },
    DemoAvailability { availability_id: 5, car_id: 4, start_date: "2024-12-15", end_date: "2025-01-15" },
    DemoAvailability { availability_id: 6, car_id: 5, start_date: "2024-11-20", end_date: "2024-12-06" },
    DemoAvailability { availability_id: 7, car_id: 6, start_date: "2025-01-01", end_date: "2025-03-31" },
    DemoAvailability { availability_id: 8, car_id: 7, start_date: "2024-12-01", end_date: "2024-12-10" },
    DemoAvailability { availability_id: 9, car_id: 8, start_date: "2024-12-05", end_date: "2024-12-25" },
    DemoAvailability { availability_id: 10, car_id: 9, start_date: "2025-02-01", end_date: "2025-02-28" },
    DemoAvailability { availability_id: 11, car_id: 10, start_date: "2024-12-20", end_date: "2025-01-05" },
];

/// Deterministic demo catalog: four shops, ten cars, and their rental windows.
pub struct DemoCatalog;

impl DemoCatalog {
    /// Inserts the demo rows in one transaction. Rows that already exist are left alone,
    /// so loading twice is harmless.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        let mut result = SeedResult::default();

        for shop in DEMO_SHOPS {
            let inserted = sqlx::query("INSERT OR IGNORE INTO shop (shop_id, location) VALUES (?, ?)")
                .bind(shop.shop_id)
                .bind(shop.location)
                .execute(&mut *tx)
                .await?;
            result.shops_inserted += inserted.rows_affected();
        }

        for car in DEMO_CARS {
            let inserted = sqlx::query(
                "INSERT OR IGNORE INTO car
                 (car_id, model, brand, year, color, price_per_day, price_per_month, shop_id)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(car.car_id)
            .bind(car.model)
            .bind(car.brand)
            .bind(car.year)
            .bind(car.color)
            .bind(decimal_to_real(cents(car.price_per_day_cents))?)
            .bind(decimal_to_real(cents(car.price_per_month_cents))?)
            .bind(car.shop_id)
            .execute(&mut *tx)
            .await?;
            result.cars_inserted += inserted.rows_affected();
        }

        for window in DEMO_AVAILABILITY {
            let inserted = sqlx::query(
                "INSERT OR IGNORE INTO car_availability (availability_id, car_id, start_date, end_date)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(window.availability_id)
            .bind(window.car_id)
            .bind(window.start_date)
            .bind(window.end_date)
            .execute(&mut *tx)
            .await?;
            result.availability_inserted += inserted.rows_affected();
        }

        tx.commit().await?;
        Ok(result)
    }

    /// Checks that every demo row is present.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let checks = vec![
            count_check(pool, "shop", DEMO_SHOPS.len()).await?,
            count_check(pool, "car", DEMO_CARS.len()).await?,
            count_check(pool, "car_availability", DEMO_AVAILABILITY.len()).await?,
        ];
        let all_passed = checks.iter().all(|check| check.passed);
        Ok(VerificationResult { all_passed, checks })
    }

    pub async fn in_memory() -> Result<InMemoryCatalogRepository, RepositoryError> {
        let repository = InMemoryCatalogRepository::default();
        for shop in DEMO_SHOPS {
            repository.add_shop(shop.shop_id, shop.location).await;
        }
        for car in DEMO_CARS {
            repository
                .add_car(NewCar {
                    car_id: car.car_id,
                    model: car.model.to_string(),
                    brand: car.brand.to_string(),
                    year: car.year,
                    color: car.color.to_string(),
                    price_per_day: cents(car.price_per_day_cents),
                    price_per_month: Some(cents(car.price_per_month_cents)),
                    shop_id: car.shop_id,
                })
                .await;
        }
        for window in DEMO_AVAILABILITY {
            let start = parse_fixture_date(window.start_date)?;
            let end = parse_fixture_date(window.end_date)?;
            repository.add_availability(window.car_id, start, end).await;
        }
        Ok(repository)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub shops_inserted: u64,
    pub cars_inserted: u64,
    pub availability_inserted: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_passed: bool,
    pub checks: Vec<SeedCheck>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedCheck {
    pub table: &'static str,
    pub expected: i64,
    pub actual: i64,
    pub passed: bool,
}

async fn count_check(
    pool: &DbPool,
    table: &'static str,
    expected: usize,
) -> Result<SeedCheck, RepositoryError> {
    let actual = sqlx::query(&format!("SELECT COUNT(*) AS count FROM {table}"))
        .fetch_one(pool)
        .await?
        .try_get::<i64, _>("count")?;
    let expected = expected as i64;
    Ok(SeedCheck { table, expected, actual, passed: actual >= expected })
}

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

fn parse_fixture_date(raw: &str) -> Result<chrono::NaiveDate, RepositoryError> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|error| RepositoryError::Decode(format!("fixture date `{raw}`: {error}")))
}

#[cfg(test)]
mod tests {
    use super::{DemoCatalog, DEMO_AVAILABILITY, DEMO_CARS, DEMO_SHOPS};
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn loading_twice_is_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        let first = DemoCatalog::load(&pool).await.expect("first load");
        assert_eq!(first.shops_inserted, DEMO_SHOPS.len() as u64);
        assert_eq!(first.cars_inserted, DEMO_CARS.len() as u64);
        assert_eq!(first.availability_inserted, DEMO_AVAILABILITY.len() as u64);

        let second = DemoCatalog::load(&pool).await.expect("second load");
        assert_eq!(second.cars_inserted, 0);

        let verification = DemoCatalog::verify(&pool).await.expect("verify");
        assert!(verification.all_passed, "{verification:?}");
    }

    #[tokio::test]
    async fn verify_reports_missing_rows() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        let verification = DemoCatalog::verify(&pool).await.expect("verify");
        assert!(!verification.all_passed);
        assert!(verification.checks.iter().all(|check| check.actual == 0));
    }

    #[test]
    fn every_car_references_a_known_shop() {
        for car in DEMO_CARS {
            assert!(DEMO_SHOPS.iter().any(|shop| shop.shop_id == car.shop_id), "car {}", car.car_id);
        }
        for window in DEMO_AVAILABILITY {
            assert!(DEMO_CARS.iter().any(|car| car.car_id == window.car_id));
            assert!(window.start_date <= window.end_date);
        }
    }
}
