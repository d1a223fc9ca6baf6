//! Zip-code geocoding for cities
//!
//! A city is located by looking up the postal code of one of its listings.
//! Cities whose listings carry no postal code are skipped on every run.

use crate::error::Result;
use crate::geo::Geocoder;
use crate::jobs::{log_progress, JobOptions, JobReport, Pacer};
use crate::store::{cities, listings};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info, warn};

/// Geocode every city that has no coordinates yet
pub async fn geocode_cities<G: Geocoder>(
    pool: &Pool<Sqlite>,
    geocoder: &G,
    options: JobOptions,
) -> Result<JobReport> {
    let mut report = JobReport::start("zip", geocoder.name());

    let mut pending = cities::cities_missing_location(pool).await?;
    if let Some(limit) = options.limit {
        pending.truncate(limit);
    }
    let total = pending.len();
    info!("Found {} cities without coordinates", total);

    let mut pacer = Pacer::new(options.delay);

    for city in pending {
        let Some(zip) = listings::first_postal_code_for_city(pool, city.id).await? else {
            debug!(city = %city.name, state = %city.state_abbr, "no postal code to try, skipping");
            report.skipped += 1;
            continue;
        };

        pacer.wait().await;
        report.processed += 1;

        let found = geocoder
            .geocode(&zip)
            .await
            .map(|location| location.coordinates())
            .filter(|coords| coords.validate().is_ok());

        match found {
            Some(coords) => {
                cities::set_city_location(pool, city.id, coords).await?;
                report.succeeded += 1;
                debug!(
                    "{}, {} -> ({:.4}, {:.4}) via {}",
                    city.name, city.state_abbr, coords.lat, coords.lng, zip
                );
            }
            None => {
                report.failed += 1;
                warn!(
                    city = %city.name,
                    state = %city.state_abbr,
                    zip = %zip,
                    "zip geocoding failed"
                );
            }
        }

        log_progress(&report, total, &options);
    }

    Ok(report.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::mock::MockGeocoder;
    use crate::store::{testing, NewListing};
    use std::time::Duration;

    fn options() -> JobOptions {
        JobOptions {
            delay: Duration::ZERO,
            progress_every: 2,
            limit: None,
        }
    }

    async fn city_with_zip(pool: &Pool<Sqlite>, state: i64, name: &str, zip: &str) -> i64 {
        let city = testing::city(pool, state, name, None).await;
        listings::insert_listing(
            pool,
            &NewListing {
                postal_code: Some(zip.to_string()),
                ..NewListing::new(format!("{} Ink", name), city)
            },
        )
        .await
        .unwrap();
        city
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_batch() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;

        let zips = ["78701", "76701", "79901", "75201", "77002"];
        let mut ids = Vec::new();
        for (i, zip) in zips.iter().enumerate() {
            ids.push(city_with_zip(&pool, tx, &format!("City {}", i + 1), zip).await);
        }

        // No answer for the third city's zip
        let geocoder = MockGeocoder::new()
            .with("78701", 30.27, -97.74)
            .with("76701", 31.55, -97.15)
            .with("75201", 32.79, -96.80)
            .with("77002", 29.76, -95.36);

        let report = geocode_cities(&pool, &geocoder, options()).await.unwrap();

        assert_eq!(geocoder.calls(), zips.to_vec());
        assert_eq!(report.processed, 5);
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.backend, "mock");

        for (i, id) in ids.iter().enumerate() {
            let city = cities::get_city(&pool, *id).await.unwrap().unwrap();
            assert_eq!(city.location.is_some(), i != 2, "city {}", i + 1);
        }
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        city_with_zip(&pool, tx, "Austin", "78701").await;
        testing::city(&pool, tx, "Houston", Some((29.76, -95.36))).await;

        let geocoder = MockGeocoder::new().with("78701", 30.27, -97.74);
        let first = geocode_cities(&pool, &geocoder, options()).await.unwrap();
        assert_eq!(first.succeeded, 1);

        let second = geocode_cities(&pool, &geocoder, options()).await.unwrap();
        assert_eq!(second.processed, 0);
        assert_eq!(second.succeeded, 0);
        assert_eq!(second.failed, 0);
        assert_eq!(geocoder.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_city_without_zip_is_skipped() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        let lonely = testing::city(&pool, tx, "Lonely", None).await;
        listings::insert_listing(&pool, &NewListing::new("Zipless", lonely))
            .await
            .unwrap();
        city_with_zip(&pool, tx, "Austin", "78701").await;

        let geocoder = MockGeocoder::new().with("78701", 30.27, -97.74);
        let report = geocode_cities(&pool, &geocoder, options()).await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.processed, 1);
        assert_eq!(geocoder.calls(), vec!["78701".to_string()]);
    }

    #[tokio::test]
    async fn test_uses_first_listing_zip() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        let austin = city_with_zip(&pool, tx, "Austin", "78701").await;
        listings::insert_listing(
            &pool,
            &NewListing {
                postal_code: Some("78704".to_string()),
                ..NewListing::new("Second", austin)
            },
        )
        .await
        .unwrap();

        let geocoder = MockGeocoder::new();
        geocode_cities(&pool, &geocoder, options()).await.unwrap();
        assert_eq!(geocoder.calls(), vec!["78701".to_string()]);
    }

    #[tokio::test]
    async fn test_limit() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        city_with_zip(&pool, tx, "Austin", "78701").await;
        city_with_zip(&pool, tx, "Waco", "76701").await;

        let geocoder = MockGeocoder::new();
        let report = geocode_cities(&pool, &geocoder, options().with_limit(Some(1)))
            .await
            .unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_store_failure_is_fatal() {
        let pool = testing::memory_pool().await;
        pool.close().await;

        let geocoder = MockGeocoder::new();
        assert!(geocode_cities(&pool, &geocoder, options()).await.is_err());
        assert!(geocoder.calls().is_empty());
    }
}
