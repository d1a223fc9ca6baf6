//! Street-address geocoding for listings
//!
//! The stored address is sent as-is; submissions already include city, state
//! and zip. Nominatim allows one request per second, so the pause between
//! requests comes from `JobOptions::address`, which never goes below 1.1 s.

use crate::error::Result;
use crate::geo::Geocoder;
use crate::jobs::{format_duration, log_progress, JobOptions, JobReport, Pacer};
use crate::store::listings;
use sqlx::{Pool, Sqlite};
use tracing::{debug, info, warn};

/// Geocode every listing that has an address but no coordinates
pub async fn geocode_listings<G: Geocoder>(
    pool: &Pool<Sqlite>,
    geocoder: &G,
    options: JobOptions,
) -> Result<JobReport> {
    let mut report = JobReport::start("address", geocoder.name());

    let mut pending = listings::listings_missing_location(pool).await?;
    if let Some(limit) = options.limit {
        pending.truncate(limit);
    }
    let total = pending.len();
    info!(
        "Found {} listings without coordinates (at least {} at current pacing)",
        total,
        format_duration(options.delay.mul_f64(total.saturating_sub(1) as f64))
    );

    let mut pacer = Pacer::new(options.delay);

    for listing in pending {
        // listings_missing_location only returns listings with an address
        let Some(address) = listing.address.as_deref() else {
            report.skipped += 1;
            continue;
        };

        pacer.wait().await;
        report.processed += 1;

        let found = geocoder
            .geocode(address)
            .await
            .map(|location| location.coordinates())
            .filter(|coords| coords.validate().is_ok());

        match found {
            Some(coords) => {
                listings::set_listing_location(pool, listing.id, coords).await?;
                report.succeeded += 1;
                debug!("{} -> ({:.5}, {:.5})", listing.name, coords.lat, coords.lng);
            }
            None => {
                report.failed += 1;
                warn!(
                    listing_id = listing.id,
                    name = %listing.name,
                    address,
                    "address geocoding failed"
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
    use crate::coord::Coordinates;
    use crate::jobs::mock::MockGeocoder;
    use crate::store::{testing, NewListing};
    use std::time::{Duration, Instant};

    fn options(delay: Duration) -> JobOptions {
        JobOptions {
            delay,
            progress_every: 100,
            limit: None,
        }
    }

    async fn listing_at(pool: &Pool<Sqlite>, city: i64, address: &str) -> i64 {
        listings::insert_listing(
            pool,
            &NewListing {
                address: Some(address.to_string()),
                ..NewListing::new("Shop", city)
            },
        )
        .await
        .unwrap()
    }

    const ADDRESSES: [&str; 5] = [
        "100 Congress Ave, Austin, TX 78701",
        "1500 S Lamar Blvd, Austin, TX 78704",
        "Unknown Rd, Nowhere, TX 00000",
        "2200 E 6th St, Austin, TX 78702",
        "5400 Burnet Rd, Austin, TX 78756",
    ];

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_batch() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        let austin = testing::city(&pool, tx, "Austin", None).await;

        let mut ids = Vec::new();
        for address in ADDRESSES {
            ids.push(listing_at(&pool, austin, address).await);
        }

        let geocoder = MockGeocoder::new()
            .with(ADDRESSES[0], 30.2640, -97.7442)
            .with(ADDRESSES[1], 30.2500, -97.7660)
            .with(ADDRESSES[3], 30.2620, -97.7220)
            .with(ADDRESSES[4], 30.3240, -97.7390);

        let report = geocode_listings(&pool, &geocoder, options(Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(geocoder.calls(), ADDRESSES.to_vec());
        assert_eq!(report.processed, 5);
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failed, 1);

        for (i, id) in ids.iter().enumerate() {
            let listing = listings::get_listing(&pool, *id).await.unwrap().unwrap();
            assert_eq!(listing.location.is_some(), i != 2, "listing {}", i + 1);
        }
        let first = listings::get_listing(&pool, ids[0]).await.unwrap().unwrap();
        assert_eq!(first.location, Some(Coordinates::new(30.2640, -97.7442)));
    }

    #[tokio::test]
    async fn test_rerun_only_retries_failures() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        let austin = testing::city(&pool, tx, "Austin", None).await;
        listing_at(&pool, austin, ADDRESSES[0]).await;
        listing_at(&pool, austin, ADDRESSES[2]).await;

        let geocoder = MockGeocoder::new().with(ADDRESSES[0], 30.2640, -97.7442);
        geocode_listings(&pool, &geocoder, options(Duration::ZERO))
            .await
            .unwrap();

        let second = geocode_listings(&pool, &geocoder, options(Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(second.processed, 1);
        assert_eq!(second.failed, 1);
        assert_eq!(geocoder.calls().last().map(String::as_str), Some(ADDRESSES[2]));
    }

    #[tokio::test]
    async fn test_nothing_to_do() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        let austin = testing::city(&pool, tx, "Austin", None).await;
        let id = listing_at(&pool, austin, ADDRESSES[0]).await;
        listings::set_listing_location(&pool, id, Coordinates::new(30.2640, -97.7442))
            .await
            .unwrap();

        let geocoder = MockGeocoder::new();
        let report = geocode_listings(&pool, &geocoder, options(Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(report.processed, 0);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed, 0);
        assert!(geocoder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_requests_are_spaced() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        let austin = testing::city(&pool, tx, "Austin", None).await;
        for address in &ADDRESSES[..3] {
            listing_at(&pool, austin, address).await;
        }

        let geocoder = MockGeocoder::new();
        let start = Instant::now();
        let report = geocode_listings(&pool, &geocoder, options(Duration::from_millis(60)))
            .await
            .unwrap();

        assert_eq!(report.processed, 3);
        assert!(start.elapsed() >= Duration::from_millis(120));
    }
}
