//! Relational store
//!
//! SQLite through sqlx. Holds states, cities, listings and style categories,
//! plus the handful of queries the geocoding jobs and proximity search need.
//!
//! Coordinates are two nullable REAL columns that are always written together;
//! a CHECK constraint keeps them both-or-neither.

pub mod cities;
pub mod listings;

pub use cities::City;
pub use listings::{Listing, ListingFilters, ListingStatus, NewListing};

use crate::error::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::time::Duration;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS states (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        abbreviation TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cities (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        state_id INTEGER NOT NULL REFERENCES states(id),
        latitude REAL,
        longitude REAL,
        UNIQUE (name, state_id),
        CHECK ((latitude IS NULL) = (longitude IS NULL))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS listings (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        address TEXT,
        postal_code TEXT,
        city_id INTEGER NOT NULL REFERENCES cities(id),
        latitude REAL,
        longitude REAL,
        rating REAL,
        price_range TEXT,
        walk_ins INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'active', 'inactive')),
        CHECK ((latitude IS NULL) = (longitude IS NULL))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS listing_categories (
        listing_id INTEGER NOT NULL REFERENCES listings(id),
        category_id INTEGER NOT NULL REFERENCES categories(id),
        PRIMARY KEY (listing_id, category_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_cities_location ON cities (latitude, longitude)",
    "CREATE INDEX IF NOT EXISTS idx_listings_city ON listings (city_id, status)",
];

/// Connect to the database and make sure the schema exists
pub async fn connect(url: &str) -> Result<Pool<Sqlite>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await?;

    info!("Connected to database: {}", url);

    init_schema(&pool).await?;
    Ok(pool)
}

/// Create tables and indexes if missing
///
/// Safe to run on every startup.
pub async fn init_schema(pool: &Pool<Sqlite>) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(*statement).execute(pool).await?;
    }
    Ok(())
}

/// Geocoding coverage counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Coverage {
    pub cities: i64,
    pub cities_geocoded: i64,
    pub listings: i64,
    pub listings_geocoded: i64,
}

/// Count cities and listings, with and without coordinates
pub async fn coverage(pool: &Pool<Sqlite>) -> Result<Coverage> {
    let (cities, cities_geocoded): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(latitude) FROM cities",
    )
    .fetch_one(pool)
    .await?;

    let (listings, listings_geocoded): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(latitude) FROM listings",
    )
    .fetch_one(pool)
    .await?;

    Ok(Coverage {
        cities,
        cities_geocoded,
        listings,
        listings_geocoded,
    })
}
