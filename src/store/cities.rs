//! City and state queries

use crate::coord::{BoundingBox, Coordinates};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

/// A city, with its state abbreviation joined in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub state_id: i64,
    pub state_abbr: String,
    pub location: Option<Coordinates>,
}

const CITY_SELECT: &str = r#"
    SELECT c.id, c.name, c.state_id, s.abbreviation AS state_abbr,
           c.latitude, c.longitude
    FROM cities c
    JOIN states s ON s.id = c.state_id
"#;

fn city_from_row(row: &SqliteRow) -> Result<City> {
    Ok(City {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        state_id: row.try_get("state_id")?,
        state_abbr: row.try_get("state_abbr")?,
        location: Coordinates::from_columns(row.try_get("latitude")?, row.try_get("longitude")?),
    })
}

/// Insert a state, returning its id
pub async fn insert_state(pool: &Pool<Sqlite>, name: &str, abbreviation: &str) -> Result<i64> {
    let id = sqlx::query("INSERT INTO states (name, abbreviation) VALUES (?, ?)")
        .bind(name)
        .bind(abbreviation)
        .execute(pool)
        .await?
        .last_insert_rowid();
    Ok(id)
}

/// Insert a city, returning its id
///
/// A supplied location is validated before it is written.
pub async fn insert_city(
    pool: &Pool<Sqlite>,
    name: &str,
    state_id: i64,
    location: Option<Coordinates>,
) -> Result<i64> {
    if let Some(coords) = &location {
        coords.validate()?;
    }

    let id = sqlx::query(
        "INSERT INTO cities (name, state_id, latitude, longitude) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(state_id)
    .bind(location.map(|c| c.lat))
    .bind(location.map(|c| c.lng))
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

/// Get a city by id
pub async fn get_city(pool: &Pool<Sqlite>, id: i64) -> Result<Option<City>> {
    let row = sqlx::query(&format!("{CITY_SELECT} WHERE c.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(city_from_row).transpose()
}

/// Cities that have no coordinates yet, oldest first
pub async fn cities_missing_location(pool: &Pool<Sqlite>) -> Result<Vec<City>> {
    let rows = sqlx::query(&format!("{CITY_SELECT} WHERE c.latitude IS NULL ORDER BY c.id"))
        .fetch_all(pool)
        .await?;

    rows.iter().map(city_from_row).collect()
}

/// Cities whose coordinates fall inside the box (edges inclusive)
///
/// Cities without coordinates never match.
pub async fn cities_in_box(pool: &Pool<Sqlite>, bbox: &BoundingBox) -> Result<Vec<City>> {
    let rows = sqlx::query(&format!(
        "{CITY_SELECT} WHERE c.latitude BETWEEN ? AND ? AND c.longitude BETWEEN ? AND ? ORDER BY c.id"
    ))
    .bind(bbox.min_lat)
    .bind(bbox.max_lat)
    .bind(bbox.min_lng)
    .bind(bbox.max_lng)
    .fetch_all(pool)
    .await?;

    rows.iter().map(city_from_row).collect()
}

/// Store a city's coordinates
pub async fn set_city_location(pool: &Pool<Sqlite>, id: i64, coords: Coordinates) -> Result<()> {
    coords.validate()?;

    sqlx::query("UPDATE cities SET latitude = ?, longitude = ? WHERE id = ?")
        .bind(coords.lat)
        .bind(coords.lng)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::bounding_box;
    use crate::store::testing;

    #[tokio::test]
    async fn test_insert_and_get_city() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        let id = testing::city(&pool, tx, "Austin", Some((30.2672, -97.7431))).await;

        let city = get_city(&pool, id).await.unwrap().unwrap();
        assert_eq!(city.name, "Austin");
        assert_eq!(city.state_abbr, "TX");
        assert_eq!(city.location, Some(Coordinates::new(30.2672, -97.7431)));

        assert!(get_city(&pool, id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_location() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        let result = insert_city(&pool, "Nowhere", tx, Some(Coordinates::new(120.0, 0.0))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_location_and_update() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        testing::city(&pool, tx, "Austin", Some((30.2672, -97.7431))).await;
        let waco = testing::city(&pool, tx, "Waco", None).await;

        let missing = cities_missing_location(&pool).await.unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].id, waco);

        set_city_location(&pool, waco, Coordinates::new(31.5493, -97.1467))
            .await
            .unwrap();
        assert!(cities_missing_location(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_location_validates() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        let waco = testing::city(&pool, tx, "Waco", None).await;

        assert!(set_city_location(&pool, waco, Coordinates::new(0.0, 200.0)).await.is_err());
        assert!(get_city(&pool, waco).await.unwrap().unwrap().location.is_none());
    }

    #[tokio::test]
    async fn test_cities_in_box() {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        let austin = testing::city(&pool, tx, "Austin", Some((30.2672, -97.7431))).await;
        let round_rock = testing::city(&pool, tx, "Round Rock", Some((30.5083, -97.6789))).await;
        testing::city(&pool, tx, "Houston", Some((29.7604, -95.3698))).await;
        testing::city(&pool, tx, "Waco", None).await;

        let bbox = bounding_box(30.30, -97.75, 25.0);
        let ids: Vec<i64> = cities_in_box(&pool, &bbox)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![austin, round_rock]);
    }
}
