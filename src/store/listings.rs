//! Listing and category queries

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, QueryBuilder, Row, Sqlite};

/// Moderation status of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Submitted, awaiting approval
    #[default]
    Pending,
    /// Visible in the directory
    Active,
    /// Hidden
    Inactive,
}

impl ListingStatus {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::str::FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("Unknown listing status: {}", s)),
        }
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shop listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city_id: i64,
    pub location: Option<Coordinates>,
    pub rating: Option<f64>,
    pub price_range: Option<String>,
    pub walk_ins: bool,
    pub status: ListingStatus,
}

/// Fields for a new listing
#[derive(Debug, Clone, Default)]
pub struct NewListing {
    pub name: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city_id: i64,
    pub rating: Option<f64>,
    pub price_range: Option<String>,
    pub walk_ins: bool,
    pub status: ListingStatus,
}

impl NewListing {
    /// A pending listing with only a name and city
    pub fn new(name: impl Into<String>, city_id: i64) -> Self {
        Self {
            name: name.into(),
            city_id,
            ..Default::default()
        }
    }
}

/// Optional narrowing applied by the proximity search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilters {
    /// Style category slug
    pub category: Option<String>,
    /// Exact price range, e.g. "$$"
    pub price: Option<String>,
    /// Only shops that do (true) or don't (false) take walk-ins
    pub walk_ins: Option<bool>,
}

const LISTING_COLUMNS: &str = "l.id, l.name, l.address, l.postal_code, l.city_id, \
     l.latitude, l.longitude, l.rating, l.price_range, l.walk_ins, l.status";

fn listing_from_row(row: &SqliteRow) -> Result<Listing> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<ListingStatus>()
        .map_err(|e| Error::Database(sqlx::Error::Decode(e.into())))?;

    Ok(Listing {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        postal_code: row.try_get("postal_code")?,
        city_id: row.try_get("city_id")?,
        location: Coordinates::from_columns(row.try_get("latitude")?, row.try_get("longitude")?),
        rating: row.try_get("rating")?,
        price_range: row.try_get("price_range")?,
        walk_ins: row.try_get("walk_ins")?,
        status,
    })
}

/// Insert a listing without coordinates, returning its id
pub async fn insert_listing(pool: &Pool<Sqlite>, listing: &NewListing) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO listings
            (name, address, postal_code, city_id, rating, price_range, walk_ins, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&listing.name)
    .bind(&listing.address)
    .bind(&listing.postal_code)
    .bind(listing.city_id)
    .bind(listing.rating)
    .bind(&listing.price_range)
    .bind(listing.walk_ins)
    .bind(listing.status.as_str())
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

/// Get a listing by id
pub async fn get_listing(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Listing>> {
    let row = sqlx::query(&format!("SELECT {LISTING_COLUMNS} FROM listings l WHERE l.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(listing_from_row).transpose()
}

/// Insert a style category, returning its id
pub async fn insert_category(pool: &Pool<Sqlite>, slug: &str, name: &str) -> Result<i64> {
    let id = sqlx::query("INSERT INTO categories (slug, name) VALUES (?, ?)")
        .bind(slug)
        .bind(name)
        .execute(pool)
        .await?
        .last_insert_rowid();
    Ok(id)
}

/// Attach a category to a listing (no-op if already attached)
pub async fn tag_listing(pool: &Pool<Sqlite>, listing_id: i64, category_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO listing_categories (listing_id, category_id) VALUES (?, ?)")
        .bind(listing_id)
        .bind(category_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// First non-blank postal code among a city's listings (lowest listing id)
pub async fn first_postal_code_for_city(pool: &Pool<Sqlite>, city_id: i64) -> Result<Option<String>> {
    let zip: Option<String> = sqlx::query_scalar(
        r#"
        SELECT TRIM(postal_code) FROM listings
        WHERE city_id = ? AND postal_code IS NOT NULL AND TRIM(postal_code) != ''
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(city_id)
    .fetch_optional(pool)
    .await?;
    Ok(zip)
}

/// Listings with an address but no coordinates, oldest first
pub async fn listings_missing_location(pool: &Pool<Sqlite>) -> Result<Vec<Listing>> {
    let rows = sqlx::query(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings l \
         WHERE l.address IS NOT NULL AND TRIM(l.address) != '' AND l.latitude IS NULL \
         ORDER BY l.id"
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(listing_from_row).collect()
}

/// Store a listing's coordinates
pub async fn set_listing_location(pool: &Pool<Sqlite>, id: i64, coords: Coordinates) -> Result<()> {
    coords.validate()?;

    sqlx::query("UPDATE listings SET latitude = ?, longitude = ? WHERE id = ?")
        .bind(coords.lat)
        .bind(coords.lng)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// City ids bound per query, under SQLite's oldest bound-variable limit (999)
/// with room for the status and filter parameters
const CITY_IDS_PER_QUERY: usize = 500;

/// Active listings in any of the given cities, narrowed by the filters
///
/// Large id sets are queried in batches; the result is ordered by listing id.
pub async fn active_listings_in_cities(
    pool: &Pool<Sqlite>,
    city_ids: &[i64],
    filters: &ListingFilters,
) -> Result<Vec<Listing>> {
    let mut found = Vec::new();
    for batch in city_ids.chunks(CITY_IDS_PER_QUERY) {
        found.extend(active_listings_batch(pool, batch, filters).await?);
    }
    if city_ids.len() > CITY_IDS_PER_QUERY {
        found.sort_by_key(|listing: &Listing| listing.id);
    }
    Ok(found)
}

async fn active_listings_batch(
    pool: &Pool<Sqlite>,
    city_ids: &[i64],
    filters: &ListingFilters,
) -> Result<Vec<Listing>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {LISTING_COLUMNS} FROM listings l WHERE l.status = "));
    qb.push_bind(ListingStatus::Active.as_str());

    qb.push(" AND l.city_id IN (");
    let mut ids = qb.separated(", ");
    for id in city_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(")");

    if let Some(price) = &filters.price {
        qb.push(" AND l.price_range = ").push_bind(price.clone());
    }
    if let Some(walk_ins) = filters.walk_ins {
        qb.push(" AND l.walk_ins = ").push_bind(walk_ins);
    }
    if let Some(category) = &filters.category {
        qb.push(
            " AND EXISTS (SELECT 1 FROM listing_categories lc \
             JOIN categories c ON c.id = lc.category_id \
             WHERE lc.listing_id = l.id AND c.slug = ",
        )
        .push_bind(category.clone())
        .push(")");
    }
    qb.push(" ORDER BY l.id");

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(listing_from_row).collect()
}
