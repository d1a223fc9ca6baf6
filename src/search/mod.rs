//! Proximity search
//!
//! Finds active listings near a point:
//! 1. bounding box around the point, range-filtered in SQL against city coordinates
//! 2. exact haversine distance per candidate city, dropping the box's corners
//! 3. active listings in the surviving cities, with category/price/walk-in filters
//! 4. listings inherit their city's distance, then sort by distance and rating
//!
//! A listing whose city has no coordinates never shows up, even if the listing
//! itself was geocoded. Distances are city-level throughout.

use crate::constants::search::{DEFAULT_PER_PAGE, DEFAULT_RADIUS_MILES, NEAREST_CITIES};
use crate::coord::{bounding_box, round_miles, Coordinates};
use crate::error::{Error, Result};
use crate::store::{cities, listings, City, Listing, ListingFilters};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Search parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_miles: f64,
    #[serde(flatten)]
    pub filters: ListingFilters,
    /// 1-based page number
    pub page: usize,
    pub per_page: usize,
}

impl NearbyQuery {
    /// Query around a point with default radius and page size
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            radius_miles: DEFAULT_RADIUS_MILES,
            filters: ListingFilters::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_radius(mut self, radius_miles: f64) -> Self {
        self.radius_miles = radius_miles;
        self
    }

    pub fn with_filters(mut self, filters: ListingFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_page(mut self, page: usize, per_page: usize) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    /// Check the point and radius
    pub fn validate(&self) -> Result<()> {
        Coordinates::new(self.lat, self.lng).validate()?;
        if !self.radius_miles.is_finite() || self.radius_miles <= 0.0 {
            return Err(Error::InvalidRadius(format!(
                "Radius must be a positive number of miles, got {}",
                self.radius_miles
            )));
        }
        Ok(())
    }
}

/// A city inside the search radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyCity {
    pub id: i64,
    pub name: String,
    pub state_abbr: String,
    /// Rounded to one decimal mile
    pub distance_miles: f64,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyResults {
    pub listings: Vec<Listing>,
    /// Listing id to distance in miles (one decimal), for this page
    pub distances: BTreeMap<i64, f64>,
    /// Matches before pagination
    pub total: usize,
    pub total_pages: usize,
    pub page: usize,
    pub per_page: usize,
    /// Closest cities in range, nearest first
    pub nearest_cities: Vec<NearbyCity>,
}

impl NearbyResults {
    fn empty(page: usize, per_page: usize) -> Self {
        Self {
            listings: Vec::new(),
            distances: BTreeMap::new(),
            total: 0,
            total_pages: 0,
            page,
            per_page,
            nearest_cities: Vec::new(),
        }
    }
}

/// Search for active listings near a point
pub async fn search_nearby(pool: &Pool<Sqlite>, query: &NearbyQuery) -> Result<NearbyResults> {
    query.validate()?;

    let center = Coordinates::new(query.lat, query.lng);
    let page = query.page.max(1);
    let per_page = query.per_page.max(1);

    let bbox = bounding_box(center.lat, center.lng, query.radius_miles);
    let candidates = cities::cities_in_box(pool, &bbox).await?;
    let in_range = cities_within(center, candidates, query.radius_miles);

    debug!(
        "{} cities within {} miles of ({}, {})",
        in_range.len(),
        query.radius_miles,
        center.lat,
        center.lng
    );

    if in_range.is_empty() {
        return Ok(NearbyResults::empty(page, per_page));
    }

    let city_ids: Vec<i64> = in_range.iter().map(|(city, _)| city.id).collect();
    let found = listings::active_listings_in_cities(pool, &city_ids, &query.filters).await?;

    let city_distance: HashMap<i64, f64> = in_range
        .iter()
        .map(|(city, distance)| (city.id, *distance))
        .collect();
    let ranked = rank_listings(found, &city_distance);

    let total = ranked.len();
    let total_pages = total.div_ceil(per_page);

    let offset = (page - 1).saturating_mul(per_page);
    let mut distances = BTreeMap::new();
    let mut page_listings = Vec::new();
    for (listing, distance) in ranked.into_iter().skip(offset).take(per_page) {
        distances.insert(listing.id, round_miles(distance));
        page_listings.push(listing);
    }

    let nearest_cities = in_range
        .into_iter()
        .take(NEAREST_CITIES)
        .map(|(city, distance)| NearbyCity {
            id: city.id,
            name: city.name,
            state_abbr: city.state_abbr,
            distance_miles: round_miles(distance),
        })
        .collect();

    Ok(NearbyResults {
        listings: page_listings,
        distances,
        total,
        total_pages,
        page,
        per_page,
        nearest_cities,
    })
}

/// Exact distance filter over box candidates, nearest first (ties by id)
pub fn cities_within(center: Coordinates, candidates: Vec<City>, radius_miles: f64) -> Vec<(City, f64)> {
    let mut in_range: Vec<(City, f64)> = candidates
        .into_iter()
        .filter_map(|city| {
            let distance = center.distance_to(&city.location?);
            (distance <= radius_miles).then_some((city, distance))
        })
        .collect();

    in_range.sort_by(|(a, da), (b, db)| da.total_cmp(db).then_with(|| a.id.cmp(&b.id)));
    in_range
}

/// Attach each listing's city distance and sort
///
/// Nearest first; within equal distance higher rating first (unrated counts as
/// 0), then lower id so the order is stable across calls.
pub fn rank_listings(found: Vec<Listing>, city_distance: &HashMap<i64, f64>) -> Vec<(Listing, f64)> {
    let mut ranked: Vec<(Listing, f64)> = found
        .into_iter()
        .filter_map(|listing| {
            let distance = *city_distance.get(&listing.city_id)?;
            Some((listing, distance))
        })
        .collect();

    ranked.sort_by(|(a, da), (b, db)| {
        da.total_cmp(db)
            .then_with(|| by_rating_desc(a, b))
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked
}

fn by_rating_desc(a: &Listing, b: &Listing) -> Ordering {
    b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0))
}
