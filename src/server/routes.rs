//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::coord::Coordinates;
use crate::error::Error;
use crate::geo::Geocoder;
use crate::search::{search_nearby, NearbyQuery, NearbyResults};
use crate::server::state::AppState;
use crate::store::{self, ListingFilters};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Upper bound on page size accepted from clients
const MAX_PER_PAGE: usize = 100;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/nearby", get(nearby_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "INVALID_COORDINATES"),
            Error::InvalidRadius(_) => (StatusCode::BAD_REQUEST, "INVALID_RADIUS"),
            Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        if status.is_server_error() {
            error!("request failed: {}", err);
        }
        ApiError::new(status, code, err.to_string())
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    pub cities: i64,
    pub cities_geocoded: i64,
    pub listings: i64,
    pub listings_geocoded: i64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let coverage = store::coverage(&state.pool).await?;

    Ok(Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        cities: coverage.cities,
        cities_geocoded: coverage.cities_geocoded,
        listings: coverage.listings,
        listings_geocoded: coverage.listings_geocoded,
    }))
}

/// Nearby search query string
#[derive(Debug, Default, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Alternative to lat/lng, resolved to the zip's centroid
    pub zip: Option<String>,
    /// Radius in miles
    pub radius: Option<f64>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub walk_ins: Option<bool>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Proximity search endpoint
///
/// GET /api/nearby?lat=..&lng=.. or GET /api/nearby?zip=..
async fn nearby_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<NearbyResults>, ApiError> {
    let center = match (params.lat, params.lng, params.zip.as_deref()) {
        (Some(lat), Some(lng), _) => Coordinates::new(lat, lng),
        (_, _, Some(zip)) => state
            .zip_geocoder
            .geocode(zip)
            .await
            .map(|location| location.coordinates())
            .ok_or_else(|| {
                ApiError::new(
                    StatusCode::NOT_FOUND,
                    "ZIP_NOT_FOUND",
                    format!("Could not locate zip code {}", zip),
                )
            })?,
        _ => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "MISSING_LOCATION",
                "Provide lat and lng, or zip",
            ))
        }
    };

    let search = &state.config.search;
    let query = NearbyQuery::new(center.lat, center.lng)
        .with_radius(params.radius.unwrap_or(search.radius_miles))
        .with_filters(ListingFilters {
            category: params.category.filter(|c| !c.is_empty()),
            price: params.price.filter(|p| !p.is_empty()),
            walk_ins: params.walk_ins,
        })
        .with_page(
            params.page.unwrap_or(1),
            params.per_page.unwrap_or(search.per_page).min(MAX_PER_PAGE),
        );

    let results = search_nearby(&state.pool, &query).await?;
    Ok(Json(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::geo::stub;
    use crate::store::testing;
    use axum::body::Body;
    use axum::extract::Path;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    async fn zip_stub(Path(zip): Path<String>) -> Result<Json<serde_json::Value>, StatusCode> {
        if zip == "78701" {
            Ok(Json(json!({
                "places": [{
                    "place name": "Austin",
                    "state abbreviation": "TX",
                    "latitude": "30.2713",
                    "longitude": "-97.7426"
                }]
            })))
        } else {
            Err(StatusCode::NOT_FOUND)
        }
    }

    async fn create_test_state() -> Arc<AppState> {
        let pool = testing::memory_pool().await;
        let tx = testing::state(&pool, "Texas", "TX").await;
        let austin = testing::city(&pool, tx, "Austin", Some((30.2672, -97.7431))).await;
        testing::city(&pool, tx, "Waco", None).await;
        for (name, rating) in [("Mid", 4.2), ("Top", 4.9), ("Low", 3.1)] {
            testing::active_listing(&pool, austin, name, Some(rating)).await;
        }

        let app = Router::new().route("/us/:zip", get(zip_stub));
        let mut config = Config::default();
        config.geocoding.zip_url = stub::spawn(app).await;

        Arc::new(AppState::new(config, pool).unwrap())
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = create_router(create_test_state().await);
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let (status, body) = get_json("/api/status").await;
        assert_eq!(status, StatusCode::OK);

        let parsed: StatusResponse = serde_json::from_value(body).unwrap();
        assert!(parsed.running);
        assert_eq!(parsed.cities, 2);
        assert_eq!(parsed.cities_geocoded, 1);
        assert_eq!(parsed.listings, 3);
    }

    #[tokio::test]
    async fn test_nearby_by_coordinates() {
        let (status, body) = get_json("/api/nearby?lat=30.30&lng=-97.75").await;
        assert_eq!(status, StatusCode::OK);

        let results: NearbyResults = serde_json::from_value(body).unwrap();
        assert_eq!(results.total, 3);
        let names: Vec<&str> = results.listings.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Top", "Mid", "Low"]);
        assert_eq!(results.per_page, 12);
    }

    #[tokio::test]
    async fn test_nearby_by_zip() {
        let (status, body) = get_json("/api/nearby?zip=78701&radius=5").await;
        assert_eq!(status, StatusCode::OK);

        let results: NearbyResults = serde_json::from_value(body).unwrap();
        assert_eq!(results.total, 3);
        assert_eq!(results.nearest_cities[0].name, "Austin");
    }

    #[tokio::test]
    async fn test_nearby_unknown_zip() {
        let (status, body) = get_json("/api/nearby?zip=00000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ZIP_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_nearby_missing_location() {
        let (status, body) = get_json("/api/nearby?lat=30.30").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_LOCATION");
    }

    #[tokio::test]
    async fn test_nearby_invalid_coordinates() {
        let (status, body) = get_json("/api/nearby?lat=91&lng=-97.75").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let err: ApiError = serde_json::from_value(body).unwrap();
        assert_eq!(err.code, "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_nearby_invalid_radius() {
        let (status, body) = get_json("/api/nearby?lat=30.30&lng=-97.75&radius=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_RADIUS");
    }

    #[tokio::test]
    async fn test_nearby_huge_page() {
        let (status, body) =
            get_json("/api/nearby?lat=30.30&lng=-97.75&page=18446744073709551615").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["listings"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_nearby_page_size_is_capped() {
        let (status, body) = get_json("/api/nearby?lat=30.30&lng=-97.75&per_page=5000&walk_ins=false").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["per_page"], 100);
        assert_eq!(body["total"], 3);
    }
}
