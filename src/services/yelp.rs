use crate::models::{BusinessRecord, Category, GeoPoint, SearchFilters};
use crate::services::provider::{BusinessSearchProvider, ProviderError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Yelp Fusion business search client
pub struct YelpClient {
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<Business>,
}

#[derive(Debug, Deserialize)]
struct Business {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    review_count: u32,
    price: Option<String>,
    #[serde(default)]
    categories: Vec<Category>,
    coordinates: Option<Coordinates>,
    distance: Option<f64>,
    image_url: Option<String>,
    url: Option<String>,
    location: Option<Location>,
    display_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Coordinates {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Location {
    #[serde(default)]
    display_address: Vec<String>,
}

impl From<Business> for BusinessRecord {
    fn from(b: Business) -> Self {
        let coordinates = b.coordinates.and_then(|c| match (c.latitude, c.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        });

        BusinessRecord {
            id: b.id,
            name: b.name,
            rating: b.rating,
            review_count: b.review_count,
            price: b.price.filter(|p| !p.is_empty()),
            categories: b.categories,
            coordinates,
            distance_meters: b.distance,
            image_url: b.image_url.filter(|u| !u.is_empty()),
            url: b.url,
            address: b.location.map(|l| l.display_address).unwrap_or_default(),
            phone: b.display_phone.filter(|p| !p.is_empty()),
        }
    }
}

impl YelpClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    fn query_params(center: GeoPoint, radius_meters: u32, filters: &SearchFilters) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("latitude", center.lat.to_string()),
            ("longitude", center.lng.to_string()),
            ("radius", radius_meters.to_string()),
            ("limit", filters.limit.to_string()),
            ("sort_by", filters.sort_by.clone()),
        ];

        if !filters.term.is_empty() {
            params.push(("term", filters.term.clone()));
        }
        if !filters.categories.is_empty() {
            params.push(("categories", filters.categories.join(",")));
        }
        if let Some(price) = &filters.price {
            params.push(("price", price.clone()));
        }
        // Yelp rejects open_now and open_at together
        match filters.open_at {
            Some(at) => params.push(("open_at", at.to_string())),
            None if filters.open_now => params.push(("open_now", "true".to_string())),
            None => {}
        }

        params
    }
}

#[async_trait]
impl BusinessSearchProvider for YelpClient {
    async fn search(
        &self,
        center: GeoPoint,
        radius_meters: u32,
        filters: &SearchFilters,
    ) -> Result<Vec<BusinessRecord>, ProviderError> {
        let url = format!("{}/businesses/search", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .query(&Self::query_params(center, radius_meters, filters))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::debug!("Yelp search failed: {} - {}", status, body);
            return Err(ProviderError::Api(format!("Business search failed: {}", status)));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse businesses: {}", e)))?;

        tracing::debug!("Yelp returned {} businesses near {}", body.businesses.len(), center);

        Ok(body.businesses.into_iter().map(BusinessRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn filters() -> SearchFilters {
        SearchFilters {
            term: "thai restaurant".to_string(),
            categories: vec!["thai".to_string(), "laotian".to_string()],
            price: Some("1,2".to_string()),
            limit: 20,
            sort_by: "distance".to_string(),
            open_now: true,
            open_at: None,
        }
    }

    const BODY: &str = r#"{
        "businesses": [
            {
                "id": "thai-palace-1",
                "name": "Thai Palace",
                "rating": 4.5,
                "review_count": 321,
                "price": "$$",
                "categories": [{"alias": "thai", "title": "Thai"}],
                "coordinates": {"latitude": 40.71, "longitude": -74.0},
                "distance": 812.4,
                "image_url": "",
                "url": "https://www.yelp.com/biz/thai-palace-1",
                "location": {"display_address": ["12 Main St", "New York, NY 10001"]},
                "display_phone": "(212) 555-0101"
            },
            {
                "id": "noodle-bar",
                "name": "Noodle Bar",
                "coordinates": {"latitude": null, "longitude": null}
            }
        ],
        "total": 2
    }"#;

    #[tokio::test]
    async fn test_search_parses_businesses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/businesses/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("term".into(), "thai restaurant".into()),
                Matcher::UrlEncoded("categories".into(), "thai,laotian".into()),
                Matcher::UrlEncoded("price".into(), "1,2".into()),
                Matcher::UrlEncoded("radius".into(), "8000".into()),
                Matcher::UrlEncoded("open_now".into(), "true".into()),
            ]))
            .match_header("authorization", "Bearer test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .create_async()
            .await;

        let client = YelpClient::new(server.url(), "test_key".to_string(), Duration::from_secs(5)).unwrap();
        let records = client
            .search(GeoPoint::new(40.7128, -74.0060), 8000, &filters())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.id, "thai-palace-1");
        assert_eq!(first.review_count, 321);
        assert_eq!(first.price.as_deref(), Some("$$"));
        assert_eq!(first.coordinates, Some(GeoPoint::new(40.71, -74.0)));
        assert_eq!(first.address, vec!["12 Main St", "New York, NY 10001"]);
        assert!(first.image_url.is_none());

        let second = &records[1];
        assert!(second.coordinates.is_none());
        assert!(second.categories.is_empty());
        assert_eq!(second.rating, 0.0);
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_retryable_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/businesses/search")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body(r#"{"error": {"code": "TOO_MANY_REQUESTS_PER_SECOND"}}"#)
            .create_async()
            .await;

        let client = YelpClient::new(server.url(), "k".to_string(), Duration::from_secs(5)).unwrap();
        let err = client
            .search(GeoPoint::new(40.0, -74.0), 8000, &filters())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_error_is_not_retryable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/businesses/search")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = YelpClient::new(server.url(), "k".to_string(), Duration::from_secs(5)).unwrap();
        let err = client
            .search(GeoPoint::new(40.0, -74.0), 8000, &filters())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Api(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_open_at_replaces_open_now() {
        let mut f = filters();
        f.open_at = Some(1_900_000_000);
        let params = YelpClient::query_params(GeoPoint::new(1.0, 2.0), 100, &f);

        assert!(params.contains(&("open_at", "1900000000".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "open_now"));
    }

    #[test]
    fn test_relaxed_filters_omit_categories_and_price() {
        let mut f = filters();
        f.categories.clear();
        f.price = None;
        let params = YelpClient::query_params(GeoPoint::new(1.0, 2.0), 16000, &f);

        assert!(!params.iter().any(|(k, _)| *k == "categories" || *k == "price"));
        assert!(params.contains(&("radius", "16000".to_string())));
    }
}
