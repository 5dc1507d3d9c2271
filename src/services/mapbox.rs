use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use geo::Point;
use reqwest::Client;
use url::Url;
use serde_json::Value;

use crate::io::geojson::{parse_coord, parse_line_string};
use super::{DirectionsService, GeocodingService, Place, RouteResult};

const MAPBOX_API: &str = "https://api.mapbox.com";

/// Mapbox geocoding and driving-directions client.
#[derive(Clone)]
pub struct MapboxClient {
    client: Client,
    token: String,
    base: String,
}

impl MapboxClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, MAPBOX_API)
    }

    /// Point the client at a different API host (proxies, mock servers).
    pub fn with_base_url(token: impl Into<String>, base: impl Into<String>) -> Self {
        Self { client: Client::new(), token: token.into(), base: base.into() }
    }

    /// Build `{base}/{segments...}`; segments are percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base)
            .with_context(|| format!("Invalid Mapbox base URL {:?}", self.base))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Mapbox base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url, query: &[(&str, String)]) -> Result<Value> {
        let response = self.client.get(url.clone())
            .query(query)
            .query(&[("access_token", self.token.as_str())])
            .send().await
            .with_context(|| format!("GET {url}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("{url} returned {status}");
        }
        response.json::<Value>().await.with_context(|| format!("Invalid JSON from {url}"))
    }

    async fn geocode(&self, text: &str, query: &[(&str, String)]) -> Result<Vec<Place>> {
        let url = self.url(&["geocoding", "v5", "mapbox.places", &format!("{text}.json")])?;
        parse_places(&self.get_json(url, query).await?)
    }
}

#[async_trait]
impl GeocodingService for MapboxClient {
    async fn search(&self, text: &str) -> Result<Vec<Place>> {
        self.geocode(text, &[]).await
    }

    async fn nearby(&self, category: &str, near: Point<f64>) -> Result<Vec<Place>> {
        self.geocode(category, &[("proximity", format!("{},{}", near.x(), near.y()))]).await
    }
}

#[async_trait]
impl DirectionsService for MapboxClient {
    async fn routes(&self, origin: Point<f64>, destination: Point<f64>) -> Result<Vec<RouteResult>> {
        let waypoints = format!("{},{};{},{}", origin.x(), origin.y(), destination.x(), destination.y());
        let url = self.url(&["directions", "v5", "mapbox", "driving", &waypoints])?;
        parse_routes(&self.get_json(url, &[("geometries", "geojson".to_string())]).await?)
    }
}

/// Parse a geocoding FeatureCollection into places.
/// Features without a usable position are skipped.
pub(crate) fn parse_places(value: &Value) -> Result<Vec<Place>> {
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("Geocoding response has no \"features\" array"))?;

    Ok(features.iter().filter_map(|feature| {
        let center = parse_coord(&feature["center"])
            .or_else(|_| parse_coord(&feature["geometry"]["coordinates"]))
            .ok()?;
        Some(Place {
            id: feature["id"].as_str().unwrap_or_default().to_string(),
            name: feature["place_name"].as_str()
                .or_else(|| feature["text"].as_str())
                .unwrap_or_default()
                .to_string(),
            center: Point(center),
        })
    }).collect())
}

/// Parse a directions response. A missing `routes` array is an error;
/// an empty one is a valid "no route" answer.
pub(crate) fn parse_routes(value: &Value) -> Result<Vec<RouteResult>> {
    let routes = value["routes"].as_array()
        .ok_or_else(|| anyhow!("Directions response has no \"routes\" array"))?;

    routes.iter().map(|route| {
        Ok(RouteResult {
            duration_seconds: route["duration"].as_f64()
                .ok_or_else(|| anyhow!("Route is missing \"duration\""))?,
            distance_meters: route["distance"].as_f64()
                .ok_or_else(|| anyhow!("Route is missing \"distance\""))?,
            geometry: parse_line_string(&route["geometry"]["coordinates"])
                .context("Route geometry must be a GeoJSON LineString")?,
        })
    }).collect()
}

#[cfg(test)]
mod tests {
    use geo::Point;
    use serde_json::json;

    use super::{parse_places, parse_routes, MapboxClient};

    #[test]
    fn places_from_center_or_geometry() {
        let response = json!({
            "features": [
                { "id": "poi.1", "place_name": "Lindfield Station, Lindfield NSW", "center": [151.169, -33.776] },
                { "id": "poi.2", "text": "Killara Shops", "geometry": { "coordinates": [151.16, -33.77] } },
                { "id": "poi.3", "place_name": "Nowhere" }
            ]
        });
        let places = parse_places(&response).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Lindfield Station, Lindfield NSW");
        assert_eq!(places[0].center, Point::new(151.169, -33.776));
        assert_eq!(places[1].name, "Killara Shops");
    }

    #[test]
    fn routes_empty_and_missing() {
        assert!(parse_routes(&json!({ "routes": [] })).unwrap().is_empty());
        assert!(parse_routes(&json!({ "message": "Not Authorized" })).is_err());
    }

    #[test]
    fn route_fields() {
        let response = json!({
            "routes": [{
                "duration": 720.4,
                "distance": 8345.0,
                "geometry": { "type": "LineString", "coordinates": [[151.17, -33.77], [151.2, -33.8]] }
            }]
        });
        let routes = parse_routes(&response).unwrap();
        assert_eq!(routes[0].duration_seconds, 720.4);
        assert_eq!(routes[0].distance_meters, 8345.0);
        assert_eq!(routes[0].geometry.0.len(), 2);
    }

    #[test]
    fn urls_encode_free_text() {
        let client = MapboxClient::with_base_url("token", "https://api.example.com/");
        let url = client.url(&["geocoding", "v5", "mapbox.places", "day care.json"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/geocoding/v5/mapbox.places/day%20care.json");
    }
}
