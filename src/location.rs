use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tzf_rs::DefaultFinder;
use urlencoding::encode;

use crate::config::GeocoderConfig;
use crate::error::ChartError;

/// A resolved birth place: coordinates plus the IANA zone covering them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationData {
    /// Degrees north, [-90, 90].
    pub latitude: f64,
    /// Degrees east, [-180, 180].
    pub longitude: f64,
    /// IANA zone identifier, e.g. `America/Sao_Paulo`.
    pub timezone: String,
}

// Nominatim serializes coordinates as strings.
#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: String,
    lon: String,
    display_name: String,
}

/// Resolves free-text place names to [`LocationData`].
///
/// Geocoding is one synchronous HTTP call against a Nominatim-compatible
/// endpoint; the timezone is then derived offline from the coordinates. No
/// retries: a single failure surfaces immediately.
pub struct LocationResolver {
    client: Client,
    finder: DefaultFinder,
    config: GeocoderConfig,
}

impl LocationResolver {
    pub fn new(config: GeocoderConfig) -> Result<Self, ChartError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(LocationResolver {
            client,
            finder: DefaultFinder::new(),
            config,
        })
    }

    pub fn resolve(&self, place: &str) -> Result<LocationData, ChartError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(ChartError::LocationNotFound(place.to_string()));
        }

        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.config.base_url.trim_end_matches('/'),
            encode(place)
        );
        let hits: Vec<GeocodeHit> = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .json()?;

        let hit = first_hit(hits, place)?;
        let (latitude, longitude) = parse_coordinates(&hit, place)?;
        tracing::debug!(place, matched = %hit.display_name, latitude, longitude, "geocoded");

        let timezone = self.timezone_at(latitude, longitude)?;
        Ok(LocationData {
            latitude,
            longitude,
            timezone,
        })
    }

    /// Offline coordinate → IANA zone lookup.
    pub fn timezone_at(&self, latitude: f64, longitude: f64) -> Result<String, ChartError> {
        let zone = self.finder.get_tz_name(longitude, latitude);
        if zone.is_empty() {
            return Err(ChartError::TimezoneNotFound(format!(
                "({latitude}, {longitude})"
            )));
        }
        Ok(zone.to_string())
    }
}

// First/best match wins; ambiguous place names are not disambiguated,
// only logged.
fn first_hit(hits: Vec<GeocodeHit>, place: &str) -> Result<GeocodeHit, ChartError> {
    hits.into_iter()
        .next()
        .ok_or_else(|| ChartError::LocationNotFound(place.to_string()))
}

fn parse_coordinates(hit: &GeocodeHit, place: &str) -> Result<(f64, f64), ChartError> {
    let latitude: f64 = hit
        .lat
        .parse()
        .map_err(|_| ChartError::LocationNotFound(place.to_string()))?;
    let longitude: f64 = hit
        .lon
        .parse()
        .map_err(|_| ChartError::LocationNotFound(place.to_string()))?;
    Ok((latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn resolver() -> LocationResolver {
        LocationResolver::new(GeocoderConfig::default()).unwrap()
    }

    #[test]
    fn empty_place_fails_before_any_network_call() {
        let err = resolver().resolve("   ").unwrap_err();
        assert!(matches!(err, ChartError::LocationNotFound(_)));
    }

    #[test]
    fn geocode_response_parses() {
        let body = r#"[
            {"lat": "-23.5506507", "lon": "-46.6333824",
             "display_name": "São Paulo, Região Sudeste, Brasil"}
        ]"#;
        let hits: Vec<GeocodeHit> = serde_json::from_str(body).unwrap();
        let (lat, lon) = parse_coordinates(&hits[0], "São Paulo").unwrap();
        assert_relative_eq!(lat, -23.5506507);
        assert_relative_eq!(lon, -46.6333824);
    }

    #[test]
    fn zero_hit_response_is_location_not_found() {
        // Nominatim answers an unknown place with an empty array.
        let hits: Vec<GeocodeHit> = serde_json::from_str("[]").unwrap();
        assert!(matches!(
            first_hit(hits, "Atlantis"),
            Err(ChartError::LocationNotFound(_))
        ));
    }

    #[test]
    fn malformed_coordinates_are_rejected() {
        let hit = GeocodeHit {
            lat: "not-a-number".into(),
            lon: "0.0".into(),
            display_name: "broken".into(),
        };
        assert!(matches!(
            parse_coordinates(&hit, "x"),
            Err(ChartError::LocationNotFound(_))
        ));
    }

    #[test]
    fn known_city_maps_to_its_zone() {
        let zone = resolver().timezone_at(40.7128, -74.0060).unwrap();
        assert_eq!(zone, "America/New_York");
    }
}
