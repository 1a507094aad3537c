//! Natal chart computation on top of the Swiss Ephemeris.
//!
//! The pipeline turns a birth moment and place into a chart in four steps:
//! geocode the place and derive its IANA timezone, normalize the local civil
//! time to a Julian Day, compute the ten planetary positions, and compute
//! the Placidus houses. Each step is exposed on its own so callers can
//! recombine them.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

pub mod chat;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod location;
pub mod swisseph;
pub mod time;
pub mod zodiac;

pub use chat::{ChatClient, ChatMessage, ChatRole, ChatSession};
pub use config::{ChatConfig, Config, EphemerisConfig, GeocoderConfig};
pub use error::ChartError;
pub use location::{LocationData, LocationResolver};
pub use swisseph::{EphemerisSource, Houses, Planet, PlanetPosition, SwissEph};
pub use zodiac::ZodiacSign;

/// Continuous day count since noon, 1 January 4713 BC (proleptic Julian).
pub type JulianDay = f64;

/// What the pipeline needs to know about a birth.
#[derive(Debug, Clone, PartialEq)]
pub struct BirthInput {
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Free-text place name, resolved by the geocoder.
    pub place: String,
}

/// A fully computed natal chart.
#[derive(Debug, Clone, Serialize)]
pub struct NatalChart {
    pub location: LocationData,
    pub julian_day: JulianDay,
    /// Ten bodies in canonical solar-system order.
    pub positions: Vec<PlanetPosition>,
    pub houses: Houses,
}

impl NatalChart {
    /// Plain-text rendering of the chart, used both for terminal output and
    /// as chat context.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for position in &self.positions {
            let _ = writeln!(
                out,
                "{:<8} {:>8.3}°  {} {}",
                position.planet,
                position.longitude,
                position.sign.symbol(),
                position.sign
            );
        }
        let _ = writeln!(out, "Ascendant {:>7.3}°", self.houses.ascendant);
        let _ = writeln!(out, "Midheaven {:>7.3}°", self.houses.mc);
        out
    }
}

/// Runs the whole pipeline: place → coordinates and zone → Julian Day →
/// positions → houses.
pub fn compute_natal_chart(input: &BirthInput, config: &Config) -> Result<NatalChart, ChartError> {
    let resolver = LocationResolver::new(config.geocoder.clone())?;
    let location = resolver.resolve(&input.place)?;
    tracing::info!(
        place = %input.place,
        latitude = location.latitude,
        longitude = location.longitude,
        timezone = %location.timezone,
        "location resolved"
    );

    let tz = time::parse_zone(&location.timezone)?;
    let julian_day = time::julian_day(input.date, input.time, tz)?;
    tracing::info!(julian_day, "birth moment normalized");

    let eph = SwissEph::new(config.ephemeris.source, &config.ephemeris.data_dir);
    let positions = eph.planet_positions(julian_day)?;
    let houses = eph.houses(julian_day, location.latitude, location.longitude)?;

    Ok(NatalChart {
        location,
        julian_day,
        positions,
        houses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_every_body_and_both_angles() {
        let eph = SwissEph::new(EphemerisSource::Moshier, std::path::Path::new("ephe"));
        let jd = 2_451_545.0;
        let chart = NatalChart {
            location: LocationData {
                latitude: 0.0,
                longitude: 0.0,
                timezone: "UTC".into(),
            },
            julian_day: jd,
            positions: eph.planet_positions(jd).unwrap(),
            houses: eph.houses(jd, 0.0, 0.0).unwrap(),
        };
        let summary = chart.summary();
        for planet in Planet::ALL {
            assert!(summary.contains(planet.name()));
        }
        assert!(summary.contains("Ascendant"));
        assert!(summary.contains("Midheaven"));
    }
}
