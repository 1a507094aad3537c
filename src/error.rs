use thiserror::Error;

/// Closed error taxonomy for the chart pipeline.
///
/// Every failure propagates to the immediate caller as one of these kinds;
/// callers branch on the variant rather than matching message text. No
/// variant is retried automatically and no partial chart is ever returned.
#[derive(Debug, Error)]
pub enum ChartError {
    /// The geocoder produced no match for the given place string.
    #[error("location not found: {0:?}")]
    LocationNotFound(String),

    /// The coordinates (or zone identifier) could not be mapped to an IANA
    /// timezone, e.g. a point in open ocean.
    #[error("timezone not found for {0}")]
    TimezoneNotFound(String),

    /// The ephemeris rejected the calculation because a required data file
    /// is absent. Recoverable by provisioning the file and retrying.
    #[error("ephemeris data file missing: {0}")]
    EphemerisDataMissing(String),

    /// Placidus house cusps are undefined at this latitude (near the polar
    /// circles).
    #[error("Placidus houses undefined at latitude {latitude}")]
    HouseCalculationUndefined { latitude: f64 },

    /// Transport failure talking to the geocoder, ephemeris file host, or
    /// chat endpoint.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// Any other error reported by the ephemeris library.
    #[error("ephemeris calculation failed ({code}): {message}")]
    Calculation { code: i32, message: String },

    /// The chat completion endpoint returned an unusable response.
    #[error("chat completion failed: {0}")]
    Chat(String),

    /// Local filesystem failure while provisioning ephemeris data.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let err = ChartError::LocationNotFound("Atlantis".into());
        assert_eq!(err.to_string(), "location not found: \"Atlantis\"");

        let err = ChartError::HouseCalculationUndefined { latitude: 78.2 };
        assert_eq!(err.to_string(), "Placidus houses undefined at latitude 78.2");

        let err = ChartError::EphemerisDataMissing("sepl_18.se1".into());
        assert!(err.to_string().contains("sepl_18.se1"));
    }
}
