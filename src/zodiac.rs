use std::fmt;

use serde::{Deserialize, Serialize};

/// The twelve tropical zodiac signs, in canonical order starting at 0° Aries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

const SIGNS: [ZodiacSign; 12] = [
    ZodiacSign::Aries,
    ZodiacSign::Taurus,
    ZodiacSign::Gemini,
    ZodiacSign::Cancer,
    ZodiacSign::Leo,
    ZodiacSign::Virgo,
    ZodiacSign::Libra,
    ZodiacSign::Scorpio,
    ZodiacSign::Sagittarius,
    ZodiacSign::Capricorn,
    ZodiacSign::Aquarius,
    ZodiacSign::Pisces,
];

impl ZodiacSign {
    /// Classifies any ecliptic longitude (degrees) into its sign.
    ///
    /// Total over all reals: the longitude is normalized into [0, 360) and
    /// each sign owns a half-open 30° interval, so exactly 30.0° is Taurus.
    pub fn from_longitude(longitude: f64) -> Self {
        let normalized = longitude.rem_euclid(360.0);
        // The `% 12` guards the one case where rounding pushes the
        // normalized value to exactly 360.0.
        let index = (normalized / 30.0).floor() as usize % 12;
        SIGNS[index]
    }

    pub fn all() -> impl Iterator<Item = ZodiacSign> {
        SIGNS.iter().copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "♈",
            ZodiacSign::Taurus => "♉",
            ZodiacSign::Gemini => "♊",
            ZodiacSign::Cancer => "♋",
            ZodiacSign::Leo => "♌",
            ZodiacSign::Virgo => "♍",
            ZodiacSign::Libra => "♎",
            ZodiacSign::Scorpio => "♏",
            ZodiacSign::Sagittarius => "♐",
            ZodiacSign::Capricorn => "♑",
            ZodiacSign::Aquarius => "♒",
            ZodiacSign::Pisces => "♓",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_half_open() {
        assert_eq!(ZodiacSign::from_longitude(0.0), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_longitude(29.999), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_longitude(30.0), ZodiacSign::Taurus);
        assert_eq!(ZodiacSign::from_longitude(330.0), ZodiacSign::Pisces);
        assert_eq!(ZodiacSign::from_longitude(359.999), ZodiacSign::Pisces);
    }

    #[test]
    fn periodic_in_full_turns() {
        for &l in &[0.0, 15.5, 29.999, 30.0, 123.4, 359.999] {
            let base = ZodiacSign::from_longitude(l);
            for k in [-3i32, -1, 1, 2, 10] {
                assert_eq!(ZodiacSign::from_longitude(l + 360.0 * k as f64), base);
            }
        }
    }

    #[test]
    fn negative_longitudes_wrap() {
        assert_eq!(ZodiacSign::from_longitude(-1.0), ZodiacSign::Pisces);
        assert_eq!(ZodiacSign::from_longitude(-330.0), ZodiacSign::Taurus);
        assert_eq!(ZodiacSign::from_longitude(-360.0), ZodiacSign::Aries);
    }

    #[test]
    fn every_sign_owns_thirty_degrees() {
        for (i, sign) in ZodiacSign::all().enumerate() {
            let start = i as f64 * 30.0;
            assert_eq!(ZodiacSign::from_longitude(start), sign);
            assert_eq!(ZodiacSign::from_longitude(start + 29.9), sign);
        }
    }

    #[test]
    fn display_and_symbol() {
        assert_eq!(ZodiacSign::Capricorn.to_string(), "Capricorn");
        assert_eq!(ZodiacSign::Capricorn.symbol(), "♑");
    }
}
