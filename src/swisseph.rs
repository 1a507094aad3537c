use std::ffi::{CStr, CString};
use std::fmt;
use std::os::raw::{c_char, c_double, c_int};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::ChartError;
use crate::zodiac::ZodiacSign;
use crate::JulianDay;

// Bindings for the handful of Swiss Ephemeris entry points this crate uses.
// The native library itself is compiled by the libswe-sys build script; the
// crate reference below pulls its link directives into this build.
use libswe_sys as _;

extern "C" {
    fn swe_set_ephe_path(path: *const c_char);
    fn swe_calc_ut(
        tjd_ut: c_double,
        ipl: c_int,
        iflag: c_int,
        xx: *mut c_double,
        serr: *mut c_char,
    ) -> c_int;
    fn swe_houses(
        tjd_ut: c_double,
        geolat: c_double,
        geolon: c_double,
        hsys: c_int,
        cusps: *mut c_double,
        ascmc: *mut c_double,
    ) -> c_int;
}

const SEFLG_SWIEPH: c_int = 2;
const SEFLG_MOSEPH: c_int = 4;
const SEFLG_SPEED: c_int = 256;

const HSYS_PLACIDUS: c_int = 'P' as c_int;

// ascmc[] slots filled by swe_houses
const ASCMC_ASC: usize = 0;
const ASCMC_MC: usize = 1;
const ASCMC_ARMC: usize = 2;
const ASCMC_VERTEX: usize = 3;

/// The ten bodies of a natal chart, with their Swiss Ephemeris ids.
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Planet {
    Sun = 0,
    Moon = 1,
    Mercury = 2,
    Venus = 3,
    Mars = 4,
    Jupiter = 5,
    Saturn = 6,
    Uranus = 7,
    Neptune = 8,
    Pluto = 9,
}

impl Planet {
    /// Canonical solar-system order; also the output order of the pipeline.
    pub const ALL: [Planet; 10] = [
        Planet::Sun,
        Planet::Moon,
        Planet::Mercury,
        Planet::Venus,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
        Planet::Pluto,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Planet::Sun => "Sun",
            Planet::Moon => "Moon",
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
            Planet::Pluto => "Pluto",
        }
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Which ephemeris backend computes positions.
///
/// `Swiss` reads the on-disk `.se1` data files (highest precision, needs
/// provisioning); `Moshier` uses the built-in analytic theory and needs no
/// files at all, which is also what the test suite runs on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EphemerisSource {
    Swiss,
    Moshier,
}

impl Default for EphemerisSource {
    fn default() -> Self {
        EphemerisSource::Swiss
    }
}

impl EphemerisSource {
    fn flag(self) -> c_int {
        match self {
            EphemerisSource::Swiss => SEFLG_SWIEPH,
            EphemerisSource::Moshier => SEFLG_MOSEPH,
        }
    }
}

/// Apparent geocentric position of one body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanetPosition {
    pub planet: Planet,
    /// Ecliptic longitude in degrees, [0, 360).
    pub longitude: f64,
    /// Ecliptic latitude in degrees.
    pub latitude: f64,
    /// Distance in AU.
    pub distance: f64,
    pub sign: ZodiacSign,
}

/// Placidus house cusps and the four angular points, all in degrees [0, 360).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Houses {
    pub cusps: [f64; 12],
    pub ascendant: f64,
    pub mc: f64,
    pub armc: f64,
    pub vertex: f64,
}

// The ephemeris search path is process-global in the C library; set it once
// and remember what it was set to.
static EPHE_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Safe wrapper over the Swiss Ephemeris calls used by the chart pipeline.
pub struct SwissEph {
    source: EphemerisSource,
}

impl SwissEph {
    pub fn new(source: EphemerisSource, ephe_path: &Path) -> Self {
        let mut configured = EPHE_PATH
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match configured.as_deref() {
            None => {
                if let Ok(c_path) = CString::new(ephe_path.to_string_lossy().as_bytes()) {
                    unsafe { swe_set_ephe_path(c_path.as_ptr()) };
                }
                *configured = Some(ephe_path.to_path_buf());
                tracing::debug!(path = %ephe_path.display(), "ephemeris search path set");
            }
            Some(existing) if existing != ephe_path => {
                tracing::warn!(
                    requested = %ephe_path.display(),
                    configured = %existing.display(),
                    "ephemeris search path already set; keeping the configured one"
                );
            }
            Some(_) => {}
        }
        SwissEph { source }
    }

    /// Apparent geocentric ecliptic position of one body at the given
    /// instant.
    pub fn calc_ut(
        &self,
        julian_day: JulianDay,
        planet: Planet,
    ) -> Result<PlanetPosition, ChartError> {
        let mut xx: [c_double; 6] = [0.0; 6];
        let mut serr: [c_char; 256] = [0; 256];
        let iflag = self.source.flag() | SEFLG_SPEED;

        let code = unsafe {
            swe_calc_ut(
                julian_day,
                planet as c_int,
                iflag,
                xx.as_mut_ptr(),
                serr.as_mut_ptr(),
            )
        };
        if code < 0 {
            let message = unsafe { CStr::from_ptr(serr.as_ptr()) }
                .to_string_lossy()
                .into_owned();
            return Err(classify_calc_error(code, message));
        }

        let longitude = xx[0].rem_euclid(360.0);
        Ok(PlanetPosition {
            planet,
            longitude,
            latitude: xx[1],
            distance: xx[2],
            sign: ZodiacSign::from_longitude(longitude),
        })
    }

    /// Positions of all ten bodies in canonical order. All-or-nothing: the
    /// first failing body aborts the whole set.
    pub fn planet_positions(
        &self,
        julian_day: JulianDay,
    ) -> Result<Vec<PlanetPosition>, ChartError> {
        Planet::ALL
            .iter()
            .map(|&planet| self.calc_ut(julian_day, planet))
            .collect()
    }

    /// Placidus cusps and angles for the given instant and geographic
    /// coordinates.
    pub fn houses(
        &self,
        julian_day: JulianDay,
        latitude: f64,
        longitude: f64,
    ) -> Result<Houses, ChartError> {
        let mut cusps: [c_double; 13] = [0.0; 13];
        let mut ascmc: [c_double; 10] = [0.0; 10];

        let code = unsafe {
            swe_houses(
                julian_day,
                latitude,
                longitude,
                HSYS_PLACIDUS,
                cusps.as_mut_ptr(),
                ascmc.as_mut_ptr(),
            )
        };
        // Placidus division is undefined inside the polar circles; the
        // library signals this with a negative return.
        if code < 0 {
            return Err(ChartError::HouseCalculationUndefined { latitude });
        }

        let mut house_cusps = [0.0; 12];
        for (i, cusp) in house_cusps.iter_mut().enumerate() {
            *cusp = cusps[i + 1].rem_euclid(360.0);
        }
        Ok(Houses {
            cusps: house_cusps,
            ascendant: ascmc[ASCMC_ASC].rem_euclid(360.0),
            mc: ascmc[ASCMC_MC].rem_euclid(360.0),
            armc: ascmc[ASCMC_ARMC].rem_euclid(360.0),
            vertex: ascmc[ASCMC_VERTEX].rem_euclid(360.0),
        })
    }
}

// Swiss Ephemeris reports missing data files only through its error string,
// e.g. `SwissEph file 'sepl_18.se1' not found in PATH ...`.
fn classify_calc_error(code: i32, message: String) -> ChartError {
    if message.contains(".se1") {
        ChartError::EphemerisDataMissing(message)
    } else {
        ChartError::Calculation { code, message }
    }
}
