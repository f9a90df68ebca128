//! Typed view of the current-weather payload.
//!
//! The cache and resolver treat payloads as opaque text; mapping into these
//! value objects happens only when a caller asks for
//! [`WeatherQuery::as_weather()`](crate::client::WeatherQuery::as_weather).

use serde::{Deserialize, Serialize};

use super::request::{Coordinate, UnitSystem};
use crate::Result;

/// Aggregated weather observation for one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weather {
    /// Time of data calculation, unix seconds (UTC).
    pub calculated_at: Option<i64>,
    pub state: Option<WeatherState>,
    pub temperature: Option<Temperature>,
    pub pressure: Option<AtmosphericPressure>,
    pub humidity: Option<Humidity>,
    pub wind: Option<Wind>,
    pub rain: Option<Precipitation>,
    pub snow: Option<Precipitation>,
    pub clouds: Option<Clouds>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherState {
    pub id: i64,
    /// Group of weather parameters (Rain, Snow, Clouds, ...).
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Temperature {
    pub value: f64,
    pub feels_like: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub unit: &'static str,
}

/// Pressure values in hPa.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtmosphericPressure {
    pub value: f64,
    pub sea_level: Option<f64>,
    pub ground_level: Option<f64>,
}

/// Relative humidity, percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Humidity {
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wind {
    pub speed: f64,
    /// Meteorological direction, degrees.
    pub degrees: Option<f64>,
    pub gust: Option<f64>,
    pub unit: &'static str,
}

/// Rain or snow volume in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Precipitation {
    pub one_hour: Option<f64>,
    pub three_hours: Option<f64>,
}

/// Cloudiness, percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Clouds {
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub country_code: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    /// Shift from UTC, seconds.
    pub timezone_offset: Option<i64>,
}

impl Weather {
    /// Map a raw current-weather JSON payload.
    ///
    /// `unit_system` only decides the unit labels; the API has already
    /// converted the numbers. `None` means the API default (standard).
    pub fn from_json(payload: &str, unit_system: Option<UnitSystem>) -> Result<Self> {
        let raw: RawWeather = serde_json::from_str(payload)?;
        Ok(raw.into_weather(unit_system.unwrap_or_default()))
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Deserialize)]
struct RawWeather {
    coord: Option<RawCoord>,
    #[serde(default)]
    weather: Vec<RawState>,
    main: Option<RawMain>,
    wind: Option<RawWind>,
    clouds: Option<RawClouds>,
    rain: Option<RawPrecipitation>,
    snow: Option<RawPrecipitation>,
    dt: Option<i64>,
    sys: Option<RawSys>,
    timezone: Option<i64>,
    id: Option<i64>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawCoord {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawState {
    id: i64,
    main: String,
    description: String,
    icon: Option<String>,
}

#[derive(Deserialize)]
struct RawMain {
    temp: f64,
    feels_like: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    pressure: Option<f64>,
    humidity: Option<u8>,
    sea_level: Option<f64>,
    grnd_level: Option<f64>,
}

#[derive(Deserialize)]
struct RawWind {
    speed: f64,
    deg: Option<f64>,
    gust: Option<f64>,
}

#[derive(Deserialize)]
struct RawClouds {
    all: u8,
}

#[derive(Deserialize)]
struct RawPrecipitation {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Deserialize)]
struct RawSys {
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

impl RawWeather {
    fn into_weather(self, units: UnitSystem) -> Weather {
        let state = self.weather.into_iter().next().map(|s| WeatherState {
            id: s.id,
            name: s.main,
            description: s.description,
            icon: s.icon,
        });

        let (temperature, pressure, humidity) = match self.main {
            Some(main) => (
                Some(Temperature {
                    value: main.temp,
                    feels_like: main.feels_like,
                    min: main.temp_min,
                    max: main.temp_max,
                    unit: units.temperature_unit(),
                }),
                main.pressure.map(|value| AtmosphericPressure {
                    value,
                    sea_level: main.sea_level,
                    ground_level: main.grnd_level,
                }),
                main.humidity.map(|percent| Humidity { percent }),
            ),
            None => (None, None, None),
        };

        let (country_code, sunrise, sunset) = match self.sys {
            Some(sys) => (sys.country, sys.sunrise, sys.sunset),
            None => (None, None, None),
        };

        Weather {
            calculated_at: self.dt,
            state,
            temperature,
            pressure,
            humidity,
            wind: self.wind.map(|w| Wind {
                speed: w.speed,
                degrees: w.deg,
                gust: w.gust,
                unit: units.wind_unit(),
            }),
            rain: self.rain.map(RawPrecipitation::into_precipitation),
            snow: self.snow.map(RawPrecipitation::into_precipitation),
            clouds: self.clouds.map(|c| Clouds { percent: c.all }),
            location: Location {
                id: self.id,
                name: self.name,
                country_code,
                // Out-of-range coordinates from the wire are dropped, not fatal.
                coordinate: self.coord.and_then(|c| Coordinate::new(c.lat, c.lon).ok()),
                sunrise,
                sunset,
                timezone_offset: self.timezone,
            },
        }
    }
}

impl RawPrecipitation {
    fn into_precipitation(self) -> Precipitation {
        Precipitation {
            one_hour: self.one_hour,
            three_hours: self.three_hours,
        }
    }
}
