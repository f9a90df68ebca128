//! Request descriptor and the selectors reflected into its query parameters.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{Result, VedrfolnirError};

const API_KEY_PARAM: &str = "appid";
const LANGUAGE_PARAM: &str = "lang";
const UNITS_PARAM: &str = "units";
const FORMAT_PARAM: &str = "mode";

/// Everything needed to replay one outbound weather call: the endpoint path
/// and the full query parameter set.
///
/// Parameters live in a `BTreeMap`, so iteration order (and therefore the
/// fingerprint) never depends on insertion order. `Clone` is a deep copy;
/// the cache always stores its own clone, so later mutation by the caller
/// cannot reach a stored entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    base_path: String,
    params: BTreeMap<String, String>,
    language: Option<Language>,
    unit_system: Option<UnitSystem>,
}

impl RequestDescriptor {
    /// Create a descriptor for the given endpoint path with no parameters.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            params: BTreeMap::new(),
            language: None,
            unit_system: None,
        }
    }

    /// Set the `appid` parameter.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.set_param(API_KEY_PARAM, api_key);
        self
    }

    /// Append a segment (e.g. `/weather`) to the endpoint path.
    pub fn append_path(&mut self, segment: &str) {
        self.base_path.push_str(segment);
    }

    /// Insert or replace a query parameter.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Remove a query parameter, returning its previous value.
    pub fn remove_param(&mut self, key: &str) -> Option<String> {
        self.params.remove(key)
    }

    /// Set the response language (reflected as `lang`).
    pub fn set_language(&mut self, language: Language) {
        self.set_param(LANGUAGE_PARAM, language.code());
        self.language = Some(language);
    }

    /// Set the unit system (reflected as `units`).
    pub fn set_unit_system(&mut self, unit_system: UnitSystem) {
        self.set_param(UNITS_PARAM, unit_system.as_str());
        self.unit_system = Some(unit_system);
    }

    /// Request a non-JSON response body (reflected as `mode`).
    pub fn set_response_format(&mut self, format: ResponseFormat) {
        self.set_param(FORMAT_PARAM, format.as_str());
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn language(&self) -> Option<Language> {
        self.language
    }

    pub fn unit_system(&self) -> Option<UnitSystem> {
        self.unit_system
    }

    /// Cache key: every parameter as `key=value`, sorted by key, joined by `&`.
    ///
    /// Values are not URL-encoded; the fingerprint identifies, it is never sent.
    pub fn fingerprint(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full request URL with URL-encoded query parameters.
    pub fn url(&self) -> Result<Url> {
        Url::parse_with_params(&self.base_path, &self.params).map_err(|e| {
            VedrfolnirError::InvalidValue(format!("invalid request URL {}: {e}", self.base_path))
        })
    }
}

/// Unit system used by the API for temperatures and wind speeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Kelvin, meter/sec. The API default.
    #[default]
    Standard,
    /// Celsius, meter/sec.
    Metric,
    /// Fahrenheit, miles/hour.
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    pub fn temperature_unit(&self) -> &'static str {
        match self {
            Self::Standard => "K",
            Self::Metric => "°C",
            Self::Imperial => "°F",
        }
    }

    pub fn wind_unit(&self) -> &'static str {
        match self {
            Self::Imperial => "miles/hour",
            _ => "meter/sec",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alternative body formats; JSON is what the API returns when unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Xml,
    Html,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Html => "html",
        }
    }
}

macro_rules! languages {
    ($($variant:ident => $code:literal),* $(,)?) => {
        /// Response language accepted by the `lang` parameter.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Language {
            $($variant),*
        }

        impl Language {
            /// Wire code sent as `lang`.
            pub fn code(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code),*
                }
            }

            /// Look up a language by its wire code (case-insensitive).
            pub fn from_code(code: &str) -> Option<Self> {
                let code = code.to_ascii_lowercase();
                match code.as_str() {
                    $($code => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

languages! {
    Afrikaans => "af",
    Albanian => "al",
    Arabic => "ar",
    Azerbaijani => "az",
    Bulgarian => "bg",
    Catalan => "ca",
    Czech => "cz",
    Danish => "da",
    German => "de",
    Greek => "el",
    English => "en",
    Basque => "eu",
    Persian => "fa",
    Finnish => "fi",
    French => "fr",
    Galician => "gl",
    Hebrew => "he",
    Hindi => "hi",
    Croatian => "hr",
    Hungarian => "hu",
    Indonesian => "id",
    Italian => "it",
    Japanese => "ja",
    Korean => "kr",
    Latvian => "la",
    Lithuanian => "lt",
    Macedonian => "mk",
    Norwegian => "no",
    Dutch => "nl",
    Polish => "pl",
    Portuguese => "pt",
    PortugueseBrazil => "pt_br",
    Russian => "ru",
    Swedish => "se",
    Slovak => "sk",
    Slovenian => "sl",
    Spanish => "es",
    Serbian => "sr",
    Thai => "th",
    Turkish => "tr",
    Ukrainian => "uk",
    Vietnamese => "vi",
    ChineseSimplified => "zh_cn",
    ChineseTraditional => "zh_tw",
    Zulu => "zu",
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Geographic coordinate with validated ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Latitude must lie in [-90, 90], longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(VedrfolnirError::InvalidValue(format!(
                "latitude must be in [-90.0, 90.0], got {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(VedrfolnirError::InvalidValue(format!(
                "longitude must be in [-180.0, 180.0], got {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}
