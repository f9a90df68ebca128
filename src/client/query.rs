//! Fluent request building on top of [`WeatherClient`].

use tracing::error;

use super::WeatherClient;
use crate::Result;
use crate::types::{Coordinate, Language, RequestDescriptor, ResponseFormat, UnitSystem, Weather};

/// First stage: pick the location.
pub struct LocationQuery<'a> {
    client: &'a WeatherClient,
    descriptor: RequestDescriptor,
}

impl<'a> LocationQuery<'a> {
    pub(super) fn new(client: &'a WeatherClient, descriptor: RequestDescriptor) -> Self {
        Self { client, descriptor }
    }

    /// Locate by city name, e.g. `"London"` or `"London,GB"`.
    pub fn by_city_name(mut self, name: &str) -> WeatherQuery<'a> {
        self.descriptor.set_param("q", name);
        WeatherQuery::new(self.client, self.descriptor)
    }

    /// Locate by geographic coordinate.
    pub fn by_coordinates(mut self, coordinate: Coordinate) -> WeatherQuery<'a> {
        self.descriptor
            .set_param("lat", coordinate.latitude().to_string());
        self.descriptor
            .set_param("lon", coordinate.longitude().to_string());
        WeatherQuery::new(self.client, self.descriptor)
    }
}

/// Second stage: optional selectors, then a terminal call.
pub struct WeatherQuery<'a> {
    client: &'a WeatherClient,
    descriptor: RequestDescriptor,
}

impl<'a> WeatherQuery<'a> {
    fn new(client: &'a WeatherClient, descriptor: RequestDescriptor) -> Self {
        Self { client, descriptor }
    }

    pub fn language(mut self, language: Language) -> Self {
        self.descriptor.set_language(language);
        self
    }

    pub fn unit_system(mut self, unit_system: UnitSystem) -> Self {
        self.descriptor.set_unit_system(unit_system);
        self
    }

    /// Ask for an XML or HTML body; only meaningful with [`as_json()`](Self::as_json)'s raw output.
    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.descriptor.set_response_format(format);
        self
    }

    /// The descriptor this query resolves.
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Resolve and return the raw payload.
    pub async fn as_json(&self) -> Result<String> {
        self.client.resolve(&self.descriptor).await
    }

    /// Resolve and map the payload into a [`Weather`].
    pub async fn as_weather(&self) -> Result<Weather> {
        let payload = self.as_json().await?;
        Weather::from_json(&payload, self.descriptor.unit_system()).inspect_err(|e| {
            error!(error = %e, "unable to map payload to weather");
        })
    }
}
