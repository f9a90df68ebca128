//! Public types for the Vedrfolnir API.

mod mode;
mod request;
mod weather;

pub use mode::OperatingMode;
pub use request::{Coordinate, Language, RequestDescriptor, ResponseFormat, UnitSystem};
pub use weather::{
    AtmosphericPressure, Clouds, Humidity, Location, Precipitation, Temperature, Weather,
    WeatherState, Wind,
};
