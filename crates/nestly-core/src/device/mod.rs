// ── Device handles ──
//
// Each handle owns its decoded state and shares a `Session` with any other
// handles built from the same client.

pub mod camera;
pub mod sensor;
pub mod thermostat;

pub use camera::Camera;
pub use sensor::TemperatureSensor;
pub use thermostat::Thermostat;
