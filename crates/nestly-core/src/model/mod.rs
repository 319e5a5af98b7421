// ── Device domain model ──
//
// Decoded, last-known state for each device category. States are built as
// fresh values from a complete response and published wholesale.

pub mod camera;
pub mod sensor;
pub mod thermostat;

pub use camera::{CameraState, DEFAULT_CAMERA_NAME};
pub use sensor::TemperatureSensorState;
pub use thermostat::{HvacAction, ThermostatMode, ThermostatState};
