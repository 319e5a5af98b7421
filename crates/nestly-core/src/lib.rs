// nestly-core: Device models and synchronization between nestly-api and consumers (CLI).

pub mod client;
pub mod config;
pub mod device;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{DeviceInventory, NestClient};
pub use config::{AuthCredentials, ClientConfig};
pub use device::{Camera, TemperatureSensor, Thermostat};
pub use error::CoreError;

pub use model::{
    CameraState, DEFAULT_CAMERA_NAME, HvacAction, TemperatureSensorState, ThermostatMode,
    ThermostatState,
};

// Wire-level types consumers need to configure a client.
pub use nestly_api::{CameraSummary, Endpoints, RetryPolicy};
