//! Command dispatch: bridges CLI args -> core device handles -> output formatting.

pub mod camera;
pub mod config_cmd;
pub mod devices;
pub mod sensor;
pub mod thermostat;
pub mod util;

use nestly_core::NestClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a network-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &NestClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices => devices::handle(client, global).await,
        Command::Thermostat(args) => thermostat::handle(client, args, global).await,
        Command::Sensor(args) => sensor::handle(client, args, global).await,
        Command::Camera(args) => camera::handle(client, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
