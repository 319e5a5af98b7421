//! Temperature sensor command handlers.

use nestly_core::{NestClient, TemperatureSensorState};

use crate::cli::{GlobalOpts, SensorArgs, SensorCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(s: &TemperatureSensorState) -> String {
    [
        format!("ID:          {}", s.device_id),
        format!("Temperature: {:.1}°", s.current_temperature),
        format!("Battery:     {:.0}", s.battery_level),
        format!("Synced:      {}", s.synced_at.to_rfc3339()),
    ]
    .join("\n")
}

pub async fn handle(
    client: &NestClient,
    args: SensorArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let known = client.sensor_ids().await?;
    util::require_listed("sensor", &args.id, &known)?;

    match args.command {
        SensorCommand::Show => {
            let sensor = client.temperature_sensor(&args.id).await?;
            let state = match sensor.state() {
                Some(state) => state,
                None => sensor.sync().await?,
            };
            let out = output::render_single(&global.output, state.as_ref(), detail, |s| {
                format!("{:.1}", s.current_temperature)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
