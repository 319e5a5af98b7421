//! `nestly devices`: one row per thermostat, sensor, and camera.

use serde::Serialize;
use tabled::Tabled;

use nestly_core::{DeviceInventory, NestClient};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Debug, Serialize, Tabled)]
struct DeviceRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

fn rows(inventory: DeviceInventory) -> Vec<DeviceRow> {
    let thermostats = inventory.thermostats.into_iter().map(|id| DeviceRow {
        kind: "thermostat",
        id,
        name: String::new(),
    });
    let sensors = inventory.sensors.into_iter().map(|id| DeviceRow {
        kind: "sensor",
        id,
        name: String::new(),
    });
    let cameras = inventory.cameras.into_iter().map(|c| DeviceRow {
        kind: "camera",
        id: c.uuid,
        name: c.name.unwrap_or_default(),
    });
    thermostats.chain(sensors).chain(cameras).collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(client: &NestClient, global: &GlobalOpts) -> Result<(), CliError> {
    let inventory = client.devices().await?;
    let rows = rows(inventory);
    let out = output::render_list(
        &global.output,
        &rows,
        |r| DeviceRow {
            kind: r.kind,
            id: r.id.clone(),
            name: r.name.clone(),
        },
        |r| r.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
