//! Camera command handlers.

use chrono::Utc;

use nestly_core::{CameraState, NestClient};

use crate::cli::{CameraArgs, CameraCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(s: &CameraState, color: bool) -> String {
    [
        format!("UUID:      {}", s.uuid),
        format!("Name:      {}", s.name),
        format!("Location:  {}", s.location.as_deref().unwrap_or("-")),
        format!(
            "Online:    {}",
            output::paint_flag(s.is_online, "yes", "no", color)
        ),
        format!(
            "Streaming: {}",
            output::paint_flag(s.is_streaming, "on", "off", color)
        ),
        format!("Battery:   {}", util::or_dash(s.battery_voltage.map(|v| format!("{v:.2} V")))),
        format!("AC:        {}", util::or_dash(s.ac_voltage.map(|v| format!("{v:.2} V")))),
        format!("Data tier: {}", util::or_dash(s.data_tier)),
        format!("Synced:    {}", s.synced_at.to_rfc3339()),
    ]
    .join("\n")
}

pub async fn handle(
    client: &NestClient,
    args: CameraArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cameras = client.cameras().await?;
    let known: Vec<String> = cameras.into_iter().map(|c| c.uuid).collect();
    util::require_listed("camera", &args.id, &known)?;

    let camera = client.camera(&args.id).await?;

    match args.command {
        CameraCommand::Show => {
            let state = match camera.state() {
                Some(state) => state,
                None => camera.sync().await?,
            };
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                state.as_ref(),
                |s| detail(s, color),
                |s| s.uuid.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CameraCommand::On => {
            camera.turn_on().await?;
            output::print_done(&format!("Streaming enabled on {}", camera.name()), global.quiet);
            Ok(())
        }

        CameraCommand::Off => {
            camera.turn_off().await?;
            output::print_done(&format!("Streaming disabled on {}", camera.name()), global.quiet);
            Ok(())
        }

        CameraCommand::Snapshot { out } => {
            let image = camera.image(Utc::now()).await?;
            std::fs::write(&out, &image)?;
            output::print_done(
                &format!("Wrote {} bytes to {}", image.len(), out.display()),
                global.quiet,
            );
            Ok(())
        }
    }
}
