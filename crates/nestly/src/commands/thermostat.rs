//! Thermostat command handlers.

use chrono::{DateTime, Duration, Utc};

use nestly_core::{NestClient, Thermostat, ThermostatMode, ThermostatState};

use crate::cli::{FanCommand, GlobalOpts, ModeArg, ThermostatArgs, ThermostatCommand, Toggle};
use crate::error::CliError;
use crate::output;

use super::util;

/// Render a bucket epoch-seconds field, falling back to the raw number.
fn epoch(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0).map_or_else(|| secs.to_string(), |t| t.to_rfc3339())
}

fn detail(s: &ThermostatState, color: bool) -> String {
    let mut lines = vec![
        format!("ID:          {}", s.device_id),
        format!("Mode:        {}", util::or_dash(s.mode)),
        format!(
            "Action:      {}",
            output::paint_action(&s.action.to_string(), color)
        ),
        format!("Current:     {:.1}°", s.current_temperature),
    ];
    match s.mode {
        Some(ThermostatMode::Range) => lines.push(format!(
            "Target:      {:.1}° - {:.1}°",
            s.target_temperature_low, s.target_temperature_high
        )),
        _ => lines.push(format!("Target:      {:.1}°", s.target_temperature)),
    }
    lines.push(format!("Humidity:    {:.0}%", s.current_humidity));
    lines.push(format!(
        "Eco:         {}",
        output::paint_flag(s.eco, "on", "off", color)
    ));
    if s.has_fan {
        let fan = output::paint_flag(s.fan, "running", "off", color);
        match s.fan_timer_timeout.filter(|_| s.fan) {
            Some(until) => lines.push(format!("Fan:         {fan} until {}", until.to_rfc3339())),
            None => lines.push(format!("Fan:         {fan}")),
        }
    }
    if s.time_to_target > 0 {
        lines.push(format!("Reaches at:  {}", epoch(s.time_to_target)));
    }
    if s.compressor_lockout_enabled {
        lines.push(format!("Lockout til: {}", epoch(s.compressor_lockout_timeout)));
    }
    lines.push(format!(
        "Can heat:    {}",
        if s.can_heat { "yes" } else { "no" }
    ));
    lines.push(format!(
        "Can cool:    {}",
        if s.can_cool { "yes" } else { "no" }
    ));
    lines.push(format!("Synced:      {}", s.synced_at.to_rfc3339()));
    lines.join("\n")
}

fn core_mode(mode: ModeArg) -> ThermostatMode {
    match mode {
        ModeArg::Off => ThermostatMode::Off,
        ModeArg::Heat => ThermostatMode::Heat,
        ModeArg::Cool => ThermostatMode::Cool,
        ModeArg::Range => ThermostatMode::Range,
    }
}

async fn open(client: &NestClient, id: &str) -> Result<Thermostat, CliError> {
    let known = client.thermostat_ids().await?;
    util::require_listed("thermostat", id, &known)?;
    Ok(client.thermostat(id).await?)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &NestClient,
    args: ThermostatArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let thermostat = open(client, &args.id).await?;

    match args.command {
        ThermostatCommand::Show => {
            let state = match thermostat.state() {
                Some(state) => state,
                None => thermostat.sync().await?,
            };
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                state.as_ref(),
                |s| detail(s, color),
                |s| format!("{:.1}", s.current_temperature),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ThermostatCommand::SetTemp { temperature, high } => {
            match high {
                Some(high) => {
                    thermostat.set_temperature_range(temperature, high).await?;
                    output::print_done(
                        &format!("Range set to {temperature:.1}° - {high:.1}°"),
                        global.quiet,
                    );
                }
                None => {
                    thermostat.set_temperature(temperature).await?;
                    output::print_done(
                        &format!("Target set to {temperature:.1}°"),
                        global.quiet,
                    );
                }
            }
            Ok(())
        }

        ThermostatCommand::SetMode { mode } => {
            let mode = core_mode(mode);
            thermostat.set_mode(mode).await?;
            output::print_done(&format!("Mode set to {mode}"), global.quiet);
            Ok(())
        }

        ThermostatCommand::Fan { command } => match command {
            FanCommand::On { minutes } => {
                let until = Utc::now() + Duration::minutes(i64::from(minutes));
                thermostat.set_fan(until).await?;
                output::print_done(
                    &format!("Fan running until {}", until.to_rfc3339()),
                    global.quiet,
                );
                Ok(())
            }
            FanCommand::Off => {
                thermostat.stop_fan().await?;
                output::print_done("Fan stopped", global.quiet);
                Ok(())
            }
        },

        ThermostatCommand::Eco { state } => {
            let enabled = matches!(state, Toggle::On);
            thermostat.set_eco_mode(enabled).await?;
            output::print_done(
                if enabled { "Eco on" } else { "Eco off, schedule resumed" },
                global.quiet,
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nestly_core::HvacAction;

    use super::*;

    fn state() -> ThermostatState {
        ThermostatState {
            device_id: "T1".into(),
            current_temperature: 20.25,
            target_temperature: 21.0,
            target_temperature_low: 19.0,
            target_temperature_high: 24.0,
            mode: Some(ThermostatMode::Range),
            action: HvacAction::Heating,
            can_heat: true,
            can_cool: true,
            has_fan: true,
            fan: false,
            fan_timer_timeout: None,
            current_humidity: 41.0,
            eco: false,
            time_to_target: 0,
            compressor_lockout_enabled: false,
            compressor_lockout_timeout: 0,
            synced_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn range_mode_shows_both_setpoints() {
        let out = detail(&state(), false);
        assert!(out.contains("Mode:        range"));
        assert!(out.contains("Target:      19.0° - 24.0°"));
        assert!(out.contains("Action:      heating"));
        assert!(out.contains("Fan:         off"));
    }

    #[test]
    fn unknown_mode_renders_dash() {
        let mut s = state();
        s.mode = None;
        let out = detail(&s, false);
        assert!(out.contains("Mode:        -"));
        assert!(out.contains("Target:      21.0°"));
    }

    #[test]
    fn time_to_target_renders_as_timestamp() {
        let mut s = state();
        assert!(!detail(&s, false).contains("Reaches at:"));

        s.time_to_target = 1_700_000_600;
        let out = detail(&s, false);
        assert!(out.contains("Reaches at:  2023-11-14T22:23:20+00:00"));
    }

    #[test]
    fn cli_modes_map_to_writable_modes() {
        assert_eq!(core_mode(ModeArg::Range), ThermostatMode::Range);
        assert_eq!(core_mode(ModeArg::Off), ThermostatMode::Off);
    }
}
