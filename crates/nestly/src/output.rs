//! Rendering for `--output`: rounded `tabled` tables, serde JSON/YAML, and a
//! plain one-id-per-line mode for scripts.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Color is on for `always`, or for `auto` on a terminal without `NO_COLOR`.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Paint an on/off word green or dimmed.
pub fn paint_flag(value: bool, on: &str, off: &str, color: bool) -> String {
    match (value, color) {
        (true, true) => on.green().to_string(),
        (false, true) => off.dimmed().to_string(),
        (true, false) => on.to_string(),
        (false, false) => off.to_string(),
    }
}

/// Paint an HVAC action: heating red, cooling cyan.
pub fn paint_action(action: &str, color: bool) -> String {
    if !color {
        return action.to_string();
    }
    match action {
        "heating" => action.red().to_string(),
        "cooling" => action.cyan().to_string(),
        _ => action.dimmed().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// JSON / YAML rendering shared by lists and single items; `None` for the
/// human formats.
fn render_structured<T: serde::Serialize + ?Sized>(
    format: &OutputFormat,
    data: &T,
) -> Option<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(|e| e.to_string()),
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(|e| e.to_string()),
        OutputFormat::Table | OutputFormat::Plain => return None,
    };
    Some(rendered.expect("serialization should not fail"))
}

/// Render a list. Tables go through `to_row`; `plain` prints `id_fn` per
/// line; the structured formats serialize `data` itself.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    if let Some(out) = render_structured(format, data) {
        return out;
    }
    if matches!(format, OutputFormat::Plain) {
        return data.iter().map(id_fn).collect::<Vec<_>>().join("\n");
    }
    let rows: Vec<R> = data.iter().map(to_row).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Render one item. Tables use the key/value block from `detail_fn`.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    render_structured(format, data).unwrap_or_else(|| match format {
        OutputFormat::Plain => id_fn(data),
        _ => detail_fn(data),
    })
}

/// Write `output` to stdout unless quiet or empty.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a one-line confirmation to stderr unless `--quiet`.
pub fn print_done(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}
