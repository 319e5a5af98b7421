//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

/// Copy of `cfg` with every plaintext secret masked.
fn redacted(cfg: Config) -> Config {
    let mask = |s: Option<String>| s.map(|_| MASK.to_string());
    let profiles = cfg
        .profiles
        .into_iter()
        .map(|(name, p)| {
            let profile = Profile {
                password: mask(p.password),
                cookie: mask(p.cookie),
                api_key: mask(p.api_key),
                ..p
            };
            (name, profile)
        })
        .collect();
    Config { profiles, ..cfg }
}

fn detail(cfg: &Config) -> String {
    let mut lines = vec![
        format!(
            "Default profile: {}",
            cfg.default_profile.as_deref().unwrap_or("-")
        ),
        format!("Output:          {}", cfg.defaults.output),
        format!("Color:           {}", cfg.defaults.color),
        format!("Timeout:         {}s", cfg.defaults.timeout),
        format!("Retries:         {}", cfg.defaults.retries),
    ];
    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        lines.push(String::new());
        lines.push(format!("[{name}]"));
        let fields = [
            ("email", &p.email),
            ("password", &p.password),
            ("issue_token", &p.issue_token),
            ("cookie", &p.cookie),
            ("api_key", &p.api_key),
            ("api_url", &p.api_url),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                lines.push(format!("  {key:<12} {value}"));
            }
        }
        if let Some(timeout) = p.timeout {
            lines.push(format!("  {:<12} {timeout}s", "timeout"));
        }
        if let Some(retries) = p.retries {
            lines.push(format!("  {:<12} {retries}", "retries"));
        }
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(
                &config::config_file(global).display().to_string(),
                global.quiet,
            );
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(config::load(global)?);
            let out = output::render_single(&global.output, &cfg, detail, |c| {
                c.default_profile.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load(global)?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!(
                    "No profiles configured. Add a [profiles.<name>] section to {}",
                    config::config_file(global).display()
                );
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load(global)?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config_to(&cfg, &config::config_file(global))?;
            output::print_done(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}
