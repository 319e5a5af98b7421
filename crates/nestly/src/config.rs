//! CLI configuration: thin wrapper around `nestly_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--email, --api-url, --timeout, --retries).

use std::path::PathBuf;

use nestly_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use nestly_config::{Config, Profile, save_config_to};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` / `NEST_CONFIG`, else the platform path.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(nestly_config::config_path)
}

/// Load the config file plus `NEST_*` environment overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(nestly_config::load_config_from(&config_file(global))?)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Apply flag overrides on top of a stored profile.
///
/// Flags take priority over profile values.
pub fn resolve_profile(profile: &Profile, global: &GlobalOpts) -> Profile {
    let mut merged = profile.clone();
    if let Some(ref email) = global.email {
        merged.email = Some(email.clone());
    }
    if let Some(ref api_url) = global.api_url {
        merged.api_url = Some(api_url.clone());
    }
    if global.timeout.is_some() {
        merged.timeout = global.timeout;
    }
    if global.retries.is_some() {
        merged.retries = global.retries;
    }
    merged
}

/// Build a `ClientConfig` from the config file, profile, and CLI overrides.
///
/// A profile that is not in the file is still usable when credentials come
/// from flags or the environment alone.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = load(global)?;
    let profile_name = active_profile_name(global, &cfg);

    let stored = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.email.is_some() || std::env::var("NEST_ISSUE_TOKEN").is_ok() => {
            Profile::default()
        }
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_file(global).display().to_string(),
            });
        }
    };

    let profile = resolve_profile(&stored, global);
    Ok(nestly_config::profile_to_client_config(
        &profile,
        &profile_name,
        &cfg.defaults,
    )?)
}

/// Comma-separated profile names for error help text.
pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}
