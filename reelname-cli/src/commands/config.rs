use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use reelname_lib::Settings;
use reelname_lib::settings::SETTABLE_KEYS;

use crate::error::CliError;

fn describe_path(label: &str, path: &Path) {
    let state = if path.exists() { "(exists)" } else { "(not found)" };
    log::info!(
        "  {label}: {} {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        state.if_supports_color(Stdout, |t| t.dimmed()),
    );
}

/// Show the effective settings and where they came from.
pub(crate) fn run_config_show(settings: &Settings, path: &Path) -> Result<(), CliError> {
    log::info!("{}", "reelname settings".if_supports_color(Stdout, |t| t.bold()));
    describe_path("Settings file", path);
    describe_path("Journal", settings.journal_store()?.path());
    log::info!("");
    for line in settings.to_toml()?.lines() {
        log::info!("  {line}");
    }
    Ok(())
}

pub(crate) fn run_config_set(mut settings: Settings, path: &Path, key: &str, value: &str) -> Result<(), CliError> {
    if let Err(e) = settings.set_value(key, value) {
        if matches!(e, reelname_lib::SettingsError::UnknownKey(_)) {
            log::warn!("Settable keys: {}", SETTABLE_KEYS.join(", "));
        }
        return Err(e.into());
    }
    settings.save_to(path)?;
    log::info!(
        "  {} {} = {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        key.if_supports_color(Stdout, |t| t.bold()),
        value,
    );
    Ok(())
}

pub(crate) fn run_config_path(settings: &Settings, path: &Path) -> Result<(), CliError> {
    println!("{}", path.display());
    println!("{}", settings.journal_store()?.path().display());
    Ok(())
}
