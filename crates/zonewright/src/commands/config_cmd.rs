//! Config subcommand handlers.

use zonewright_config::{Settings, to_toml};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Settings as they would appear in the config file.
fn format_settings(settings: &Settings) -> String {
    to_toml(settings).unwrap_or_else(|err| format!("# cannot render settings: {err}\n"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let settings = config::settings(global)?;
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => format_settings(&settings),
                _ => output::render_single(
                    &global.output,
                    &settings,
                    format_settings,
                    format_settings,
                )?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let path = config::settings_path(global);
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}
