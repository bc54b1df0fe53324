//! Command handlers, one module per subcommand.

pub mod config_cmd;
pub mod dkim;
pub mod plan;
pub mod zones;

use serde::Serialize;

use zonewright_core::{DkimReport, RunReport};

use crate::cli::{GlobalOpts, RunArgs};
use crate::config::Runtime;
use crate::error::CliError;
use crate::output;

/// Combined result of `zonewright all`.
#[derive(Debug, Serialize)]
struct AllReport {
    zones: RunReport,
    dkim: DkimReport,
}

/// `zones` then `dkim`, sharing one store.
pub fn all(args: &RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let runtime = Runtime::load(global)?;
    let mut store = runtime.open_store()?;

    let report = AllReport {
        zones: zones::run(&runtime, &mut store, args.today())?,
        dkim: dkim::run(&runtime, &mut store)?,
    };

    let out = output::render_single(
        &global.output,
        &report,
        |r| format!("{}\n\n{}", zones::detail(&r.zones), dkim::detail(&r.dkim)),
        |r| {
            r.zones
                .zone_files
                .iter()
                .map(|p| p.display().to_string())
                .chain(r.dkim.domains.iter().cloned())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
