//! `zones`: rewrite zone files and the master configuration.

use chrono::NaiveDate;

use zonewright_core::{DomainStore, RunReport, ShellRunner, write_configs};

use crate::cli::{GlobalOpts, RunArgs};
use crate::config::Runtime;
use crate::error::CliError;
use crate::output;

pub(super) fn run(
    runtime: &Runtime,
    store: &mut dyn DomainStore,
    today: NaiveDate,
) -> Result<RunReport, CliError> {
    Ok(write_configs(&runtime.config, store, &ShellRunner, today)?)
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_owned()
}

/// Table view of a name server pass.
pub(super) fn detail(report: &RunReport) -> String {
    let failures = if report.failures.is_empty() {
        "0".to_owned()
    } else {
        let ids: Vec<String> = report.failures.iter().map(ToString::to_string).collect();
        format!("{} ({})", ids.len(), ids.join(", "))
    };
    output::detail(&[
        ("Zone files written", report.zone_files.len().to_string()),
        (
            "Master config",
            report
                .config_file
                .as_ref()
                .map_or_else(|| "-".to_owned(), |p| p.display().to_string()),
        ),
        ("Serials updated", report.serials_written.to_string()),
        ("Failed domains", failures),
        ("Dropped delegations", report.anomalies.len().to_string()),
        ("Name server reloaded", yes_no(report.reloaded)),
        ("Stale files removed", report.removed.len().to_string()),
    ])
}

pub fn handle(args: &RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let runtime = Runtime::load(global)?;
    let mut store = runtime.open_store()?;
    let report = run(&runtime, &mut store, args.today())?;

    let out = output::render_single(&global.output, &report, detail, |r| {
        r.zone_files
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
