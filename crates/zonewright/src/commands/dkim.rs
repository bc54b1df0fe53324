//! `dkim`: provision DKIM keys and write the signing milter's lists.

use zonewright_core::{
    DkimReport, DomainStore, OpensslKeyGenerator, ShellRunner, write_dkim_configs,
};

use crate::cli::GlobalOpts;
use crate::config::Runtime;
use crate::error::CliError;
use crate::output;

pub(super) fn run(runtime: &Runtime, store: &mut dyn DomainStore) -> Result<DkimReport, CliError> {
    Ok(write_dkim_configs(
        &runtime.config,
        store,
        &OpensslKeyGenerator::default(),
        &ShellRunner,
    )?)
}

pub(super) fn detail(report: &DkimReport) -> String {
    let list = |names: &[String]| {
        if names.is_empty() {
            "-".to_owned()
        } else {
            names.join(", ")
        }
    };
    output::detail(&[
        ("Signed domains", list(&report.domains)),
        ("New key pairs", list(&report.generated)),
        ("Key generation failed", list(&report.skipped)),
        ("Milter reloaded", if report.reloaded { "yes" } else { "no" }.to_owned()),
    ])
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let runtime = Runtime::load(global)?;
    if !runtime.config.dkim.enabled {
        tracing::info!("DKIM is disabled in the settings, nothing to do");
    }
    let mut store = runtime.open_store()?;
    let report = run(&runtime, &mut store)?;

    let out = output::render_single(&global.output, &report, detail, |r| r.domains.join("\n"))?;
    output::print_output(&out, global.quiet);
    Ok(())
}
