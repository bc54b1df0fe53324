//! `plan`: dry run of the zone walk.

use tabled::Tabled;

use zonewright_core::{PlanEntry, plan};

use crate::cli::{GlobalOpts, RunArgs};
use crate::config::Runtime;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Parent")]
    parent: String,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&PlanEntry> for PlanRow {
    fn from(e: &PlanEntry) -> Self {
        Self {
            id: e.id.to_string(),
            domain: e.domain.clone(),
            role: e.role.to_string(),
            parent: e.parent.clone().unwrap_or_default(),
            file: e
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            error: e.error.clone().unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let runtime = Runtime::load(global)?;
    let store = runtime.open_store()?;
    let entries = plan(&runtime.config, &store, args.today())?;

    let out = output::render_list(&global.output, &entries, |e| PlanRow::from(e), |e| {
        format!("{}\t{}", e.domain, e.role)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
