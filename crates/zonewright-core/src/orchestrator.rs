// ── Run orchestration ──
//
// One pass of the name server job and one pass of the DKIM job. The order
// of filesystem steps matters: zone files land before the master config
// that references them, the reload happens after both, and stale files are
// only pruned once the name server has stopped referencing them.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::bindconf;
use crate::config::GeneratorConfig;
use crate::error::CoreError;
use crate::exec::CommandRunner;
use crate::fs;
use crate::keygen::KeyGenerator;
use crate::model::{Domain, DomainId};
use crate::serial::today_prefix;
use crate::store::DomainStore;
use crate::sync::FileSyncer;
use crate::tree::DomainForest;
use crate::walker::{DomainRole, PlanEntry, WalkOutcome, ZoneTreeWalker};

/// Summary of a name server pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Zone files written, absolute.
    pub zone_files: Vec<PathBuf>,
    /// Master configuration, `None` when there was nothing to serve.
    pub config_file: Option<PathBuf>,
    pub serials_written: usize,
    /// Domains whose zone body was replaced by an error comment.
    pub failures: Vec<DomainId>,
    /// Delegation links that were dropped while building the forest.
    pub anomalies: Vec<String>,
    pub reloaded: bool,
    /// Stale zone files deleted after the reload.
    pub removed: Vec<PathBuf>,
}

/// Summary of a DKIM pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DkimReport {
    /// Domains listed in the signing configuration.
    pub domains: Vec<String>,
    /// Domains that got a fresh key pair this run.
    pub generated: Vec<String>,
    /// Domains skipped because key generation failed.
    pub skipped: Vec<String>,
    pub reloaded: bool,
}

fn platform_domain(config: &GeneratorConfig, today: NaiveDate) -> Option<Domain> {
    config
        .platform_host
        .as_deref()
        .map(|host| Domain::platform(host, config.create_mail_entry, &today_prefix(today)))
}

fn load_forest(
    config: &GeneratorConfig,
    store: &dyn DomainStore,
    today: NaiveDate,
) -> Result<Option<DomainForest>, CoreError> {
    let domains = store.list_bind_domains()?;
    let platform = platform_domain(config, today);
    if domains.is_empty() && platform.is_none() {
        return Ok(None);
    }
    Ok(Some(DomainForest::build(domains, platform)))
}

fn reload(runner: &dyn CommandRunner, command: Option<&str>, what: &str) -> bool {
    let Some(command) = command.map(str::trim).filter(|c| !c.is_empty()) else {
        debug!(what, "no reload command configured");
        return false;
    };
    match runner.run(command) {
        Ok(_) => {
            info!(what, command, "reloaded");
            true
        }
        Err(err) => {
            error!(what, error = %err, "reload failed");
            false
        }
    }
}

/// Regenerate every zone file and the master configuration, reload the
/// name server and prune zone files of vanished domains.
pub fn write_configs(
    config: &GeneratorConfig,
    store: &mut dyn DomainStore,
    runner: &dyn CommandRunner,
    today: NaiveDate,
) -> Result<RunReport, CoreError> {
    info!("rebuilding name server configuration");

    let zone_dir = config.zone_dir();
    fs::ensure_dir(&zone_dir).map_err(CoreError::io(&zone_dir))?;

    let Some(forest) = load_forest(config, &*store, today)? else {
        info!("no domains found for the name server, skipping");
        return Ok(RunReport::default());
    };

    let outcome = ZoneTreeWalker::new(config, &*store, &forest, today).walk()?;
    let mut report = RunReport {
        failures: outcome.failures.clone(),
        anomalies: forest.anomalies().iter().map(ToString::to_string).collect(),
        ..RunReport::default()
    };

    let mut syncer = FileSyncer::new();
    for zone in &outcome.zone_files {
        let path = zone_dir.join(&zone.file_name);
        fs::write_atomic(&path, zone.contents.as_bytes(), fs::PUBLIC_FILE_MODE)
            .map_err(CoreError::io(&path))?;
        info!(path = %path.display(), "zone written");
        syncer.record(zone.file_name.clone());
        report.zone_files.push(path);
    }
    keep_override_files(&outcome, &zone_dir, &mut syncer);

    for update in &outcome.serial_updates {
        match store.update_serial(update.domain_id, &update.serial) {
            Ok(()) => report.serials_written += 1,
            Err(err) => {
                error!(domain_id = update.domain_id, serial = %update.serial, error = %err, "cannot store zone serial");
            }
        }
    }

    let conf_path = config.master_config_path();
    let mut conf = bindconf::header(&conf_path);
    conf.push_str(&outcome.config);
    fs::write_atomic(&conf_path, conf.as_bytes(), fs::PUBLIC_FILE_MODE)
        .map_err(CoreError::io(&conf_path))?;
    info!(path = %conf_path.display(), "master configuration written");
    report.config_file = Some(conf_path);

    report.reloaded = reload(runner, config.bind.reload_command.as_deref(), "bind");
    report.removed = syncer.prune(&zone_dir)?;

    if !report.failures.is_empty() {
        warn!(count = report.failures.len(), "some zones could not be generated");
    }
    Ok(report)
}

/// Administrator zone files kept inside the zone directory must survive pruning.
fn keep_override_files(outcome: &WalkOutcome, zone_dir: &Path, syncer: &mut FileSyncer) {
    for entry in outcome
        .entries
        .iter()
        .filter(|e| e.role == DomainRole::Override)
    {
        let Some(file) = &entry.file else { continue };
        if file.parent() == Some(zone_dir) {
            if let Some(name) = file.file_name() {
                syncer.record(name.to_string_lossy().into_owned());
            }
        }
    }
}

/// What a name server pass would do, without touching disk or store.
pub fn plan(
    config: &GeneratorConfig,
    store: &dyn DomainStore,
    today: NaiveDate,
) -> Result<Vec<PlanEntry>, CoreError> {
    let Some(forest) = load_forest(config, store, today)? else {
        return Ok(Vec::new());
    };
    Ok(ZoneTreeWalker::new(config, store, &forest, today).walk()?.entries)
}

fn write_key_file(path: &Path, contents: &str, mode: u32) -> Result<(), CoreError> {
    if path.exists() || contents.is_empty() {
        return Ok(());
    }
    fs::write_atomic(path, contents.as_bytes(), mode).map_err(CoreError::io(path))?;
    debug!(path = %path.display(), "restored key file from store");
    Ok(())
}

/// Provision missing DKIM keys and rewrite the signing milter's lists.
pub fn write_dkim_configs(
    config: &GeneratorConfig,
    store: &mut dyn DomainStore,
    keygen: &dyn KeyGenerator,
    runner: &dyn CommandRunner,
) -> Result<DkimReport, CoreError> {
    let settings = &config.dkim;
    let mut report = DkimReport::default();
    if !settings.enabled {
        debug!("DKIM disabled, skipping");
        return Ok(report);
    }

    fs::ensure_dir(&settings.prefix).map_err(CoreError::io(&settings.prefix))?;

    let mut domains_list = String::new();
    let mut keys_list = String::new();

    for domain in store.list_dkim_domains()? {
        let Some(domain_id) = domain.id.as_stored() else {
            continue;
        };

        let stored = (!domain.dkim.needs_keys())
            .then_some((&domain.dkim.public_key, &domain.dkim.private_key));
        let (dkim_id, public_key, private_key) = match stored {
            Some((Some(public), Some(private))) => (
                domain.dkim.id.unwrap_or_default(),
                public.clone(),
                private.clone(),
            ),
            _ => {
                let dkim_id = store.next_dkim_id()?;
                let private_path = config.dkim_private_key_path(dkim_id);
                let public_path = config.dkim_public_key_path(dkim_id);
                let pair = match keygen.generate(&private_path, &public_path, settings.key_length) {
                    Ok(pair) => pair,
                    Err(err) => {
                        error!(domain = %domain.name, error = %err, "DKIM key generation failed");
                        report.skipped.push(domain.name.clone());
                        continue;
                    }
                };
                if let Err(err) =
                    store.update_dkim_keys(domain_id, dkim_id, &pair.public_pem, &pair.private_pem)
                {
                    error!(domain = %domain.name, error = %err, "cannot store DKIM keys");
                }
                report.generated.push(domain.name.clone());
                (dkim_id, pair.public_pem, pair.private_pem)
            }
        };

        let private_path = config.dkim_private_key_path(dkim_id);
        write_key_file(
            &private_path,
            private_key.expose_secret(),
            fs::PRIVATE_KEY_MODE,
        )?;
        write_key_file(
            &config.dkim_public_key_path(dkim_id),
            &public_key,
            fs::PUBLIC_KEY_MODE,
        )?;

        domains_list.push_str(&domain.name);
        domains_list.push('\n');
        let _ = writeln!(
            keys_list,
            "*@{name}:{name}:{}",
            private_path.display(),
            name = domain.name
        );
        report.domains.push(domain.name);
    }

    let domains_path = settings.prefix.join(&settings.domains_file);
    fs::write_atomic(&domains_path, domains_list.as_bytes(), fs::PUBLIC_FILE_MODE)
        .map_err(CoreError::io(&domains_path))?;
    let keys_path = settings.prefix.join(&settings.keys_file);
    fs::write_atomic(&keys_path, keys_list.as_bytes(), fs::PUBLIC_FILE_MODE)
        .map_err(CoreError::io(&keys_path))?;
    info!(domains = report.domains.len(), "DKIM configuration written");

    report.reloaded = reload(runner, settings.reload_command.as_deref(), "dkim");
    Ok(report)
}
