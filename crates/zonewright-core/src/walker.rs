// ── Zone tree walk ──
//
// Visits the delegation forest depth-first. Every visit returns its own
// contribution: the text to inline into the caller and a `WalkOutcome`
// with the zone files, config stanzas and serial updates it produced.
// Parents fold their children's outcomes; nothing is accumulated on the
// walker itself.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use strum::Display;
use tracing::{error, info};

use crate::bindconf;
use crate::config::GeneratorConfig;
use crate::model::DomainId;
use crate::store::{DomainStore, StoreError};
use crate::tree::DomainForest;
use crate::zone::{ZoneError, ZoneGenerator};

/// A generated zone file, relative to the zone directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneFile {
    pub domain: String,
    pub file_name: String,
    pub contents: String,
}

/// A serial to write back once the zone file is on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialUpdate {
    pub domain_id: u64,
    pub serial: String,
}

/// How a domain ends up in the name server's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum DomainRole {
    /// Owns a generated zone file.
    ZoneFile,
    /// Folded into an ancestor's zone file.
    Inline,
    /// Served from an administrator-managed zone file.
    Override,
}

/// One line of a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub id: DomainId,
    pub domain: String,
    pub role: DomainRole,
    /// Ancestor whose zone file holds this domain's records.
    pub parent: Option<String>,
    /// Zone file referenced from the master configuration.
    pub file: Option<PathBuf>,
    /// Why the domain's records were replaced by an error comment.
    pub error: Option<String>,
}

/// Everything a walk produced, in visit order.
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    pub zone_files: Vec<ZoneFile>,
    /// Master configuration stanzas, without the file header.
    pub config: String,
    pub serial_updates: Vec<SerialUpdate>,
    pub entries: Vec<PlanEntry>,
    /// Domains whose records could not be generated.
    pub failures: Vec<DomainId>,
}

impl WalkOutcome {
    pub fn absorb(&mut self, other: WalkOutcome) {
        self.zone_files.extend(other.zone_files);
        self.config.push_str(&other.config);
        self.serial_updates.extend(other.serial_updates);
        self.entries.extend(other.entries);
        self.failures.extend(other.failures);
    }
}

/// Result of visiting one domain.
#[derive(Debug, Default)]
struct Visit {
    /// Records to splice into the caller's zone.
    inline: String,
    outcome: WalkOutcome,
}

pub struct ZoneTreeWalker<'a> {
    config: &'a GeneratorConfig,
    forest: &'a DomainForest,
    generator: ZoneGenerator<'a>,
}

impl<'a> ZoneTreeWalker<'a> {
    pub fn new(
        config: &'a GeneratorConfig,
        store: &'a dyn DomainStore,
        forest: &'a DomainForest,
        today: NaiveDate,
    ) -> Self {
        Self {
            config,
            forest,
            generator: ZoneGenerator::new(config, store, today),
        }
    }

    /// Walk every root of the forest.
    pub fn walk(&self) -> Result<WalkOutcome, StoreError> {
        let mut outcome = WalkOutcome::default();
        for root in self.forest.roots() {
            outcome.absorb(self.walk_root(root)?);
        }
        Ok(outcome)
    }

    /// Walk the subtree below one root.
    pub fn walk_root(&self, root: usize) -> Result<WalkOutcome, StoreError> {
        Ok(self.visit(root)?.outcome)
    }

    fn visit(&self, idx: usize) -> Result<Visit, StoreError> {
        let domain = self.forest.domain(idx);
        let mut visit = Visit::default();

        for &child in self.forest.children(idx) {
            let child = self.visit(child)?;
            visit.inline.push_str(&child.inline);
            visit.outcome.absorb(child.outcome);
        }

        if let Some(zone_file) = &domain.zone_file_override {
            self.visit_override(idx, zone_file, &mut visit);
            return Ok(visit);
        }

        let delegated = self.forest.is_delegated(idx);
        let (body, failure) = match self.generator.generate(domain, delegated) {
            Ok(body) => {
                if let (Some(serial), Some(domain_id)) = (body.serial, domain.id.as_stored()) {
                    visit.outcome.serial_updates.push(SerialUpdate { domain_id, serial });
                }
                (body.text, None)
            }
            Err(ZoneError::Store(err)) => return Err(err),
            Err(err) => {
                error!(domain = %domain.name, error = %err, "could not create zone");
                visit.outcome.failures.push(domain.id);
                (err.placeholder(), Some(err.to_string()))
            }
        };

        if delegated {
            let parent = self.forest.parent(idx).map(|p| self.forest.domain(p).name.clone());
            visit.outcome.entries.insert(
                0,
                PlanEntry {
                    id: domain.id,
                    domain: domain.name.clone(),
                    role: DomainRole::Inline,
                    parent,
                    file: None,
                    error: failure,
                },
            );
            visit.inline.insert_str(0, &body);
            return Ok(visit);
        }

        let file_name = domain.zone_file_name();
        let path = self.config.zone_dir().join(&file_name);
        let mut contents = body;
        contents.push_str(&std::mem::take(&mut visit.inline));

        visit.outcome.config.push_str(&bindconf::stanza(self.config, domain, &path));
        visit.outcome.entries.insert(
            0,
            PlanEntry {
                id: domain.id,
                domain: domain.name.clone(),
                role: DomainRole::ZoneFile,
                parent: None,
                file: Some(path),
                error: failure,
            },
        );
        visit.outcome.zone_files.push(ZoneFile {
            domain: domain.name.clone(),
            file_name,
            contents,
        });
        Ok(visit)
    }

    fn visit_override(&self, idx: usize, zone_file: &str, visit: &mut Visit) {
        let domain = self.forest.domain(idx);
        info!(
            domain = %domain.name,
            zone_file,
            "using administrator zone file; all subdomain records are handled there"
        );
        if !visit.inline.is_empty() {
            info!(domain = %domain.name, "discarding generated subdomain records");
            visit.inline.clear();
        }

        let path = self.config.resolve_zone_path(zone_file);
        let parent = self
            .forest
            .parent(idx)
            .map(|p| self.forest.domain(p).name.clone());
        visit
            .outcome
            .config
            .push_str(&bindconf::stanza(self.config, domain, &path));
        visit.outcome.entries.insert(
            0,
            PlanEntry {
                id: domain.id,
                domain: domain.name.clone(),
                role: DomainRole::Override,
                parent,
                file: Some(path),
                error: None,
            },
        );
    }
}
