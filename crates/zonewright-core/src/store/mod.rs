// ── Domain store ──
//
// The relational side of a run: domain rows, their addresses, and the
// few columns a run writes back. `DomainStore` is the seam; `MemoryStore`
// answers the queries over in-memory rows and `JsonDomainStore` persists
// those rows as a JSON document.

mod json;
mod memory;
mod record;

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

use crate::model::Domain;

pub use json::JsonDomainStore;
pub use memory::MemoryStore;
pub use record::{DomainRecord, StoreDocument};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("domain #{id} not found in store")]
    UnknownDomain { id: u64 },

    #[error("cannot read domain store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid domain store {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write domain store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode domain store: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Read and write-back access to hosted domains.
///
/// Reads take `&self` so the zone walk can share the store; the two
/// write-backs take `&mut self` and happen outside the walk.
pub trait DomainStore {
    /// Every domain served by the name server, ordered by name.
    fn list_bind_domains(&self) -> Result<Vec<Domain>, StoreError>;

    /// Raw addresses bound to a domain, deduplicated, in binding order.
    fn list_ips(&self, domain_id: u64) -> Result<Vec<String>, StoreError>;

    /// Every address in the platform's pool, deduplicated.
    fn list_all_ips(&self) -> Result<Vec<String>, StoreError>;

    /// Domains living in the zone of `domain_id` (same-zone subdomains).
    fn list_same_zone_subdomains(&self, domain_id: u64) -> Result<Vec<Domain>, StoreError>;

    /// Top-level bind domains exactly one label below `suffix`.
    fn list_direct_bind_delegations(&self, suffix: &str) -> Result<Vec<Domain>, StoreError>;

    /// Domains with DKIM enabled, ordered by id.
    fn list_dkim_domains(&self) -> Result<Vec<Domain>, StoreError>;

    fn update_serial(&mut self, domain_id: u64, serial: &str) -> Result<(), StoreError>;

    fn update_dkim_keys(
        &mut self,
        domain_id: u64,
        dkim_id: u64,
        public_key: &str,
        private_key: &SecretString,
    ) -> Result<(), StoreError>;

    /// One past the highest DKIM id in use.
    fn next_dkim_id(&self) -> Result<u64, StoreError>;
}
