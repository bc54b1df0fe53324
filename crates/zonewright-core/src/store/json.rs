// ── JSON-backed store ──
//
// Rows live in a single JSON document. Reads are served from memory;
// every write-back rewrites the document atomically.

use std::path::PathBuf;

use secrecy::SecretString;
use tracing::debug;

use super::memory::MemoryStore;
use super::record::StoreDocument;
use super::{DomainStore, StoreError};
use crate::fs;
use crate::model::Domain;

#[derive(Debug)]
pub struct JsonDomainStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonDomainStore {
    /// Load the document at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let raw = std::fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let document: StoreDocument =
            serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), domains = document.domains.len(), "loaded domain store");
        Ok(Self {
            path,
            inner: MemoryStore::from_document(document),
        })
    }

    fn save(&self) -> Result<(), StoreError> {
        let mut payload =
            serde_json::to_string_pretty(self.inner.document()).map_err(StoreError::Encode)?;
        payload.push('\n');
        fs::write_atomic(&self.path, payload.as_bytes(), fs::PRIVATE_KEY_MODE).map_err(
            |source| StoreError::Write {
                path: self.path.clone(),
                source,
            },
        )
    }
}

impl DomainStore for JsonDomainStore {
    fn list_bind_domains(&self) -> Result<Vec<Domain>, StoreError> {
        self.inner.list_bind_domains()
    }

    fn list_ips(&self, domain_id: u64) -> Result<Vec<String>, StoreError> {
        self.inner.list_ips(domain_id)
    }

    fn list_all_ips(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_all_ips()
    }

    fn list_same_zone_subdomains(&self, domain_id: u64) -> Result<Vec<Domain>, StoreError> {
        self.inner.list_same_zone_subdomains(domain_id)
    }

    fn list_direct_bind_delegations(&self, suffix: &str) -> Result<Vec<Domain>, StoreError> {
        self.inner.list_direct_bind_delegations(suffix)
    }

    fn list_dkim_domains(&self) -> Result<Vec<Domain>, StoreError> {
        self.inner.list_dkim_domains()
    }

    fn update_serial(&mut self, domain_id: u64, serial: &str) -> Result<(), StoreError> {
        self.inner.update_serial(domain_id, serial)?;
        self.save()
    }

    fn update_dkim_keys(
        &mut self,
        domain_id: u64,
        dkim_id: u64,
        public_key: &str,
        private_key: &SecretString,
    ) -> Result<(), StoreError> {
        self.inner
            .update_dkim_keys(domain_id, dkim_id, public_key, private_key)?;
        self.save()
    }

    fn next_dkim_id(&self) -> Result<u64, StoreError> {
        self.inner.next_dkim_id()
    }
}
