// ── In-memory store ──

use secrecy::{ExposeSecret, SecretString};

use super::record::{DomainRecord, StoreDocument};
use super::{DomainStore, StoreError};
use crate::model::Domain;

/// Domain rows held in memory, queried the way the relational store would.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: StoreDocument,
}

fn dedup(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: StoreDocument) -> Self {
        Self { document }
    }

    pub fn with_ip_pool(mut self, pool: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.document.ip_pool = pool.into_iter().map(Into::into).collect();
        self
    }

    pub fn insert(&mut self, record: DomainRecord) {
        self.document.domains.push(record);
    }

    pub fn document(&self) -> &StoreDocument {
        &self.document
    }

    pub fn record(&self, domain_id: u64) -> Option<&DomainRecord> {
        self.document.domains.iter().find(|r| r.id == domain_id)
    }

    fn record_mut(&mut self, domain_id: u64) -> Result<&mut DomainRecord, StoreError> {
        self.document
            .domains
            .iter_mut()
            .find(|r| r.id == domain_id)
            .ok_or(StoreError::UnknownDomain { id: domain_id })
    }
}

impl DomainStore for MemoryStore {
    fn list_bind_domains(&self) -> Result<Vec<Domain>, StoreError> {
        let mut rows: Vec<&DomainRecord> =
            self.document.domains.iter().filter(|r| r.is_bind_domain).collect();
        rows.sort_by(|a, b| a.domain.cmp(&b.domain));
        Ok(rows.into_iter().map(DomainRecord::to_domain).collect())
    }

    fn list_ips(&self, domain_id: u64) -> Result<Vec<String>, StoreError> {
        let record = self
            .record(domain_id)
            .ok_or(StoreError::UnknownDomain { id: domain_id })?;
        Ok(dedup(record.ips.iter().cloned()))
    }

    fn list_all_ips(&self) -> Result<Vec<String>, StoreError> {
        Ok(dedup(self.document.ip_pool.iter().cloned()))
    }

    fn list_same_zone_subdomains(&self, domain_id: u64) -> Result<Vec<Domain>, StoreError> {
        Ok(self
            .document
            .domains
            .iter()
            .filter(|r| r.parent_domain_id == domain_id)
            .map(DomainRecord::to_domain)
            .collect())
    }

    fn list_direct_bind_delegations(&self, suffix: &str) -> Result<Vec<Domain>, StoreError> {
        let dotted = format!(".{suffix}");
        Ok(self
            .document
            .domains
            .iter()
            .filter(|r| r.is_bind_domain && r.delegated_parent_id == 0)
            .filter(|r| {
                r.domain
                    .strip_suffix(&dotted)
                    .is_some_and(|label| !label.is_empty() && !label.contains('.'))
            })
            .map(DomainRecord::to_domain)
            .collect())
    }

    fn list_dkim_domains(&self) -> Result<Vec<Domain>, StoreError> {
        let mut rows: Vec<&DomainRecord> =
            self.document.domains.iter().filter(|r| r.dkim_enabled).collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows.into_iter().map(DomainRecord::to_domain).collect())
    }

    fn update_serial(&mut self, domain_id: u64, serial: &str) -> Result<(), StoreError> {
        self.record_mut(domain_id)?.serial = serial.to_owned();
        Ok(())
    }

    fn update_dkim_keys(
        &mut self,
        domain_id: u64,
        dkim_id: u64,
        public_key: &str,
        private_key: &SecretString,
    ) -> Result<(), StoreError> {
        let record = self.record_mut(domain_id)?;
        record.dkim_id = dkim_id;
        record.dkim_pubkey = public_key.to_owned();
        record.dkim_privkey = private_key.expose_secret().to_owned();
        Ok(())
    }

    fn next_dkim_id(&self) -> Result<u64, StoreError> {
        let max = self.document.domains.iter().map(|r| r.dkim_id).max().unwrap_or(0);
        Ok(max + 1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DomainId;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new().with_ip_pool(["192.0.2.1", "192.0.2.1", "2001:db8::1"]);
        store.insert(DomainRecord {
            ips: vec!["192.0.2.1".into(), "192.0.2.1".into()],
            ..DomainRecord::new(1, "zeta.test")
        });
        store.insert(DomainRecord::new(2, "alpha.test"));
        store.insert(DomainRecord {
            is_bind_domain: false,
            ..DomainRecord::new(3, "nodns.test")
        });
        store.insert(DomainRecord::new(4, "shop.alpha.test"));
        store.insert(DomainRecord::new(5, "deep.shop.alpha.test"));
        store.insert(DomainRecord {
            delegated_parent_id: 2,
            ..DomainRecord::new(6, "blog.alpha.test")
        });
        store.insert(DomainRecord {
            parent_domain_id: 2,
            is_bind_domain: false,
            ..DomainRecord::new(7, "www2.alpha.test")
        });
        store
    }

    #[test]
    fn bind_domains_sorted_by_name() {
        let names: Vec<String> = store()
            .list_bind_domains()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            names,
            [
                "alpha.test",
                "blog.alpha.test",
                "deep.shop.alpha.test",
                "shop.alpha.test",
                "zeta.test"
            ]
        );
    }

    #[test]
    fn addresses_are_deduplicated() {
        let store = store();
        assert_eq!(store.list_ips(1).unwrap(), ["192.0.2.1"]);
        assert_eq!(store.list_all_ips().unwrap(), ["192.0.2.1", "2001:db8::1"]);
        assert!(matches!(
            store.list_ips(99),
            Err(StoreError::UnknownDomain { id: 99 })
        ));
    }

    #[test]
    fn direct_delegations_are_one_label_deep_and_top_level() {
        let found = store().list_direct_bind_delegations("alpha.test").unwrap();
        let ids: Vec<DomainId> = found.iter().map(|d| d.id).collect();
        assert_eq!(ids, [DomainId::Stored(4)]);
    }

    #[test]
    fn same_zone_subdomains_ignore_bind_flag() {
        let subs = store().list_same_zone_subdomains(2).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].name, "www2.alpha.test");
    }

    #[test]
    fn write_backs_update_rows() {
        let mut store = store();
        store.update_serial(1, "2024010100").unwrap();
        assert_eq!(store.record(1).unwrap().serial, "2024010100");

        assert_eq!(store.next_dkim_id().unwrap(), 1);
        store
            .update_dkim_keys(2, 1, "PUB", &SecretString::from("PRIV".to_owned()))
            .unwrap();
        assert_eq!(store.next_dkim_id().unwrap(), 2);
        let row = store.record(2).unwrap();
        assert_eq!((row.dkim_pubkey.as_str(), row.dkim_privkey.as_str()), ("PUB", "PRIV"));
        assert!(store.update_serial(42, "x").is_err());
    }
}
