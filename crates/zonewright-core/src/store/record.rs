// ── Stored rows ──
//
// The on-disk shape of the domain table. Columns keep their relational
// encoding (zero ids, empty strings); `DomainRecord::to_domain` is the
// single place that turns them into typed options.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::model::{DkimState, Domain, DomainId};

/// One row of the domain table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainRecord {
    pub id: u64,
    pub domain: String,
    #[serde(default = "default_true")]
    pub is_bind_domain: bool,
    pub is_email_domain: bool,
    pub is_wildcard_domain: bool,
    pub www_server_alias: bool,
    pub customer_id: u64,
    pub login_name: String,
    /// Administrator-supplied zone file; empty when generated.
    pub zone_file: String,
    pub serial: String,
    pub dkim_enabled: bool,
    pub dkim_id: u64,
    pub dkim_pubkey: String,
    pub dkim_privkey: String,
    /// Id of the domain whose zone this one is folded into; 0 for none.
    pub delegated_parent_id: u64,
    /// Same-zone parent; 0 for none.
    pub parent_domain_id: u64,
    /// Addresses bound to the domain.
    pub ips: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

fn non_zero(value: u64) -> Option<u64> {
    (value != 0).then_some(value)
}

impl DomainRecord {
    pub fn new(id: u64, domain: impl Into<String>) -> Self {
        Self {
            id,
            domain: domain.into(),
            is_bind_domain: true,
            ..Self::default()
        }
    }

    pub fn to_domain(&self) -> Domain {
        Domain {
            id: DomainId::Stored(self.id),
            name: self.domain.clone(),
            is_email_domain: self.is_email_domain,
            is_wildcard_domain: self.is_wildcard_domain,
            www_server_alias: self.www_server_alias,
            customer_id: non_zero(self.customer_id),
            owner_login: non_empty(&self.login_name),
            zone_file_override: non_empty(&self.zone_file),
            serial: non_empty(&self.serial),
            dkim: DkimState {
                enabled: self.dkim_enabled,
                id: non_zero(self.dkim_id),
                public_key: non_empty(&self.dkim_pubkey),
                private_key: non_empty(&self.dkim_privkey).map(SecretString::from),
            },
            delegated_parent_id: non_zero(self.delegated_parent_id),
            parent_domain_id: non_zero(self.parent_domain_id),
        }
    }
}

/// The whole store as persisted by `JsonDomainStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreDocument {
    /// Every address the platform owns.
    pub ip_pool: Vec<String>,
    pub domains: Vec<DomainRecord>,
}
