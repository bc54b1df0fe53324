// ── Hosted domain ──
//
// A fully typed view of one domain row. Optional columns are real
// `Option`s: the store layer turns empty strings and zero ids into `None`
// when it loads rows, so nothing downstream checks for sentinels.

use secrecy::SecretString;

use super::domain_id::DomainId;

/// Login label used in config comments for the platform hostname entry.
pub const PLATFORM_LOGIN: &str = "platform";

/// DKIM state of a domain.
#[derive(Debug, Clone, Default)]
pub struct DkimState {
    /// Whether the customer enabled DKIM signing for the domain.
    pub enabled: bool,
    /// Selector number; the record is published as `dkim_<id>._domainkey`.
    pub id: Option<u64>,
    /// PEM-encoded public key.
    pub public_key: Option<String>,
    /// PEM-encoded private key.
    pub private_key: Option<SecretString>,
}

impl DkimState {
    /// True when key material has to be generated before it can be published.
    pub fn needs_keys(&self) -> bool {
        self.public_key.is_none() || self.private_key.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Domain {
    pub id: DomainId,
    /// Fully-qualified name without the trailing dot.
    pub name: String,
    pub is_email_domain: bool,
    pub is_wildcard_domain: bool,
    pub www_server_alias: bool,
    pub customer_id: Option<u64>,
    pub owner_login: Option<String>,
    /// Administrator-managed zone file. When set, no zone is generated.
    pub zone_file_override: Option<String>,
    /// Last serial written to this domain's zone (`YYYYMMDDnn`).
    pub serial: Option<String>,
    pub dkim: DkimState,
    /// Domain whose zone file this one is folded into.
    pub delegated_parent_id: Option<u64>,
    /// Same-zone parent, only used to enumerate subdomain address records.
    pub parent_domain_id: Option<u64>,
}

impl Domain {
    /// A plain top-level domain with every flag off.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: DomainId::Stored(id),
            name: name.into(),
            is_email_domain: false,
            is_wildcard_domain: false,
            www_server_alias: false,
            customer_id: None,
            owner_login: None,
            zone_file_override: None,
            serial: None,
            dkim: DkimState::default(),
            delegated_parent_id: None,
            parent_domain_id: None,
        }
    }

    /// The synthetic entry publishing the platform's own hostname.
    ///
    /// It answers on every pooled address, is always a wildcard, and its
    /// serial is seeded from today's date instead of being stored.
    pub fn platform(hostname: impl Into<String>, email: bool, today: &str) -> Self {
        Self {
            id: DomainId::Platform,
            is_email_domain: email,
            is_wildcard_domain: true,
            owner_login: Some(PLATFORM_LOGIN.to_owned()),
            serial: Some(format!("{today}00")),
            ..Self::new(0, hostname)
        }
    }

    pub fn is_platform(&self) -> bool {
        self.id.is_platform()
    }

    /// Whether the administrator supplies this domain's zone file.
    pub fn has_override(&self) -> bool {
        self.zone_file_override.is_some()
    }

    /// File name of the generated zone, relative to the zone directory.
    pub fn zone_file_name(&self) -> String {
        format!("{}.zone", self.name)
    }

    /// Strip `.<self.name>` from a descendant name, leaving the relative label.
    ///
    /// Names that are not below this domain are returned unchanged.
    pub fn relative_label<'a>(&self, descendant: &'a str) -> &'a str {
        descendant
            .strip_suffix(self.name.as_str())
            .and_then(|rest| rest.strip_suffix('.'))
            .filter(|label| !label.is_empty())
            .unwrap_or(descendant)
    }
}
