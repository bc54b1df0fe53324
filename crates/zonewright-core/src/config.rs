// ── Runtime generation configuration ──
//
// Everything a run needs from the operator, resolved once up front.
// Components receive `&GeneratorConfig` and never read settings on their
// own. `zonewright-config` builds this from TOML and the environment.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use strum::{Display, EnumString, FromRepr};

/// File name of the master configuration inside the BIND config directory.
pub const MASTER_CONFIG_FILE: &str = "froxlor_bind.conf";

/// Sub-directory of the BIND config directory holding generated zones.
pub const ZONE_DIR: &str = "domains";

/// An authoritative name server. May be multi-homed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameServer {
    /// Hostname, always dot-terminated.
    pub hostname: String,
    /// Every address the hostname resolved to when the config was built.
    pub ips: Vec<IpAddr>,
}

/// Author Domain Signing Practices policy published next to the DKIM key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, FromRepr)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum AdspPolicy {
    #[default]
    Unknown = 0,
    All = 1,
    Discardable = 2,
}

#[derive(Debug, Clone)]
pub struct BindSettings {
    /// Directory holding the master configuration and the zone directory.
    pub conf_dir: PathBuf,
    /// Shell command that makes the name server pick up new files.
    pub reload_command: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DkimSettings {
    /// Master switch; nothing DKIM-related happens while off.
    pub enabled: bool,
    /// Directory for key files and the milter lists.
    pub prefix: PathBuf,
    /// File name (under `prefix`) of the newline separated domain list.
    pub domains_file: String,
    /// File name (under `prefix`) of the `*@domain:domain:keyfile` map.
    pub keys_file: String,
    /// Hash algorithms for the `h=` tag. `all` ends the list.
    pub algorithms: Vec<String>,
    /// Free text for the `n=` tag.
    pub notes: Option<String>,
    /// RSA modulus length for newly generated keys.
    pub key_length: u32,
    /// Adds `s=email;` restricting the key to mail.
    pub service_type_email: bool,
    /// Publish an `_adsp._domainkey` record with this policy.
    pub adsp: Option<AdspPolicy>,
    /// Shell command reloading the signing milter.
    pub reload_command: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SpfSettings {
    pub enabled: bool,
    /// Complete TXT record line for `@`, e.g. `@ IN TXT "v=spf1 a mx -all"`.
    pub entry: String,
}

/// Configuration for a single generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// `$TTL` of every generated zone.
    pub default_ttl: u32,
    /// Contact address for the SOA record, `@` form.
    pub admin_mail: String,
    pub nameservers: Vec<NameServer>,
    /// Dot-terminated mail exchangers, preference prefix included if any.
    pub mx_servers: Vec<String>,
    /// Raw AXFR peer list; entries that are not IP literals are skipped.
    pub axfr_servers: Vec<String>,
    /// Publish a zone for the platform's own hostname.
    pub platform_host: Option<String>,
    /// Create `mail`/`imap`/`smtp`/`pop3` names when MX servers are configured.
    pub create_mail_entry: bool,
    pub bind: BindSettings,
    pub dkim: DkimSettings,
    pub spf: SpfSettings,
}

impl GeneratorConfig {
    /// Directory the generated zone files live in.
    pub fn zone_dir(&self) -> PathBuf {
        self.bind.conf_dir.join(ZONE_DIR)
    }

    pub fn master_config_path(&self) -> PathBuf {
        self.bind.conf_dir.join(MASTER_CONFIG_FILE)
    }

    /// Where a zone file referenced from the master configuration lives.
    ///
    /// Relative paths are taken relative to the BIND config directory.
    pub fn resolve_zone_path(&self, zone_file: &str) -> PathBuf {
        let path = Path::new(zone_file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.bind.conf_dir.join(path)
        }
    }

    /// SOA contact in zone form: `hostmaster@example.com` becomes `hostmaster.example.com.`.
    pub fn soa_contact(&self) -> String {
        format!("{}.", self.admin_mail.replace('@', "."))
    }

    pub fn dkim_private_key_path(&self, dkim_id: u64) -> PathBuf {
        self.dkim.prefix.join(format!("dkim_{dkim_id}"))
    }

    pub fn dkim_public_key_path(&self, dkim_id: u64) -> PathBuf {
        self.dkim.prefix.join(format!("dkim_{dkim_id}.public"))
    }
}

impl Default for BindSettings {
    fn default() -> Self {
        Self {
            conf_dir: PathBuf::from("/etc/bind/"),
            reload_command: Some("/etc/init.d/bind9 reload".into()),
        }
    }
}

impl Default for DkimSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix: PathBuf::from("/etc/postfix/dkim/"),
            domains_file: "dkim-domains.conf".into(),
            keys_file: "dkim-keys.conf".into(),
            algorithms: vec!["all".into()],
            notes: None,
            key_length: 1024,
            service_type_email: false,
            adsp: None,
            reload_command: Some("/etc/init.d/dkim-filter restart".into()),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_ttl: 604_800,
            admin_mail: "hostmaster@localhost".into(),
            nameservers: Vec::new(),
            mx_servers: Vec::new(),
            axfr_servers: Vec::new(),
            platform_host: None,
            create_mail_entry: false,
            bind: BindSettings::default(),
            dkim: DkimSettings::default(),
            spf: SpfSettings::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn adsp_policy_from_setting_value() {
        assert_eq!(AdspPolicy::from_repr(0), Some(AdspPolicy::Unknown));
        assert_eq!(AdspPolicy::from_repr(1), Some(AdspPolicy::All));
        assert_eq!(AdspPolicy::from_repr(2), Some(AdspPolicy::Discardable));
        assert_eq!(AdspPolicy::from_repr(3), None);
        assert_eq!(AdspPolicy::Discardable.to_string(), "discardable");
        assert_eq!("all".parse::<AdspPolicy>().unwrap(), AdspPolicy::All);
    }

    #[test]
    fn soa_contact_rewrites_at_sign() {
        let config = GeneratorConfig {
            admin_mail: "admin@example.com".into(),
            ..GeneratorConfig::default()
        };
        assert_eq!(config.soa_contact(), "admin.example.com.");
    }

    #[test]
    fn zone_paths_resolve_against_conf_dir() {
        let mut config = GeneratorConfig::default();
        config.bind.conf_dir = PathBuf::from("/srv/bind");
        assert_eq!(config.zone_dir(), PathBuf::from("/srv/bind/domains"));
        assert_eq!(
            config.master_config_path(),
            PathBuf::from("/srv/bind/froxlor_bind.conf")
        );
        assert_eq!(
            config.resolve_zone_path("custom/example.zone"),
            PathBuf::from("/srv/bind/custom/example.zone")
        );
        assert_eq!(
            config.resolve_zone_path("/var/zones/example.zone"),
            PathBuf::from("/var/zones/example.zone")
        );
    }

    #[test]
    fn dkim_key_paths() {
        let mut config = GeneratorConfig::default();
        config.dkim.prefix = PathBuf::from("/etc/dkim");
        assert_eq!(config.dkim_private_key_path(7), PathBuf::from("/etc/dkim/dkim_7"));
        assert_eq!(
            config.dkim_public_key_path(7),
            PathBuf::from("/etc/dkim/dkim_7.public")
        );
    }
}
