//! Operator settings for zonewright.
//!
//! Flat TOML settings (plus `ZONEWRIGHT_*` environment overrides) and their
//! translation into the immutable `zonewright_core::GeneratorConfig` a run
//! is driven by. List-valued settings keep the panel's comma-separated
//! string form; they are parsed once, here.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use zonewright_core::{
    AdspPolicy, BindSettings, DkimSettings, GeneratorConfig, HostResolver, NameServer,
    SpfSettings,
};

/// Prefix of environment overrides; sections nest with `__`,
/// e.g. `ZONEWRIGHT_SYSTEM__DEFAULT_TTL=3600`.
pub const ENV_PREFIX: &str = "ZONEWRIGHT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level settings file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub system: SystemSettings,

    #[serde(default)]
    pub panel: PanelSettings,

    #[serde(default)]
    pub dkim: DkimSection,

    #[serde(default)]
    pub spf: SpfSection,

    #[serde(default)]
    pub store: StoreSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemSettings {
    /// Comma-separated name server hostnames; the first is the SOA primary.
    pub nameservers: String,

    /// Comma-separated mail exchangers, optionally with a preference.
    pub mxservers: String,

    /// Comma-separated IP addresses allowed to transfer zones.
    pub axfrservers: String,

    pub default_ttl: u32,

    /// The panel's own hostname.
    pub hostname: String,

    /// Publish a zone for `hostname`.
    pub create_hostname_entry: bool,

    /// Add `mail`/`imap`/`smtp`/`pop3` names when MX servers are configured.
    pub create_mail_entry: bool,

    pub bind_conf_directory: PathBuf,

    pub bind_reload_command: String,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            nameservers: String::new(),
            mxservers: String::new(),
            axfrservers: String::new(),
            default_ttl: 604_800,
            hostname: String::new(),
            create_hostname_entry: false,
            create_mail_entry: false,
            bind_conf_directory: PathBuf::from("/etc/bind/"),
            bind_reload_command: "/etc/init.d/bind9 reload".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PanelSettings {
    /// Contact address published in every SOA record.
    pub admin_mail: String,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            admin_mail: "hostmaster@localhost".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DkimSection {
    pub enabled: bool,
    pub prefix: PathBuf,
    pub domains_file: String,
    pub keys_file: String,
    /// Comma-separated hash algorithms, or `all`.
    pub algorithm: String,
    pub notes: String,
    pub key_length: u32,
    /// Restrict keys to email (`s=email`).
    pub service_type: bool,
    pub add_adsp: bool,
    /// 0 = unknown, 1 = all, 2 = discardable.
    pub adsp_policy: u8,
    pub reload_command: String,
}

impl Default for DkimSection {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix: PathBuf::from("/etc/postfix/dkim/"),
            domains_file: "dkim-domains.conf".into(),
            keys_file: "dkim-keys.conf".into(),
            algorithm: "all".into(),
            notes: String::new(),
            key_length: 1024,
            service_type: false,
            add_adsp: false,
            adsp_policy: 1,
            reload_command: "/etc/init.d/dkim-filter restart".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpfSection {
    pub enabled: bool,
    /// Complete zone line published for `@`.
    pub entry: String,
}

impl Default for SpfSection {
    fn default() -> Self {
        Self {
            enabled: false,
            entry: "@\tIN\tTXT\t\"v=spf1 a mx -all\"".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSection {
    /// JSON document holding the hosted domains.
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/lib/zonewright/domains.json"),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "zonewright", "zonewright").map_or_else(
        || PathBuf::from("/etc/zonewright/config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file, then the environment.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load settings from `path`, or from [`config_path`] when none is given.
///
/// An explicitly named file must exist; the default location is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match path {
        Some(path) if !path.is_file() => {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Some(path) => path.to_path_buf(),
        None => config_path(),
    };
    debug!(path = %path.display(), "loading settings");
    let settings: Settings = figment(&path).extract()?;
    Ok(settings)
}

/// Serialize settings the way they would be written to the config file.
pub fn to_toml(settings: &Settings) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(settings)?)
}

// ── Translation to the runtime config ───────────────────────────────

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn dot_terminated(mut host: String) -> String {
    if !host.ends_with('.') {
        host.push('.');
    }
    host
}

fn optional(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| raw.to_owned())
}

impl Settings {
    /// Path of the domain store document.
    pub fn store_path(&self) -> &Path {
        &self.store.path
    }

    /// Build the runtime configuration, resolving name server addresses.
    pub fn into_generator_config(
        &self,
        resolver: &dyn HostResolver,
    ) -> Result<GeneratorConfig, ConfigError> {
        let system = &self.system;
        if system.default_ttl == 0 {
            return Err(ConfigError::Validation {
                field: "system.default_ttl".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if !self.panel.admin_mail.contains('@') {
            return Err(ConfigError::Validation {
                field: "panel.admin_mail".into(),
                reason: format!("expected an email address, got '{}'", self.panel.admin_mail),
            });
        }

        let nameservers = split_list(&system.nameservers)
            .into_iter()
            .map(|host| {
                let ips = resolver.resolve(&host);
                if ips.is_empty() {
                    warn!(nameserver = %host, "name server has no addresses, it will not be allowed to transfer zones");
                }
                NameServer {
                    hostname: dot_terminated(host),
                    ips,
                }
            })
            .collect();

        let platform_host = system
            .create_hostname_entry
            .then(|| optional(&system.hostname))
            .flatten();
        if system.create_hostname_entry && platform_host.is_none() {
            warn!("create_hostname_entry is set but system.hostname is empty");
        }

        Ok(GeneratorConfig {
            default_ttl: system.default_ttl,
            admin_mail: self.panel.admin_mail.trim().to_owned(),
            nameservers,
            mx_servers: split_list(&system.mxservers)
                .into_iter()
                .map(dot_terminated)
                .collect(),
            axfr_servers: split_list(&system.axfrservers),
            platform_host,
            create_mail_entry: system.create_mail_entry,
            bind: BindSettings {
                conf_dir: system.bind_conf_directory.clone(),
                reload_command: optional(&system.bind_reload_command),
            },
            dkim: self.dkim_settings()?,
            spf: SpfSettings {
                enabled: self.spf.enabled,
                entry: self.spf.entry.clone(),
            },
        })
    }

    fn dkim_settings(&self) -> Result<DkimSettings, ConfigError> {
        let dkim = &self.dkim;
        let adsp = if dkim.add_adsp {
            let policy =
                AdspPolicy::from_repr(dkim.adsp_policy).ok_or_else(|| ConfigError::Validation {
                    field: "dkim.adsp_policy".into(),
                    reason: format!(
                        "expected 0 (unknown), 1 (all) or 2 (discardable), got {}",
                        dkim.adsp_policy
                    ),
                })?;
            Some(policy)
        } else {
            None
        };
        if dkim.key_length < 512 {
            return Err(ConfigError::Validation {
                field: "dkim.key_length".into(),
                reason: format!("{} bits is too short for an RSA key", dkim.key_length),
            });
        }

        Ok(DkimSettings {
            enabled: dkim.enabled,
            prefix: dkim.prefix.clone(),
            domains_file: dkim.domains_file.clone(),
            keys_file: dkim.keys_file.clone(),
            algorithms: split_list(&dkim.algorithm),
            notes: optional(&dkim.notes),
            key_length: dkim.key_length,
            service_type_email: dkim.service_type,
            adsp,
            reload_command: optional(&dkim.reload_command),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::net::IpAddr;

    use super::*;

    #[derive(Default)]
    struct StaticResolver(HashMap<String, Vec<IpAddr>>);

    impl HostResolver for StaticResolver {
        fn resolve(&self, host: &str) -> Vec<IpAddr> {
            self.0.get(host).cloned().unwrap_or_default()
        }
    }

    fn ip(raw: &str) -> IpAddr {
        raw.parse().unwrap()
    }

    #[test]
    fn defaults_follow_the_panel() {
        let config = Settings::default()
            .into_generator_config(&StaticResolver::default())
            .unwrap();
        assert_eq!(config.default_ttl, 604_800);
        assert_eq!(config.bind.conf_dir, PathBuf::from("/etc/bind/"));
        assert_eq!(config.dkim.key_length, 1024);
        assert_eq!(config.dkim.algorithms, vec!["all".to_owned()]);
        assert_eq!(config.dkim.adsp, None);
        assert_eq!(config.platform_host, None);
        assert!(config.nameservers.is_empty());
    }

    #[test]
    fn lists_are_trimmed_and_dot_terminated() {
        let mut settings = Settings::default();
        settings.system.nameservers = " ns1.example.net, ns2.example.net. ,".into();
        settings.system.mxservers = "10 mx.example.net".into();
        settings.system.axfrservers = "192.0.2.53, bogus ".into();

        let mut resolver = StaticResolver::default();
        resolver.0.insert(
            "ns1.example.net".into(),
            vec![ip("192.0.2.1"), ip("2001:db8::1")],
        );

        let config = settings.into_generator_config(&resolver).unwrap();

        let hosts: Vec<_> = config.nameservers.iter().map(|n| n.hostname.as_str()).collect();
        assert_eq!(hosts, ["ns1.example.net.", "ns2.example.net."]);
        assert_eq!(config.nameservers[0].ips.len(), 2);
        assert!(config.nameservers[1].ips.is_empty());
        assert_eq!(config.mx_servers, vec!["10 mx.example.net.".to_owned()]);
        assert_eq!(config.axfr_servers, vec!["192.0.2.53".to_owned(), "bogus".to_owned()]);
    }

    #[test]
    fn hostname_entry_needs_flag_and_name() {
        let mut settings = Settings::default();
        settings.system.hostname = "panel.example.net".into();
        let resolver = StaticResolver::default();
        assert_eq!(settings.into_generator_config(&resolver).unwrap().platform_host, None);

        settings.system.create_hostname_entry = true;
        assert_eq!(
            settings.into_generator_config(&resolver).unwrap().platform_host.as_deref(),
            Some("panel.example.net")
        );
    }

    #[test]
    fn adsp_policy_out_of_range_is_rejected() {
        let mut settings = Settings::default();
        settings.dkim.add_adsp = true;
        settings.dkim.adsp_policy = 2;
        let config = settings
            .into_generator_config(&StaticResolver::default())
            .unwrap();
        assert_eq!(config.dkim.adsp, Some(AdspPolicy::Discardable));

        settings.dkim.adsp_policy = 7;
        let err = settings
            .into_generator_config(&StaticResolver::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "dkim.adsp_policy"));
    }

    #[test]
    fn blank_reload_command_disables_reload() {
        let mut settings = Settings::default();
        settings.system.bind_reload_command = "  ".into();
        let config = settings
            .into_generator_config(&StaticResolver::default())
            .unwrap();
        assert_eq!(config.bind.reload_command, None);
    }

    #[test]
    fn loads_toml_file_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[system]\ndefault_ttl = 3600\nnameservers = \"ns1.example.net\"\n\n\
             [panel]\nadmin_mail = \"admin@example.net\"\n\n\
             [store]\npath = \"/srv/domains.json\"\n",
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.system.default_ttl, 3600);
        assert_eq!(settings.system.nameservers, "ns1.example.net");
        assert_eq!(settings.panel.admin_mail, "admin@example.net");
        assert_eq!(settings.store_path(), Path::new("/srv/domains.json"));
        // Untouched sections keep their defaults.
        assert_eq!(settings.dkim.keys_file, "dkim-keys.conf");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn wrong_type_is_reported_by_figment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[system]\ndefault_ttl = \"soon\"\n").unwrap();
        assert!(matches!(
            load_settings(Some(&path)).unwrap_err(),
            ConfigError::Figment(_)
        ));
    }

    #[test]
    fn settings_serialize_to_toml() {
        let rendered = to_toml(&Settings::default()).unwrap();
        assert!(rendered.contains("[system]"));
        assert!(rendered.contains("default_ttl = 604800"));
        assert!(rendered.contains("[dkim]"));
    }

    #[test]
    fn zero_ttl_is_invalid() {
        let mut settings = Settings::default();
        settings.system.default_ttl = 0;
        assert!(settings.into_generator_config(&StaticResolver::default()).is_err());
    }
}
