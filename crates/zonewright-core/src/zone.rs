// ── Zone bodies ──
//
// Synthesizes the records of one domain: SOA and NS for zone owners,
// `$ORIGIN` for delegated sub-zones, MX and SPF for mail domains, DKIM,
// NS delegations to sibling zones, and the address records that fan out
// over every bound IP.

use std::fmt::{self, Write};
use std::net::IpAddr;

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::dkim;
use crate::model::{Domain, DomainId};
use crate::serial::{next_serial, today_prefix};
use crate::store::{DomainStore, StoreError};

#[derive(Debug, Error)]
pub enum ZoneError {
    /// A bound address is neither IPv4 nor IPv6. Fatal for this domain only.
    #[error("invalid IP address '{address}' bound to {domain}")]
    InvalidAddress { domain: String, address: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ZoneError {
    /// Zone body standing in for a domain whose records could not be built.
    pub fn placeholder(&self) -> String {
        match self {
            Self::InvalidAddress { address, .. } => {
                format!("; error in at least one IP address ({address}), could not create zone\n")
            }
            Self::Store(err) => format!("; could not create zone: {err}\n"),
        }
    }
}

/// An address record value, `A\t\t192.0.2.1` or `AAAA\t\t2001:db8::1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRecord(pub IpAddr);

impl AddressRecord {
    pub fn record_type(&self) -> &'static str {
        match self.0 {
            IpAddr::V4(_) => "A",
            IpAddr::V6(_) => "AAAA",
        }
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t\t{}", self.record_type(), self.0)
    }
}

/// Generated records of one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneBody {
    pub text: String,
    /// Serial written into the SOA, `None` for delegated sub-zones.
    pub serial: Option<String>,
}

/// Builds zone bodies for the domains of one run.
pub struct ZoneGenerator<'a> {
    config: &'a GeneratorConfig,
    store: &'a dyn DomainStore,
    today: String,
}

impl<'a> ZoneGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig, store: &'a dyn DomainStore, today: NaiveDate) -> Self {
        Self {
            config,
            store,
            today: today_prefix(today),
        }
    }

    /// Records for `domain`. `delegated` domains get an `$ORIGIN` header
    /// instead of SOA/NS, as they live inside an ancestor's zone.
    pub fn generate(&self, domain: &Domain, delegated: bool) -> Result<ZoneBody, ZoneError> {
        let addresses = self.addresses(domain)?;
        let mut zone = String::new();
        let mut names: Vec<String> = Vec::new();

        let serial = if delegated {
            let _ = writeln!(zone, "$ORIGIN {}.", domain.name);
            None
        } else {
            let serial = next_serial(domain.serial.as_deref().unwrap_or_default(), &self.today);
            self.write_soa(&mut zone, &serial, &addresses);
            Some(serial)
        };

        if domain.is_email_domain {
            self.write_mail(&mut zone, domain, &mut names);
        }

        zone.push_str(&dkim::dkim_records(&self.config.dkim, domain));

        if !delegated && !domain.is_platform() {
            self.write_delegations(&mut zone, domain)?;
        }

        names.push("@".into());
        if domain.is_wildcard_domain {
            names.push("*".into());
        } else if domain.www_server_alias {
            names.push("www".into());
        }

        if let (false, DomainId::Stored(id)) = (delegated, domain.id) {
            for sub in self.store.list_same_zone_subdomains(id)? {
                let label = domain.relative_label(&sub.name);
                names.push(label.to_owned());
                if domain.www_server_alias {
                    names.push(format!("www.{label}"));
                }
            }
        }

        for name in &names {
            for address in &addresses {
                let _ = writeln!(zone, "{name}\tIN\t{address}");
            }
        }

        Ok(ZoneBody { text: zone, serial })
    }

    fn addresses(&self, domain: &Domain) -> Result<Vec<AddressRecord>, ZoneError> {
        let raw = match domain.id {
            DomainId::Platform => self.store.list_all_ips()?,
            DomainId::Stored(id) => self.store.list_ips(id)?,
        };
        raw.iter()
            .map(|ip| {
                ip.trim()
                    .parse::<IpAddr>()
                    .map(AddressRecord)
                    .map_err(|_| ZoneError::InvalidAddress {
                        domain: domain.name.clone(),
                        address: ip.clone(),
                    })
            })
            .collect()
    }

    fn write_soa(&self, zone: &mut String, serial: &str, addresses: &[AddressRecord]) {
        let primary = self
            .config
            .nameservers
            .first()
            .map_or("ns", |ns| ns.hostname.as_str());

        let _ = writeln!(zone, "$TTL {}", self.config.default_ttl);
        let _ = writeln!(zone, "@ IN SOA {primary} {} (", self.config.soa_contact());
        let _ = writeln!(zone, "\t{serial} ; serial");
        let _ = writeln!(zone, "\t8H ; refresh");
        let _ = writeln!(zone, "\t2H ; retry");
        let _ = writeln!(zone, "\t1W ; expiry");
        let _ = writeln!(zone, "\t11h) ; minimum");

        if self.config.nameservers.is_empty() {
            let _ = writeln!(zone, "@    IN    NS    ns");
            for address in addresses {
                let _ = writeln!(zone, "ns    IN    {address}");
            }
        } else {
            for ns in &self.config.nameservers {
                let _ = writeln!(zone, "@    IN    NS    {}", ns.hostname.trim());
            }
        }
    }

    fn write_mail(&self, zone: &mut String, domain: &Domain, names: &mut Vec<String>) {
        let mail_names = if self.config.mx_servers.is_empty() {
            let _ = writeln!(zone, "@\tIN\tMX\t10 mail");
            true
        } else {
            for mx in &self.config.mx_servers {
                let _ = writeln!(zone, "@    IN    MX    {}", mx.trim());
            }
            self.config.create_mail_entry
        };

        if mail_names {
            names.push("mail".into());
            if !domain.is_wildcard_domain {
                names.extend(["imap", "smtp", "pop3"].map(String::from));
            }
        }

        let spf = &self.config.spf;
        if spf.enabled {
            let _ = writeln!(zone, "{}", spf.entry);
            if names.iter().any(|n| n == "mail") {
                let _ = writeln!(zone, "{}", spf.entry.replace('@', "mail"));
            }
        }
    }

    /// NS records handing `<label>.<domain>` to its own zone.
    fn write_delegations(&self, zone: &mut String, domain: &Domain) -> Result<(), ZoneError> {
        for sub in self.store.list_direct_bind_delegations(&domain.name)? {
            let label = domain.relative_label(&sub.name);
            if self.config.nameservers.is_empty() {
                let _ = writeln!(zone, "{label}\tIN\tNS\tns.{label}");
            } else {
                for ns in &self.config.nameservers {
                    let _ = writeln!(zone, "{label}\tIN\tNS\t{}", ns.hostname.trim());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::{NameServer, SpfSettings};
    use crate::store::{DomainRecord, MemoryStore};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            default_ttl: 3600,
            admin_mail: "hostmaster@example.com".into(),
            ..GeneratorConfig::default()
        }
    }

    fn simple_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert(DomainRecord {
            is_email_domain: true,
            www_server_alias: true,
            serial: "2024010105".into(),
            ips: vec!["203.0.113.5".into()],
            ..DomainRecord::new(1, "example.com")
        });
        store
    }

    fn lines_with<'a>(zone: &'a str, needle: &str) -> Vec<&'a str> {
        zone.lines().filter(|l| l.contains(needle)).collect()
    }

    #[test]
    fn simple_root_domain() {
        let config = config();
        let store = simple_store();
        let domain = store.record(1).unwrap().to_domain();

        let body = ZoneGenerator::new(&config, &store, today())
            .generate(&domain, false)
            .unwrap();

        assert_eq!(body.serial.as_deref(), Some("2024010106"));
        assert_eq!(
            body.text,
            "$TTL 3600\n\
             @ IN SOA ns hostmaster.example.com. (\n\
             \t2024010106 ; serial\n\
             \t8H ; refresh\n\
             \t2H ; retry\n\
             \t1W ; expiry\n\
             \t11h) ; minimum\n\
             @    IN    NS    ns\n\
             ns    IN    A\t\t203.0.113.5\n\
             @\tIN\tMX\t10 mail\n\
             mail\tIN\tA\t\t203.0.113.5\n\
             imap\tIN\tA\t\t203.0.113.5\n\
             smtp\tIN\tA\t\t203.0.113.5\n\
             pop3\tIN\tA\t\t203.0.113.5\n\
             @\tIN\tA\t\t203.0.113.5\n\
             www\tIN\tA\t\t203.0.113.5\n"
        );
        assert_eq!(lines_with(&body.text, " SOA ").len(), 1);
    }

    #[test]
    fn delegated_domain_has_origin_and_no_soa() {
        let config = config();
        let mut store = simple_store();
        store.insert(DomainRecord {
            delegated_parent_id: 1,
            ips: vec!["2001:db8::5".into()],
            ..DomainRecord::new(2, "shop.example.com")
        });
        let domain = store.record(2).unwrap().to_domain();

        let body = ZoneGenerator::new(&config, &store, today())
            .generate(&domain, true)
            .unwrap();

        assert_eq!(body.serial, None);
        assert_eq!(
            body.text,
            "$ORIGIN shop.example.com.\n@\tIN\tAAAA\t\t2001:db8::5\n"
        );
    }

    #[test]
    fn configured_nameservers_and_mx() {
        let config = GeneratorConfig {
            nameservers: vec![
                NameServer {
                    hostname: "ns1.example.net.".into(),
                    ips: vec![],
                },
                NameServer {
                    hostname: "ns2.example.net.".into(),
                    ips: vec![],
                },
            ],
            mx_servers: vec!["10 mx.example.net.".into()],
            ..config()
        };
        let store = simple_store();
        let domain = store.record(1).unwrap().to_domain();

        let text = ZoneGenerator::new(&config, &store, today())
            .generate(&domain, false)
            .unwrap()
            .text;

        assert!(text.contains("@ IN SOA ns1.example.net. hostmaster.example.com. (\n"));
        assert_eq!(
            lines_with(&text, "IN    NS"),
            ["@    IN    NS    ns1.example.net.", "@    IN    NS    ns2.example.net."]
        );
        assert!(text.contains("@    IN    MX    10 mx.example.net.\n"));
        // No mail names without create_mail_entry.
        assert!(lines_with(&text, "mail\t").is_empty());
        assert!(!text.contains("ns    IN"));
    }

    #[test]
    fn mx_with_mail_entry_and_spf() {
        let config = GeneratorConfig {
            mx_servers: vec!["mx.example.net.".into()],
            create_mail_entry: true,
            spf: SpfSettings {
                enabled: true,
                entry: "@\tIN\tTXT\t\"v=spf1 a mx -all\"".into(),
            },
            ..config()
        };
        let store = simple_store();
        let domain = store.record(1).unwrap().to_domain();

        let text = ZoneGenerator::new(&config, &store, today())
            .generate(&domain, false)
            .unwrap()
            .text;

        assert!(text.contains("@\tIN\tTXT\t\"v=spf1 a mx -all\"\n"));
        assert!(text.contains("mail\tIN\tTXT\t\"v=spf1 a mx -all\"\n"));
        assert!(text.contains("smtp\tIN\tA\t\t203.0.113.5\n"));
    }

    #[test]
    fn wildcard_mail_domain_gets_star_and_only_mail() {
        let config = config();
        let mut store = MemoryStore::new();
        store.insert(DomainRecord {
            is_email_domain: true,
            is_wildcard_domain: true,
            www_server_alias: true,
            ips: vec!["192.0.2.10".into()],
            ..DomainRecord::new(1, "example.org")
        });
        let domain = store.record(1).unwrap().to_domain();

        let text = ZoneGenerator::new(&config, &store, today())
            .generate(&domain, false)
            .unwrap()
            .text;

        assert!(text.contains("*\tIN\tA\t\t192.0.2.10\n"));
        assert!(text.contains("mail\tIN\tA\t\t192.0.2.10\n"));
        assert!(!text.contains("www\t"));
        assert!(!text.contains("imap\t"));
    }

    #[test]
    fn invalid_address_fails_the_domain() {
        let config = config();
        let mut store = MemoryStore::new();
        store.insert(DomainRecord {
            ips: vec!["192.0.2.1".into(), "300.1.2.3".into()],
            ..DomainRecord::new(1, "broken.test")
        });
        let domain = store.record(1).unwrap().to_domain();

        let err = ZoneGenerator::new(&config, &store, today())
            .generate(&domain, false)
            .unwrap_err();

        assert!(matches!(err, ZoneError::InvalidAddress { ref address, .. } if address == "300.1.2.3"));
        let placeholder = err.placeholder();
        assert_eq!(placeholder.lines().count(), 1);
        assert!(placeholder.starts_with(';'));
    }

    #[test]
    fn same_zone_subdomains_fan_out() {
        let config = config();
        let mut store = simple_store();
        store.insert(DomainRecord {
            parent_domain_id: 1,
            is_bind_domain: false,
            ..DomainRecord::new(5, "blog.example.com")
        });
        let domain = store.record(1).unwrap().to_domain();

        let text = ZoneGenerator::new(&config, &store, today())
            .generate(&domain, false)
            .unwrap()
            .text;

        assert!(text.ends_with(
            "blog\tIN\tA\t\t203.0.113.5\nwww.blog\tIN\tA\t\t203.0.113.5\n"
        ));
    }

    #[test]
    fn sibling_zones_get_ns_delegations() {
        let config = config();
        let mut store = simple_store();
        store.insert(DomainRecord::new(3, "eu.example.com"));
        store.insert(DomainRecord::new(4, "x.eu.example.com"));
        let domain = store.record(1).unwrap().to_domain();

        let text = ZoneGenerator::new(&config, &store, today())
            .generate(&domain, false)
            .unwrap()
            .text;

        assert_eq!(lines_with(&text, "\tNS\t"), ["eu\tIN\tNS\tns.eu"]);
    }

    #[test]
    fn platform_domain_uses_whole_pool() {
        let config = config();
        let store = MemoryStore::new().with_ip_pool(["192.0.2.1", "2001:db8::1"]);
        let host = Domain::platform("panel.example.net", false, "20240101");

        let body = ZoneGenerator::new(&config, &store, today())
            .generate(&host, false)
            .unwrap();

        assert_eq!(body.serial.as_deref(), Some("2024010101"));
        assert!(body.text.contains("*\tIN\tA\t\t192.0.2.1\n"));
        assert!(body.text.contains("*\tIN\tAAAA\t\t2001:db8::1\n"));
        assert!(body.text.contains("ns    IN    AAAA\t\t2001:db8::1\n"));
    }
}
