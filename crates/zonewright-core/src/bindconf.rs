// ── Master configuration stanzas ──
//
// Text fragments of the BIND master configuration: the banner opening the
// file and one `zone` block per zone file.

use std::fmt::Write;
use std::net::IpAddr;
use std::path::Path;

use tracing::debug;

use crate::config::GeneratorConfig;
use crate::model::Domain;

/// Banner opening the master configuration file.
///
/// Carries no timestamp so unchanged input produces an identical file.
pub fn header(conf_path: &Path) -> String {
    format!(
        "# {}\n\
         # Do NOT manually edit this file, all changes will be deleted after the next domain change at the panel.\n\
         \n",
        conf_path.display()
    )
}

/// The `zone` block serving `domain` from `zone_file`.
pub fn stanza(config: &GeneratorConfig, domain: &Domain, zone_file: &Path) -> String {
    let mut out = String::new();
    let customer = domain
        .customer_id
        .map_or_else(|| "none".to_owned(), |id| id.to_string());
    let login = domain.owner_login.as_deref().unwrap_or("none");

    let _ = writeln!(
        out,
        "# Domain ID: {} - CustomerID: {customer} - CustomerLogin: {login}",
        domain.id
    );
    let _ = writeln!(out, "zone \"{}\" in {{", domain.name);
    let _ = writeln!(out, "\ttype master;");
    let _ = writeln!(out, "\tfile \"{}\";", zone_file.display());
    let _ = writeln!(out, "\tallow-query {{ any; }};");

    let transfer = transfer_peers(config);
    if !config.nameservers.is_empty() || !config.axfr_servers.is_empty() {
        let _ = writeln!(out, "\tallow-transfer {{");
        for peer in &transfer {
            let _ = writeln!(out, "\t\t{peer};");
        }
        let _ = writeln!(out, "\t}};");
    }

    let _ = writeln!(out, "}};");
    out.push('\n');
    out
}

/// Addresses allowed to transfer zones: every address of every name
/// server, then every AXFR peer that is a valid IP literal.
pub fn transfer_peers(config: &GeneratorConfig) -> Vec<IpAddr> {
    let nameserver_ips = config.nameservers.iter().flat_map(|ns| ns.ips.iter().copied());
    let axfr_ips = config.axfr_servers.iter().filter_map(|peer| {
        let parsed = peer.trim().parse::<IpAddr>().ok();
        if parsed.is_none() {
            debug!(peer = %peer, "skipping AXFR peer that is not an IP address");
        }
        parsed
    });
    nameserver_ips.chain(axfr_ips).collect()
}
