// ── DKIM TXT records ──
//
// Builds the `dkim_<id>._domainkey` TXT record (and the optional ADSP
// record) published inside a domain's zone.

use std::fmt::Write;

use tracing::warn;

use crate::config::DkimSettings;
use crate::model::Domain;

/// Characters per quoted string in a wrapped TXT record.
pub const TXT_CHUNK: usize = 50;

const PEM_BEGIN: &str = "-----BEGIN PUBLIC KEY-----";
const PEM_END: &str = "-----END PUBLIC KEY-----";

/// Zone lines for the domain's DKIM key, or an empty string.
///
/// Nothing is produced unless DKIM is enabled globally and for the
/// domain, and the domain already has a public key.
pub fn dkim_records(settings: &DkimSettings, domain: &Domain) -> String {
    if !settings.enabled || !domain.dkim.enabled {
        return String::new();
    }
    let Some(public_key) = domain.dkim.public_key.as_deref().filter(|k| !k.is_empty()) else {
        return String::new();
    };
    let Some(selector) = domain.dkim.id else {
        warn!(domain = %domain.name, "public key present but no DKIM id, skipping record");
        return String::new();
    };

    let mut out = String::new();
    let _ = write!(
        out,
        "dkim_{selector}._domainkey IN TXT {}",
        wrap_txt(&txt_payload(settings, public_key))
    );
    if let Some(policy) = settings.adsp {
        let _ = writeln!(out, "_adsp._domainkey IN TXT \"dkim={policy}\"");
    }
    out
}

/// The unwrapped `v=DKIM1;...;t=s` record text.
pub fn txt_payload(settings: &DkimSettings, public_key: &str) -> String {
    let mut txt = String::from("v=DKIM1;");

    let algorithms: Vec<&str> = settings
        .algorithms
        .iter()
        .map(String::as_str)
        .take_while(|a| *a != "all")
        .filter(|a| !a.is_empty())
        .collect();
    if !algorithms.is_empty() {
        let _ = write!(txt, "h={};", algorithms.join(":"));
    }

    if let Some(notes) = settings.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        let _ = write!(txt, "n={notes};");
    }

    let _ = write!(txt, "k=rsa;p={};", strip_pem(public_key));

    if settings.service_type_email {
        txt.push_str("s=email;");
    }

    txt.push_str("t=s");
    txt
}

/// Key material of a PEM public key, armour and line breaks removed.
pub fn strip_pem(key: &str) -> String {
    let flat: String = key.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let body = match (flat.find(PEM_BEGIN), flat.find(PEM_END)) {
        (Some(begin), Some(end)) if end > begin => &flat[begin + PEM_BEGIN.len()..end],
        _ => flat.as_str(),
    };
    body.trim().to_owned()
}

/// Wrap a TXT payload into a parenthesized run of quoted strings.
///
/// ```text
/// ("first 50 characters"
///                       "next 50 characters"
///                       "rest")
/// ```
///
/// Every line, the last included, ends with a newline.
pub fn wrap_txt(payload: &str) -> String {
    let chars: Vec<char> = payload.chars().collect();
    let chunks: Vec<String> = chars.chunks(TXT_CHUNK).map(|c| c.iter().collect()).collect();
    let last = chunks.len().saturating_sub(1);

    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let open = if i == 0 { "(\"" } else { "\t\t\t\t\t \"" };
        let close = if i == last { "\")" } else { "\"" };
        let _ = writeln!(out, "{open}{chunk}{close}");
    }
    if chunks.is_empty() {
        out.push_str("(\"\")\n");
    }
    out
}
