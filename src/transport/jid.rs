//! Address (JID) resolution for outbound sends.
//!
//! Stored contacts carry addresses written under several conventions:
//! - linked-identity numbers (`5511999@lid`), sometimes saved with a doubled
//!   suffix (`5511999@lid@s.whatsapp.net`);
//! - a cached `remoteJid` from an earlier resolution;
//! - bare numbers, where the domain follows from `isGroup`;
//! - the legacy `c.us` direct-message domain.
//!
//! [`resolve`] picks one signal in priority order and always runs the result
//! through [`normalize_jid`], so every address leaving this module ends in
//! exactly one recognized domain.

use std::fmt;

#[cfg(feature = "debug-logs")]
use tracing::info;

use crate::core::models::Contact;

pub const USER_DOMAIN: &str = "s.whatsapp.net";
pub const GROUP_DOMAIN: &str = "g.us";
pub const LID_DOMAIN: &str = "lid";
pub const LEGACY_USER_DOMAIN: &str = "c.us";

/// Substring marking a linked-identity number.
pub const LID_MARKER: &str = "@lid";
/// The defect left by older contact sync code: marker followed by the DM domain.
pub const DOUBLED_LID_SUFFIX: &str = "@lid@s.whatsapp.net";

/// Which stored signal produced the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    LinkedIdentity,
    StoredRemoteJid,
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub jid: String,
    pub source: AddressSource,
}

impl ResolvedAddress {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.jid
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.jid.ends_with(GROUP_DOMAIN)
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.jid)
    }
}

fn canonical_domain(token: &str) -> Option<&'static str> {
    match token.trim().to_ascii_lowercase().as_str() {
        USER_DOMAIN | LEGACY_USER_DOMAIN => Some(USER_DOMAIN),
        GROUP_DOMAIN => Some(GROUP_DOMAIN),
        LID_DOMAIN => Some(LID_DOMAIN),
        _ => None,
    }
}

/// Trim and collapse an address to `user@domain` with exactly one recognized
/// domain. A `lid` token anywhere wins; otherwise the first recognized token
/// is kept, and an address with none falls back to the direct-message domain.
///
/// Idempotent: `normalize_jid(&normalize_jid(x)) == normalize_jid(x)`.
#[must_use]
pub fn normalize_jid(raw: &str) -> String {
    let mut parts = raw.trim().split('@');
    let user = parts.next().unwrap_or_default().trim();
    let domains: Vec<&'static str> = parts.filter_map(canonical_domain).collect();

    let domain = if domains.contains(&LID_DOMAIN) {
        LID_DOMAIN
    } else {
        domains.first().copied().unwrap_or(USER_DOMAIN)
    };

    format!("{user}@{domain}")
}

/// Priority-ordered choice of the raw address, before normalization.
fn select_address(contact: &Contact) -> (AddressSource, String) {
    if contact.number.contains(LID_MARKER) {
        return (
            AddressSource::LinkedIdentity,
            contact.number.replace(DOUBLED_LID_SUFFIX, LID_MARKER),
        );
    }

    // Best-effort: only the doubled-LID defect is screened out here.
    if let Some(remote_jid) = contact
        .remote_jid
        .as_deref()
        .filter(|jid| !jid.trim().is_empty() && !jid.contains(DOUBLED_LID_SUFFIX))
    {
        return (AddressSource::StoredRemoteJid, remote_jid.to_string());
    }

    let domain = if contact.is_group {
        GROUP_DOMAIN
    } else {
        USER_DOMAIN
    };
    (
        AddressSource::Synthesized,
        format!("{}@{}", contact.number.trim(), domain),
    )
}

/// Resolve the canonical transport address for a contact. Never fails.
#[must_use]
pub fn resolve(contact: &Contact) -> ResolvedAddress {
    let (source, raw) = select_address(contact);
    let jid = normalize_jid(&raw);

    #[cfg(feature = "debug-logs")]
    info!(
        "Resolved JID {} via {:?} (number={}, remote_jid={:?}, is_group={})",
        jid, source, contact.number, contact.remote_jid, contact.is_group
    );

    ResolvedAddress { jid, source }
}
