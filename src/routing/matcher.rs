//! Domain suffix matching
//!
//! A hostname such as `www.foo.example.com` does not say where the host ends
//! and the domain begins. The matcher settles that by consulting the domains
//! actually registered on the platform and picking the longest registered
//! suffix.
//!
//! Domain names are globally unique on the platform, so each suffix level
//! matches at most one domain and the first (longest) hit wins.

use std::collections::{BTreeSet, HashMap};

use crate::domain::Domain;
use crate::errors::{Result, RouteError};

/// Every right-hand dot-delimited suffix of `hostname`, from the full string
/// down to the top-level label. Single-label hostnames have no suffixes.
pub fn candidate_suffixes(hostname: &str) -> BTreeSet<String> {
    let mut suffixes = BTreeSet::new();
    if !hostname.contains('.') {
        return suffixes;
    }

    let mut remainder = hostname;
    loop {
        suffixes.insert(remainder.to_string());
        match remainder.split_once('.') {
            Some((_, rest)) if !rest.is_empty() => remainder = rest,
            _ => break,
        }
    }

    suffixes
}

/// Split `hostname` into host labels and the longest registered domain suffix.
///
/// Labels are stripped from the left until the remainder names a known
/// domain. A remainder without a dot is never looked up, so a bare top-level
/// label cannot match.
pub fn resolve_domain(
    hostname: &str,
    known_domains: &HashMap<String, Domain>,
) -> Result<(Vec<String>, Domain)> {
    let mut host_labels = Vec::new();
    let mut remainder = hostname;

    loop {
        if let Some(domain) = known_domains.get(remainder) {
            return Ok((host_labels, domain.clone()));
        }

        match remainder.split_once('.') {
            Some((label, rest)) if rest.contains('.') => {
                host_labels.push(label.to_string());
                remainder = rest;
            }
            _ => return Err(RouteError::domain_not_found(hostname)),
        }
    }
}
