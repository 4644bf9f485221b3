//! # Route Resolution Primitives
//!
//! Pure building blocks used by the route services: parsing raw route
//! strings, matching hostnames against registered domains, sanitizing
//! application names into hostnames, and comparing routes.

pub mod compare;
pub mod matcher;
pub mod parser;
pub mod sanitize;

pub use compare::{contains_guid, find_by_name, find_by_settings, same_settings, strip_scheme};
pub use matcher::{candidate_suffixes, resolve_domain};
pub use parser::{parse_route, ParsedRoute};
pub use sanitize::sanitize_hostname;
