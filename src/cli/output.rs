//! Shared output formatting utilities for CLI commands
//!
//! Results go to stdout as JSON, YAML or a table; platform warnings go to
//! stderr so they never corrupt machine-readable output.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;

use crate::domain::{Route, Warnings};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    #[default]
    Table,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "table" => Ok(OutputFormat::Table),
            _ => Err(format!("Unsupported output format: '{}'. Use 'json', 'yaml', or 'table'.", s)),
        }
    }
}

/// Print routes in the requested format
pub fn print_routes(routes: &[Route], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&routes),
        OutputFormat::Yaml => print_yaml(&routes),
        OutputFormat::Table => {
            print!("{}", routes_table(routes));
            Ok(())
        }
    }
}

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Print data as YAML
pub fn print_yaml<T: Serialize>(data: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(data).context("Failed to serialize to YAML")?;
    println!("{}", yaml);
    Ok(())
}

/// Write every warning to stderr, one per line
pub fn print_warnings(warnings: &Warnings) {
    let mut stderr = std::io::stderr().lock();
    for warning in warnings.iter() {
        // Nothing useful to do if stderr is gone
        let _ = writeln!(stderr, "{}", warning);
    }
}

/// Render routes as a fixed-width table
pub fn routes_table(routes: &[Route]) -> String {
    if routes.is_empty() {
        return "No routes found\n".to_string();
    }

    let mut table = String::new();
    table.push_str(&format!("{:<45} {:<6} {:<10} {:<38}\n", "Route", "Type", "Status", "GUID"));
    table.push_str(&format!("{}\n", "-".repeat(100)));

    for route in routes {
        let routing = if route.domain.is_tcp() { "tcp" } else { "http" };
        let status = if route.is_potential() { "new" } else { "existing" };
        table.push_str(&format!(
            "{:<45} {:<6} {:<10} {:<38}\n",
            truncate(&route.to_string(), 43),
            routing,
            status,
            route.guid
        ));
    }

    table
}

/// Truncate string to maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
