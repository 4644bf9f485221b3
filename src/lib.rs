//! # Routeplane
//!
//! Route resolution and reconciliation for applications deployed to a
//! Cloud Foundry style platform.
//!
//! ## Architecture
//!
//! ```text
//! CLI → Services (calculator, reconciler) → ControlPlane trait → Cloud Controller API
//!            ↓
//!     Routing primitives (parser, matcher, sanitizer, comparison)
//! ```
//!
//! ## Core Components
//!
//! - **Routing**: pure parsing and domain matching of raw route strings
//! - **Services**: route calculation against the platform and reconciliation
//!   of an application's bound routes
//! - **Client**: the [`client::ControlPlane`] seam and its HTTP implementation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use routeplane::{
//!     client::CloudControllerClient, config::ClientSettings, domain::{OrgGuid, SpaceGuid, Warnings},
//!     services::RouteCalculator, Result,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = CloudControllerClient::new(ClientSettings::default())?;
//!     let calculator = RouteCalculator::new(Arc::new(client));
//!
//!     let mut warnings = Warnings::new();
//!     let routes = calculator
//!         .calculate_routes(
//!             &["www.example.com/api".to_string()],
//!             &OrgGuid::new("org-guid"),
//!             &SpaceGuid::new("space-guid"),
//!             &[],
//!             &mut warnings,
//!         )
//!         .await?;
//!     println!("{:?}", routes);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod routing;
pub mod services;

// Re-export commonly used types and traits
pub use client::ControlPlane;
pub use errors::{Result, RouteError};
pub use services::{RouteCalculator, RouteReconciler};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
