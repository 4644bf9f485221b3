//! Business logic services
//!
//! Route calculation and reconciliation, built on the pure helpers in
//! [`crate::routing`] and the platform operations of
//! [`crate::client::ControlPlane`].

pub mod route_calculator;
pub mod route_reconciler;

pub use route_calculator::RouteCalculator;
pub use route_reconciler::RouteReconciler;
