//! Access policy for registry modules and production sectors.
//!
//! This module provides:
//!
//! - **Role**: closed set of user roles
//! - **Feature**: closed set of application modules, each with a `ModuleRule`
//! - **AccessPolicyEvaluator**: module access and "works in production" checks
//!
//! # Architecture
//!
//! ```text
//! (Role, feature name) ──► Feature::from_str ──► Feature::rule()
//!                                                     │
//!                          ┌──────────────────────────┼──────────────────────┐
//!                          ▼                          ▼                      ▼
//!                       AnyRole                 Roles(&[..])          ProductionStaff
//!                                                                            │
//!                                             normalize(sector) ∈ allow-list ┘
//! ```
//!
//! Sector names go through the same [`normalize`](crate::normalize::normalize)
//! as cache keys.

mod evaluator;
mod feature;
mod role;

pub use evaluator::{AccessPolicyEvaluator, Principal};
pub use feature::{Feature, ModuleRule, UnknownFeature};
pub use role::Role;

/// Sectors whose staff work in production.
pub const DEFAULT_PRODUCTION_SECTORS: &[&str] = &[
    "Bobinagem",
    "Montagem",
    "Usinagem",
    "Pintura",
    "Motores",
    "Transformadores",
    "Laboratório de Ensaios Elétricos",
    "Caldeiraria",
    "Manutenção",
    "Expedição",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_production_sectors_not_empty() {
        assert!(!DEFAULT_PRODUCTION_SECTORS.is_empty());
        assert!(!DEFAULT_PRODUCTION_SECTORS.contains(&"Administrativo"));
    }
}
