//! Application modules and their access rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::policy::role::Role;

/// An application module guarded at route boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Pcp,
    Gestao,
    Admin,
    Dashboard,
    ConsultaOs,
    Desenvolvimento,
}

/// Who may enter a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleRule {
    /// Any authenticated role.
    AnyRole,
    /// Only the listed roles.
    Roles(&'static [Role]),
    /// Users who work in a production sector.
    ProductionStaff,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::Pcp,
        Feature::Gestao,
        Feature::Admin,
        Feature::Dashboard,
        Feature::ConsultaOs,
        Feature::Desenvolvimento,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Pcp => "pcp",
            Feature::Gestao => "gestao",
            Feature::Admin => "admin",
            Feature::Dashboard => "dashboard",
            Feature::ConsultaOs => "consulta_os",
            Feature::Desenvolvimento => "desenvolvimento",
        }
    }

    /// Access rule table. Exhaustive: a new feature will not compile until it
    /// has a rule.
    pub fn rule(self) -> ModuleRule {
        match self {
            Feature::Pcp => ModuleRule::Roles(&[Role::Pcp, Role::Gestao, Role::Admin]),
            Feature::Gestao => ModuleRule::Roles(&[Role::Gestao, Role::Admin]),
            Feature::Admin => ModuleRule::Roles(&[Role::Admin]),
            Feature::Dashboard | Feature::ConsultaOs => ModuleRule::AnyRole,
            Feature::Desenvolvimento => ModuleRule::ProductionStaff,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown feature name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature '{0}'")]
pub struct UnknownFeature(pub String);

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Feature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == wanted)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_parse() {
        assert_eq!("consulta_os".parse::<Feature>().unwrap(), Feature::ConsultaOs);
        assert_eq!("PCP".parse::<Feature>().unwrap(), Feature::Pcp);
        assert!("relatorios".parse::<Feature>().is_err());
    }

    #[test]
    fn admin_module_is_admin_only() {
        assert_eq!(Feature::Admin.rule(), ModuleRule::Roles(&[Role::Admin]));
    }
}
