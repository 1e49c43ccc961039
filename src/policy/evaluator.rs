//! Module and sector access decisions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, NormalizedKey};
use crate::policy::feature::{Feature, ModuleRule};
use crate::policy::role::Role;
use crate::policy::DEFAULT_PRODUCTION_SECTORS;

/// The user an access decision is made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub role: Role,
    /// Sector name as stored upstream (any casing or accentuation).
    #[serde(default)]
    pub sector: Option<String>,
    /// Explicit "works in production" flag, when upstream provides one.
    #[serde(default)]
    pub production_flag: Option<bool>,
}

impl Principal {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            sector: None,
            production_flag: None,
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_production_flag(mut self, flag: bool) -> Self {
        self.production_flag = Some(flag);
        self
    }
}

/// Decides module-level and sector-level access.
#[derive(Debug, Clone)]
pub struct AccessPolicyEvaluator {
    production_sectors: HashSet<NormalizedKey>,
}

impl Default for AccessPolicyEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCTION_SECTORS)
    }
}

impl AccessPolicyEvaluator {
    /// Create an evaluator with the given production sectors.
    ///
    /// Names are normalized on the way in.
    pub fn new<I, S>(production_sectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            production_sectors: production_sectors
                .into_iter()
                .map(|s| normalize(s.as_ref()))
                .filter(|key| !key.is_empty())
                .collect(),
        }
    }

    /// Check module access by role alone.
    ///
    /// `desenvolvimento` is decided without sector data here, so only roles
    /// that always work in production pass. Use [`can_access`](Self::can_access)
    /// when the user's sector is known.
    pub fn can_access_module(&self, role: Role, feature: &str) -> bool {
        self.can_access(&Principal::new(role), feature)
    }

    /// Check module access for a principal. Unknown features are denied
    /// except for admins.
    pub fn can_access(&self, principal: &Principal, feature: &str) -> bool {
        if principal.role.is_admin() {
            return true;
        }

        let Ok(feature) = feature.parse::<Feature>() else {
            tracing::debug!(role = %principal.role, feature, "Unknown feature, denying");
            return false;
        };

        let allowed = self.allows(principal, feature);
        if !allowed {
            tracing::debug!(role = %principal.role, %feature, "Module access denied");
        }
        allowed
    }

    /// Modules a principal may enter, in menu order.
    pub fn allowed_features(&self, principal: &Principal) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|feature| principal.role.is_admin() || self.allows(principal, *feature))
            .collect()
    }

    /// Decide whether a user works in production.
    ///
    /// ADMIN and GESTAO always do. USER and SUPERVISOR do when either the
    /// explicit flag is set or the sector is on the production list; both
    /// signals are accepted because upstream data is not always consistent.
    pub fn works_in_production(
        &self,
        role: Role,
        raw_sector_name: &str,
        explicit_flag: Option<bool>,
    ) -> bool {
        match role {
            Role::Admin | Role::Gestao => true,
            Role::User | Role::Supervisor => {
                explicit_flag == Some(true) || self.is_production_sector(raw_sector_name)
            }
            Role::Pcp => false,
        }
    }

    /// Check a sector name against the production list.
    pub fn is_production_sector(&self, raw_sector_name: &str) -> bool {
        self.production_sectors.contains(&normalize(raw_sector_name))
    }

    /// Normalized production sector keys, sorted.
    pub fn production_sectors(&self) -> Vec<&NormalizedKey> {
        let mut keys: Vec<_> = self.production_sectors.iter().collect();
        keys.sort();
        keys
    }

    fn allows(&self, principal: &Principal, feature: Feature) -> bool {
        match feature.rule() {
            ModuleRule::AnyRole => true,
            ModuleRule::Roles(roles) => roles.contains(&principal.role),
            ModuleRule::ProductionStaff => self.works_in_production(
                principal.role,
                principal.sector.as_deref().unwrap_or_default(),
                principal.production_flag,
            ),
        }
    }
}
