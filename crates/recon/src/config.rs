use serde::Deserialize;

use crate::error::ReconError;

/// How the non-OCS dual-reporting branch resolves the two sources'
/// independent estimates for the same facility-fuel. Policy, not hard-coded
/// precedence: the historical behavior is `PreferTierMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DualPolicy {
    PreferTierMethod,
    PreferEmissionFactor,
}

impl Default for DualPolicy {
    fn default() -> Self {
        Self::PreferTierMethod
    }
}

impl std::fmt::Display for DualPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreferTierMethod => write!(f, "prefer_tier_method"),
            Self::PreferEmissionFactor => write!(f, "prefer_emission_factor"),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level run config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub name: String,
    pub reporting_year: i32,
    #[serde(default)]
    pub dual_policy: DualPolicy,
    pub inputs: InputPaths,
    #[serde(default)]
    pub limits: Limits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputPaths {
    pub ghgrp: String,
    pub nei: String,
    pub secondary_factors: String,
    pub registry: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Limits {
    /// Unit-level annual energy plausibility ceiling, MJ.
    #[serde(default = "default_max_unit_energy_mj")]
    pub max_unit_energy_mj: f64,
    /// OCS share of facility-fuel energy at which sub-unit allocation
    /// becomes mandatory.
    #[serde(default = "default_ocs_mandatory_share")]
    pub ocs_mandatory_share: f64,
}

fn default_max_unit_energy_mj() -> f64 {
    cinder_efactor::MAX_UNIT_ENERGY_MJ
}

fn default_ocs_mandatory_share() -> f64 {
    0.5
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_unit_energy_mj: default_max_unit_energy_mj(),
            ocs_mandatory_share: default_ocs_mandatory_share(),
        }
    }
}

impl RunConfig {
    pub fn from_toml(raw: &str) -> Result<RunConfig, ReconError> {
        let config: RunConfig =
            toml::from_str(raw).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.limits.ocs_mandatory_share) {
            return Err(ReconError::ConfigValidation(format!(
                "ocs_mandatory_share {} outside [0, 1]",
                self.limits.ocs_mandatory_share
            )));
        }
        if self.limits.max_unit_energy_mj <= 0.0 {
            return Err(ReconError::ConfigValidation(
                "max_unit_energy_mj must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
name = "annual compile"
reporting_year = 2021

[inputs]
ghgrp = "ghgrp.csv"
nei = "nei.csv"
secondary_factors = "factors.csv"
registry = "registry.csv"
"#;

    #[test]
    fn parses_with_defaults() {
        let config = RunConfig::from_toml(EXAMPLE).unwrap();
        assert_eq!(config.reporting_year, 2021);
        assert_eq!(config.dual_policy, DualPolicy::PreferTierMethod);
        assert_eq!(config.limits.ocs_mandatory_share, 0.5);
    }

    #[test]
    fn rejects_bad_share() {
        let raw = format!("{EXAMPLE}\n[limits]\nocs_mandatory_share = 1.5\n");
        assert!(matches!(
            RunConfig::from_toml(&raw),
            Err(ReconError::ConfigValidation(_))
        ));
    }

    #[test]
    fn parses_policy_override() {
        let raw = r#"
name = "annual compile"
reporting_year = 2021
dual_policy = "prefer_emission_factor"

[inputs]
ghgrp = "ghgrp.csv"
nei = "nei.csv"
secondary_factors = "factors.csv"
registry = "registry.csv"
"#;
        let config = RunConfig::from_toml(raw).unwrap();
        assert_eq!(config.dual_policy, DualPolicy::PreferEmissionFactor);
    }
}
