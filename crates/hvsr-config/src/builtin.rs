//! Built-in analysis profiles.
//!
//! These are embedded at compile time and always available without external
//! files.

use std::path::Path;

use crate::error::ConfigError;
use crate::profile::AnalysisProfile;

/// Names of the built-in profiles.
pub static BUILTIN_PROFILE_NAMES: &[&str] = &["default", "sesame", "legacy"];

static BUILTIN_PROFILES_TOML: &[(&str, &str)] = &[
    ("default", DEFAULT_PROFILE),
    ("sesame", SESAME_PROFILE),
    ("legacy", LEGACY_PROFILE),
];

/// Engine defaults.
const DEFAULT_PROFILE: &str = r#"
name = "Default"
description = "Vector summation, log-std dispersion curves, all windows kept"
"#;

/// SESAME (2004) recommendations.
const SESAME_PROFILE: &str = r#"
name = "SESAME"
description = "Geometric mean of the horizontals as recommended by SESAME (2004)"

[settings]
method = "geometric_mean"
water_level = 1.8
stability_curves = "log_std"

[settings.band]
low = 0.4
high = 40.0
"#;

/// Linear-std dispersion curves with outlier window rejection.
const LEGACY_PROFILE: &str = r#"
name = "Legacy"
description = "Linear-std dispersion curves and outlier window rejection"

[settings]
method = "vector_summation"
water_level = 1.8
outlier_curve_std = 1.75
stability_curves = "linear_std"

[settings.band]
low = 0.4
high = 40.0
"#;

/// Names of all built-in profiles.
pub fn builtin_profile_names() -> &'static [&'static str] {
    BUILTIN_PROFILE_NAMES
}

/// Whether `name` is a built-in profile (case-insensitive).
pub fn is_builtin_profile(name: &str) -> bool {
    lookup(name).is_some()
}

/// Look up a built-in profile by name (case-insensitive).
pub fn builtin_profile(name: &str) -> Result<AnalysisProfile, ConfigError> {
    let toml_str = lookup(name).ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))?;
    AnalysisProfile::from_toml(toml_str)
}

/// All built-in profiles.
pub fn builtin_profiles() -> Result<Vec<AnalysisProfile>, ConfigError> {
    BUILTIN_PROFILES_TOML
        .iter()
        .map(|(_, toml_str)| AnalysisProfile::from_toml(toml_str))
        .collect()
}

/// Resolve a built-in profile name or a path to a profile file.
///
/// Built-in names take precedence over relative paths of the same spelling.
pub fn resolve_profile(name_or_path: &str) -> Result<AnalysisProfile, ConfigError> {
    if is_builtin_profile(name_or_path) {
        tracing::debug!(name = name_or_path, "using built-in profile");
        return builtin_profile(name_or_path);
    }

    let path = Path::new(name_or_path);
    if path.exists() {
        AnalysisProfile::load(path)
    } else {
        Err(ConfigError::ProfileNotFound(name_or_path.to_string()))
    }
}

fn lookup(name: &str) -> Option<&'static str> {
    BUILTIN_PROFILES_TOML
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, toml_str)| *toml_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvsr_core::{CombinationMethod, HvsrSettings, StabilityCurves};

    #[test]
    fn all_builtins_parse() {
        let profiles = builtin_profiles().unwrap();
        assert_eq!(profiles.len(), BUILTIN_PROFILE_NAMES.len());
        for profile in &profiles {
            assert!(profile.validate().is_ok(), "{} should validate", profile.name);
            assert!(profile.description.is_some());
        }
    }

    #[test]
    fn names_match_table() {
        for name in builtin_profile_names() {
            assert!(is_builtin_profile(name));
            assert!(builtin_profile(name).is_ok());
        }
    }

    #[test]
    fn default_matches_engine_defaults() {
        assert_eq!(builtin_profile("default").unwrap().settings, HvsrSettings::default());
    }

    #[test]
    fn sesame_uses_geometric_mean() {
        let profile = builtin_profile("SESAME").unwrap();
        assert_eq!(profile.settings.method, CombinationMethod::GeometricMean);
        assert!(profile.settings.outlier_curve_std.is_none());
    }

    #[test]
    fn legacy_uses_linear_std() {
        let profile = builtin_profile("legacy").unwrap();
        assert_eq!(profile.settings.stability_curves, StabilityCurves::LinearStd);
        assert_eq!(
            profile.settings.outlier_curve_std,
            Some(hvsr_core::DEFAULT_OUTLIER_CURVE_STD)
        );
    }

    #[test]
    fn unknown_profile_is_not_found() {
        assert!(matches!(
            builtin_profile("nakamura"),
            Err(ConfigError::ProfileNotFound(name)) if name == "nakamura"
        ));
        assert!(matches!(
            resolve_profile("no/such/profile.toml"),
            Err(ConfigError::ProfileNotFound(_))
        ));
    }
}
