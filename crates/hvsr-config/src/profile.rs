//! Profile file format and operations.

use std::path::Path;

use hvsr_core::{CombinationMethod, FrequencyBand, HvsrSettings, StabilityCurves};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Named set of analysis settings.
///
/// Profiles are stored as TOML files. Loading a profile validates its
/// settings, so a profile obtained from [`AnalysisProfile::load`] or
/// [`AnalysisProfile::from_toml`] can be handed to the engine directly.
///
/// # TOML Format
///
/// ```toml
/// name = "Soft soil"
/// description = "Deep sediment sites"
///
/// [settings]
/// method = "geometric_mean"
/// water_level = 1.5
/// stability_curves = "log_std"
///
/// [settings.band]
/// low = 0.2
/// high = 10.0
/// ```
///
/// Every key under `[settings]` is optional and falls back to the engine
/// default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisProfile {
    /// Name of the profile.
    pub name: String,

    /// Optional description of the profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Analysis settings.
    #[serde(default)]
    pub settings: HvsrSettings,
}

impl AnalysisProfile {
    /// Create a profile with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            settings: HvsrSettings::default(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace all settings.
    pub fn with_settings(mut self, settings: HvsrSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the combination method.
    pub fn with_method(mut self, method: CombinationMethod) -> Self {
        self.settings.method = method;
        self
    }

    /// Set the peak search band.
    pub fn with_band(mut self, band: FrequencyBand) -> Self {
        self.settings.band = band;
        self
    }

    /// Set the water level.
    pub fn with_water_level(mut self, water_level: f64) -> Self {
        self.settings.water_level = water_level;
        self
    }

    /// Enable outlier window rejection.
    pub fn with_outlier_rejection(mut self, curve_std: f64) -> Self {
        self.settings.outlier_curve_std = Some(curve_std);
        self
    }

    /// Choose the ±1-std curves used for stability testing.
    pub fn with_stability_curves(mut self, curves: StabilityCurves) -> Self {
        self.settings.stability_curves = curves;
        self
    }

    /// Check the settings against the engine's rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.settings.validate()?;
        Ok(())
    }

    /// Load and validate a profile from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let profile = Self::from_toml(&content)?;
        tracing::debug!(name = %profile.name, path = %path.display(), "loaded profile");
        Ok(profile)
    }

    /// Parse and validate a profile from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let profile: AnalysisProfile = toml::from_str(toml_str)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Save the profile to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the profile to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for AnalysisProfile {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_new() {
        let profile = AnalysisProfile::new("Site A");
        assert_eq!(profile.name, "Site A");
        assert!(profile.description.is_none());
        assert_eq!(profile.settings, HvsrSettings::default());
    }

    #[test]
    fn test_profile_builder() {
        let profile = AnalysisProfile::new("Soft soil")
            .with_description("Deep sediment sites")
            .with_method(CombinationMethod::GeometricMean)
            .with_band(FrequencyBand::new(0.2, 10.0).unwrap())
            .with_water_level(1.5)
            .with_outlier_rejection(2.0)
            .with_stability_curves(StabilityCurves::LinearStd);

        assert_eq!(profile.description.as_deref(), Some("Deep sediment sites"));
        assert_eq!(profile.settings.method, CombinationMethod::GeometricMean);
        assert_eq!(profile.settings.band.high, 10.0);
        assert_eq!(profile.settings.water_level, 1.5);
        assert_eq!(profile.settings.outlier_curve_std, Some(2.0));
        assert_eq!(profile.settings.stability_curves, StabilityCurves::LinearStd);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_profile_toml_roundtrip() {
        let profile = AnalysisProfile::new("Roundtrip")
            .with_description("check")
            .with_method(CombinationMethod::QuadraticMean)
            .with_outlier_rejection(1.75);

        let toml_str = profile.to_toml().unwrap();
        assert!(toml_str.contains("method = \"quadratic_mean\""), "got: {toml_str}");
        assert_eq!(AnalysisProfile::from_toml(&toml_str).unwrap(), profile);
    }

    #[test]
    fn test_profile_from_toml_defaults() {
        let profile = AnalysisProfile::from_toml("name = \"Bare\"").unwrap();
        assert_eq!(profile.settings, HvsrSettings::default());
        assert!(profile.description.is_none());
    }

    #[test]
    fn test_profile_from_toml_partial_settings() {
        let toml_str = r#"
name = "Partial"

[settings]
method = "maximum_horizontal"

[settings.band]
low = 1.0
high = 20.0
"#;
        let profile = AnalysisProfile::from_toml(toml_str).unwrap();
        assert_eq!(profile.settings.method, CombinationMethod::MaximumHorizontal);
        assert_eq!(profile.settings.band, FrequencyBand::new(1.0, 20.0).unwrap());
        assert_eq!(profile.settings.water_level, hvsr_core::DEFAULT_WATER_LEVEL);
    }

    #[test]
    fn test_profile_rejects_invalid_settings() {
        let inverted = "name = \"Bad\"\n[settings.band]\nlow = 10.0\nhigh = 1.0\n";
        assert!(matches!(
            AnalysisProfile::from_toml(inverted),
            Err(ConfigError::Settings(hvsr_core::HvsrError::InvalidBand { .. }))
        ));

        let dfa = "name = \"Bad\"\n[settings]\nmethod = \"diffuse_field\"\n";
        assert!(matches!(
            AnalysisProfile::from_toml(dfa),
            Err(ConfigError::Settings(hvsr_core::HvsrError::UnsupportedMethod(_)))
        ));
    }

    #[test]
    fn test_profile_rejects_unknown_method_name() {
        let toml_str = "name = \"Bad\"\n[settings]\nmethod = \"median\"\n";
        assert!(matches!(
            AnalysisProfile::from_toml(toml_str),
            Err(ConfigError::TomlParse(_))
        ));
    }
}
