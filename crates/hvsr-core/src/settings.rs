//! Analysis settings: combination method, peak band, and thresholds.
//!
//! Settings are resolved once at the API boundary. Loose user input (method
//! names, legacy integer codes) is parsed into [`CombinationMethod`] here and
//! rejected with [`HvsrError`] if it does not name a method.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HvsrError;

/// Default minimum peak amplitude.
pub const DEFAULT_WATER_LEVEL: f64 = 1.8;

/// Default peak search band in Hz.
pub const DEFAULT_BAND: (f64, f64) = (0.4, 40.0);

/// Spread cutoff applied by [`HvsrSettings::with_default_outlier_rejection`].
pub const DEFAULT_OUTLIER_CURVE_STD: f64 = 1.75;

/// How the two horizontal components are combined into one amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationMethod {
    /// Diffuse field assumption. Named for completeness; never computed.
    DiffuseField,
    /// H = (H1 + H2) / 2
    ArithmeticMean,
    /// H = sqrt(H1 * H2), recommended by SESAME (2004)
    GeometricMean,
    /// H = sqrt(P1 + P2)
    #[default]
    VectorSummation,
    /// H = sqrt((P1 + P2) / 2)
    QuadraticMean,
    /// H = max(H1, H2)
    MaximumHorizontal,
}

impl CombinationMethod {
    /// All methods, in legacy code order (1..=6).
    pub const ALL: [CombinationMethod; 6] = [
        CombinationMethod::DiffuseField,
        CombinationMethod::ArithmeticMean,
        CombinationMethod::GeometricMean,
        CombinationMethod::VectorSummation,
        CombinationMethod::QuadraticMean,
        CombinationMethod::MaximumHorizontal,
    ];

    /// Human-readable method name.
    pub fn name(self) -> &'static str {
        match self {
            CombinationMethod::DiffuseField => "Diffuse Field Assumption",
            CombinationMethod::ArithmeticMean => "Arithmetic Mean",
            CombinationMethod::GeometricMean => "Geometric Mean",
            CombinationMethod::VectorSummation => "Vector Summation",
            CombinationMethod::QuadraticMean => "Quadratic Mean",
            CombinationMethod::MaximumHorizontal => "Maximum Horizontal Value",
        }
    }

    /// Legacy integer code (1 = DFA ... 6 = maximum horizontal).
    pub fn code(self) -> u8 {
        match self {
            CombinationMethod::DiffuseField => 1,
            CombinationMethod::ArithmeticMean => 2,
            CombinationMethod::GeometricMean => 3,
            CombinationMethod::VectorSummation => 4,
            CombinationMethod::QuadraticMean => 5,
            CombinationMethod::MaximumHorizontal => 6,
        }
    }

    /// Whether the combiner can compute this method.
    pub fn is_supported(self) -> bool {
        self != CombinationMethod::DiffuseField
    }

    /// Fail fast on methods the combiner cannot compute.
    pub fn ensure_supported(self) -> Result<Self, HvsrError> {
        if self.is_supported() {
            Ok(self)
        } else {
            Err(HvsrError::UnsupportedMethod(self))
        }
    }
}

impl fmt::Display for CombinationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for CombinationMethod {
    type Error = HvsrError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        CombinationMethod::ALL
            .into_iter()
            .find(|m| m.code() == code)
            .ok_or_else(|| HvsrError::UnknownMethod(code.to_string()))
    }
}

impl FromStr for CombinationMethod {
    type Err = HvsrError;

    /// Parse a method name. Case, spaces, dashes and underscores are ignored,
    /// so `"Geometric Mean"`, `"geometric_mean"` and `"geometric-mean"` all
    /// resolve the same way. Legacy integer codes are accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return CombinationMethod::try_from(code);
        }

        let key: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-' | '.'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "dfa" | "diffusefield" | "diffusefieldassumption" => {
                Ok(CombinationMethod::DiffuseField)
            }
            "arithmeticmean" | "arithmetic" => Ok(CombinationMethod::ArithmeticMean),
            "geometricmean" | "geometric" => Ok(CombinationMethod::GeometricMean),
            "vectorsummation" | "vectorsum" | "vector" => Ok(CombinationMethod::VectorSummation),
            "quadraticmean" | "quadratic" | "rms" => Ok(CombinationMethod::QuadraticMean),
            "maximumhorizontal" | "maximumhorizontalvalue" | "maxhorizontal" | "max" => {
                Ok(CombinationMethod::MaximumHorizontal)
            }
            _ => Err(HvsrError::UnknownMethod(trimmed.to_string())),
        }
    }
}

/// Closed frequency interval used to restrict the peak search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    /// Lower limit in Hz (inclusive).
    pub low: f64,
    /// Upper limit in Hz (inclusive).
    pub high: f64,
}

impl FrequencyBand {
    /// Create a validated band.
    pub fn new(low: f64, high: f64) -> Result<Self, HvsrError> {
        let band = Self { low, high };
        band.validate()?;
        Ok(band)
    }

    /// Check that both limits are finite, non-negative, and ordered.
    pub fn validate(&self) -> Result<(), HvsrError> {
        if self.low.is_finite() && self.high.is_finite() && self.low >= 0.0 && self.low <= self.high
        {
            Ok(())
        } else {
            Err(HvsrError::InvalidBand {
                low: self.low,
                high: self.high,
            })
        }
    }

    /// Inclusive membership test.
    pub fn contains(&self, frequency: f64) -> bool {
        self.low <= frequency && frequency <= self.high
    }
}

impl Default for FrequencyBand {
    fn default() -> Self {
        Self {
            low: DEFAULT_BAND.0,
            high: DEFAULT_BAND.1,
        }
    }
}

/// Which dispersion curves bracket the mean curve for stability testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityCurves {
    /// `curve * exp(±log_std)`
    #[default]
    LogStd,
    /// `curve ± std`
    LinearStd,
}

/// Complete set of analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HvsrSettings {
    /// Horizontal combination method.
    #[serde(default)]
    pub method: CombinationMethod,

    /// Peak search band.
    #[serde(default)]
    pub band: FrequencyBand,

    /// Minimum amplitude a maximum must exceed to become a candidate peak.
    #[serde(default = "default_water_level")]
    pub water_level: f64,

    /// Reject windows whose curve spread is more than this many standard
    /// deviations away from the mean spread. `None` keeps every window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlier_curve_std: Option<f64>,

    /// Curves used for the ±1-std peak sets.
    #[serde(default)]
    pub stability_curves: StabilityCurves,
}

fn default_water_level() -> f64 {
    DEFAULT_WATER_LEVEL
}

impl Default for HvsrSettings {
    fn default() -> Self {
        Self {
            method: CombinationMethod::default(),
            band: FrequencyBand::default(),
            water_level: DEFAULT_WATER_LEVEL,
            outlier_curve_std: None,
            stability_curves: StabilityCurves::default(),
        }
    }
}

impl HvsrSettings {
    /// Settings with the given method and defaults for everything else.
    pub fn new(method: CombinationMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Set the combination method.
    pub fn with_method(mut self, method: CombinationMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the peak search band.
    pub fn with_band(mut self, band: FrequencyBand) -> Self {
        self.band = band;
        self
    }

    /// Set the water level.
    pub fn with_water_level(mut self, water_level: f64) -> Self {
        self.water_level = water_level;
        self
    }

    /// Enable outlier window rejection with the given spread cutoff.
    pub fn with_outlier_rejection(mut self, curve_std: f64) -> Self {
        self.outlier_curve_std = Some(curve_std);
        self
    }

    /// Enable outlier window rejection at [`DEFAULT_OUTLIER_CURVE_STD`].
    pub fn with_default_outlier_rejection(self) -> Self {
        self.with_outlier_rejection(DEFAULT_OUTLIER_CURVE_STD)
    }

    /// Choose the ±1-std curves used for stability testing.
    pub fn with_stability_curves(mut self, curves: StabilityCurves) -> Self {
        self.stability_curves = curves;
        self
    }

    /// Reject settings that cannot produce a meaningful analysis.
    pub fn validate(&self) -> Result<(), HvsrError> {
        self.method.ensure_supported()?;
        self.band.validate()?;

        if !self.water_level.is_finite() {
            return Err(HvsrError::invalid_parameter(
                "water_level",
                format!("must be finite, got {}", self.water_level),
            ));
        }

        if let Some(k) = self.outlier_curve_std
            && !(k.is_finite() && k > 0.0)
        {
            return Err(HvsrError::invalid_parameter(
                "outlier_curve_std",
                format!("must be a positive finite value, got {k}"),
            ));
        }

        Ok(())
    }
}
