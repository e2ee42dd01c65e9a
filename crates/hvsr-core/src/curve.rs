//! H/V curve synthesis across bins and time windows.
//!
//! The ensemble curve is built from the time-averaged PSD of each channel,
//! never by averaging per-window ratios. Per-window curves are built with the
//! same bin pipeline and only feed the dispersion statistics.
//!
//! Every curve has one value per adjacent bin pair, so its length is one less
//! than the number of bins. Value `j` is reported at frequency `f[j]`.

use serde::Serialize;

use crate::combine::combine;
use crate::error::HvsrError;
use crate::power::integrate_power;
use crate::psd::{AlignedPsd, ThreeComponentPsd};
use crate::settings::{CombinationMethod, DEFAULT_WATER_LEVEL, HvsrSettings, StabilityCurves};
use crate::stats::{column_mean, column_std, nan_mean, nan_std};

/// Builds [`HvsrCurve`]s from aligned three-component PSDs.
#[derive(Debug, Clone)]
pub struct CurveSynthesizer {
    method: CombinationMethod,
    water_level: f64,
    outlier_curve_std: Option<f64>,
}

impl CurveSynthesizer {
    /// Create a synthesizer, rejecting methods that cannot be computed.
    pub fn new(method: CombinationMethod) -> Result<Self, HvsrError> {
        Ok(Self {
            method: method.ensure_supported()?,
            water_level: DEFAULT_WATER_LEVEL,
            outlier_curve_std: None,
        })
    }

    /// Create a synthesizer from full settings.
    pub fn from_settings(settings: &HvsrSettings) -> Result<Self, HvsrError> {
        settings.validate()?;
        Ok(Self {
            method: settings.method,
            water_level: settings.water_level,
            outlier_curve_std: settings.outlier_curve_std,
        })
    }

    /// Set the peak water level (default 1.8).
    pub fn with_water_level(mut self, water_level: f64) -> Self {
        self.water_level = water_level;
        self
    }

    /// Reject outlier windows whose spread is beyond `curve_std` deviations.
    pub fn with_outlier_rejection(mut self, curve_std: f64) -> Self {
        self.outlier_curve_std = Some(curve_std);
        self
    }

    /// Combination method in use.
    pub fn method(&self) -> CombinationMethod {
        self.method
    }

    /// Align the channels and build the curve.
    pub fn synthesize(&self, psd: &ThreeComponentPsd) -> Result<HvsrCurve, HvsrError> {
        self.synthesize_aligned(&psd.align())
    }

    /// Build the curve from already aligned channels.
    pub fn synthesize_aligned(&self, psd: &AlignedPsd) -> Result<HvsrCurve, HvsrError> {
        let x = &psd.frequencies;
        let points = x.len().saturating_sub(1);

        let z_avg = column_mean(&psd.vertical, x.len());
        let h1_avg = column_mean(&psd.horizontal_1, x.len());
        let h2_avg = column_mean(&psd.horizontal_2, x.len());
        let amplitude = ratio_curve(self.method, x, &z_avg, &h1_avg, &h2_avg)?;

        let degenerate = amplitude.iter().filter(|v| v.is_nan()).count();
        if degenerate > 0 {
            tracing::warn!(
                bins = degenerate,
                total = points,
                "mean H/V curve has undefined bins (zero vertical power or NaN input)"
            );
        }

        let mut window_curves = (0..psd.window_count())
            .map(|w| {
                ratio_curve(
                    self.method,
                    x,
                    &psd.vertical[w],
                    &psd.horizontal_1[w],
                    &psd.horizontal_2[w],
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let removed_windows = match self.outlier_curve_std {
            Some(k) => reject_outlier_windows(&mut window_curves, k),
            None => Vec::new(),
        };
        if !removed_windows.is_empty() {
            tracing::debug!(
                removed = removed_windows.len(),
                kept = window_curves.len(),
                "rejected outlier H/V windows"
            );
        }

        let std = column_std(&window_curves, points);
        let log_curves: Vec<Vec<f64>> = window_curves
            .iter()
            .map(|curve| curve.iter().map(|&v| finite_or_nan(v.log10())).collect())
            .collect();
        let log_std = column_std(&log_curves, points);

        if window_curves.is_empty() {
            tracing::warn!("no time windows left; dispersion statistics are undefined");
        }

        let curve = HvsrCurve {
            frequencies: x[..points].to_vec(),
            plus_std: zip_map(&amplitude, &std, |a, s| a + s),
            minus_std: zip_map(&amplitude, &std, |a, s| a - s),
            plus_log_std: zip_map(&amplitude, &log_std, |a, s| a * s.exp()),
            minus_log_std: zip_map(&amplitude, &log_std, |a, s| a / s.exp()),
            water_levels: WaterLevels::new(self.water_level, &std),
            amplitude,
            window_curves,
            std,
            log_std,
            removed_windows,
            method: self.method,
            window_length_s: psd.window_length_s,
        };

        tracing::debug!(
            method = %self.method,
            points = curve.len(),
            windows = curve.window_count(),
            "synthesized H/V curve"
        );

        Ok(curve)
    }
}

/// Peak acceptance thresholds for the mean and ±1-std curves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterLevels {
    /// Configured level, broadcast per bin.
    pub level: Vec<f64>,
    /// `level + std` per bin.
    pub plus: Vec<f64>,
    /// `level - std` per bin.
    pub minus: Vec<f64>,
}

impl WaterLevels {
    fn new(level: f64, std: &[f64]) -> Self {
        Self {
            level: vec![level; std.len()],
            plus: std.iter().map(|s| level + s).collect(),
            minus: std.iter().map(|s| level - s).collect(),
        }
    }
}

/// Which of the three curves a value or peak set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// Ensemble mean curve.
    Mean,
    /// Upper dispersion bound.
    PlusStd,
    /// Lower dispersion bound.
    MinusStd,
}

/// Synthesized H/V curve with its dispersion statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HvsrCurve {
    frequencies: Vec<f64>,
    amplitude: Vec<f64>,
    window_curves: Vec<Vec<f64>>,
    std: Vec<f64>,
    log_std: Vec<f64>,
    plus_std: Vec<f64>,
    minus_std: Vec<f64>,
    plus_log_std: Vec<f64>,
    minus_log_std: Vec<f64>,
    water_levels: WaterLevels,
    removed_windows: Vec<usize>,
    method: CombinationMethod,
    window_length_s: f64,
}

impl HvsrCurve {
    /// Number of curve points (bins - 1).
    pub fn len(&self) -> usize {
        self.amplitude.len()
    }

    /// Whether the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.amplitude.is_empty()
    }

    /// Frequency of each curve point in Hz, ascending.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Ensemble H/V amplitude.
    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }

    /// Per-window H/V curves (windows × points), outliers removed.
    pub fn window_curves(&self) -> &[Vec<f64>] {
        &self.window_curves
    }

    /// Number of windows contributing to the dispersion statistics.
    pub fn window_count(&self) -> usize {
        self.window_curves.len()
    }

    /// Indices of windows dropped by outlier rejection.
    pub fn removed_windows(&self) -> &[usize] {
        &self.removed_windows
    }

    /// Linear standard deviation across windows.
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Standard deviation of log10 amplitude across windows.
    pub fn log_std(&self) -> &[f64] {
        &self.log_std
    }

    /// `amplitude + std`
    pub fn plus_std(&self) -> &[f64] {
        &self.plus_std
    }

    /// `amplitude - std`
    pub fn minus_std(&self) -> &[f64] {
        &self.minus_std
    }

    /// `amplitude * exp(log_std)`
    pub fn plus_log_std(&self) -> &[f64] {
        &self.plus_log_std
    }

    /// `amplitude / exp(log_std)`
    pub fn minus_log_std(&self) -> &[f64] {
        &self.minus_log_std
    }

    /// Peak acceptance thresholds.
    pub fn water_levels(&self) -> &WaterLevels {
        &self.water_levels
    }

    /// Combination method used.
    pub fn method(&self) -> CombinationMethod {
        self.method
    }

    /// PSD analysis window length in seconds.
    pub fn window_length_s(&self) -> f64 {
        self.window_length_s
    }

    /// Curve values and matching water level for one of the three curves.
    pub fn bound(&self, kind: CurveKind, curves: StabilityCurves) -> (&[f64], &[f64]) {
        match (kind, curves) {
            (CurveKind::Mean, _) => (&self.amplitude, &self.water_levels.level),
            (CurveKind::PlusStd, StabilityCurves::LogStd) => {
                (&self.plus_log_std, &self.water_levels.plus)
            }
            (CurveKind::PlusStd, StabilityCurves::LinearStd) => {
                (&self.plus_std, &self.water_levels.plus)
            }
            (CurveKind::MinusStd, StabilityCurves::LogStd) => {
                (&self.minus_log_std, &self.water_levels.minus)
            }
            (CurveKind::MinusStd, StabilityCurves::LinearStd) => {
                (&self.minus_std, &self.water_levels.minus)
            }
        }
    }
}

/// H/V ratio for each adjacent bin pair.
///
/// The three dB slices must be at least `x.len()` long.
pub fn ratio_curve(
    method: CombinationMethod,
    x: &[f64],
    vertical_db: &[f64],
    horizontal_1_db: &[f64],
    horizontal_2_db: &[f64],
) -> Result<Vec<f64>, HvsrError> {
    (0..x.len().saturating_sub(1))
        .map(|j| {
            let (x0, x1) = (x[j], x[j + 1]);
            let pz = integrate_power(vertical_db[j], vertical_db[j + 1], x0, x1);
            let p1 = integrate_power(horizontal_1_db[j], horizontal_1_db[j + 1], x0, x1);
            let p2 = integrate_power(horizontal_2_db[j], horizontal_2_db[j + 1], x0, x1);
            combine(method, pz, p1, p2)
        })
        .collect()
}

/// Drop windows whose spread across bins is an outlier; returns the
/// original indices of the dropped windows.
fn reject_outlier_windows(curves: &mut Vec<Vec<f64>>, k: f64) -> Vec<usize> {
    let spreads: Vec<f64> = curves.iter().map(|c| nan_std(c.iter().copied())).collect();
    let spread_mean = nan_mean(spreads.iter().copied());
    let spread_std = nan_std(spreads.iter().copied());

    let low = spread_mean - spread_std * k;
    let high = spread_mean + spread_std * k;

    let removed: Vec<usize> = spreads
        .iter()
        .enumerate()
        .filter(|&(_, &s)| s < low || s > high)
        .map(|(i, _)| i)
        .collect();

    let mut index = 0;
    curves.retain(|_| {
        let keep = removed.binary_search(&index).is_err();
        index += 1;
        keep
    });

    removed
}

fn finite_or_nan(v: f64) -> f64 {
    if v.is_finite() { v } else { f64::NAN }
}

fn zip_map(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect()
}
