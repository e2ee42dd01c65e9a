//! One-call HVSR analysis: curve synthesis, peak assessment, and selection.

use serde::Serialize;

use crate::curve::{CurveSynthesizer, HvsrCurve};
use crate::error::HvsrError;
use crate::peaks::Peak;
use crate::psd::ThreeComponentPsd;
use crate::quality::{PeakAssessment, QualityAssessor};
use crate::report::PeakReport;
use crate::selection::best_peak;
use crate::settings::HvsrSettings;

/// Everything produced by [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HvsrAnalysis {
    /// Synthesized curve and dispersion statistics.
    pub curve: HvsrCurve,
    /// Scored peak sets for the mean and ±1-std curves.
    pub peaks: PeakAssessment,
    /// Settings the analysis ran with.
    pub settings: HvsrSettings,
}

impl HvsrAnalysis {
    /// Highest-scoring mean-curve peak.
    pub fn best_peak(&self) -> Option<&Peak> {
        best_peak(&self.peaks.mean)
    }

    /// Printable report for the best peak.
    pub fn report(&self) -> Option<PeakReport<'_>> {
        self.best_peak()
            .map(|peak| PeakReport::new(peak, &self.curve, self.peaks.mean.max_score()))
    }
}

/// Run the full analysis on one three-component recording.
///
/// # Errors
///
/// Returns [`HvsrError`] when the settings are invalid or name a combination
/// method that cannot be computed. Degenerate input (NaN bins, zero vertical
/// power, missing windows) is not an error; it produces NaN curve values and
/// fewer or no peaks.
///
/// # Example
///
/// ```
/// use hvsr_core::{HvsrSettings, PsdSeries, ThreeComponentPsd, analyze};
///
/// let bins: Vec<f64> = (1..=32).map(|i| i as f64 * 0.5).collect();
/// let flat = PsdSeries::new(bins.clone(), vec![vec![-120.0; 32]; 4]);
/// let psd = ThreeComponentPsd::new(flat.clone(), flat.clone(), flat, 60.0);
///
/// let analysis = analyze(&psd, &HvsrSettings::default()).unwrap();
/// assert_eq!(analysis.curve.len(), 31);
/// assert!(analysis.best_peak().is_none());
/// ```
pub fn analyze(
    psd: &ThreeComponentPsd,
    settings: &HvsrSettings,
) -> Result<HvsrAnalysis, HvsrError> {
    let synthesizer = CurveSynthesizer::from_settings(settings)?;
    let curve = synthesizer.synthesize(psd)?;

    let peaks = QualityAssessor::new(&curve, settings.band)
        .with_stability_curves(settings.stability_curves)
        .assess();

    let analysis = HvsrAnalysis {
        curve,
        peaks,
        settings: settings.clone(),
    };

    match analysis.best_peak() {
        Some(peak) => tracing::debug!(
            f0 = peak.f0,
            a0 = peak.a0,
            score = peak.score(),
            max_score = analysis.peaks.mean.max_score(),
            "selected best peak"
        ),
        None => tracing::debug!("no candidate peaks on the mean curve"),
    }

    Ok(analysis)
}
