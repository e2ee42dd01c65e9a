//! SESAME (2004) reliability, clarity, and stability criteria.
//!
//! Tests run in a fixed order: curve reliability on the mean-curve peaks,
//! clarity on each of the three peak sets, then frequency stability and the
//! σf/σA thresholds on the mean-curve peaks. Each peak set counts the tests it
//! was put through in [`PeakSet::tests_run`].

use serde::Serialize;

use crate::curve::{CurveKind, HvsrCurve};
use crate::peaks::{CurvePoint, PeakSet, PeakTest, find_peaks, init_peaks};
use crate::settings::{FrequencyBand, StabilityCurves};
use crate::stats::nan_std;

/// Minimum ratio between the peak and a clarity reference sample.
const CLARITY_RATIO: f64 = 2.0;

/// Minimum peak amplitude for amplitude clarity.
const CLARITY_AMPLITUDE: f64 = 2.0;

/// Relative tolerance for matching peaks on the dispersion curves.
const FREQUENCY_TOLERANCE: f64 = 0.05;

/// Minimum number of significant cycles.
const MIN_CYCLES: f64 = 200.0;

/// Peak sets for the mean curve and both dispersion bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakAssessment {
    /// Fully assessed mean-curve peaks.
    pub mean: PeakSet,
    /// Upper-bound peaks (clarity only).
    pub plus: PeakSet,
    /// Lower-bound peaks (clarity only).
    pub minus: PeakSet,
}

/// Runs the full test suite against one curve.
#[derive(Debug, Clone)]
pub struct QualityAssessor<'a> {
    curve: &'a HvsrCurve,
    band: FrequencyBand,
    stability_curves: StabilityCurves,
}

impl<'a> QualityAssessor<'a> {
    /// Assess peaks of `curve` that fall inside `band`.
    pub fn new(curve: &'a HvsrCurve, band: FrequencyBand) -> Self {
        Self {
            curve,
            band,
            stability_curves: StabilityCurves::default(),
        }
    }

    /// Choose the dispersion curves used for the ±1-std peak sets.
    pub fn with_stability_curves(mut self, curves: StabilityCurves) -> Self {
        self.stability_curves = curves;
        self
    }

    /// Candidate peaks on one of the three curves.
    pub fn locate(&self, kind: CurveKind) -> PeakSet {
        let (y, water_level) = self.curve.bound(kind, self.stability_curves);

        if y.iter().any(|v| v.is_nan()) {
            tracing::debug!(?kind, "curve contains NaN, skipping peak search");
            return PeakSet::empty(kind);
        }

        let indices = find_peaks(y);
        let peaks = init_peaks(self.curve.frequencies(), y, &indices, self.band, water_level);
        PeakSet::new(kind, peaks)
    }

    /// Locate and score peaks on all three curves.
    pub fn assess(&self) -> PeakAssessment {
        let x = self.curve.frequencies();

        let mut mean = self.locate(CurveKind::Mean);
        check_curve_reliability(&mut mean, self.curve);
        check_clarity(&mut mean, x, self.curve.amplitude());

        let (plus_y, _) = self.curve.bound(CurveKind::PlusStd, self.stability_curves);
        let mut plus = self.locate(CurveKind::PlusStd);
        check_clarity(&mut plus, x, plus_y);

        let (minus_y, _) = self.curve.bound(CurveKind::MinusStd, self.stability_curves);
        let mut minus = self.locate(CurveKind::MinusStd);
        check_clarity(&mut minus, x, minus_y);

        check_frequency_stability(&mut mean, &minus, &plus);
        check_stability(&mut mean, self.curve);

        tracing::debug!(
            mean = mean.len(),
            plus = plus.len(),
            minus = minus.len(),
            "assessed peaks"
        );

        PeakAssessment { mean, plus, minus }
    }
}

/// Window length, significant cycles, and low log-std around each peak.
pub fn check_curve_reliability(set: &mut PeakSet, curve: &HvsrCurve) {
    set.tests_run += 3;

    let window_len = curve.window_length_s();
    let window_count = curve.window_count() as f64;

    for peak in &mut set.peaks {
        let f0 = peak.f0;

        peak.record(PeakTest::WindowLength, f0 > 10.0 / window_len);
        peak.record(
            PeakTest::SignificantCycles,
            significant_cycles(window_len, window_count, f0) > MIN_CYCLES,
        );

        let limit = log_std_limit(f0);
        let low_std = curve
            .frequencies()
            .iter()
            .zip(curve.log_std())
            .filter(|&(&f, _)| f >= 0.5 * f0 && f < 2.0 * f0)
            .all(|(_, &s)| s < limit);
        peak.record(PeakTest::LowCurveStd, low_std);
    }
}

/// Clarity below, clarity above, and amplitude clarity.
///
/// `x` must be ascending. The search below runs from f0 downward toward
/// f0/4, the search above from f0 upward toward 4·f0; both stop at the first
/// sample that satisfies the ratio.
pub fn check_clarity(set: &mut PeakSet, x: &[f64], y: &[f64]) {
    set.tests_run += 3;

    for peak in &mut set.peaks {
        let (f0, a0) = (peak.f0, peak.a0);

        peak.f_minus = (0..y.len())
            .rev()
            .find(|&j| f0 / 4.0 <= x[j] && x[j] < f0 && a0 / y[j] > CLARITY_RATIO)
            .map(|j| CurvePoint {
                frequency: x[j],
                amplitude: y[j],
            });
        peak.record(PeakTest::ClarityBelow, peak.f_minus.is_some());

        peak.f_plus = (0..y.len())
            .find(|&j| f0 < x[j] && x[j] <= 4.0 * f0 && a0 / y[j] > CLARITY_RATIO)
            .map(|j| CurvePoint {
                frequency: x[j],
                amplitude: y[j],
            });
        peak.record(PeakTest::ClarityAbove, peak.f_plus.is_some());

        peak.record(PeakTest::AmplitudeClarity, a0 > CLARITY_AMPLITUDE);
    }
}

/// The peak must reappear within ±5% on both dispersion curves.
pub fn check_frequency_stability(set: &mut PeakSet, minus: &PeakSet, plus: &PeakSet) {
    set.tests_run += 1;

    for peak in &mut set.peaks {
        let f0 = peak.f0;
        peak.match_below = nearest_frequency(minus, f0);
        peak.match_above = nearest_frequency(plus, f0);

        let within = |f: Option<f64>| {
            f.is_some_and(|f| {
                (1.0 - FREQUENCY_TOLERANCE) * f0 <= f && f <= (1.0 + FREQUENCY_TOLERANCE) * f0
            })
        };
        let stable = within(peak.match_below) && within(peak.match_above);
        peak.record(PeakTest::FrequencyStability, stable);
    }
}

/// σf and σA against the frequency-dependent thresholds.
pub fn check_stability(set: &mut PeakSet, curve: &HvsrCurve) {
    set.tests_run += 2;

    let x = curve.frequencies();
    let window_peaks: Vec<Vec<usize>> = curve
        .window_curves()
        .iter()
        .map(|c| find_peaks(c))
        .collect();

    for peak in &mut set.peaks {
        let sf = frequency_std(x, peak.index, &window_peaks);
        let sa = curve.log_std()[peak.index];
        peak.sf = Some(sf);
        peak.sa = Some(sa);

        let thresholds = StabilityThresholds::for_frequency(peak.f0);
        peak.record(PeakTest::FrequencyStd, sf < thresholds.epsilon * peak.f0);
        peak.record(PeakTest::AmplitudeStd, sa < thresholds.theta);
    }
}

/// Frequency-dependent σf factor and σA limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StabilityThresholds {
    /// σf must be below `epsilon * f0`.
    pub epsilon: f64,
    /// σA must be below `theta`.
    pub theta: f64,
}

impl StabilityThresholds {
    /// Threshold pair for a peak at `f0` Hz.
    pub fn for_frequency(f0: f64) -> Self {
        let (epsilon, theta) = if f0 < 0.2 {
            (0.25, 0.48)
        } else if f0 < 0.5 {
            (0.20, 0.40)
        } else if f0 < 1.0 {
            (0.15, 0.30)
        } else if f0 <= 2.0 {
            (0.10, 0.25)
        } else {
            (0.05, 0.20)
        };
        Self { epsilon, theta }
    }
}

/// Number of significant cycles, Lw · Nw · f0.
pub fn significant_cycles(window_length_s: f64, window_count: f64, f0: f64) -> f64 {
    window_length_s * window_count * f0
}

/// Log-std ceiling inside [f0/2, 2·f0).
pub fn log_std_limit(f0: f64) -> f64 {
    if f0 < 0.5 { 3.0 } else { 2.0 }
}

/// Spread of the peak frequency across windows.
///
/// Each window contributes the frequency of its peak nearest to `index`, or
/// the frequency at `index` when the window has no peaks.
pub fn frequency_std(x: &[f64], index: usize, window_peaks: &[Vec<usize>]) -> f64 {
    if window_peaks.is_empty() {
        return 0.0;
    }

    let positions = window_peaks.iter().map(|peaks| {
        let nearest = peaks
            .iter()
            .copied()
            .min_by_key(|&p| p.abs_diff(index))
            .unwrap_or(index);
        x[nearest]
    });

    nan_std(positions)
}

fn nearest_frequency(set: &PeakSet, f0: f64) -> Option<f64> {
    set.iter()
        .map(|p| p.f0)
        .min_by(|a, b| (a - f0).abs().total_cmp(&(b - f0).abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveSynthesizer;
    use crate::peaks::Peak;
    use crate::psd::{PsdSeries, ThreeComponentPsd};
    use crate::settings::CombinationMethod;

    /// Curve on a 0.125 Hz grid (bin `b` at `0.125 * (b + 1)` Hz) over a flat
    /// vertical channel. `offset(w, b)` is the horizontal dB excess of window
    /// `w` at bin `b`.
    fn dispersed_curve(
        windows: usize,
        window_length_s: f64,
        offset: impl Fn(usize, usize) -> f64,
    ) -> HvsrCurve {
        let x: Vec<f64> = (1..=40).map(|i| 0.125 * f64::from(i)).collect();
        let vertical = PsdSeries::new(x.clone(), vec![vec![-140.0; x.len()]; windows]);
        let rows = (0..windows)
            .map(|w| (0..x.len()).map(|b| -140.0 + offset(w, b)).collect())
            .collect();
        let horizontal = PsdSeries::new(x, rows);
        let psd = ThreeComponentPsd::new(vertical, horizontal.clone(), horizontal, window_length_s);
        CurveSynthesizer::new(CombinationMethod::GeometricMean)
            .unwrap()
            .synthesize(&psd)
            .unwrap()
    }

    /// Two windows at ±50 dB from bin `from` upward: log-std 2.5 there.
    fn split_from(from: usize) -> impl Fn(usize, usize) -> f64 {
        move |w, b| match (b >= from, w) {
            (false, _) => 0.0,
            (true, 0) => 50.0,
            (true, _) => -50.0,
        }
    }

    /// +10 dB on bins `k` and `k + 1`, giving window `w` one peak at point `k`.
    fn bumps(peaks: [usize; 2]) -> impl Fn(usize, usize) -> f64 {
        move |w, b| {
            let k = peaks[w];
            if b == k || b == k + 1 { 10.0 } else { 0.0 }
        }
    }

    fn mean_set(peaks: Vec<Peak>) -> PeakSet {
        PeakSet::new(CurveKind::Mean, peaks)
    }

    #[test]
    fn threshold_table() {
        let t = |f| {
            let s = StabilityThresholds::for_frequency(f);
            (s.epsilon, s.theta)
        };
        assert_eq!(t(0.1), (0.25, 0.48));
        assert_eq!(t(0.2), (0.20, 0.40));
        assert_eq!(t(0.49), (0.20, 0.40));
        assert_eq!(t(0.5), (0.15, 0.30));
        assert_eq!(t(1.0), (0.10, 0.25));
        assert_eq!(t(2.0), (0.10, 0.25));
        assert_eq!(t(2.01), (0.05, 0.20));
        assert_eq!(t(30.0), (0.05, 0.20));
    }

    #[test]
    fn log_std_limit_switches_at_half_hertz() {
        assert_eq!(log_std_limit(0.3), 3.0);
        assert_eq!(log_std_limit(0.5), 2.0);
    }

    #[test]
    fn clarity_finds_nearest_qualifying_samples() {
        let x: Vec<f64> = (1..=16).map(|i| i as f64 * 0.5).collect();
        // Peak at index 3 (2.0 Hz), amplitude 6.
        let y = vec![
            1.0, 2.0, 4.0, 6.0, 4.0, 3.5, 2.5, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
        ];
        let mut set = PeakSet::new(CurveKind::Mean, vec![Peak::new(3, 2.0, 6.0)]);
        check_clarity(&mut set, &x, &y);

        let peak = &set.peaks[0];
        // Below: 1.5 Hz has 4.0 (ratio 1.5); 1.0 Hz has 2.0 (ratio 3).
        assert_eq!(peak.f_minus.map(|p| p.frequency), Some(1.0));
        // Above: 2.5 Hz and 3.0 Hz are too high; 3.5 Hz gives 6 / 2.5 = 2.4.
        assert_eq!(peak.f_plus.map(|p| p.frequency), Some(3.5));
        assert!(peak.pass_list().passed(PeakTest::AmplitudeClarity));
        assert_eq!(peak.score(), 3);
        assert_eq!(set.tests_run, 3);
    }

    #[test]
    fn clarity_respects_search_windows() {
        let x: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        // Only the far sample at 1 Hz is low; it lies below f0/4 for f0 = 5.
        let y = vec![0.1, 3.0, 3.0, 3.0, 5.0, 3.0, 3.0, 3.0, 3.0, 3.0];
        let mut set = PeakSet::new(CurveKind::Mean, vec![Peak::new(4, 5.0, 5.0)]);
        check_clarity(&mut set, &x, &y);

        let peak = &set.peaks[0];
        assert!(peak.f_minus.is_none());
        assert!(peak.f_plus.is_none());
        assert!(!peak.pass_list().passed(PeakTest::ClarityBelow));
        assert!(!peak.pass_list().passed(PeakTest::ClarityAbove));
        assert_eq!(peak.score(), 1);
    }

    #[test]
    fn frequency_stability_needs_both_matches() {
        let bound = |fs: &[f64], kind| {
            PeakSet::new(kind, fs.iter().map(|&f| Peak::new(0, f, 3.0)).collect())
        };
        let minus = bound(&[1.0, 2.04], CurveKind::MinusStd);
        let plus = bound(&[1.97, 6.0], CurveKind::PlusStd);
        let far_plus = bound(&[2.5], CurveKind::PlusStd);

        let mut set = PeakSet::new(CurveKind::Mean, vec![Peak::new(0, 2.0, 5.0)]);
        check_frequency_stability(&mut set, &minus, &plus);
        let peak = &set.peaks[0];
        assert_eq!(peak.match_below, Some(2.04));
        assert_eq!(peak.match_above, Some(1.97));
        assert!(peak.pass_list().passed(PeakTest::FrequencyStability));

        let mut set = PeakSet::new(CurveKind::Mean, vec![Peak::new(0, 2.0, 5.0)]);
        check_frequency_stability(&mut set, &minus, &far_plus);
        assert_eq!(set.peaks[0].pass_list().get(PeakTest::FrequencyStability), Some(false));

        let mut set = PeakSet::new(CurveKind::Mean, vec![Peak::new(0, 2.0, 5.0)]);
        check_frequency_stability(&mut set, &PeakSet::empty(CurveKind::MinusStd), &plus);
        assert!(set.peaks[0].match_below.is_none());
        assert!(!set.peaks[0].pass_list().passed(PeakTest::FrequencyStability));
    }

    #[test]
    fn window_length_and_cycles_fail_at_threshold() {
        // 10 / Lw = 2 Hz and Lw * Nw * 2 Hz = 200 cycles.
        let curve = dispersed_curve(20, 5.0, |_, _| 0.0);
        let mut set = mean_set(vec![Peak::new(15, 2.0, 5.0), Peak::new(16, 2.125, 5.0)]);
        check_curve_reliability(&mut set, &curve);

        let at = set.peaks[0].pass_list();
        assert_eq!(at.get(PeakTest::WindowLength), Some(false));
        assert_eq!(at.get(PeakTest::SignificantCycles), Some(false));
        assert_eq!(at.get(PeakTest::LowCurveStd), Some(true));

        let above = set.peaks[1].pass_list();
        assert_eq!(above.get(PeakTest::WindowLength), Some(true));
        assert_eq!(above.get(PeakTest::SignificantCycles), Some(true));
        assert_eq!(set.tests_run, 3);
    }

    #[test]
    fn short_sparse_windows_fail_reliability() {
        let curve = dispersed_curve(2, 3.0, |_, _| 0.0);
        let mut set = mean_set(vec![Peak::new(15, 2.0, 5.0)]);
        check_curve_reliability(&mut set, &curve);

        let passes = set.peaks[0].pass_list();
        assert_eq!(passes.get(PeakTest::WindowLength), Some(false));
        assert_eq!(passes.get(PeakTest::SignificantCycles), Some(false));
        assert_eq!(set.peaks[0].score(), 1);
    }

    #[test]
    fn low_curve_std_ignores_sample_at_twice_f0() {
        // Point 15 (2.0 Hz) and above carry log-std 2.5; point 14 only half.
        let curve = dispersed_curve(2, 60.0, split_from(15));
        assert!((curve.log_std()[15] - 2.5).abs() < 1e-9);
        assert!(curve.log_std()[14] < 2.0);
        assert!(curve.log_std()[..14].iter().all(|&s| s == 0.0));

        let mut set = mean_set(vec![Peak::new(7, 1.0, 5.0), Peak::new(8, 1.125, 5.0)]);
        check_curve_reliability(&mut set, &curve);

        // [0.5, 2.0) stops short of the dispersed samples.
        assert_eq!(set.peaks[0].pass_list().get(PeakTest::LowCurveStd), Some(true));
        // [0.5625, 2.25) reaches 2.0 and 2.125 Hz.
        assert_eq!(set.peaks[1].pass_list().get(PeakTest::LowCurveStd), Some(false));
    }

    #[test]
    fn low_curve_std_allows_three_below_half_hertz() {
        let curve = dispersed_curve(2, 60.0, split_from(0));
        assert!(curve.log_std().iter().all(|&s| (s - 2.5).abs() < 1e-9));

        let mut set = mean_set(vec![Peak::new(2, 0.375, 5.0), Peak::new(3, 0.5, 5.0)]);
        check_curve_reliability(&mut set, &curve);

        assert_eq!(set.peaks[0].pass_list().get(PeakTest::LowCurveStd), Some(true));
        assert_eq!(set.peaks[1].pass_list().get(PeakTest::LowCurveStd), Some(false));
    }

    #[test]
    fn amplitude_std_reads_log_std_at_peak_index() {
        let curve = dispersed_curve(2, 60.0, split_from(15));
        let mut set = mean_set(vec![Peak::new(1, 0.25, 3.0), Peak::new(20, 2.625, 3.0)]);
        check_stability(&mut set, &curve);
        assert_eq!(set.tests_run, 2);

        let first = &set.peaks[0];
        assert_eq!(first.sa, Some(0.0));
        assert_eq!(first.pass_list().get(PeakTest::AmplitudeStd), Some(true));

        let second = &set.peaks[1];
        assert_eq!(second.sa, Some(curve.log_std()[20]));
        assert_ne!(second.sa, Some(curve.log_std()[1]));
        assert_eq!(second.pass_list().get(PeakTest::AmplitudeStd), Some(false));

        // Step curves have no window peaks, so every window sits at f0.
        assert_eq!(first.sf, Some(0.0));
        assert_eq!(second.pass_list().get(PeakTest::FrequencyStd), Some(true));
    }

    #[test]
    fn frequency_std_fails_at_threshold() {
        // Window peaks at 1.125 and 1.375 Hz around f0 = 1.25: σf = 0.125 = 0.10 * f0.
        let curve = dispersed_curve(2, 60.0, bumps([8, 10]));
        assert_eq!(find_peaks(&curve.window_curves()[0]), vec![8]);
        assert_eq!(find_peaks(&curve.window_curves()[1]), vec![10]);

        let mut set = mean_set(vec![Peak::new(9, 1.25, 3.0)]);
        check_stability(&mut set, &curve);
        let peak = &set.peaks[0];
        assert_eq!(peak.sf, Some(0.125));
        assert_eq!(peak.pass_list().get(PeakTest::FrequencyStd), Some(false));
    }

    #[test]
    fn frequency_std_compares_window_spread() {
        let check = |peaks| {
            let curve = dispersed_curve(2, 60.0, bumps(peaks));
            let mut set = mean_set(vec![Peak::new(9, 1.25, 3.0)]);
            check_stability(&mut set, &curve);
            let peak = set.peaks.remove(0);
            (peak.sf, peak.pass_list().get(PeakTest::FrequencyStd))
        };

        assert_eq!(check([8, 9]), (Some(0.0625), Some(true)));
        assert_eq!(check([7, 11]), (Some(0.25), Some(false)));
    }

    #[test]
    fn frequency_std_uses_nearest_window_peak() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let windows = vec![vec![2, 5, 8], vec![4], vec![], vec![6, 9]];
        // Nearest to 5: 5, 4, (fallback 5), 6
        let sf = frequency_std(&x, 5, &windows);
        let expected = nan_std([5.0, 4.0, 5.0, 6.0]);
        assert!((sf - expected).abs() < 1e-12);
    }

    #[test]
    fn frequency_std_without_windows_is_zero() {
        assert_eq!(frequency_std(&[1.0, 2.0], 1, &[]), 0.0);
    }

    #[test]
    fn significant_cycles_formula() {
        assert_eq!(significant_cycles(30.0, 50.0, 2.0), 3000.0);
    }
}
