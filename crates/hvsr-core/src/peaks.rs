//! Peak location, candidate filtering, and the per-peak test record.

use serde::Serialize;

use crate::curve::CurveKind;
use crate::settings::FrequencyBand;

/// Indices strictly greater than both neighbours.
///
/// The first and last samples are never reported. Any NaN in `y` yields an
/// empty result, since adjacency comparisons are meaningless around NaN.
pub fn find_peaks(y: &[f64]) -> Vec<usize> {
    if y.len() < 3 || y.iter().any(|v| v.is_nan()) {
        return Vec::new();
    }

    (1..y.len() - 1)
        .filter(|&i| y[i] > y[i - 1] && y[i] > y[i + 1])
        .collect()
}

/// Keep maxima that exceed the water level and lie inside the band.
///
/// `x`, `y` and `water_level` are indexed alike; `water_level` may vary per
/// index.
pub fn init_peaks(
    x: &[f64],
    y: &[f64],
    indices: &[usize],
    band: FrequencyBand,
    water_level: &[f64],
) -> Vec<Peak> {
    indices
        .iter()
        .copied()
        .filter(|&i| y[i] > water_level[i] && band.contains(x[i]))
        .map(|i| Peak::new(i, x[i], y[i]))
        .collect()
}

/// Grouping of the nine tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCategory {
    /// Curve reliability (applies to the mean curve only).
    Reliability,
    /// Peak clarity.
    Clarity,
    /// Peak stability.
    Stability,
}

/// One SESAME-2004 criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakTest {
    /// f0 > 10 / Lw
    WindowLength,
    /// Lw * Nw * f0 > 200
    SignificantCycles,
    /// log-std below 2 (3 under 0.5 Hz) on [f0/2, 2 f0)
    LowCurveStd,
    /// A0 / A(f-) > 2 for some f- in [f0/4, f0)
    ClarityBelow,
    /// A0 / A(f+) > 2 for some f+ in (f0, 4 f0]
    ClarityAbove,
    /// A0 > 2
    AmplitudeClarity,
    /// Peak reappears within ±5% on both dispersion curves
    FrequencyStability,
    /// Sf < ε(f0) * f0
    FrequencyStd,
    /// Sa < θ(f0)
    AmplitudeStd,
}

impl PeakTest {
    /// All tests in execution order.
    pub const ALL: [PeakTest; 9] = [
        PeakTest::WindowLength,
        PeakTest::SignificantCycles,
        PeakTest::LowCurveStd,
        PeakTest::ClarityBelow,
        PeakTest::ClarityAbove,
        PeakTest::AmplitudeClarity,
        PeakTest::FrequencyStability,
        PeakTest::FrequencyStd,
        PeakTest::AmplitudeStd,
    ];

    /// Number of distinct tests.
    pub const COUNT: usize = Self::ALL.len();

    /// Category this test belongs to.
    pub fn category(self) -> TestCategory {
        match self {
            PeakTest::WindowLength | PeakTest::SignificantCycles | PeakTest::LowCurveStd => {
                TestCategory::Reliability
            }
            PeakTest::ClarityBelow | PeakTest::ClarityAbove | PeakTest::AmplitudeClarity => {
                TestCategory::Clarity
            }
            PeakTest::FrequencyStability | PeakTest::FrequencyStd | PeakTest::AmplitudeStd => {
                TestCategory::Stability
            }
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            PeakTest::WindowLength => "Window Length Freq.",
            PeakTest::SignificantCycles => "Significant Cycles",
            PeakTest::LowCurveStd => "Low Curve StDev. over time",
            PeakTest::ClarityBelow => "Peak Freq. Clarity Below",
            PeakTest::ClarityAbove => "Peak Freq. Clarity Above",
            PeakTest::AmplitudeClarity => "Peak Amp. Clarity",
            PeakTest::FrequencyStability => "Freq. Stability",
            PeakTest::FrequencyStd => "Peak Stability (freq. std)",
            PeakTest::AmplitudeStd => "Peak Stability (amp. std)",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Outcome of each test that has run on a peak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassList {
    outcomes: [Option<bool>; PeakTest::COUNT],
}

impl PassList {
    /// Outcome of `test`, or `None` if it has not run.
    pub fn get(&self, test: PeakTest) -> Option<bool> {
        self.outcomes[test.slot()]
    }

    /// Whether `test` ran and passed.
    pub fn passed(&self, test: PeakTest) -> bool {
        self.get(test) == Some(true)
    }

    /// `(test, passed)` for every test that has run, in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (PeakTest, bool)> + '_ {
        PeakTest::ALL
            .into_iter()
            .filter_map(|t| self.get(t).map(|p| (t, p)))
    }

    /// Number of passing tests.
    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| **o == Some(true)).count()
    }

    /// Number of passing tests in `category`.
    pub fn passed_in(&self, category: TestCategory) -> usize {
        self.iter()
            .filter(|(t, p)| *p && t.category() == category)
            .count()
    }

    /// Number of tests that have run.
    pub fn len(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_some()).count()
    }

    /// Whether no test has run.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set(&mut self, test: PeakTest, passed: bool) -> Option<bool> {
        self.outcomes[test.slot()].replace(passed)
    }
}

impl Serialize for PassList {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (test, passed) in self.iter() {
            map.serialize_entry(&test, &passed)?;
        }
        map.end()
    }
}

/// A curve sample used as clarity evidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    /// Frequency in Hz.
    pub frequency: f64,
    /// H/V amplitude at that frequency.
    pub amplitude: f64,
}

/// One candidate resonance and the evidence gathered by the tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Peak {
    /// Index of the peak on its curve.
    pub index: usize,
    /// Peak frequency in Hz.
    pub f0: f64,
    /// Peak amplitude.
    pub a0: f64,
    /// First sample below f0 that satisfies the clarity ratio.
    pub f_minus: Option<CurvePoint>,
    /// First sample above f0 that satisfies the clarity ratio.
    pub f_plus: Option<CurvePoint>,
    /// Nearest peak frequency on the lower dispersion curve.
    pub match_below: Option<f64>,
    /// Nearest peak frequency on the upper dispersion curve.
    pub match_above: Option<f64>,
    /// Frequency standard deviation across windows.
    pub sf: Option<f64>,
    /// log10 amplitude standard deviation at the peak.
    pub sa: Option<f64>,
    score: u32,
    pass_list: PassList,
}

impl Peak {
    /// Fresh candidate with no tests run.
    pub fn new(index: usize, f0: f64, a0: f64) -> Self {
        Self {
            index,
            f0,
            a0,
            f_minus: None,
            f_plus: None,
            match_below: None,
            match_above: None,
            sf: None,
            sa: None,
            score: 0,
            pass_list: PassList::default(),
        }
    }

    /// Number of passed tests.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Test outcomes.
    pub fn pass_list(&self) -> &PassList {
        &self.pass_list
    }

    /// Store a test outcome, keeping the score equal to the pass count.
    pub fn record(&mut self, test: PeakTest, passed: bool) {
        if self.pass_list.set(test, passed) == Some(true) {
            self.score -= 1;
        }
        if passed {
            self.score += 1;
        }
    }

    /// All three curve reliability tests passed.
    pub fn curve_reliable(&self) -> bool {
        self.pass_list.passed_in(TestCategory::Reliability) == 3
    }

    /// At least five of the six clarity and stability tests passed.
    pub fn clarity_stability_passed(&self) -> bool {
        self.pass_list.passed_in(TestCategory::Clarity)
            + self.pass_list.passed_in(TestCategory::Stability)
            >= 5
    }

    /// Reliable curve and a clear, stable peak.
    pub fn passes(&self) -> bool {
        self.curve_reliable() && self.clarity_stability_passed()
    }
}

/// Candidate peaks found on one curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakSet {
    /// Curve the peaks were found on.
    pub kind: CurveKind,
    /// Candidates in ascending frequency order.
    pub peaks: Vec<Peak>,
    /// Number of tests executed against this set.
    pub tests_run: u32,
}

impl PeakSet {
    /// Peak set with no tests run yet.
    pub fn new(kind: CurveKind, peaks: Vec<Peak>) -> Self {
        Self {
            kind,
            peaks,
            tests_run: 0,
        }
    }

    /// Empty set.
    pub fn empty(kind: CurveKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Highest score any peak in this set could reach.
    pub fn max_score(&self) -> u32 {
        self.tests_run
    }

    /// Number of peaks.
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    /// Whether the set has no peaks.
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Iterate over peaks.
    pub fn iter(&self) -> impl Iterator<Item = &Peak> {
        self.peaks.iter()
    }
}
