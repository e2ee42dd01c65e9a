//! Human-readable peak report.
//!
//! Formatting lives here so that [`Peak`] stays a plain record of numbers and
//! booleans.

use std::fmt;

use crate::curve::HvsrCurve;
use crate::peaks::{Peak, PeakTest};
use crate::quality::{StabilityThresholds, log_std_limit, significant_cycles};

const PASS: char = '✔';
const FAIL: char = '✘';
const NOT_RUN: char = '-';

/// Printable summary of one assessed peak.
#[derive(Debug, Clone, Copy)]
pub struct PeakReport<'a> {
    peak: &'a Peak,
    curve: &'a HvsrCurve,
    max_score: u32,
}

impl<'a> PeakReport<'a> {
    /// Report `peak`, found on `curve`, out of `max_score` possible points.
    pub fn new(peak: &'a Peak, curve: &'a HvsrCurve, max_score: u32) -> Self {
        Self {
            peak,
            curve,
            max_score,
        }
    }

    fn mark(&self, test: PeakTest) -> char {
        match self.peak.pass_list().get(test) {
            Some(true) => PASS,
            Some(false) => FAIL,
            None => NOT_RUN,
        }
    }

    fn line(
        &self,
        f: &mut fmt::Formatter<'_>,
        test: PeakTest,
        title: &str,
        detail: &str,
    ) -> fmt::Result {
        writeln!(f, "\t\t{} {}: {}", self.mark(test), title, detail)
    }
}

impl fmt::Display for PeakReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.peak;
        let lw = self.curve.window_length_s();
        let nw = self.curve.window_count() as f64;

        writeln!(f, "{:.3} Hz Peak Frequency", p.f0)?;
        if p.passes() {
            writeln!(f, "{PASS} Curve at {:.3} Hz passed quality checks", p.f0)?;
        } else {
            writeln!(f, "{FAIL} Peak at {:.3} Hz did NOT pass quality checks", p.f0)?;
        }

        writeln!(f, "\tCurve Tests:")?;
        self.line(
            f,
            PeakTest::WindowLength,
            "Length of processing windows",
            &format!("{:.3} > 10 / {}", p.f0, lw),
        )?;
        self.line(
            f,
            PeakTest::SignificantCycles,
            "Number of significant cycles",
            &format!("{:.0} > 200", significant_cycles(lw, nw, p.f0)),
        )?;
        self.line(
            f,
            PeakTest::LowCurveStd,
            "Low StDev. of H/V Curve over time",
            &format!(
                "σ_A for all freqs {:.3}-{:.3} < {}",
                0.5 * p.f0,
                2.0 * p.f0,
                log_std_limit(p.f0)
            ),
        )?;

        writeln!(f, "\tPeak Tests:")?;
        let below = match p.f_minus {
            Some(pt) => format!("A({:.3}): {:.3} < {:.3}", pt.frequency, pt.amplitude, p.a0 / 2.0),
            None => format!(
                "No A_h/v in freqs {:.3}-{:.3} < {:.3}",
                p.f0 / 4.0,
                p.f0,
                p.a0 / 2.0
            ),
        };
        self.line(f, PeakTest::ClarityBelow, "Clarity Below Peak Frequency", &below)?;

        let above = match p.f_plus {
            Some(pt) => format!("A({:.3}): {:.3} < {:.3}", pt.frequency, pt.amplitude, p.a0 / 2.0),
            None => format!(
                "No A_h/v in freqs {:.3}-{:.3} < {:.3}",
                p.f0,
                p.f0 * 4.0,
                p.a0 / 2.0
            ),
        };
        self.line(f, PeakTest::ClarityAbove, "Clarity Above Peak Frequency", &above)?;

        self.line(
            f,
            PeakTest::AmplitudeClarity,
            "Clarity of Peak Amplitude",
            &format!("{:.2} > 2.0", p.a0),
        )?;

        let matched = |m: Option<f64>| m.map_or_else(|| "none".to_string(), |f| format!("{f:.3}"));
        self.line(
            f,
            PeakTest::FrequencyStability,
            "Stability of Peak Freq. Over time",
            &format!(
                "{} and {} within ±5% of {:.3}",
                matched(p.match_below),
                matched(p.match_above),
                p.f0
            ),
        )?;

        let t = StabilityThresholds::for_frequency(p.f0);
        let sf = p.sf.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
        let sa = p.sa.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
        self.line(
            f,
            PeakTest::FrequencyStd,
            "Stability of Peak (Freq. StDev)",
            &format!("{sf} < {:.2} * {:.3}", t.epsilon, p.f0),
        )?;
        self.line(
            f,
            PeakTest::AmplitudeStd,
            "Stability of Peak (Amp. StDev)",
            &format!("{sa} < {:.2}", t.theta),
        )?;

        write!(f, "Score: {} / {}", p.score(), self.max_score)
    }
}
