//! HVSR core - Horizontal-to-vertical spectral ratio curves and peak quality
//!
//! This crate turns three-component PSD estimates of ambient seismic noise
//! into an H/V curve and grades its resonance peaks against the SESAME (2004)
//! criteria:
//!
//! - [`psd`] - Per-channel PSD input and channel alignment
//! - [`power`] - dB to power conversion and per-bin-pair integration
//! - [`combine`] - Horizontal combination methods and the H/V ratio
//! - [`curve`] - Ensemble and per-window curve synthesis with dispersion statistics
//! - [`peaks`] - Peak location and the per-peak test record
//! - [`quality`] - SESAME reliability, clarity, and stability tests
//! - [`selection`] - Best-peak selection
//! - [`report`] - Human-readable peak report
//! - [`pipeline`] - One-call analysis
//!
//! PSD estimation itself happens upstream; input here is already in dB per
//! bin and time window.
//!
//! ## Example Workflow
//!
//! ```rust,ignore
//! use hvsr_core::{CombinationMethod, HvsrSettings, ThreeComponentPsd, analyze};
//!
//! // 1. PSDs from an external estimator
//! let psd = ThreeComponentPsd::new(vertical, north, east, 30.0);
//!
//! // 2. Synthesize and assess
//! let settings = HvsrSettings::new(CombinationMethod::GeometricMean);
//! let analysis = analyze(&psd, &settings)?;
//!
//! // 3. Report
//! if let Some(report) = analysis.report() {
//!     println!("{report}");
//! }
//! ```

pub mod combine;
pub mod curve;
pub mod error;
pub mod peaks;
pub mod pipeline;
pub mod power;
pub mod psd;
pub mod quality;
pub mod report;
pub mod selection;
pub mod settings;
pub mod stats;

pub use combine::combine;
pub use curve::{CurveKind, CurveSynthesizer, HvsrCurve, WaterLevels};
pub use error::HvsrError;
pub use peaks::{CurvePoint, PassList, Peak, PeakSet, PeakTest, TestCategory};
pub use pipeline::{HvsrAnalysis, analyze};
pub use psd::{AlignedPsd, BinAxis, PsdSeries, ThreeComponentPsd};
pub use quality::{PeakAssessment, QualityAssessor, StabilityThresholds};
pub use report::PeakReport;
pub use selection::best_peak;
pub use settings::{
    CombinationMethod, DEFAULT_BAND, DEFAULT_OUTLIER_CURVE_STD, DEFAULT_WATER_LEVEL,
    FrequencyBand, HvsrSettings, StabilityCurves,
};
