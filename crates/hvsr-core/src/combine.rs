//! Horizontal/vertical combination for one frequency bin.

use crate::error::HvsrError;
use crate::settings::CombinationMethod;

/// Combine linear bin powers into one H/V ratio.
///
/// `p1` and `p2` are the two horizontal components in either order; every
/// method is symmetric in them. Returns NaN when the vertical power is zero,
/// negative, or not finite, since no ratio can be derived from that bin.
/// Fails only for [`CombinationMethod::DiffuseField`].
pub fn combine(
    method: CombinationMethod,
    pz: f64,
    p1: f64,
    p2: f64,
) -> Result<f64, HvsrError> {
    let h1 = p1.sqrt();
    let h2 = p2.sqrt();

    let h = match method {
        CombinationMethod::ArithmeticMean => (h1 + h2) / 2.0,
        CombinationMethod::GeometricMean => (h1 * h2).sqrt(),
        CombinationMethod::VectorSummation => (p1 + p2).sqrt(),
        CombinationMethod::QuadraticMean => ((p1 + p2) / 2.0).sqrt(),
        CombinationMethod::MaximumHorizontal => h1.max(h2),
        CombinationMethod::DiffuseField => return Err(HvsrError::UnsupportedMethod(method)),
    };

    if !(pz.is_finite() && pz > 0.0) {
        return Ok(f64::NAN);
    }

    Ok(h / pz.sqrt())
}
