//! Range classification of the final amount against the wallet ceiling

use crate::player::RangeLabel;

/// Bucket a final amount relative to the wallet ceiling `W`.
///
/// Runs after the full exclusion chain, since exclusions can zero a
/// previously computed amount. A zero amount, a non-positive ceiling, or any
/// unmatched case classifies as `NotApplicable`.
pub fn classify(final_amount: f64, ceiling: f64) -> RangeLabel {
    if final_amount <= 0.0 || ceiling <= 0.0 {
        return RangeLabel::NotApplicable;
    }
    if final_amount <= 0.5 * ceiling {
        RangeLabel::UnderHalf
    } else if final_amount <= ceiling {
        RangeLabel::HalfToFull
    } else {
        RangeLabel::NotApplicable
    }
}
