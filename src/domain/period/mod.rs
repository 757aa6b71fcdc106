//! Period & cutoff calculation.
//!
//! Pure functions mapping a filter selection to the "as of" cutoff dates and
//! the previous period used for trend comparison.

mod cutoff;
mod reference;

pub use cutoff::{compute_cutoffs, CutoffPlan, DateBasis, PeriodFilter};
pub use reference::{PeriodReference, MAX_YEAR, MIN_YEAR};
