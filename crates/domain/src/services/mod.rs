//! Domain services for the Farm Manager client.
//!
//! Services are pure functions over domain models; none of them perform I/O.

pub mod membership_diff;
pub mod threshold;
pub mod time_series;
pub mod variance;

pub use membership_diff::{diff, MembershipDiff};
pub use threshold::is_alert;
pub use time_series::{build, trailing_days, TimeSeriesGrid, TimeSeriesRow};
pub use variance::{variance, VarianceDirection, ZERO_BASELINE_VARIANCE};
