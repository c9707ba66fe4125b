//! Sun times port — where sunrise and sunset come from.

use chrono::NaiveDate;

use kelvin_domain::error::KelvinError;
use kelvin_domain::schedule::SunTimes;

/// Supplies sunrise and sunset for a date. Kelvin never computes them itself.
pub trait SunTimesProvider {
    /// Sun times for `date`, in local time.
    ///
    /// # Errors
    ///
    /// Returns an error when no sun times can be supplied for `date`.
    fn sun_times(&self, date: NaiveDate) -> Result<SunTimes, KelvinError>;
}
