use chrono::NaiveDate;

use kelvin_app::ports::SunTimesProvider;
use kelvin_domain::error::KelvinError;
use kelvin_domain::schedule::SunTimes;

/// Returns the same sun times for every date.
#[derive(Debug, Clone, Copy)]
pub struct FixedSunTimes {
    sun: SunTimes,
}

impl FixedSunTimes {
    #[must_use]
    pub fn new(sun: SunTimes) -> Self {
        Self { sun }
    }
}

impl SunTimesProvider for FixedSunTimes {
    fn sun_times(&self, _date: NaiveDate) -> Result<SunTimes, KelvinError> {
        Ok(self.sun)
    }
}
