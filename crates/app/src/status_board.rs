//! Status board — the latest snapshot of every light, for status reports.

use std::sync::{Arc, PoisonError, RwLock};

use kelvin_domain::error::{KelvinError, NotFoundError};
use kelvin_domain::id::LightId;
use kelvin_domain::light::LightStatus;

/// Shared, read-mostly copy of the light statuses.
///
/// The dispatcher replaces the whole snapshot after every tick; readers
/// never see a half-updated board.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    statuses: Arc<RwLock<Vec<LightStatus>>>,
}

impl StatusBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot.
    pub fn publish(&self, statuses: Vec<LightStatus>) {
        *self
            .statuses
            .write()
            .unwrap_or_else(PoisonError::into_inner) = statuses;
    }

    /// Every light, ordered by id.
    #[must_use]
    pub fn all(&self) -> Vec<LightStatus> {
        let mut statuses = self
            .statuses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        statuses.sort_by_key(|status| status.id);
        statuses
    }

    /// One light.
    ///
    /// # Errors
    ///
    /// Returns [`KelvinError::NotFound`] when no light has this id.
    pub fn get(&self, id: LightId) -> Result<LightStatus, KelvinError> {
        self.statuses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|status| status.id == id)
            .cloned()
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Light",
                    id: id.to_string(),
                }
                .into()
            })
    }
}
