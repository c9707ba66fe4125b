//! Virtual bulb error types.

use kelvin_domain::error::BulbError;

/// Errors raised by a simulated bulb.
#[derive(Debug, thiserror::Error)]
pub enum VirtualBulbError {
    /// The bulb was made unreachable with `set_reachable(false)`.
    #[error("virtual bulb is offline")]
    Offline,

    /// Writes were made to fail with `fail_writes(true)`.
    #[error("virtual bulb rejected the write")]
    WriteRejected,
}

impl VirtualBulbError {
    /// Wrap as a failed write, whatever the cause.
    pub fn into_write_failed(self) -> BulbError {
        BulbError::WriteFailed(Box::new(self))
    }
}

impl From<VirtualBulbError> for BulbError {
    fn from(err: VirtualBulbError) -> Self {
        match err {
            VirtualBulbError::Offline => Self::Unreachable(Box::new(err)),
            VirtualBulbError::WriteRejected => Self::WriteFailed(Box::new(err)),
        }
    }
}
