use thiserror::Error;

use crate::domain::{BusError, EnvelopeError};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Bus(#[from] BusError),
}
