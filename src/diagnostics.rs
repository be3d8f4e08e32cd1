// src/diagnostics.rs
use log::{debug, warn};
use std::fmt;

use crate::live::FetchError;
use crate::storage::{Slot, StorageError};

/// Marker for a failure that has been reported and deliberately swallowed.
/// Only [`Diagnostics::ignore`] produces one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ignored(());

#[derive(Debug)]
pub enum Failure {
    StorageRead { slot: Slot, error: StorageError },
    StorageDecode { slot: Slot, error: serde_json::Error },
    StorageWrite { slot: Slot, error: StorageError },
    LiveFetch { url: String, error: FetchError },
    FragmentDiscarded { reason: String },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageRead { slot, error } => write!(f, "Failed to read slot {}: {}", slot, error),
            Self::StorageDecode { slot, error } => {
                write!(f, "Ignoring malformed slot {}: {}", slot, error)
            }
            Self::StorageWrite { slot, error } => {
                write!(f, "Failed to write slot {}: {}", slot, error)
            }
            Self::LiveFetch { url, error } => write!(f, "Live data fetch from {} failed: {}", url, error),
            Self::FragmentDiscarded { reason } => write!(f, "Discarded live fragment: {}", reason),
        }
    }
}

pub trait Diagnostics: Send + Sync {
    fn report(&self, failure: &Failure);

    fn ignore(&self, failure: Failure) -> Ignored {
        self.report(&failure);
        Ignored(())
    }
}

/// Default sink: forwards every failure to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&self, failure: &Failure) {
        match failure {
            Failure::FragmentDiscarded { .. } => debug!("{}", failure),
            _ => warn!("{}", failure),
        }
    }
}
