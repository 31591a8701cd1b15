//! Crate-level error taxonomy, composed from per-component errors via
//! `From`, in the idiom of the teacher's `fork_choice::Error<T>`.

use osp_types::{StorageError, TransitionError};
use std::fmt;

/// Back-pressure / closure signal for a single output-channel subscription
/// (SPEC_FULL.md §4.6, §7).
#[derive(Debug, Clone)]
pub enum ChannelError {
    /// The subscriber fell behind by `n` messages and was dropped. Other
    /// subscribers are unaffected; the producer is unaffected.
    Lagged(u64),
    /// The channel's sender side has been dropped (the processor stopped).
    Closed,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::Lagged(n) => write!(f, "subscriber lagged by {} messages", n),
            ChannelError::Closed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for ChannelError {}

/// Errors from `HeadTracker::update_head` (SPEC_FULL.md §4.3).
#[derive(Debug, Clone)]
pub enum HeadTrackerError {
    /// The head function returned a block with no tuple in either the
    /// tuple-details cache or tuple storage. A bug-or-corruption condition,
    /// never expected in a correctly operating surrounding system.
    HeadTupleMissing,
    Storage(StorageError),
}

impl fmt::Display for HeadTrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadTrackerError::HeadTupleMissing => write!(f, "head tuple missing from cache and storage"),
            HeadTrackerError::Storage(e) => write!(f, "storage error resolving head tuple: {}", e),
        }
    }
}

impl std::error::Error for HeadTrackerError {}

impl From<StorageError> for HeadTrackerError {
    fn from(e: StorageError) -> Self {
        HeadTrackerError::Storage(e)
    }
}

/// The crate-level error every public `Processor` method can return.
#[derive(Debug, Clone)]
pub enum ObservableStateError {
    Channel(ChannelError),
    HeadTupleMissing,
    Storage(StorageError),
    Transition(TransitionError),
}

impl fmt::Display for ObservableStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservableStateError::Channel(e) => write!(f, "{}", e),
            ObservableStateError::HeadTupleMissing => write!(f, "head tuple missing from cache and storage"),
            ObservableStateError::Storage(e) => write!(f, "{}", e),
            ObservableStateError::Transition(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ObservableStateError {}

impl From<ChannelError> for ObservableStateError {
    fn from(e: ChannelError) -> Self {
        ObservableStateError::Channel(e)
    }
}

impl From<TransitionError> for ObservableStateError {
    fn from(e: TransitionError) -> Self {
        ObservableStateError::Transition(e)
    }
}

impl From<StorageError> for ObservableStateError {
    fn from(e: StorageError) -> Self {
        ObservableStateError::Storage(e)
    }
}

impl From<HeadTrackerError> for ObservableStateError {
    fn from(e: HeadTrackerError) -> Self {
        match e {
            HeadTrackerError::HeadTupleMissing => ObservableStateError::HeadTupleMissing,
            HeadTrackerError::Storage(e) => ObservableStateError::Storage(e),
        }
    }
}
