//! The Observable State Processor: the reactive core that turns wall-clock
//! slot ticks, gossiped attestations and imported block tuples into three
//! published streams — head, observable state, pending operations
//! (SPEC_FULL.md §1–§6).
//!
//! Every type here is generic over `osp_types::ObservableStateTypes`, in
//! the idiom of the teacher's `BeaconChain<T: BeaconChainTypes>`.

mod builder;
mod channel;
mod error;
mod head_tracker;
mod metrics;
mod processor;
mod projector;
mod publisher;
mod tuple_cache;

pub mod testing;

pub use builder::ProcessorBuilder;
pub use channel::{ReplayChannel, ReplaySubscription};
pub use error::{ChannelError, HeadTrackerError, ObservableStateError};
pub use processor::{ContinuousInput, Processor};
pub use tuple_cache::TupleDetailsCache;
