//! Wires a `Processor` and schedules its background tasks, in the idiom of
//! the teacher's `BeaconChainBuilder`: fields are set incrementally via
//! consuming setter methods, then validated and assembled in `build()`.

use crate::head_tracker::HeadTracker;
use crate::processor::{ContinuousInput, Processor};
use crate::projector::StateProjector;
use crate::publisher::StatePublisher;
use crate::tuple_cache::TupleDetailsCache;
use attestation_pool::AttestationPool;
use osp_types::{
    ChainSpec, HeadFunction, ObservableStateConfig, ObservableStateTypes, StateTransitions,
    TupleStorage,
};
use slog::{o, warn, Logger};
use std::sync::Arc;
use task_executor::TaskExecutor;
use tokio::sync::mpsc;

pub struct ProcessorBuilder<T: ObservableStateTypes> {
    transitions: Option<Arc<dyn StateTransitions<T>>>,
    spec: Option<Arc<dyn ChainSpec<T>>>,
    head_function: Option<Arc<dyn HeadFunction<T>>>,
    tuple_storage: Option<Arc<dyn TupleStorage<T>>>,
    executor: Option<TaskExecutor>,
    config: ObservableStateConfig,
    log: Option<Logger>,
}

impl<T: ObservableStateTypes> Default for ProcessorBuilder<T> {
    fn default() -> Self {
        Self {
            transitions: None,
            spec: None,
            head_function: None,
            tuple_storage: None,
            executor: None,
            config: ObservableStateConfig::default(),
            log: None,
        }
    }
}

impl<T: ObservableStateTypes> ProcessorBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(mut self, transitions: Arc<dyn StateTransitions<T>>) -> Self {
        self.transitions = Some(transitions);
        self
    }

    pub fn spec(mut self, spec: Arc<dyn ChainSpec<T>>) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn head_function(mut self, head_function: Arc<dyn HeadFunction<T>>) -> Self {
        self.head_function = Some(head_function);
        self
    }

    pub fn tuple_storage(mut self, tuple_storage: Arc<dyn TupleStorage<T>>) -> Self {
        self.tuple_storage = Some(tuple_storage);
        self
    }

    pub fn executor(mut self, executor: TaskExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn config(mut self, config: ObservableStateConfig) -> Self {
        self.config = config;
        self
    }

    pub fn logger(mut self, log: Logger) -> Self {
        self.log = Some(log);
        self
    }

    /// Assembles the processor and schedules its three executors (SPEC_FULL.md
    /// §5): input reception for attestations, the regular-job aggregation
    /// task, and the continuous task draining `continuous_inputs`.
    pub fn build(
        self,
        mut attestations: mpsc::Receiver<T::Attestation>,
        mut continuous_inputs: mpsc::Receiver<ContinuousInput<T>>,
    ) -> Result<Arc<Processor<T>>, String> {
        let transitions = self.transitions.ok_or("ProcessorBuilder requires transitions")?;
        let spec = self.spec.ok_or("ProcessorBuilder requires spec")?;
        let head_function = self
            .head_function
            .ok_or("ProcessorBuilder requires head_function")?;
        let tuple_storage = self
            .tuple_storage
            .ok_or("ProcessorBuilder requires tuple_storage")?;
        let executor = self.executor.ok_or("ProcessorBuilder requires executor")?;
        let log = self.log.unwrap_or_else(|| Logger::root(slog::Discard, o!()));

        let tuple_cache = Arc::new(TupleDetailsCache::new(self.config.tuple_cache_capacity));
        let pool = Arc::new(AttestationPool::new(log.new(o!("component" => "attestation_pool"))));
        let head_tracker = Arc::new(HeadTracker::new(
            head_function,
            tuple_storage,
            tuple_cache.clone(),
            self.config.channel_capacity,
            log.new(o!("component" => "head_tracker")),
        ));
        let projector = StateProjector::new(transitions, spec.clone());
        let publisher = Arc::new(StatePublisher::new(projector, self.config.channel_capacity));

        let processor = Arc::new(Processor::new(
            pool,
            tuple_cache,
            head_tracker,
            publisher,
            spec,
            self.config.clone(),
        ));

        {
            let processor = processor.clone();
            executor.spawn(
                async move {
                    while let Some(attestation) = attestations.recv().await {
                        processor.offer_attestation(attestation);
                    }
                },
                "attestation_input",
            );
        }

        {
            let processor = processor.clone();
            let log = executor.log("continuous");
            executor.spawn(
                async move {
                    while let Some(input) = continuous_inputs.recv().await {
                        let result = match input {
                            ContinuousInput::Slot(slot) => processor.on_new_slot(slot),
                            ContinuousInput::BlockTuple(details) => processor.on_block_tuple(details),
                        };
                        if let Err(e) = result {
                            warn!(log, "Processor tick failed"; "error" => %e);
                        }
                    }
                },
                "continuous",
            );
        }

        {
            let processor = processor.clone();
            let period = self.config.aggregation_period;
            executor.spawn(
                async move {
                    let mut interval = tokio::time::interval(period);
                    loop {
                        interval.tick().await;
                        processor.run_aggregation_job_once();
                    }
                },
                "aggregation",
            );
        }

        Ok(processor)
    }
}
