//! # Editor Session
//!
//! One session owns the scene store and the three worker actors, standing
//! in for the canvas glue: it snapshots store state into worker requests
//! and merges completed results back through batch mutations.
//!
//! The store lives on the calling thread; only copied messages cross into
//! the workers. Responses from distinct workers arrive in no particular
//! order relative to each other - callers correlate by result kind, never
//! by cross-worker FIFO.

use std::time::Duration;

use aurafx_scene::{Bounds, SceneStore, Vec3, Vertex, VertexId, VertexUpdate};
use aurafx_workers::{
    ChainCommand, ChainFrame, ChainItem, ChainWorker, SelectionQuery, SelectionResult,
    SelectionWorker, Transform, TransformRequest, TransformResultKind, TransformWorker,
    WorkerResult, WorkerStats,
};

use crate::config::EditorConfig;

/// How long a synchronous selection query waits for its reply.
const SELECTION_REPLY_TIMEOUT: Duration = Duration::from_millis(250);

/// The editor core: scene store plus worker actors.
#[derive(Debug)]
pub struct EditorSession {
    /// Loaded configuration.
    config: EditorConfig,
    /// The synchronous scene kernel.
    store: SceneStore,
    /// Batch transform math, off-thread.
    transform: TransformWorker,
    /// Selection-box hit testing, off-thread.
    selection: SelectionWorker,
    /// Chain-animation clock, off-thread.
    chain: ChainWorker,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// Creates a session with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Creates a session from a loaded configuration, spawning the three
    /// workers.
    #[must_use]
    pub fn with_config(config: EditorConfig) -> Self {
        let capacity = config.workers.channel_capacity;
        Self {
            config,
            store: SceneStore::with_slow_batch_threshold(config.scene.slow_batch_threshold()),
            transform: TransformWorker::spawn(capacity),
            selection: SelectionWorker::spawn(capacity),
            chain: ChainWorker::spawn(capacity),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Read access to the scene store.
    #[must_use]
    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    /// Mutable access to the scene store, for batch mutations.
    pub fn store_mut(&mut self) -> &mut SceneStore {
        &mut self.store
    }

    /// Inserts vertices into the store.
    pub fn insert_vertices(&mut self, vertices: Vec<Vertex>) {
        self.store.batch_insert(vertices);
    }

    /// Sends the referenced vertices to the transform worker.
    ///
    /// Ids no longer in the store are skipped; the batch carries whatever
    /// still exists. Nothing is sent when no id resolves. Returns the
    /// number of vertices submitted.
    ///
    /// # Errors
    ///
    /// Worker-boundary errors from [`TransformWorker::submit`].
    pub fn request_transform(&self, ids: &[VertexId], transform: Transform) -> WorkerResult<usize> {
        let vertices = self.snapshot(ids);
        let count = vertices.len();
        if count == 0 {
            return Ok(0);
        }
        self.transform.submit(TransformRequest::BatchTransform {
            vertices,
            transform,
        })?;
        Ok(count)
    }

    /// Sends the referenced vertices to the transform worker for rotation
    /// about the vertical axis through `center`.
    ///
    /// # Errors
    ///
    /// Worker-boundary errors from [`TransformWorker::submit`].
    pub fn request_rotation(
        &self,
        ids: &[VertexId],
        center: Vec3,
        angle: f32,
    ) -> WorkerResult<usize> {
        let vertices = self.snapshot(ids);
        let count = vertices.len();
        if count == 0 {
            return Ok(0);
        }
        self.transform.submit(TransformRequest::RotateVertices {
            vertices,
            center,
            angle,
        })?;
        Ok(count)
    }

    /// Drains completed transform results into the store.
    ///
    /// Each non-error result becomes one batch update; vertices deleted
    /// while their transform was in flight degrade to no-ops under the
    /// store's leniency policy. Returns the number of positions applied.
    pub fn apply_transform_results(&mut self) -> usize {
        let mut applied = 0;
        while let Some(result) = self.transform.try_recv_result() {
            if result.kind == TransformResultKind::Error {
                tracing::debug!("discarding transform error result");
                continue;
            }
            applied += result.vertices.len();
            self.store.batch_update(&result.vertices);
        }
        applied
    }

    /// Runs a selection-box hit test on the selection worker, waiting for
    /// the reply.
    ///
    /// # Errors
    ///
    /// Submission errors from [`SelectionWorker::submit`], or
    /// [`aurafx_workers::WorkerError::ReplyTimeout`] when the worker does
    /// not answer in time.
    pub fn query_selection(&self, query: SelectionQuery) -> WorkerResult<SelectionResult> {
        self.selection.submit(query)?;
        self.selection.recv_result_timeout(SELECTION_REPLY_TIMEOUT)
    }

    /// Coarse store-side selection by world-space bounds.
    #[must_use]
    pub fn select_in_bounds(&self, bounds: &Bounds) -> Vec<VertexId> {
        self.store.select_in_bounds(bounds)
    }

    /// Starts the chain-animation clock with the configured cycle duration.
    ///
    /// # Errors
    ///
    /// Worker-boundary errors from [`ChainWorker::send`].
    pub fn start_chain(&self, items: Vec<ChainItem>) -> WorkerResult<()> {
        self.chain.send(ChainCommand::Start {
            items,
            cycle_duration: self.config.chain.cycle_duration,
        })
    }

    /// Swaps the running chain's items without an observable idle frame.
    ///
    /// # Errors
    ///
    /// Worker-boundary errors from [`ChainWorker::send`].
    pub fn update_chain(&self, items: Vec<ChainItem>) -> WorkerResult<()> {
        self.chain.send(ChainCommand::Update {
            items,
            cycle_duration: self.config.chain.cycle_duration,
        })
    }

    /// Stops the chain-animation clock.
    ///
    /// # Errors
    ///
    /// Worker-boundary errors from [`ChainWorker::send`].
    pub fn stop_chain(&self) -> WorkerResult<()> {
        self.chain.send(ChainCommand::Stop)
    }

    /// Takes every chain frame queued since the last poll.
    #[must_use]
    pub fn poll_chain_frames(&self) -> Vec<ChainFrame> {
        self.chain.drain_frames()
    }

    /// Transform worker counters.
    #[must_use]
    pub fn transform_stats(&self) -> WorkerStats {
        self.transform.stats()
    }

    /// Selection worker counters.
    #[must_use]
    pub fn selection_stats(&self) -> WorkerStats {
        self.selection.stats()
    }

    /// Chain worker counters.
    #[must_use]
    pub fn chain_stats(&self) -> WorkerStats {
        self.chain.stats()
    }

    /// Tears down all three workers, reporting the first failure after
    /// attempting every shutdown.
    ///
    /// # Errors
    ///
    /// [`aurafx_workers::WorkerError::JoinPanic`] if any worker thread
    /// panicked.
    pub fn shutdown(mut self) -> WorkerResult<()> {
        let transform = self.transform.shutdown();
        let selection = self.selection.shutdown();
        let chain = self.chain.shutdown();
        transform.and(selection).and(chain)
    }

    /// Copies current positions for the ids that still exist.
    fn snapshot(&self, ids: &[VertexId]) -> Vec<VertexUpdate> {
        ids.iter()
            .filter_map(|id| {
                self.store
                    .position_of(id)
                    .map(|position| VertexUpdate::new(id.clone(), position))
            })
            .collect()
    }
}
