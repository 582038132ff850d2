//! # Transform Worker
//!
//! Applies rotation/scale/translation to batches of vertices on a dedicated
//! thread, so a 10,000-vertex drag never stalls the canvas.
//!
//! The math itself is pure and exposed directly ([`batch_transform`],
//! [`rotate_around_point`]) - the actor is a thin message loop around it.
//!
//! ## Protocol
//!
//! One request, one reply, in arrival order. Unserviceable request kinds are
//! answered with an in-band [`TransformResultKind::Error`] reply (empty
//! vertex list, zero processing time) rather than a panic or a dropped
//! message, so the caller's receive path never hangs on a malformed but
//! well-typed request.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use aurafx_scene::{Vec3, VertexUpdate};

use crate::error::{WorkerError, WorkerResult};
use crate::stats::WorkerStats;

/// A geometric transform applied in the fixed order rotate, scale,
/// translate. Each step is skipped when its field is `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    /// Rotation in radians. Only the `y` component (rotation about the
    /// vertical axis) is applied.
    pub rotation: Option<Vec3>,
    /// Per-axis scale factors.
    pub scale: Option<Vec3>,
    /// Translation offset.
    pub position: Option<Vec3>,
}

impl Transform {
    /// A rotation about the vertical axis by `angle` radians.
    #[must_use]
    pub const fn rotation_y(angle: f32) -> Self {
        Self {
            rotation: Some(Vec3::new(0.0, angle, 0.0)),
            scale: None,
            position: None,
        }
    }

    /// A translation by `offset`.
    #[must_use]
    pub const fn translation(offset: Vec3) -> Self {
        Self {
            rotation: None,
            scale: None,
            position: Some(offset),
        }
    }
}

/// Requests accepted by the transform worker.
#[derive(Clone, Debug)]
pub enum TransformRequest {
    /// Apply `transform` to every vertex in the batch.
    BatchTransform {
        /// Vertex positions to transform.
        vertices: Vec<VertexUpdate>,
        /// The transform to apply.
        transform: Transform,
    },
    /// Rotate every vertex about the vertical axis through `center`.
    RotateVertices {
        /// Vertex positions to rotate.
        vertices: Vec<VertexUpdate>,
        /// Center of rotation (x/z used; y ignored).
        center: Vec3,
        /// Angle in radians.
        angle: f32,
    },
    /// Scale-only request. Declared for protocol completeness but not
    /// serviced; answered with an `Error` reply.
    // TODO: service scale-only requests once the UI stops routing scale
    // through BatchTransform.
    ScaleVertices {
        /// Vertex positions to scale.
        vertices: Vec<VertexUpdate>,
        /// Per-axis scale factors.
        scale: Vec3,
    },
}

/// Reply kinds, used by callers to correlate replies to requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformResultKind {
    /// Reply to [`TransformRequest::BatchTransform`].
    BatchTransformComplete,
    /// Reply to [`TransformRequest::RotateVertices`].
    RotateComplete,
    /// The request kind is not serviced.
    Error,
}

/// Reply carrying the transformed batch.
#[derive(Clone, Debug)]
pub struct TransformResult {
    /// Which request this answers.
    pub kind: TransformResultKind,
    /// Transformed vertex positions. Empty on `Error`.
    pub vertices: Vec<VertexUpdate>,
    /// Wall-clock compute duration. Zero on `Error`.
    pub processing_time: Duration,
}

/// Applies `transform` to a batch of vertex positions.
///
/// The rotation's cos/sin are computed once per batch. Steps apply in the
/// fixed order rotate (2D rotation of x/z about the y axis), scale
/// (per-axis), translate; a step whose field is `None` is skipped.
#[must_use]
pub fn batch_transform(vertices: &[VertexUpdate], transform: &Transform) -> Vec<VertexUpdate> {
    let angle = transform.rotation.map_or(0.0, |r| r.y);
    let (sin, cos) = angle.sin_cos();

    vertices
        .iter()
        .map(|vertex| {
            let mut p = vertex.position;

            if transform.rotation.is_some() {
                let x = p.x * cos - p.z * sin;
                let z = p.x * sin + p.z * cos;
                p.x = x;
                p.z = z;
            }

            if let Some(scale) = transform.scale {
                p.x *= scale.x;
                p.y *= scale.y;
                p.z *= scale.z;
            }

            if let Some(offset) = transform.position {
                p.x += offset.x;
                p.y += offset.y;
                p.z += offset.z;
            }

            VertexUpdate {
                id: vertex.id.clone(),
                position: p,
            }
        })
        .collect()
}

/// Rotates a batch of vertex positions about the vertical axis through
/// `center`.
///
/// Each vertex is translated into the center's frame, rotated in the x/z
/// plane, and translated back. `y` is untouched.
#[must_use]
pub fn rotate_around_point(
    vertices: &[VertexUpdate],
    center: Vec3,
    angle: f32,
) -> Vec<VertexUpdate> {
    let (sin, cos) = angle.sin_cos();

    vertices
        .iter()
        .map(|vertex| {
            let x = vertex.position.x - center.x;
            let z = vertex.position.z - center.z;
            VertexUpdate {
                id: vertex.id.clone(),
                position: Vec3::new(
                    center.x + (x * cos - z * sin),
                    vertex.position.y,
                    center.z + (x * sin + z * cos),
                ),
            }
        })
        .collect()
}

/// Handle to a spawned transform worker.
///
/// Dropping the handle shuts the worker down (best effort); call
/// [`TransformWorker::shutdown`] to observe join failures.
#[derive(Debug)]
pub struct TransformWorker {
    /// Request queue. `None` once shut down.
    requests: Option<Sender<TransformRequest>>,
    /// Reply queue.
    results: Receiver<TransformResult>,
    /// Counters shared with the worker thread.
    stats: Arc<Mutex<WorkerStats>>,
    /// Worker thread handle. `None` once joined.
    handle: Option<JoinHandle<()>>,
    /// Request queue capacity, reported on backpressure.
    capacity: usize,
}

impl TransformWorker {
    /// Spawns the worker with bounded request/reply queues of
    /// `channel_capacity` messages each.
    #[must_use]
    pub fn spawn(channel_capacity: usize) -> Self {
        let (request_tx, request_rx) = bounded(channel_capacity);
        let (result_tx, result_rx) = bounded(channel_capacity);
        let stats = Arc::new(Mutex::new(WorkerStats::default()));

        let thread_stats = Arc::clone(&stats);
        let handle = thread::spawn(move || worker_loop(&request_rx, &result_tx, &thread_stats));

        Self {
            requests: Some(request_tx),
            results: result_rx,
            stats,
            handle: Some(handle),
            capacity: channel_capacity,
        }
    }

    /// Submits a request without blocking.
    ///
    /// # Errors
    ///
    /// [`WorkerError::QueueFull`] when the bounded request queue is full,
    /// [`WorkerError::Disconnected`] when the worker is gone.
    pub fn submit(&self, request: TransformRequest) -> WorkerResult<()> {
        let Some(requests) = self.requests.as_ref() else {
            return Err(WorkerError::Disconnected);
        };
        match requests.try_send(request) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(WorkerError::QueueFull {
                capacity: self.capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(WorkerError::Disconnected),
        }
    }

    /// Takes the next completed result, if one is ready.
    #[must_use]
    pub fn try_recv_result(&self) -> Option<TransformResult> {
        self.results.try_recv().ok()
    }

    /// Waits up to `timeout` for the next completed result.
    ///
    /// # Errors
    ///
    /// [`WorkerError::ReplyTimeout`] when nothing arrived in time,
    /// [`WorkerError::Disconnected`] when the worker is gone.
    pub fn recv_result_timeout(&self, timeout: Duration) -> WorkerResult<TransformResult> {
        self.results.recv_timeout(timeout).map_err(|err| {
            if err.is_timeout() {
                WorkerError::ReplyTimeout(timeout)
            } else {
                WorkerError::Disconnected
            }
        })
    }

    /// Snapshot of the worker's counters.
    #[must_use]
    pub fn stats(&self) -> WorkerStats {
        *self.stats.lock()
    }

    /// Shuts the worker down: closes the request queue and joins the thread.
    ///
    /// Idempotent; later calls are no-ops.
    ///
    /// # Errors
    ///
    /// [`WorkerError::JoinPanic`] if the worker thread panicked.
    pub fn shutdown(&mut self) -> WorkerResult<()> {
        self.requests = None;
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| WorkerError::JoinPanic)?;
        }
        Ok(())
    }
}

impl Drop for TransformWorker {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// Message loop: one request at a time, to completion, in arrival order.
fn worker_loop(
    requests: &Receiver<TransformRequest>,
    results: &Sender<TransformResult>,
    stats: &Mutex<WorkerStats>,
) {
    tracing::debug!("transform worker started");

    while let Ok(request) = requests.recv() {
        let started = Instant::now();

        let result = match request {
            TransformRequest::BatchTransform {
                vertices,
                transform,
            } => {
                let vertices = batch_transform(&vertices, &transform);
                TransformResult {
                    kind: TransformResultKind::BatchTransformComplete,
                    vertices,
                    processing_time: started.elapsed(),
                }
            }
            TransformRequest::RotateVertices {
                vertices,
                center,
                angle,
            } => {
                let vertices = rotate_around_point(&vertices, center, angle);
                TransformResult {
                    kind: TransformResultKind::RotateComplete,
                    vertices,
                    processing_time: started.elapsed(),
                }
            }
            TransformRequest::ScaleVertices { .. } => {
                tracing::warn!("unserviceable transform request kind, replying with error");
                TransformResult {
                    kind: TransformResultKind::Error,
                    vertices: Vec::new(),
                    processing_time: Duration::ZERO,
                }
            }
        };

        stats
            .lock()
            .record(result.vertices.len(), started.elapsed());

        match results.try_send(result) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                // Consumer stopped draining; dropping keeps the actor live.
                stats.lock().dropped_results += 1;
                tracing::warn!("transform result dropped, outbound queue full");
            }
            Err(TrySendError::Disconnected(_)) => break,
        }
    }

    tracing::debug!("transform worker exiting");
}
