//! # Selection Worker
//!
//! Selection-box hit testing against projected 2D screen positions, off the
//! render thread.
//!
//! The projection mirrors the canvas renderer: the top view draws the x/z
//! ground plane; the side view draws x against height with the screen y
//! axis inverted (screen-down is world-down). The two formulas are not
//! symmetric - the top view ignores the element's height field entirely.
//! That asymmetry is the renderer's convention and is preserved here as-is.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use crate::error::{WorkerError, WorkerResult};
use crate::stats::WorkerStats;

/// World-to-screen scale factor applied before the camera zoom.
const WORLD_TO_SCREEN: f32 = 10.0;

/// Which 2D canvas projection is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    /// Top-down: screen x/y map to world x/z.
    Top,
    /// Side-on: screen x maps to world x, screen y to height (inverted).
    Side,
}

/// A point in screen coordinates (pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPoint {
    /// Horizontal pixel coordinate.
    pub x: f32,
    /// Vertical pixel coordinate.
    pub y: f32,
}

impl ScreenPoint {
    /// Creates a screen point.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A drag rectangle in screen space. `start` and `end` are the drag's
/// anchor and current corner in either order; containment testing
/// normalizes them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionBox {
    /// Drag anchor corner.
    pub start: ScreenPoint,
    /// Drag current corner.
    pub end: ScreenPoint,
}

/// An element eligible for selection, with its world position.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionElement {
    /// Element id, echoed back on a hit.
    pub id: String,
    /// World x.
    pub x: f32,
    /// World height, used by the side view when `y_offset` is absent.
    pub y: Option<f32>,
    /// World z.
    pub z: f32,
    /// Explicit height override for the side view.
    pub y_offset: Option<f32>,
}

/// One hit-testing query. Carries everything the worker needs - camera
/// offset, zoom, canvas size - so no state is shared across messages.
#[derive(Clone, Debug)]
pub struct SelectionQuery {
    /// Candidate elements.
    pub elements: Vec<SelectionElement>,
    /// The drag rectangle.
    pub selection_box: SelectionBox,
    /// Active projection.
    pub view_mode: ViewMode,
    /// Camera pan offset in pixels.
    pub offset: ScreenPoint,
    /// Camera zoom factor.
    pub scale: f32,
    /// Canvas width in pixels.
    pub canvas_width: f32,
    /// Canvas height in pixels.
    pub canvas_height: f32,
}

/// Hit-testing reply.
///
/// With zero matches the bounding-box fields hold the `INFINITY` /
/// `NEG_INFINITY` sentinels; check `selected_ids` before trusting them.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionResult {
    /// Matched element ids, in input iteration order.
    pub selected_ids: Vec<String>,
    /// Screen-space bounding box of the matched set: left edge.
    pub min_x: f32,
    /// Top edge.
    pub min_y: f32,
    /// Right edge.
    pub max_x: f32,
    /// Bottom edge.
    pub max_y: f32,
}

/// Tests every element against the (normalized) selection rectangle.
///
/// Containment is a closed interval on both axes, so elements exactly on
/// an edge count as inside.
#[must_use]
pub fn hit_test(query: &SelectionQuery) -> SelectionResult {
    let center_x = query.canvas_width / 2.0 + query.offset.x;
    let center_y = query.canvas_height / 2.0 + query.offset.y;

    let x1 = query.selection_box.start.x.min(query.selection_box.end.x);
    let y1 = query.selection_box.start.y.min(query.selection_box.end.y);
    let x2 = query.selection_box.start.x.max(query.selection_box.end.x);
    let y2 = query.selection_box.start.y.max(query.selection_box.end.y);

    let mut selected_ids = Vec::new();
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for element in &query.elements {
        let screen_x = center_x + element.x * WORLD_TO_SCREEN * query.scale;
        let screen_y = match query.view_mode {
            ViewMode::Side => {
                let height = element.y_offset.or(element.y).unwrap_or(0.0);
                center_y - height * WORLD_TO_SCREEN * query.scale
            }
            ViewMode::Top => center_y + element.z * WORLD_TO_SCREEN * query.scale,
        };

        if screen_x >= x1 && screen_x <= x2 && screen_y >= y1 && screen_y <= y2 {
            selected_ids.push(element.id.clone());
            min_x = min_x.min(screen_x);
            max_x = max_x.max(screen_x);
            min_y = min_y.min(screen_y);
            max_y = max_y.max(screen_y);
        }
    }

    SelectionResult {
        selected_ids,
        min_x,
        min_y,
        max_x,
        max_y,
    }
}

/// Handle to a spawned selection worker.
#[derive(Debug)]
pub struct SelectionWorker {
    /// Query queue. `None` once shut down.
    queries: Option<Sender<SelectionQuery>>,
    /// Reply queue.
    results: Receiver<SelectionResult>,
    /// Counters shared with the worker thread.
    stats: Arc<Mutex<WorkerStats>>,
    /// Worker thread handle. `None` once joined.
    handle: Option<JoinHandle<()>>,
    /// Query queue capacity, reported on backpressure.
    capacity: usize,
}

impl SelectionWorker {
    /// Spawns the worker with bounded query/reply queues of
    /// `channel_capacity` messages each.
    #[must_use]
    pub fn spawn(channel_capacity: usize) -> Self {
        let (query_tx, query_rx) = bounded(channel_capacity);
        let (result_tx, result_rx) = bounded(channel_capacity);
        let stats = Arc::new(Mutex::new(WorkerStats::default()));

        let thread_stats = Arc::clone(&stats);
        let handle = thread::spawn(move || worker_loop(&query_rx, &result_tx, &thread_stats));

        Self {
            queries: Some(query_tx),
            results: result_rx,
            stats,
            handle: Some(handle),
            capacity: channel_capacity,
        }
    }

    /// Submits a query without blocking.
    ///
    /// # Errors
    ///
    /// [`WorkerError::QueueFull`] when the bounded query queue is full,
    /// [`WorkerError::Disconnected`] when the worker is gone.
    pub fn submit(&self, query: SelectionQuery) -> WorkerResult<()> {
        let Some(queries) = self.queries.as_ref() else {
            return Err(WorkerError::Disconnected);
        };
        match queries.try_send(query) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(WorkerError::QueueFull {
                capacity: self.capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(WorkerError::Disconnected),
        }
    }

    /// Takes the next completed result, if one is ready.
    #[must_use]
    pub fn try_recv_result(&self) -> Option<SelectionResult> {
        self.results.try_recv().ok()
    }

    /// Waits up to `timeout` for the next completed result.
    ///
    /// # Errors
    ///
    /// [`WorkerError::ReplyTimeout`] when nothing arrived in time,
    /// [`WorkerError::Disconnected`] when the worker is gone.
    pub fn recv_result_timeout(&self, timeout: Duration) -> WorkerResult<SelectionResult> {
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

    /// Shuts the worker down: closes the query queue and joins the thread.
    ///
    /// Idempotent; later calls are no-ops.
    ///
    /// # Errors
    ///
    /// [`WorkerError::JoinPanic`] if the worker thread panicked.
    pub fn shutdown(&mut self) -> WorkerResult<()> {
        self.queries = None;
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| WorkerError::JoinPanic)?;
        }
        Ok(())
    }
}

impl Drop for SelectionWorker {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// Message loop: one query at a time, to completion, in arrival order.
fn worker_loop(
    queries: &Receiver<SelectionQuery>,
    results: &Sender<SelectionResult>,
    stats: &Mutex<WorkerStats>,
) {
    tracing::debug!("selection worker started");

    while let Ok(query) = queries.recv() {
        let started = Instant::now();
        let result = hit_test(&query);
        stats.lock().record(query.elements.len(), started.elapsed());

        match results.try_send(result) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                stats.lock().dropped_results += 1;
                tracing::warn!("selection result dropped, outbound queue full");
            }
            Err(TrySendError::Disconnected(_)) => break,
        }
    }

    tracing::debug!("selection worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: &str, x: f32, z: f32) -> SelectionElement {
        SelectionElement {
            id: id.to_owned(),
            x,
            y: None,
            z,
            y_offset: None,
        }
    }

    fn query(elements: Vec<SelectionElement>, selection_box: SelectionBox) -> SelectionQuery {
        SelectionQuery {
            elements,
            selection_box,
            view_mode: ViewMode::Top,
            offset: ScreenPoint::default(),
            scale: 1.0,
            canvas_width: 800.0,
            canvas_height: 600.0,
        }
    }

    #[test]
    fn test_top_view_hit() {
        // Canvas center is (400, 300); element at world (1, _, 2) projects
        // to (410, 320) at scale 1.
        let q = query(
            vec![element("a", 1.0, 2.0), element("b", 30.0, 0.0)],
            SelectionBox {
                start: ScreenPoint::new(400.0, 300.0),
                end: ScreenPoint::new(420.0, 330.0),
            },
        );

        let result = hit_test(&q);
        assert_eq!(result.selected_ids, vec!["a".to_owned()]);
        assert_eq!(result.min_x, 410.0);
        assert_eq!(result.max_y, 320.0);
    }

    #[test]
    fn test_inverted_drag_selects_same_set() {
        let elements = vec![element("a", 1.0, 2.0), element("b", -1.0, -2.0)];
        let forward = query(
            elements.clone(),
            SelectionBox {
                start: ScreenPoint::new(350.0, 250.0),
                end: ScreenPoint::new(450.0, 350.0),
            },
        );
        let inverted = query(
            elements,
            SelectionBox {
                start: ScreenPoint::new(450.0, 350.0),
                end: ScreenPoint::new(350.0, 250.0),
            },
        );

        assert_eq!(hit_test(&forward), hit_test(&inverted));
    }

    #[test]
    fn test_side_view_height_fallback() {
        // y_offset wins over y; y wins over the 0 default.
        let mut with_offset = element("a", 0.0, 99.0);
        with_offset.y = Some(1.0);
        with_offset.y_offset = Some(5.0);
        let mut with_y = element("b", 0.0, 99.0);
        with_y.y = Some(1.0);
        let bare = element("c", 0.0, 99.0);

        // Screen y at scale 1: a -> 300 - 50 = 250, b -> 290, c -> 300.
        let mut q = query(
            vec![with_offset, with_y, bare],
            SelectionBox {
                start: ScreenPoint::new(390.0, 245.0),
                end: ScreenPoint::new(410.0, 255.0),
            },
        );
        q.view_mode = ViewMode::Side;

        let result = hit_test(&q);
        assert_eq!(result.selected_ids, vec!["a".to_owned()]);
    }

    #[test]
    fn test_zero_matches_yields_sentinel_bbox() {
        let q = query(
            vec![element("a", 50.0, 50.0)],
            SelectionBox {
                start: ScreenPoint::new(0.0, 0.0),
                end: ScreenPoint::new(10.0, 10.0),
            },
        );

        let result = hit_test(&q);
        assert!(result.selected_ids.is_empty());
        assert_eq!(result.min_x, f32::INFINITY);
        assert_eq!(result.max_x, f32::NEG_INFINITY);
        assert_eq!(result.min_y, f32::INFINITY);
        assert_eq!(result.max_y, f32::NEG_INFINITY);
    }

    #[test]
    fn test_edge_containment_is_closed_interval() {
        // Element projects exactly onto the rectangle's corner.
        let q = query(
            vec![element("a", 1.0, 1.0)],
            SelectionBox {
                start: ScreenPoint::new(410.0, 310.0),
                end: ScreenPoint::new(420.0, 320.0),
            },
        );

        let result = hit_test(&q);
        assert_eq!(result.selected_ids, vec!["a".to_owned()]);
    }

    #[test]
    fn test_worker_round_trip() {
        let mut worker = SelectionWorker::spawn(4);
        assert!(worker.try_recv_result().is_none());
        worker
            .submit(query(
                vec![element("a", 0.0, 0.0)],
                SelectionBox {
                    start: ScreenPoint::new(390.0, 290.0),
                    end: ScreenPoint::new(410.0, 310.0),
                },
            ))
            .unwrap();

        let result = worker
            .recv_result_timeout(Duration::from_secs(2))
            .unwrap();
        assert_eq!(result.selected_ids, vec!["a".to_owned()]);
        worker.shutdown().unwrap();
    }
}
