//! # Chain Animation Worker
//!
//! Maintains a repeating animation clock and, on each ~30 Hz tick, computes
//! a pulse intensity and activity flag per chained element, streaming the
//! frames back to the caller. Drives the "chain reaction" visual sequence
//! in the editor.
//!
//! ## State machine
//!
//! ```text
//!            Start (non-empty items)
//!   ┌──────┐ ─────────────────────────> ┌─────────┐
//!   │ Idle │                            │ Running │──┐ Update (items):
//!   └──────┘ <───────────────────────── └─────────┘<─┘ swap + clock reset
//!            Stop / Update (empty items)
//! ```
//!
//! The clock (item list, cycle duration, start instant) is the one piece of
//! state this actor retains between messages. It lives entirely on the
//! worker thread; `Start`/`Stop`/`Update` are the only ways to touch it.
//!
//! ## Phase computation
//!
//! Element `i` of `total` starts `delay(i) = (i / max(1, total-1)) * cycle`
//! seconds into the sequence, spreading the chain evenly from the first
//! element (zero delay) to the last (one full cycle). The phase runs modulo
//! `2 * cycle` - the doubled modulus reserves a rest half-cycle after each
//! active half-cycle. The remainder keeps its sign, so an element whose
//! delay has not elapsed yet sits at a negative phase: intensity 0, not
//! active.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossbeam_channel::{bounded, never, tick, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use crate::error::{WorkerError, WorkerResult};
use crate::stats::WorkerStats;

/// Default cycle duration in seconds.
pub const DEFAULT_CYCLE_DURATION: f32 = 3.0;

/// Tick period of the animation clock (~30 Hz).
pub const TICK_INTERVAL: Duration = Duration::from_millis(33);

/// Fraction of the active window during which an element is flagged active.
const ACTIVE_WINDOW: f32 = 0.3;

/// One step of the chain sequence, expanding to one or more element ids.
///
/// The ordinal position of each expanded id across the whole sequence
/// determines its phase offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainItem {
    /// Element ids animated together at this step.
    ids: Vec<String>,
}

impl ChainItem {
    /// A step animating a single element.
    #[must_use]
    pub fn single(id: impl Into<String>) -> Self {
        Self {
            ids: vec![id.into()],
        }
    }

    /// A step animating several elements at consecutive ordinals.
    #[must_use]
    pub fn group(ids: Vec<String>) -> Self {
        Self { ids }
    }

    /// The element ids of this step.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// Per-element output of one animation tick.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainFrameRow {
    /// The animated element.
    pub element_id: String,
    /// How lit-up the element is, in `[0, 1]`.
    pub pulse_intensity: f32,
    /// True during the leading 30% of the element's active window.
    pub is_active: bool,
    /// Seconds since the clock (re)started.
    pub time: f32,
    /// Ordinal of the element in the expanded sequence.
    pub order: usize,
    /// The element's phase offset in seconds.
    pub delay: f32,
}

/// One emitted animation frame: every element's row plus a timestamp in
/// milliseconds since the Unix epoch.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainFrame {
    /// Per-element rows, in sequence order.
    pub rows: Vec<ChainFrameRow>,
    /// Emission time, milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Commands accepted by the chain worker.
#[derive(Clone, Debug)]
pub enum ChainCommand {
    /// Idle -> Running. Ignored while Running or with an empty item list.
    Start {
        /// The chain sequence.
        items: Vec<ChainItem>,
        /// Cycle duration in seconds.
        cycle_duration: f32,
    },
    /// Swap the item list and cycle duration without an observable Idle
    /// frame, resetting the clock. While Running, an empty item list stops
    /// the clock instead; while Idle, the command never starts it.
    Update {
        /// The new chain sequence.
        items: Vec<ChainItem>,
        /// The new cycle duration in seconds.
        cycle_duration: f32,
    },
    /// Running -> Idle. Ignored while Idle.
    Stop,
}

/// Computes one frame's rows for `elapsed` seconds into the clock.
///
/// Pure; the worker calls this on every tick, and tests call it directly
/// to pin phase boundaries without waiting on real time.
#[must_use]
pub fn chain_frame(items: &[ChainItem], cycle_duration: f32, elapsed: f32) -> Vec<ChainFrameRow> {
    let total: usize = items.iter().map(|item| item.ids().len()).sum();
    let denominator = total.saturating_sub(1).max(1) as f32;

    let mut rows = Vec::with_capacity(total);
    let mut order = 0usize;

    for item in items {
        for element_id in item.ids() {
            let delay = (order as f32 / denominator) * cycle_duration;
            // Sign-preserving remainder: negative before the delay elapses,
            // and in (cycle, 2*cycle) during the rest half-cycle.
            let phase = (elapsed - delay) % (cycle_duration * 2.0);

            let (pulse_intensity, is_active) = if (0.0..=cycle_duration).contains(&phase) {
                let progress = phase / cycle_duration;
                (
                    (progress * std::f32::consts::TAU).sin() * 0.5 + 0.5,
                    progress < ACTIVE_WINDOW,
                )
            } else {
                (0.0, false)
            };

            rows.push(ChainFrameRow {
                element_id: element_id.clone(),
                pulse_intensity,
                is_active,
                time: elapsed,
                order,
                delay,
            });
            order += 1;
        }
    }

    rows
}

/// The retained clock of a Running chain.
struct ChainClock {
    /// Current chain sequence.
    items: Vec<ChainItem>,
    /// Cycle duration in seconds.
    cycle_duration: f32,
    /// When the clock (re)started.
    started: Instant,
}

/// Handle to a spawned chain-animation worker.
#[derive(Debug)]
pub struct ChainWorker {
    /// Command queue. `None` once shut down.
    commands: Option<Sender<ChainCommand>>,
    /// Emitted frames.
    frames: Receiver<ChainFrame>,
    /// Counters shared with the worker thread.
    stats: Arc<Mutex<WorkerStats>>,
    /// Worker thread handle. `None` once joined.
    handle: Option<JoinHandle<()>>,
    /// Command queue capacity, reported on backpressure.
    capacity: usize,
}

impl ChainWorker {
    /// Spawns the worker with a bounded command queue of `channel_capacity`
    /// messages and a frame queue sized for roughly one second of frames.
    #[must_use]
    pub fn spawn(channel_capacity: usize) -> Self {
        let (command_tx, command_rx) = bounded(channel_capacity);
        // ~30 frames/second; a second of undrained frames before dropping.
        let (frame_tx, frame_rx) = bounded(32);
        let stats = Arc::new(Mutex::new(WorkerStats::default()));

        let thread_stats = Arc::clone(&stats);
        let handle = thread::spawn(move || worker_loop(&command_rx, &frame_tx, &thread_stats));

        Self {
            commands: Some(command_tx),
            frames: frame_rx,
            stats,
            handle: Some(handle),
            capacity: channel_capacity,
        }
    }

    /// Sends a command without blocking.
    ///
    /// # Errors
    ///
    /// [`WorkerError::QueueFull`] when the bounded command queue is full,
    /// [`WorkerError::Disconnected`] when the worker is gone.
    pub fn send(&self, command: ChainCommand) -> WorkerResult<()> {
        let Some(commands) = self.commands.as_ref() else {
            return Err(WorkerError::Disconnected);
        };
        match commands.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(WorkerError::QueueFull {
                capacity: self.capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(WorkerError::Disconnected),
        }
    }

    /// Takes the next emitted frame, if one is ready.
    #[must_use]
    pub fn try_recv_frame(&self) -> Option<ChainFrame> {
        self.frames.try_recv().ok()
    }

    /// Waits up to `timeout` for the next emitted frame.
    ///
    /// # Errors
    ///
    /// [`WorkerError::ReplyTimeout`] when nothing arrived in time,
    /// [`WorkerError::Disconnected`] when the worker is gone.
    pub fn recv_frame_timeout(&self, timeout: Duration) -> WorkerResult<ChainFrame> {
        self.frames.recv_timeout(timeout).map_err(|err| {
            if err.is_timeout() {
                WorkerError::ReplyTimeout(timeout)
            } else {
                WorkerError::Disconnected
            }
        })
    }

    /// Drains every frame currently queued.
    #[must_use]
    pub fn drain_frames(&self) -> Vec<ChainFrame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.frames.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Snapshot of the worker's counters.
    #[must_use]
    pub fn stats(&self) -> WorkerStats {
        *self.stats.lock()
    }

    /// Shuts the worker down: closes the command queue and joins the
    /// thread. The clock, if Running, dies with the thread.
    ///
    /// Idempotent; later calls are no-ops.
    ///
    /// # Errors
    ///
    /// [`WorkerError::JoinPanic`] if the worker thread panicked.
    pub fn shutdown(&mut self) -> WorkerResult<()> {
        self.commands = None;
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| WorkerError::JoinPanic)?;
        }
        Ok(())
    }
}

impl Drop for ChainWorker {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// What the select step observed.
enum Step {
    /// A command arrived (`None`: the queue closed).
    Command(Option<ChainCommand>),
    /// The ticker fired.
    Tick,
}

/// Command/tick loop. The ticker channel exists only while Running;
/// swapping in a fresh ticker on `Update` restarts the clock without an
/// observable Idle frame.
fn worker_loop(
    commands: &Receiver<ChainCommand>,
    frames: &Sender<ChainFrame>,
    stats: &Mutex<WorkerStats>,
) {
    tracing::debug!("chain worker started");

    let mut clock: Option<ChainClock> = None;
    let mut ticker: Receiver<Instant> = never();

    loop {
        let step = crossbeam_channel::select! {
            recv(commands) -> command => Step::Command(command.ok()),
            recv(ticker) -> _ => Step::Tick,
        };

        match step {
            Step::Command(None) => break,
            Step::Command(Some(command)) => match command {
                ChainCommand::Start {
                    items,
                    cycle_duration,
                } => {
                    if clock.is_none() && !items.is_empty() {
                        tracing::debug!(steps = items.len(), "chain started (cycle {cycle_duration}s)");
                        clock = Some(ChainClock {
                            items,
                            cycle_duration,
                            started: Instant::now(),
                        });
                        ticker = tick(TICK_INTERVAL);
                    }
                }
                ChainCommand::Update {
                    items,
                    cycle_duration,
                } => {
                    if clock.is_some() {
                        if items.is_empty() {
                            tracing::debug!("chain stopped by empty update");
                            clock = None;
                            ticker = never();
                        } else {
                            tracing::debug!(steps = items.len(), "chain updated (cycle {cycle_duration}s)");
                            clock = Some(ChainClock {
                                items,
                                cycle_duration,
                                started: Instant::now(),
                            });
                            ticker = tick(TICK_INTERVAL);
                        }
                    }
                }
                ChainCommand::Stop => {
                    if clock.is_some() {
                        tracing::debug!("chain stopped");
                        clock = None;
                        ticker = never();
                    }
                }
            },
            Step::Tick => {
                if let Some(active) = clock.as_ref() {
                    let computed = Instant::now();
                    let elapsed = active.started.elapsed().as_secs_f32();
                    let rows = chain_frame(&active.items, active.cycle_duration, elapsed);
                    let row_count = rows.len();
                    let frame = ChainFrame {
                        rows,
                        timestamp: unix_millis(),
                    };
                    stats.lock().record(row_count, computed.elapsed());

                    match frames.try_send(frame) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            stats.lock().dropped_results += 1;
                            tracing::warn!("chain frame dropped, outbound queue full");
                        }
                        Err(TrySendError::Disconnected(_)) => break,
                    }
                }
            }
        }
    }

    tracing::debug!("chain worker exiting");
}

/// Milliseconds since the Unix epoch, saturating at zero on a pre-epoch
/// system clock.
#[allow(clippy::cast_possible_truncation)]
fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-4;

    fn single_chain() -> Vec<ChainItem> {
        vec![ChainItem::single("e-0")]
    }

    #[test]
    fn test_phase_boundaries_single_element() {
        // One element: delay 0, cycle 3.
        let items = single_chain();

        let at_zero = &chain_frame(&items, 3.0, 0.0)[0];
        assert!((at_zero.pulse_intensity - 0.5).abs() < TOLERANCE);
        assert!(at_zero.is_active);

        let quarter = &chain_frame(&items, 3.0, 0.75)[0];
        assert!((quarter.pulse_intensity - 1.0).abs() < TOLERANCE);
        assert!(quarter.is_active);

        let half = &chain_frame(&items, 3.0, 1.5)[0];
        assert!(!half.is_active);

        let resting = &chain_frame(&items, 3.0, 3.5)[0];
        assert!(resting.pulse_intensity.abs() < TOLERANCE);
        assert!(!resting.is_active);
    }

    #[test]
    fn test_delays_spread_evenly() {
        let items = vec![
            ChainItem::single("e-0"),
            ChainItem::group(vec!["e-1".to_owned(), "e-2".to_owned()]),
        ];

        let rows = chain_frame(&items, 3.0, 0.0);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].order, 0);
        assert!((rows[0].delay - 0.0).abs() < TOLERANCE);
        assert!((rows[1].delay - 1.5).abs() < TOLERANCE);
        assert!((rows[2].delay - 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_element_before_its_delay_is_silent() {
        let items = vec![
            ChainItem::single("e-0"),
            ChainItem::single("e-1"),
            ChainItem::single("e-2"),
        ];

        // At 1s, the third element (delay 3) has a negative phase.
        let rows = chain_frame(&items, 3.0, 1.0);
        assert!(rows[2].pulse_intensity.abs() < TOLERANCE);
        assert!(!rows[2].is_active);
        // The first element (delay 0) is a third into its window.
        assert!(rows[0].pulse_intensity > 0.5);
    }

    #[test]
    fn test_single_element_uses_unit_denominator() {
        // total=1 must not divide by zero; the lone element gets delay 0.
        let rows = chain_frame(&single_chain(), 3.0, 0.1);
        assert!((rows[0].delay - 0.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_worker_emits_frames_while_running() {
        let mut worker = ChainWorker::spawn(8);
        worker
            .send(ChainCommand::Start {
                items: single_chain(),
                cycle_duration: DEFAULT_CYCLE_DURATION,
            })
            .unwrap();

        let frame = worker.recv_frame_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.rows[0].element_id, "e-0");
        assert!(frame.timestamp > 0);

        worker.send(ChainCommand::Stop).unwrap();
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_start_with_empty_items_stays_idle() {
        let mut worker = ChainWorker::spawn(8);
        worker
            .send(ChainCommand::Start {
                items: Vec::new(),
                cycle_duration: DEFAULT_CYCLE_DURATION,
            })
            .unwrap();

        assert!(worker.try_recv_frame().is_none());
        assert_eq!(
            worker.recv_frame_timeout(Duration::from_millis(150)),
            Err(WorkerError::ReplyTimeout(Duration::from_millis(150)))
        );
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_update_while_idle_does_not_start() {
        let mut worker = ChainWorker::spawn(8);
        worker
            .send(ChainCommand::Update {
                items: single_chain(),
                cycle_duration: DEFAULT_CYCLE_DURATION,
            })
            .unwrap();

        assert!(worker
            .recv_frame_timeout(Duration::from_millis(150))
            .is_err());
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_update_resets_clock_without_idle_gap() {
        let mut worker = ChainWorker::spawn(8);
        worker
            .send(ChainCommand::Start {
                items: single_chain(),
                cycle_duration: DEFAULT_CYCLE_DURATION,
            })
            .unwrap();
        let _ = worker.recv_frame_timeout(Duration::from_secs(2)).unwrap();

        worker
            .send(ChainCommand::Update {
                items: vec![ChainItem::single("e-9")],
                cycle_duration: 1.0,
            })
            .unwrap();

        // Frames keep flowing and soon carry the new items with a fresh
        // clock (time near zero, far below the seconds already elapsed).
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let frame = worker.recv_frame_timeout(Duration::from_secs(2)).unwrap();
            if frame.rows[0].element_id == "e-9" {
                assert!(frame.rows[0].time < 0.5);
                break;
            }
            assert!(Instant::now() < deadline, "update never took effect");
        }
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_empty_update_while_running_stops() {
        let mut worker = ChainWorker::spawn(8);
        worker
            .send(ChainCommand::Start {
                items: single_chain(),
                cycle_duration: DEFAULT_CYCLE_DURATION,
            })
            .unwrap();
        let _ = worker.recv_frame_timeout(Duration::from_secs(2)).unwrap();

        worker
            .send(ChainCommand::Update {
                items: Vec::new(),
                cycle_duration: DEFAULT_CYCLE_DURATION,
            })
            .unwrap();

        // Give the stop a moment to land, flush the backlog, then verify
        // the clock is silent.
        std::thread::sleep(Duration::from_millis(100));
        let _ = worker.drain_frames();
        assert!(worker
            .recv_frame_timeout(Duration::from_millis(150))
            .is_err());
        worker.shutdown().unwrap();
    }
}
