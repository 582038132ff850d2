//! # Headless Stress Run
//!
//! Drag 10,000 vertices → rotate a selection off-thread → box-select →
//! run the chain clock for half a second. No GUI, deterministic workload,
//! stats printed at the end.
//!
//! This binary exercises every public surface of the editor core the way
//! the canvas does, and doubles as a smoke test for thread teardown.

use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use aurafx::scene::{Bounds, Vec3, Vertex, VertexId, VertexUpdate};
use aurafx::workers::{
    ChainItem, ScreenPoint, SelectionBox, SelectionElement, SelectionQuery, ViewMode,
};
use aurafx::EditorSession;

/// Vertices in the synthetic scene.
const VERTEX_COUNT: usize = 10_000;

/// Vertices rotated off-thread.
const ROTATED_COUNT: usize = 2_500;

fn main() {
    let mut session = EditorSession::new();
    let mut rng = StdRng::seed_from_u64(0xAF_01);

    // =========================================================================
    // STEP 1: Seed the scene
    // =========================================================================
    let seed_start = Instant::now();
    let vertices: Vec<Vertex> = (0..VERTEX_COUNT)
        .map(|i| {
            Vertex::at(
                format!("v-{i}"),
                Vec3::new(
                    rng.gen_range(-100.0..100.0),
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(-100.0..100.0),
                ),
            )
        })
        .collect();
    session.insert_vertices(vertices);
    println!(
        "seeded {} vertices in {:?} ({} occupied cells)",
        session.store().len(),
        seed_start.elapsed(),
        session.store().index().cell_count()
    );

    // =========================================================================
    // STEP 2: Simulated drag - one batch update per "frame"
    // =========================================================================
    let drag_start = Instant::now();
    for frame in 0..30 {
        let offset = frame as f32 * 0.5;
        let updates: Vec<VertexUpdate> = (0..1_000)
            .map(|i| {
                VertexUpdate::new(
                    format!("v-{i}"),
                    Vec3::new(offset + i as f32 * 0.1, 0.0, offset),
                )
            })
            .collect();
        session.store_mut().batch_update(&updates);
        let _ = session.store_mut().take_dirty();
    }
    println!(
        "30 drag frames in {:?} (last batch {:?})",
        drag_start.elapsed(),
        session.store().stats().last_batch
    );

    // =========================================================================
    // STEP 3: Off-thread rotation
    // =========================================================================
    let ids: Vec<VertexId> = (0..ROTATED_COUNT)
        .map(|i| VertexId::from(format!("v-{i}")))
        .collect();
    let sent = session
        .request_rotation(&ids, Vec3::ZERO, std::f32::consts::FRAC_PI_2)
        .expect("transform worker alive");

    let mut applied = 0;
    let deadline = Instant::now() + Duration::from_secs(2);
    while applied < sent && Instant::now() < deadline {
        applied += session.apply_transform_results();
        thread::sleep(Duration::from_millis(1));
    }
    println!("rotated {applied}/{sent} vertices off-thread");
    assert_eq!(applied, sent, "rotation results must all come back");

    // =========================================================================
    // STEP 4: Selections - store bounds query + worker hit test
    // =========================================================================
    let in_bounds = session.select_in_bounds(&Bounds::new(
        Vec3::new(-20.0, 0.0, -20.0),
        Vec3::new(20.0, 0.0, 20.0),
    ));
    println!("store bounds query matched {} vertices", in_bounds.len());

    let elements: Vec<SelectionElement> = in_bounds
        .iter()
        .take(500)
        .filter_map(|id| {
            session.store().position_of(id).map(|p| SelectionElement {
                id: id.to_string(),
                x: p.x,
                y: Some(p.y),
                z: p.z,
                y_offset: None,
            })
        })
        .collect();
    let hit = session
        .query_selection(SelectionQuery {
            elements,
            selection_box: SelectionBox {
                start: ScreenPoint::new(700.0, 500.0),
                end: ScreenPoint::new(260.0, 100.0),
            },
            view_mode: ViewMode::Top,
            offset: ScreenPoint::default(),
            scale: 1.0,
            canvas_width: 960.0,
            canvas_height: 600.0,
        })
        .expect("selection worker alive");
    println!("selection worker matched {} elements", hit.selected_ids.len());

    // =========================================================================
    // STEP 5: Chain clock for half a second
    // =========================================================================
    session
        .start_chain(vec![
            ChainItem::single("e-0"),
            ChainItem::group(vec![String::from("e-1"), String::from("e-2")]),
            ChainItem::single("e-3"),
        ])
        .expect("chain worker alive");
    thread::sleep(Duration::from_millis(500));
    session.stop_chain().expect("chain worker alive");
    let frames = session.poll_chain_frames();
    println!(
        "chain clock emitted {} frames ({} rows each)",
        frames.len(),
        frames.first().map_or(0, |f| f.rows.len())
    );

    // =========================================================================
    // STEP 6: Stats + teardown
    // =========================================================================
    let store = session.store().stats();
    println!(
        "store: {} vertices, {} batches, last {:?}",
        store.vertex_count, store.total_batches, store.last_batch
    );
    for (name, stats) in [
        ("transform", session.transform_stats()),
        ("selection", session.selection_stats()),
        ("chain", session.chain_stats()),
    ] {
        println!(
            "{name}: {} messages, {} items, {} dropped, busy {:?}",
            stats.messages, stats.items_processed, stats.dropped_results, stats.busy
        );
    }

    session.shutdown().expect("clean worker teardown");
    println!("done");
}
