//! Integration tests for the editor session: store + workers end to end.

use std::thread;
use std::time::{Duration, Instant};

use aurafx::scene::{Bounds, CellCoord, Vec3, Vertex, VertexId};
use aurafx::workers::{
    ChainItem, ScreenPoint, SelectionBox, SelectionElement, SelectionQuery, Transform, ViewMode,
};
use aurafx::{EditorConfig, EditorSession};

fn id(s: &str) -> VertexId {
    VertexId::from(s)
}

fn seed_session() -> EditorSession {
    let mut session = EditorSession::new();
    session.insert_vertices(vec![
        Vertex::at("a", Vec3::new(0.0, 0.0, 0.0)),
        Vertex::at("b", Vec3::new(15.0, 0.0, 0.0)),
        Vertex::at("c", Vec3::new(25.0, 0.0, 25.0)),
    ]);
    session
}

/// Polls `apply_transform_results` until `expected` positions came back.
fn wait_for_results(session: &mut EditorSession, expected: usize) -> usize {
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut applied = 0;
    while applied < expected && Instant::now() < deadline {
        applied += session.apply_transform_results();
        thread::sleep(Duration::from_millis(1));
    }
    applied
}

#[test]
fn test_end_to_end_grid_scenario() {
    let session = seed_session();
    let store = session.store();

    for (vertex, cell) in [("a", (0, 0)), ("b", (1, 0)), ("c", (2, 2))] {
        let members = store
            .index()
            .cell_members(CellCoord::new(cell.0, cell.1))
            .unwrap_or_else(|| panic!("cell {},{} unoccupied", cell.0, cell.1));
        assert!(members.contains(&id(vertex)));
    }

    let bounds = Bounds::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(19.0, 0.0, 19.0));
    let mut hits = session.select_in_bounds(&bounds);
    hits.sort();
    assert_eq!(hits, vec![id("a"), id("b")]);

    session.shutdown().unwrap();
}

#[test]
fn test_off_thread_rotation_lands_in_store() {
    let mut session = seed_session();

    let sent = session
        .request_rotation(
            &[id("b")],
            Vec3::ZERO,
            std::f32::consts::FRAC_PI_2,
        )
        .unwrap();
    assert_eq!(sent, 1);
    assert_eq!(wait_for_results(&mut session, 1), 1);

    // (15,0,0) rotated 90 degrees about the origin lands at (0,0,15).
    let rotated = session.store().position_of(&id("b")).unwrap();
    assert!(rotated.x.abs() < 1e-4);
    assert!((rotated.z - 15.0).abs() < 1e-4);

    // The spatial index followed the move into cell 0,1.
    assert!(session
        .store()
        .index()
        .cell_members(CellCoord::new(0, 1))
        .is_some_and(|m| m.contains(&id("b"))));

    session.shutdown().unwrap();
}

#[test]
fn test_transform_request_skips_stale_ids() {
    let mut session = seed_session();
    session.store_mut().batch_delete(&[id("a")]);

    let sent = session
        .request_transform(
            &[id("a"), id("b")],
            Transform::translation(Vec3::new(1.0, 0.0, 0.0)),
        )
        .unwrap();
    assert_eq!(sent, 1);
    assert_eq!(wait_for_results(&mut session, 1), 1);

    assert!(session.store().get(&id("a")).is_none());
    let moved = session.store().position_of(&id("b")).unwrap();
    assert!((moved.x - 16.0).abs() < 1e-4);

    session.shutdown().unwrap();
}

#[test]
fn test_transform_of_only_stale_ids_sends_nothing() {
    let session = seed_session();
    let sent = session
        .request_transform(&[id("ghost")], Transform::rotation_y(1.0))
        .unwrap();
    assert_eq!(sent, 0);
    session.shutdown().unwrap();
}

#[test]
fn test_selection_worker_round_trip() {
    let session = seed_session();

    // At scale 1 on a 960x600 canvas: a -> (480, 300), b -> (630, 300).
    let elements: Vec<SelectionElement> = ["a", "b", "c"]
        .iter()
        .filter_map(|name| {
            session
                .store()
                .position_of(&id(name))
                .map(|p| SelectionElement {
                    id: (*name).to_owned(),
                    x: p.x,
                    y: Some(p.y),
                    z: p.z,
                    y_offset: None,
                })
        })
        .collect();

    let result = session
        .query_selection(SelectionQuery {
            elements,
            selection_box: SelectionBox {
                start: ScreenPoint::new(700.0, 350.0),
                end: ScreenPoint::new(400.0, 250.0),
            },
            view_mode: ViewMode::Top,
            offset: ScreenPoint::default(),
            scale: 1.0,
            canvas_width: 960.0,
            canvas_height: 600.0,
        })
        .unwrap();

    assert_eq!(result.selected_ids, vec!["a".to_owned(), "b".to_owned()]);
    assert!((result.min_x - 480.0).abs() < 1e-4);
    assert!((result.max_x - 630.0).abs() < 1e-4);

    session.shutdown().unwrap();
}

#[test]
fn test_chain_clock_through_session() {
    let config = EditorConfig::from_toml_str("[chain]\ncycle_duration = 1.0\n").unwrap();
    let session = EditorSession::with_config(config);
    assert!((session.config().chain.cycle_duration - 1.0).abs() < f32::EPSILON);

    session
        .start_chain(vec![
            ChainItem::single("e-0"),
            ChainItem::single("e-1"),
        ])
        .unwrap();
    thread::sleep(Duration::from_millis(200));
    session.stop_chain().unwrap();

    let frames = session.poll_chain_frames();
    assert!(!frames.is_empty(), "clock should have ticked at ~30 Hz");
    let rows = &frames[0].rows;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].element_id, "e-0");
    assert_eq!(rows[1].order, 1);
    // Two elements spread across the full cycle: delays 0 and 1.
    assert!((rows[1].delay - 1.0).abs() < 1e-4);

    session.shutdown().unwrap();
}

#[test]
fn test_dirty_set_drives_render_flush() {
    let mut session = seed_session();
    let _ = session.store_mut().take_dirty();

    let sent = session
        .request_transform(
            &[id("a"), id("b")],
            Transform::translation(Vec3::new(0.0, 2.0, 0.0)),
        )
        .unwrap();
    assert_eq!(wait_for_results(&mut session, sent), sent);

    let dirty = session.store_mut().take_dirty();
    assert_eq!(dirty.len(), 2);
    assert!(dirty.contains(&id("a")) && dirty.contains(&id("b")));
    assert!(session.store_mut().take_dirty().is_empty());

    session.shutdown().unwrap();
}
