use std::fs;
use std::time::Duration;

use serde_json::Value;
use tetris_enhanced::save::{JsonSessionStore, LoadError, SAVE_FILE_NAME, SAVE_FILE_VERSION, SessionStore};
use tetris_enhanced::state::Session;
use tetris_enhanced::tetris_core::{RotationDir, TetrisCore, Vec2i};

/// A session that has been played for a while: moved, rotated, held, dropped and mid-fall.
fn played_session() -> Session {
    let mut core = TetrisCore::new(2024);
    core.set_start_level(3);
    core.initialize_game();
    core.move_piece(Vec2i::new(-1, 0));
    core.rotate_piece(RotationDir::Cw);
    core.hard_drop();
    core.hold_piece();
    core.move_piece(Vec2i::new(1, 0));

    let mut session = Session::new(core);
    let interval = session.tetris.gravity_interval();
    session.tick(interval * 2 + interval / 3);
    session
}

#[test]
fn saved_session_loads_back_equal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = JsonSessionStore::at(dir.path().join(SAVE_FILE_NAME));
    let session = played_session();
    assert!(session.fall_timer.phase() > Duration::ZERO);
    assert!(session.play_time > Duration::ZERO);
    assert!(session.tetris.held_piece().is_some());

    store.save(&session).expect("save");
    let loaded = store.load().expect("load");
    assert_eq!(loaded, session);
}

#[test]
fn loaded_session_keeps_playing_identically() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = JsonSessionStore::at(dir.path().join(SAVE_FILE_NAME));
    let mut original = played_session();
    store.save(&original).expect("save");
    let mut loaded = store.load().expect("load");

    // Same rng and bag state means the same future pieces.
    for _ in 0..5 {
        original.tetris.hard_drop();
        loaded.tetris.hard_drop();
        original.tick(Duration::from_millis(700));
        loaded.tick(Duration::from_millis(700));
    }
    assert_eq!(loaded, original);
}

#[test]
fn save_file_records_version_and_timestamp() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SAVE_FILE_NAME);
    let mut store = JsonSessionStore::at(&path);
    store.save(&played_session()).expect("save");

    let text = fs::read_to_string(&path).expect("read save");
    let value: Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(value["version"], Value::from(SAVE_FILE_VERSION));
    assert!(value["saved_at_unix_ms"].as_u64().is_some_and(|ms| ms > 0));
    assert!(value["session"]["tetris"]["board"].is_array());
}

#[test]
fn overwriting_keeps_only_the_latest_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = JsonSessionStore::at(dir.path().join(SAVE_FILE_NAME));
    let first = played_session();
    let mut second = first.clone();
    second.tetris.hard_drop();

    store.save(&first).expect("first save");
    store.save(&second).expect("second save");
    assert_eq!(store.load().expect("load"), second);
}

#[test]
fn truncated_file_is_corrupt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SAVE_FILE_NAME);
    let mut store = JsonSessionStore::at(&path);
    store.save(&played_session()).expect("save");

    let text = fs::read_to_string(&path).expect("read");
    fs::write(&path, &text[..text.len() / 2]).expect("truncate");
    let err = store.load().expect_err("truncated save must not load");
    assert!(matches!(err, LoadError::Corrupt { .. }), "{err:?}");
}

#[test]
fn well_formed_but_inconsistent_session_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SAVE_FILE_NAME);
    let mut store = JsonSessionStore::at(&path);
    store.save(&played_session()).expect("save");

    let mut value: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
    value
        .pointer_mut("/session/tetris/board")
        .and_then(Value::as_array_mut)
        .expect("board rows")
        .pop();
    fs::write(&path, serde_json::to_string(&value).expect("encode")).expect("write");

    let err = store.load().expect_err("short board must not load");
    assert!(matches!(err, LoadError::Invalid(_)), "{err:?}");
    assert_eq!(err.summary(), "LOAD FAILED: SAVE IS CORRUPT");
}

#[test]
fn older_version_is_reported_as_unsupported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SAVE_FILE_NAME);
    let mut store = JsonSessionStore::at(&path);
    store.save(&played_session()).expect("save");

    let mut value: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
    value["version"] = Value::from(0);
    fs::write(&path, serde_json::to_string(&value).expect("encode")).expect("write");

    assert!(matches!(
        store.load(),
        Err(LoadError::UnsupportedVersion { found: 0, expected: SAVE_FILE_VERSION })
    ));
}
