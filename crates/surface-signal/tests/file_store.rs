use std::{
    env, fs,
    path::PathBuf,
    process,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use surface_signal::{
    Error, FileStore, SELECTED_CONVERSATION_SLOT, Signal, SignalChannel, SlotStore,
};

fn unique_tmp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = env::temp_dir().join(format!("overlay-signal-{tag}-{}-{}", process::id(), nanos));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn publish_is_visible_to_another_surface() {
    let dir = unique_tmp_dir("visible");
    let path = dir.join("signals.json");
    // Two surfaces, each with its own store handle on the same file.
    let producer = SignalChannel::selected_conversation(Arc::new(FileStore::new(&path)));
    let consumer = SignalChannel::selected_conversation(Arc::new(FileStore::new(&path)));

    assert_eq!(consumer.observe().unwrap(), None);
    producer.publish("abc").unwrap();
    assert_eq!(consumer.observe().unwrap().map(|s| s.id), Some("abc".into()));
    producer.publish("def").unwrap();
    assert_eq!(consumer.observe().unwrap().map(|s| s.id), Some("def".into()));

    let _ignored = fs::remove_dir_all(&dir);
}

#[test]
fn slots_share_one_json_object() {
    let dir = unique_tmp_dir("slots");
    let path = dir.join("nested").join("signals.json");
    let store = Arc::new(FileStore::new(&path));
    SignalChannel::selected_conversation(store.clone())
        .publish_at("abc", 42)
        .unwrap();
    SignalChannel::new(store.clone(), "prompt-selected")
        .publish_at("p1", 43)
        .unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw[SELECTED_CONVERSATION_SLOT]["id"], "abc");
    assert_eq!(raw[SELECTED_CONVERSATION_SLOT]["timestamp"], 42);
    assert_eq!(raw["prompt-selected"]["id"], "p1");

    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());

    let _ignored = fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_file_is_reported_then_replaced() {
    let dir = unique_tmp_dir("corrupt");
    let path = dir.join("signals.json");
    fs::write(&path, "not json").unwrap();
    let store = FileStore::new(&path);

    assert!(matches!(
        store.read(SELECTED_CONVERSATION_SLOT),
        Err(Error::Corrupt { .. })
    ));
    store
        .write(SELECTED_CONVERSATION_SLOT, &Signal::new("abc", 1))
        .unwrap();
    assert_eq!(
        store.read(SELECTED_CONVERSATION_SLOT).unwrap(),
        Some(Signal::new("abc", 1))
    );

    let _ignored = fs::remove_dir_all(&dir);
}

#[test]
fn watcher_over_file_store() {
    let dir = unique_tmp_dir("watcher");
    let path = dir.join("signals.json");
    let producer = SignalChannel::selected_conversation(Arc::new(FileStore::new(&path)));
    let mut watcher = SignalChannel::selected_conversation(Arc::new(FileStore::new(&path)))
        .watcher(Duration::from_secs(10));

    producer.publish("abc").unwrap();
    assert_eq!(watcher.poll().unwrap().map(|s| s.id), Some("abc".into()));
    assert_eq!(watcher.poll().unwrap(), None);

    let _ignored = fs::remove_dir_all(&dir);
}
