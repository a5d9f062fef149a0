// Browser-only checks; run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use node404_danmaku::danmaku::{KeyValueStore, UserMessageCache};
use node404_danmaku::web::LocalStorageStore;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const KEY: &str = "node404-danmaku-test";

#[wasm_bindgen_test]
fn local_storage_round_trips_user_messages() {
    let mut store = LocalStorageStore::open();
    store.save(KEY, "[]").expect("save");
    let mut cache = UserMessageCache::open(Box::new(LocalStorageStore::open()), KEY, 50);
    cache.remember("from the browser");
    assert_eq!(store.load(KEY).expect("load").as_deref(), Some(r#"["from the browser"]"#));
}

#[wasm_bindgen_test]
fn garbage_in_local_storage_is_ignored() {
    let mut store = LocalStorageStore::open();
    store.save(KEY, "not json at all").expect("save");
    let cache = UserMessageCache::open(Box::new(LocalStorageStore::open()), KEY, 50);
    assert!(cache.messages().is_empty());
}
