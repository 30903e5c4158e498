//! Engine lifecycle tests
//!
//! Every test runs on paused time so debounce delays are exact.

use ahl_core::{EngineConfig, HighlightEngine, TaskKind};
use ahl_host::{Dom, ElementSpec, MemoryStore, SharedDocument, SyncStore};
use ahl_registry::REGISTRY_KEY;
use ahl_test_utils::{
    address_span, advance_ms, alice_bob_spec, find_by_attr, list, registered_store,
    sent_view_spec, shared_document, SlowStore, ALICE_TITLE, BOB_TITLE, CAROL,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn engine(document: &SharedDocument, store: &MemoryStore) -> HighlightEngine {
    HighlightEngine::new(
        EngineConfig::default(),
        document.clone(),
        Arc::new(store.clone()),
    )
    .unwrap()
}

fn is_marked(engine: &HighlightEngine, attr: &str, value: &str) -> bool {
    let doc = engine.document().read();
    let id = find_by_attr(&*doc, attr, value).unwrap();
    engine.marker().is_marked(&*doc, id)
}

#[tokio::test(start_paused = true)]
async fn startup_highlights_registered_sender_only() {
    let document = shared_document(&alice_bob_spec());
    let store = registered_store(&["alice@example.com"]);
    let engine = engine(&document, &store);

    engine.start().await.unwrap();
    assert!(!is_marked(&engine, "title", ALICE_TITLE));

    advance_ms(5100).await;
    assert!(is_marked(&engine, "title", ALICE_TITLE));
    assert!(!is_marked(&engine, "title", BOB_TITLE));

    advance_ms(1000).await;
    // inbox view: the harvest pass ran but read nothing beyond the startup load
    assert_eq!(engine.stats().harvest_passes, 1);
    assert_eq!(store.read_count(), 1);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn sent_view_harvest_registers_and_then_highlights() {
    let document = shared_document(&sent_view_spec());
    let store = MemoryStore::default();
    let engine = engine(&document, &store);

    engine.start().await.unwrap();
    advance_ms(6100).await;

    assert_eq!(store.write_count(), 1);
    assert_eq!(store.peek(REGISTRY_KEY), Some(list(&["carol@example.org"])));
    assert!(!is_marked(&engine, "data-hovercard-id", CAROL));

    advance_ms(1100).await;
    assert!(is_marked(&engine, "data-hovercard-id", CAROL));
    assert_eq!(engine.stats().merge_writes, 1);
}

#[tokio::test(start_paused = true)]
async fn repeated_harvest_writes_at_most_once() {
    let document = shared_document(&sent_view_spec());
    let store = MemoryStore::default();
    let engine = engine(&document, &store);

    assert!(engine.harvest_now().await.unwrap().changed());
    assert!(!engine.harvest_now().await.unwrap().changed());
    assert!(!engine.harvest_now().await.unwrap().changed());

    assert_eq!(store.write_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn existing_entries_are_preserved_by_merge() {
    let document = shared_document(&sent_view_spec());
    let store = registered_store(&["Zed@Example.com"]);
    let engine = engine(&document, &store);

    engine.harvest_now().await.unwrap();

    assert_eq!(
        store.peek(REGISTRY_KEY),
        Some(list(&["zed@example.com", "carol@example.org"]))
    );
}

#[tokio::test(start_paused = true)]
async fn mutation_burst_runs_one_highlight() {
    let document = shared_document(&alice_bob_spec());
    let store = registered_store(&["alice@example.com"]);
    let engine = engine(&document, &store);
    engine.start().await.unwrap();
    advance_ms(6100).await;
    assert_eq!(engine.stats().highlight_passes, 1);

    let main = find_by_attr(&*document.read(), "role", "main").unwrap();
    for i in 0..5 {
        let span = address_span("alice@example.com").with_attr("data-n", i.to_string());
        document.append_spec(main, &span).unwrap();
        advance_ms(100).await;
    }
    assert_eq!(engine.stats().highlight_passes, 1);

    advance_ms(750).await;
    let stats = engine.stats();
    assert_eq!(stats.highlight_passes, 2);
    assert_eq!(stats.elements_marked, 6);

    advance_ms(1000).await;
    assert_eq!(engine.stats().harvest_passes, 2);
}

#[tokio::test(start_paused = true)]
async fn attribute_edits_do_not_trigger_passes() {
    let document = shared_document(&alice_bob_spec());
    let store = registered_store(&["bob@example.com"]);
    let engine = engine(&document, &store);
    engine.start().await.unwrap();
    advance_ms(6100).await;

    {
        let mut doc = document.write();
        let id = find_by_attr(&*doc, "title", ALICE_TITLE).unwrap();
        doc.set_attribute(id, "aria-label", "bob@example.com").unwrap();
    }
    advance_ms(3000).await;

    assert_eq!(engine.stats().highlight_passes, 1);
    assert!(!is_marked(&engine, "title", ALICE_TITLE));
}

#[tokio::test(start_paused = true)]
async fn external_change_refreshes_mirror_and_highlights() {
    let document = shared_document(&alice_bob_spec());
    let store = MemoryStore::default();
    let engine = engine(&document, &store);
    engine.start().await.unwrap();
    advance_ms(6100).await;
    assert!(!is_marked(&engine, "title", BOB_TITLE));

    store.set(REGISTRY_KEY, list(&["BOB@example.com"])).await.unwrap();
    advance_ms(10).await;
    assert_eq!(engine.registry().len(), 1);
    assert!(engine.is_pending(TaskKind::Highlight));

    advance_ms(1000).await;
    assert!(is_marked(&engine, "title", BOB_TITLE));
}

#[tokio::test(start_paused = true)]
async fn removed_addresses_stay_marked() {
    let document = shared_document(&alice_bob_spec());
    let store = registered_store(&["alice@example.com"]);
    let engine = engine(&document, &store);
    engine.start().await.unwrap();
    advance_ms(5100).await;
    assert!(is_marked(&engine, "title", ALICE_TITLE));

    store.set(REGISTRY_KEY, Vec::new()).await.unwrap();
    advance_ms(1100).await;

    assert!(engine.registry().is_empty());
    assert!(is_marked(&engine, "title", ALICE_TITLE));
}

#[tokio::test(start_paused = true)]
async fn failed_write_is_retried_on_next_trigger() {
    let document = shared_document(&sent_view_spec());
    let store = MemoryStore::default();
    store.fail_next_sets(1);
    let engine = engine(&document, &store);
    engine.start().await.unwrap();

    advance_ms(6100).await;
    assert_eq!(store.write_count(), 0);
    assert!(engine.registry().is_empty());

    document.navigate("#sent/thread2");
    advance_ms(2100).await;

    assert_eq!(store.write_count(), 1);
    assert_eq!(engine.registry().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn navigation_into_sent_view_enables_harvest() {
    let mut spec = sent_view_spec();
    spec.fragment = "inbox".to_string();
    let document = shared_document(&spec);
    let store = MemoryStore::default();
    let engine = engine(&document, &store);
    engine.start().await.unwrap();

    advance_ms(6100).await;
    assert_eq!(store.write_count(), 0);

    document.navigate("sent");
    advance_ms(1100).await;
    assert_eq!(store.write_count(), 0);
    advance_ms(1000).await;
    assert_eq!(store.write_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_silences_all_triggers() {
    let document = shared_document(&alice_bob_spec());
    let store = registered_store(&["alice@example.com"]);
    let engine = engine(&document, &store);
    engine.start().await.unwrap();
    engine.stop();

    let body = document.read().body();
    document.append_spec(body, &ElementSpec::new("div")).unwrap();
    document.navigate("sent");
    advance_ms(10_000).await;

    assert_eq!(engine.stats().highlight_passes, 0);
    assert_eq!(engine.stats().harvest_passes, 0);
    assert!(!engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn style_is_injected_once_across_restarts() {
    let document = shared_document(&alice_bob_spec());
    let store = MemoryStore::default();
    let engine = engine(&document, &store);

    engine.start().await.unwrap();
    engine.stop();
    engine.start().await.unwrap();

    let style_id = &engine.config().marker.style_id;
    assert!(document.read().has_style(style_id));
}

#[tokio::test(start_paused = true)]
async fn stop_during_merge_write_leaves_document_untouched() {
    let document = shared_document(&sent_view_spec());
    let store = MemoryStore::default();
    let engine = HighlightEngine::new(
        EngineConfig::default(),
        document.clone(),
        Arc::new(SlowStore::new(store.clone(), 500)),
    )
    .unwrap();
    engine.start().await.unwrap();

    // harvest fired at 6000ms and is waiting on the write
    advance_ms(6100).await;
    assert_eq!(store.write_count(), 0);
    engine.stop();

    advance_ms(5000).await;
    assert_eq!(store.write_count(), 1);
    let stats = engine.stats();
    assert_eq!(stats.highlight_passes, 1);
    assert_eq!(stats.elements_marked, 0);
    assert!(!is_marked(&engine, "data-hovercard-id", CAROL));
}
