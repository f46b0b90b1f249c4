use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tablefix::{
    BatchSink, DocId, DocumentSource, Engine, EngineConfig, InMemoryStore, MappingStore,
    RepairOwner, TableDoc,
};

fn table(id: &str, owner: Option<&str>, trashed: Option<bool>) -> TableDoc {
    let mut doc = TableDoc::new(id);
    doc.owner_id = owner.map(str::to_string);
    doc.trashed = trashed;
    doc
}

fn engine_over(store: &Arc<InMemoryStore>, page_size: usize, dry_run: bool) -> Engine {
    Engine::with_config(
        Arc::clone(store) as Arc<dyn DocumentSource>,
        Arc::clone(store) as Arc<dyn MappingStore>,
        Arc::clone(store) as Arc<dyn BatchSink>,
        EngineConfig { page_size, dry_run },
    )
}

#[test]
fn assigns_owner_and_adds_trashed_when_absent() {
    // Scenario: blank ownerId, no trashed field at all.
    let store = Arc::new(InMemoryStore::new());
    store.set_fixed_now(Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap())).unwrap();
    store.insert_table(&table("t2", Some(""), None)).unwrap();

    let report = engine_over(&store, 500, false)
        .run(&RepairOwner::new("u9"))
        .unwrap();
    assert_eq!(report.scanned, 1);
    assert_eq!(report.updated, 1);

    let repaired = store.table(&DocId::from("t2")).unwrap().unwrap();
    assert_eq!(repaired.owner_id.as_deref(), Some("u9"));
    assert_eq!(repaired.trashed, Some(false));
}

#[test]
fn never_overrides_an_explicit_trashed_value() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_table(&table("kept-true", None, Some(true))).unwrap();
    store.insert_table(&table("kept-false", None, Some(false))).unwrap();

    engine_over(&store, 500, false)
        .run(&RepairOwner::new("u9"))
        .unwrap();

    let kept_true = store.table(&DocId::from("kept-true")).unwrap().unwrap();
    assert_eq!(kept_true.owner_id.as_deref(), Some("u9"));
    assert_eq!(kept_true.trashed, Some(true));

    let kept_false = store.table(&DocId::from("kept-false")).unwrap().unwrap();
    assert_eq!(kept_false.trashed, Some(false));
}

#[test]
fn owned_documents_are_left_alone() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_table(&table("t1", Some("u1"), Some(true))).unwrap();
    store.insert_table(&table("t2", Some(" "), None)).unwrap();

    let report = engine_over(&store, 500, false)
        .run(&RepairOwner::new("u9"))
        .unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.skipped_already_owned, 1);
    assert_eq!(report.updated, 1);

    let untouched = store.table(&DocId::from("t1")).unwrap().unwrap();
    assert_eq!(untouched.owner_id.as_deref(), Some("u1"));
    assert_eq!(untouched.trashed, Some(true));
}

#[test]
fn rerun_repairs_nothing_further() {
    let store = Arc::new(InMemoryStore::new());
    store.set_fixed_now(Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap())).unwrap();
    for i in 0..9 {
        let owner = if i % 3 == 0 { Some("u1") } else { None };
        store
            .insert_table(&table(&format!("t{i}"), owner, None))
            .unwrap();
    }

    let engine = engine_over(&store, 4, false);
    let first = engine.run(&RepairOwner::new("u9")).unwrap();
    assert_eq!(first.updated, 6);
    assert_eq!(first.skipped_already_owned, 3);

    let (tables_after_first, _) = store.export().unwrap();

    let second = engine.run(&RepairOwner::new("u9")).unwrap();
    assert_eq!(second.updated, 0);
    assert_eq!(second.skipped_already_owned, 9);

    let (tables_after_second, _) = store.export().unwrap();
    assert_eq!(tables_after_first, tables_after_second);
}

#[test]
fn dry_run_counts_identically_and_patches_nothing() {
    let seed = |store: &Arc<InMemoryStore>| {
        store.insert_table(&table("t1", None, None)).unwrap();
        store.insert_table(&table("t2", Some("u1"), None)).unwrap();
        store.insert_table(&table("t3", Some(""), Some(true))).unwrap();
    };

    let dry_store = Arc::new(InMemoryStore::new());
    seed(&dry_store);
    let dry = engine_over(&dry_store, 2, true)
        .run(&RepairOwner::new("u9"))
        .unwrap();

    let live_store = Arc::new(InMemoryStore::new());
    seed(&live_store);
    let live = engine_over(&live_store, 2, false)
        .run(&RepairOwner::new("u9"))
        .unwrap();

    assert_eq!(dry.counters(), live.counters());

    let unpatched = dry_store.table(&DocId::from("t1")).unwrap().unwrap();
    assert_eq!(unpatched.owner_id, None);
    assert_eq!(unpatched.trashed, None);
}
