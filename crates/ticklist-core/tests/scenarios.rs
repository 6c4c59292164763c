use ticklist_core::reconcile::visible_default_count;
use ticklist_core::{
    DEFAULT_LIST_NAME, Error, FileBackend, Identity, ItemFilter, MemoryBackend, Session,
    StorageBackend, StorageKey, TodoItem, TodoList, enforce_default_list,
};

fn identity() -> Identity {
    Identity {
        user_id: "mock-user-123".to_string(),
        email: "user@example.com".to_string(),
        display_name: "Demo".to_string(),
        is_admin: false,
    }
}

fn signed_in<B: StorageBackend>(backend: B) -> Session<B> {
    let mut session = Session::open(backend, DEFAULT_LIST_NAME);
    session.login(identity()).into_result().unwrap();
    session
}

/// At most one visible default list
fn assert_invariants<B: StorageBackend>(session: &Session<B>) {
    assert!(visible_default_count(session.all_lists(), DEFAULT_LIST_NAME) <= 1);
}

#[test]
fn scenario_a_favorite_creates_default_list() {
    let mut session = signed_in(MemoryBackend::new());
    assert!(session.lists().is_empty());

    let item = session.add_favorite_item("buy milk").unwrap().into_result().unwrap();

    let defaults: Vec<&TodoList> = session
        .lists()
        .into_iter()
        .filter(|l| l.name == DEFAULT_LIST_NAME)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(session.items().len(), 1);
    let stored = session.items()[0];
    assert_eq!(stored, &item);
    assert!(stored.is_favorited);
    assert_eq!(stored.list_id, defaults[0].list_id);
    assert_eq!(stored.content, "buy milk");
}

#[test]
fn scenario_b_duplicate_defaults_converge() {
    let mut lists = vec![
        TodoList::new("list-1".into(), "u".into(), DEFAULT_LIST_NAME.into()),
        TodoList::new("list-2".into(), "u".into(), DEFAULT_LIST_NAME.into()),
    ];

    enforce_default_list(&mut lists, DEFAULT_LIST_NAME);

    assert_eq!(lists.len(), 2);
    assert_eq!(lists.iter().filter(|l| !l.is_deleted).count(), 1);
    assert!(!lists[0].is_deleted);
    assert!(lists[1].is_deleted);
}

#[test]
fn scenario_c_cascade_then_blocked_restore() {
    let mut session = signed_in(MemoryBackend::new());
    let list = session.add_list("Groceries").unwrap().into_value();
    let i1 = session.add_item(&list.list_id, "eggs").unwrap().into_value();
    let i2 = session.add_item(&list.list_id, "bread").unwrap().into_value();

    session.delete_list(&list.list_id).unwrap().into_result().unwrap();
    for id in [&i1.item_id, &i2.item_id] {
        assert!(session.store().get_item(id).unwrap().is_deleted);
    }

    assert!(!session.restore_item(&i1.item_id).into_value());
    assert!(session.store().get_item(&i1.item_id).unwrap().is_deleted);

    assert!(session.restore_list(&list.list_id).unwrap().into_value());
    assert!(session.items_in_list(&list.list_id).is_empty());
    assert!(session.restore_item(&i1.item_id).into_value());
    assert_eq!(session.items_in_list(&list.list_id).len(), 1);
    assert_invariants(&session);
}

#[test]
fn scenario_d_duplicate_list_name() {
    let mut session = signed_in(MemoryBackend::new());
    session.add_list("Work").unwrap().into_result().unwrap();
    let snapshot = session.all_lists().to_vec();

    let err = session.add_list("Work").unwrap_err();
    assert!(matches!(err, Error::DuplicateListName(_)));
    assert_eq!(session.all_lists(), snapshot.as_slice());
}

#[test]
fn scenario_e_permanent_delete_removes_items() {
    let mut session = signed_in(MemoryBackend::new());
    let keep = session.add_list("Keep").unwrap().into_value();
    let purge = session.add_list("Purge").unwrap().into_value();
    session.add_item(&keep.list_id, "stay").unwrap().into_result().unwrap();
    session.add_item(&purge.list_id, "go").unwrap().into_result().unwrap();
    let trashed = session.add_item(&purge.list_id, "go too").unwrap().into_value();
    session.delete_item(&trashed.item_id).unwrap().into_result().unwrap();

    let removed = session
        .permanently_delete_list(&purge.list_id)
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(removed, 2);
    assert!(session.all_lists().iter().all(|l| l.list_id != purge.list_id));
    assert!(session.all_items().iter().all(|i| i.list_id != purge.list_id));
    assert_eq!(session.all_items().len(), 1);
}

#[test]
fn restore_never_exposes_orphans() {
    let mut session = signed_in(MemoryBackend::new());
    let a = session.add_list("A").unwrap().into_value();
    let b = session.add_list("B").unwrap().into_value();
    let ids: Vec<String> = (0..4)
        .map(|n| {
            let list = if n % 2 == 0 { &a } else { &b };
            session
                .add_item(&list.list_id, &format!("task {}", n))
                .unwrap()
                .into_value()
                .item_id
        })
        .collect();

    session.clear_items(&ItemFilter::All).into_result().unwrap();
    session.delete_list(&a.list_id).unwrap().into_result().unwrap();
    session.permanently_delete_list(&b.list_id).unwrap().into_result().unwrap();

    for id in &ids {
        let _ = session.restore_item(id).into_result().unwrap();
    }

    for item in session.items() {
        let parent = session.store().get_list(&item.list_id);
        assert!(parent.is_some_and(|l| !l.is_deleted));
    }
    assert!(session.items().is_empty());
    assert_invariants(&session);
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let (list_id, item_id) = {
        let mut session = signed_in(FileBackend::open(dir.path()).unwrap());
        let list = session.add_list("Work").unwrap().into_value();
        let item = session.add_item(&list.list_id, "report").unwrap().into_value();
        session.toggle_item_favorite(&item.item_id).unwrap().into_result().unwrap();
        session.add_favorite_item("milk").unwrap().into_result().unwrap();
        (list.list_id, item.item_id)
    };

    let session = Session::open(FileBackend::open(dir.path()).unwrap(), DEFAULT_LIST_NAME);
    assert_eq!(session.user().unwrap(), &identity());
    assert_eq!(session.lists().len(), 2);
    assert!(session.store().get_list(&list_id).is_some());
    assert!(session.store().get_item(&item_id).unwrap().is_favorited);
    assert_eq!(session.favorite_items().len(), 2);
    assert!(session.default_list().is_some());
}

#[test]
fn items_roundtrip_through_storage() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = signed_in(FileBackend::open(dir.path()).unwrap());
    let list = session.add_list("Work").unwrap().into_value();
    for n in 0..3 {
        session.add_item(&list.list_id, &format!("t{}", n)).unwrap().into_result().unwrap();
    }
    let first = session.items()[0].item_id.clone();
    session.delete_item(&first).unwrap().into_result().unwrap();

    let stored: Vec<TodoItem> = session.storage().get(StorageKey::Items).unwrap();
    assert_eq!(stored.as_slice(), session.all_items());
}

#[test]
fn unavailable_storage_is_reported_not_fatal() {
    let mut session = signed_in(MemoryBackend::new());
    session.storage_mut().backend_mut().set_available(false);

    let committed = session.add_favorite_item("offline").unwrap();
    assert!(!committed.is_persisted());
    assert_eq!(session.favorite_items().len(), 1);
    assert!(session.unsaved().contains(&StorageKey::Lists));

    session.storage_mut().backend_mut().set_available(true);
    assert!(session.storage_available());
    // The next write also flushes the default list that failed earlier
    session.add_favorite_item("online").unwrap().into_result().unwrap();
    assert!(session.unsaved().is_empty());
    let stored: Vec<TodoItem> = session.storage().get(StorageKey::Items).unwrap();
    assert_eq!(stored.len(), 2);
    let lists: Vec<TodoList> = session.storage().get(StorageKey::Lists).unwrap();
    assert_eq!(lists.len(), 1);
}
