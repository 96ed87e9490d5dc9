//! End-to-end tests of the repository façade over the in-memory store.

use dataforge_core::error::ErrorKind;
use dataforge_core::traits::{AuditFields, Entity, EntityState, PersistenceContext};
use dataforge_core::types::relation::Relation;
use dataforge_repository::Repository;
use dataforge_store::{MemoryContext, MemoryStore};

#[derive(Debug, Clone, PartialEq)]
struct Note {
    id: i64,
    title: String,
    owner_name: Option<String>,
    audit: AuditFields,
}

impl Note {
    fn titled(title: &str) -> Self {
        Self {
            id: 0,
            title: title.to_string(),
            owner_name: None,
            audit: AuditFields::default(),
        }
    }
}

impl Entity for Note {
    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
    fn audit(&self) -> &AuditFields {
        &self.audit
    }
    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

type NoteRepository = Repository<Note, MemoryContext<Note>>;

async fn seeded_store(count: usize) -> MemoryStore<Note> {
    let store = MemoryStore::new();
    let mut repo = NoteRepository::new(store.context());
    let notes = (1..=count).map(|n| Note::titled(&format!("note-{n:02}"))).collect();
    repo.add_many(notes).await.expect("seed");
    store
}

// ---- paging ----

#[tokio::test]
async fn test_paginate_23_rows_page_3_of_10() {
    let store = seeded_store(23).await;
    let mut repo = NoteRepository::new(store.context());

    let result = repo.paginate(&repo.query(), 3, 10).await.expect("paginate");
    assert_eq!(result.page.skip(), 20);
    assert_eq!(result.items.len(), 3);
    assert_eq!(result.page.total_pages(), 3);
    assert_eq!(result.page.total_count, 23);
}

#[tokio::test]
async fn test_paginate_past_the_end_is_empty_but_valid() {
    let store = seeded_store(23).await;
    let mut repo = NoteRepository::new(store.context());

    let result = repo.paginate(&repo.query(), 9, 10).await.expect("paginate");
    assert!(result.items.is_empty());
    assert_eq!(result.page.total_count, 23);
    assert_eq!(result.page.total_pages(), 3);
}

#[tokio::test]
async fn test_paginate_empty_store_has_zero_pages() {
    let store: MemoryStore<Note> = MemoryStore::new();
    let mut repo = NoteRepository::new(store.context());

    let result = repo.paginate(&repo.query(), 1, 10).await.expect("paginate");
    assert!(result.items.is_empty());
    assert_eq!(result.page.total_pages(), 0);
}

#[tokio::test]
async fn test_paginate_issues_exactly_two_round_trips() {
    let store = seeded_store(5).await;
    let mut repo = NoteRepository::new(store.context());

    let before = store.round_trips();
    repo.paginate(&repo.query(), 1, 2).await.expect("paginate");
    assert_eq!(store.round_trips() - before, 2);
}

#[tokio::test]
async fn test_paginate_respects_filter() {
    let store = seeded_store(23).await;
    let mut repo = NoteRepository::new(store.context());

    let query = repo.query().filter(|note: &Note| note.id() <= 7);
    let result = repo.paginate(&query, 2, 5).await.expect("paginate");
    assert_eq!(result.page.total_count, 7);
    assert_eq!(result.items.len(), 2);
}

#[tokio::test]
async fn test_paginate_caps_page_size_at_configured_max() {
    use dataforge_core::config::paging::PagingConfig;

    let store = seeded_store(23).await;
    let paging = PagingConfig {
        default_page_size: 5,
        max_page_size: 10,
    };
    let mut repo = NoteRepository::with_paging(store.context(), paging);

    let result = repo.paginate(&repo.query(), 1, 500).await.expect("paginate");
    assert_eq!(result.page.page_size, 10);
    assert_eq!(result.items.len(), 10);
}

#[tokio::test]
async fn test_paginated_rows_are_not_tracked() {
    let store = seeded_store(5).await;
    let mut repo = NoteRepository::new(store.context());

    let query = repo.query().tracked(true); // paginate must override this
    repo.paginate(&query, 1, 5).await.expect("paginate");
    assert_eq!(repo.context().state(1), EntityState::Detached);
}

// ---- soft and hard delete ----

#[tokio::test]
async fn test_soft_delete_marks_and_hides_from_default_listing() {
    let store = seeded_store(8).await;
    let mut repo = NoteRepository::new(store.context());

    let note = repo.get_by_id(5, false, &[]).await.expect("get").expect("row");
    repo.delete(note, false).await.expect("soft delete");

    let row = store.peek(5).expect("row still stored");
    assert!(row.audit.is_deleted);
    assert!(row.audit.updated_date.is_some());

    let mut repo = NoteRepository::new(store.context());
    let visible = repo.get_all(false).await.expect("untracked get_all");
    assert_eq!(visible.len(), 7);
    assert!(visible.iter().all(|note| note.id() != 5));

    let everything = repo.get_all(true).await.expect("tracked get_all");
    assert_eq!(everything.len(), 8);
    assert!(everything.iter().any(|note| note.id() == 5 && note.is_deleted()));
}

#[tokio::test]
async fn test_soft_deleted_row_reachable_by_explicit_query() {
    let store = seeded_store(3).await;
    let mut repo = NoteRepository::new(store.context());
    repo.delete_by_id(2, false).await.expect("soft delete");

    let found = repo
        .first_or_default(|note: &Note| note.id() == 2, &[])
        .await
        .expect("query");
    assert!(found.expect("row").is_deleted());
}

#[tokio::test]
async fn test_hard_delete_removes_the_row() {
    let store = seeded_store(3).await;
    let mut repo = NoteRepository::new(store.context());

    let note = repo.get_by_id(2, false, &[]).await.expect("get").expect("row");
    repo.delete(note, true).await.expect("hard delete");

    assert!(!store.contains(2));
    let mut repo = NoteRepository::new(store.context());
    assert!(repo.get_by_id(2, false, &[]).await.expect("get").is_none());
}

#[tokio::test]
async fn test_delete_by_id_miss_is_not_found() {
    let store = seeded_store(1).await;
    let mut repo = NoteRepository::new(store.context());

    let err = repo.delete_by_id(99, false).await.expect_err("missing id");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_range_always_hard_deletes() {
    let store = seeded_store(10).await;
    let mut repo = NoteRepository::new(store.context());

    let removed = repo
        .delete_range(|note: &Note| note.id() > 7)
        .await
        .expect("range delete");
    assert!(removed);
    assert_eq!(store.len(), 7);
    assert!(!store.contains(8));

    let removed_again = repo
        .delete_range(|note: &Note| note.id() > 7)
        .await
        .expect("range delete");
    assert!(!removed_again);
}

// ---- reads ----

#[tokio::test]
async fn test_get_by_id_untracked_mutation_is_never_persisted() {
    let store = seeded_store(2).await;
    let mut repo = NoteRepository::new(store.context());

    let mut note = repo.get_by_id(1, false, &[]).await.expect("get").expect("row");
    note.title = "mutated in memory".to_string();

    // unrelated flush later in the same unit of work
    repo.save_changes().await.expect("flush");
    assert_eq!(store.peek(1).expect("row").title, "note-01");
}

#[tokio::test]
async fn test_get_by_id_tracked_registers_in_identity_map() {
    let store = seeded_store(1).await;
    let mut repo = NoteRepository::new(store.context());

    repo.get_by_id(1, true, &[]).await.expect("get");
    assert!(repo.context().is_tracked(1));

    repo.get_by_id(1, false, &[]).await.expect("get");
    assert!(!repo.context().is_tracked(1));
}

#[tokio::test]
async fn test_get_by_id_eager_loads_single_relations_only() {
    let store = seeded_store(1).await;
    store.register_relation("owner", |note: &mut Note| {
        note.owner_name = Some("admin".to_string());
    });
    store.register_relation("attachments", |_: &mut Note| {
        panic!("collection relations must not load through get_by_id");
    });
    let mut repo = NoteRepository::new(store.context());

    let relations = [Relation::single("owner"), Relation::collection("attachments")];
    let note = repo
        .get_by_id(1, false, &relations)
        .await
        .expect("get")
        .expect("row");
    assert_eq!(note.owner_name.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_get_single_zero_one_and_many() {
    let store = seeded_store(4).await;
    let mut repo = NoteRepository::new(store.context());

    let none = repo
        .get_single(|note: &Note| note.id() == 77, &[])
        .await
        .expect("zero rows");
    assert!(none.is_none());

    let one = repo
        .get_single(|note: &Note| note.id() == 3, &[])
        .await
        .expect("one row");
    assert_eq!(one.expect("row").title, "note-03");

    let err = repo
        .get_single(|note: &Note| note.id() > 1, &[])
        .await
        .expect_err("many rows");
    assert_eq!(err.kind, ErrorKind::AmbiguousResult);
}

#[tokio::test]
async fn test_first_or_default_returns_none_without_error() {
    let store = seeded_store(2).await;
    let mut repo = NoteRepository::new(store.context());

    let missing = repo
        .first_or_default(|note: &Note| note.title == "nope", &[])
        .await
        .expect("no match");
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_get_list_orders_results() {
    let store = seeded_store(3).await;
    let mut repo = NoteRepository::new(store.context());

    let newest_first: dataforge_core::types::Comparator<Note> =
        std::sync::Arc::new(|a: &Note, b: &Note| b.id().cmp(&a.id()));
    let rows = repo
        .get_list(None, Some(newest_first), &[])
        .await
        .expect("list");
    let ids: Vec<i64> = rows.iter().map(|note| note.id()).collect();
    assert_eq!(ids, [3, 2, 1]);
}

// ---- create and update ----

#[tokio::test]
async fn test_add_assigns_sequential_ids() {
    let store: MemoryStore<Note> = MemoryStore::new();
    let mut repo = NoteRepository::new(store.context());

    assert_eq!(repo.add(Note::titled("a")).await.expect("add"), 1);
    assert_eq!(repo.add(Note::titled("b")).await.expect("add"), 1);
    assert_eq!(store.peek(2).expect("row").title, "b");
}

#[tokio::test]
async fn test_add_many_empty_is_a_no_op() {
    let store: MemoryStore<Note> = MemoryStore::new();
    let mut repo = NoteRepository::new(store.context());

    let before = store.round_trips();
    assert_eq!(repo.add_many(Vec::new()).await.expect("add_many"), 0);
    assert_eq!(store.round_trips(), before);
}

#[tokio::test]
async fn test_update_overwrites_the_full_record() {
    let store = seeded_store(1).await;
    let mut repo = NoteRepository::new(store.context());

    let mut note = repo.get_by_id(1, false, &[]).await.expect("get").expect("row");
    note.title = "rewritten".to_string();
    note.audit.row_status = 9;
    repo.update(note).await.expect("update");

    let row = store.peek(1).expect("row");
    assert_eq!(row.title, "rewritten");
    assert_eq!(row.audit.row_status, 9);
    assert!(row.audit.updated_date.is_some());
}

#[tokio::test]
async fn test_update_of_unknown_id_propagates_the_failure() {
    let store = seeded_store(1).await;
    let mut repo = NoteRepository::new(store.context());

    let mut ghost = Note::titled("ghost");
    ghost.set_id(404);
    let err = repo.update(ghost).await.expect_err("unknown id");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_add_or_update_inserts_unassigned_ids() {
    let store: MemoryStore<Note> = MemoryStore::new();
    let mut repo = NoteRepository::new(store.context());

    repo.add_or_update(Note::titled("fresh")).await.expect("upsert");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_add_or_update_updates_store_existing_untracked_id() {
    let store = seeded_store(1).await;

    // a different unit of work never loaded row 1, so it is not locally tracked
    let mut repo = NoteRepository::new(store.context());
    let mut replacement = Note::titled("replaced");
    replacement.set_id(1);
    repo.add_or_update(replacement).await.expect("upsert");

    assert_eq!(store.len(), 1);
    assert_eq!(store.peek(1).expect("row").title, "replaced");
}

#[tokio::test]
async fn test_add_or_update_flushes_pending_state_when_tracked() {
    let store = seeded_store(1).await;
    let mut repo = NoteRepository::new(store.context());

    let mut note = repo.get_by_id(1, true, &[]).await.expect("get").expect("row");
    note.title = "tracked edit".to_string();
    repo.context_mut().mark_modified(note.clone());

    repo.add_or_update(note).await.expect("upsert");
    assert_eq!(store.peek(1).expect("row").title, "tracked edit");
}

// ---- bulk ----

#[tokio::test]
async fn test_bulk_operations_with_empty_input_skip_the_store() {
    let store = seeded_store(2).await;
    let mut repo = NoteRepository::new(store.context());

    let before = store.round_trips();
    assert_eq!(repo.bulk_add(Vec::new()).await.expect("bulk add"), 0);
    assert_eq!(repo.bulk_update(Vec::new()).await.expect("bulk update"), 0);
    assert_eq!(repo.bulk_delete(Vec::new()).await.expect("bulk delete"), 0);
    assert_eq!(repo.bulk_delete_by_ids(&[]).await.expect("bulk delete ids"), 0);
    assert_eq!(store.round_trips(), before);
}

#[tokio::test]
async fn test_bulk_add_inserts_in_one_flush() {
    let store: MemoryStore<Note> = MemoryStore::new();
    let mut repo = NoteRepository::new(store.context());

    let notes = vec![Note::titled("a"), Note::titled("b"), Note::titled("c")];
    let before = store.round_trips();
    assert_eq!(repo.bulk_add(notes).await.expect("bulk add"), 3);
    assert_eq!(store.round_trips() - before, 1);
}

#[tokio::test]
async fn test_bulk_delete_by_ids_hard_deletes_matching_rows() {
    let store = seeded_store(5).await;
    let mut repo = NoteRepository::new(store.context());

    let affected = repo
        .bulk_delete_by_ids(&[2, 4, 99])
        .await
        .expect("bulk delete");
    assert_eq!(affected, 2);
    assert!(!store.contains(2));
    assert!(!store.contains(4));
    assert!(store.contains(3));
}

#[tokio::test]
async fn test_bulk_delete_where_removes_all_matches() {
    let store = seeded_store(6).await;
    let mut repo = NoteRepository::new(store.context());

    let affected = repo
        .bulk_delete_where(|note: &Note| note.id() % 2 == 0)
        .await
        .expect("bulk delete");
    assert_eq!(affected, 3);
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_bulk_update_overwrites_each_row_in_one_flush() {
    let store = seeded_store(3).await;
    let mut repo = NoteRepository::new(store.context());

    let mut rows = repo.get_all(false).await.expect("get_all");
    for note in &mut rows {
        note.title = format!("edited-{}", note.id());
    }
    let before = store.round_trips();
    assert_eq!(repo.bulk_update(rows).await.expect("bulk update"), 3);
    assert_eq!(store.round_trips() - before, 1);
    assert_eq!(store.peek(2).expect("row").title, "edited-2");
}

// ---- unit-of-work control ----

#[tokio::test]
async fn test_composed_mutations_flush_once() {
    let store = seeded_store(2).await;
    let mut repo = NoteRepository::new(store.context());

    let first = repo.get_by_id(1, false, &[]).await.expect("get").expect("row");
    let second = repo.get_by_id(2, false, &[]).await.expect("get").expect("row");

    let mut renamed = first.clone();
    renamed.title = "batched".to_string();
    repo.context_mut().mark_modified(renamed);
    repo.context_mut().mark_deleted(second);

    let before = store.round_trips();
    assert_eq!(repo.save_changes().await.expect("flush"), 2);
    assert_eq!(store.round_trips() - before, 1);
    assert_eq!(store.peek(1).expect("row").title, "batched");
    assert!(!store.contains(2));
}

// ---- synchronous mirrors ----

#[test]
fn test_blocking_mirrors_apply_identical_policy() {
    let store: MemoryStore<Note> = MemoryStore::new();
    let mut repo = NoteRepository::new(store.context());

    repo.add_blocking(Note::titled("sync-a")).expect("add");
    repo.add_blocking(Note::titled("sync-b")).expect("add");

    let note = repo
        .get_by_id_blocking(1, false, &[])
        .expect("get")
        .expect("row");
    repo.delete_blocking(note, false).expect("soft delete");

    let visible = repo.get_all_blocking(false).expect("get_all");
    assert_eq!(visible.len(), 1);
    assert!(store.peek(1).expect("row").audit.is_deleted);
}
