use bson::doc;
use docquery::test_support::{RecordedCall, RecordingStore};
use docquery::{Builder, Execution, OperationKind, QueryError};
use std::sync::Arc;

fn session() -> (Arc<RecordingStore>, Builder<RecordingStore>) {
    let store = Arc::new(RecordingStore::new());
    let qb = Builder::new(Arc::clone(&store));
    (store, qb)
}

#[test]
fn find_dispatches_filter_without_projection() {
    let (store, mut qb) = session();
    qb.field("age").gte(21);
    let result = qb.get_query().execute().unwrap();
    assert!(matches!(result, Execution::Cursor(_)));
    assert_eq!(
        store.calls(),
        vec![RecordedCall::Find {
            filter: doc! { "age": { "$gte": 21 } },
            projection: None,
        }]
    );
}

#[test]
fn find_passes_a_non_empty_projection() {
    let (store, mut qb) = session();
    qb.field("age").gte(21).select(["name"]);
    qb.get_query().execute().unwrap();
    assert_eq!(
        store.calls(),
        vec![RecordedCall::Find {
            filter: doc! { "age": { "$gte": 21 } },
            projection: Some(doc! { "name": 1 }),
        }]
    );
}

#[test]
fn find_omits_an_empty_projection() {
    let (store, mut qb) = session();
    qb.select(Vec::<String>::new());
    qb.get_query().execute().unwrap();
    assert_eq!(
        store.calls(),
        vec![RecordedCall::Find { filter: doc! {}, projection: None }]
    );
}

#[test]
fn insert_passes_the_update_document_as_the_document() {
    let (store, mut qb) = session();
    qb.insert()
        .field("name")
        .set("awesome")
        .unwrap()
        .field("age")
        .set(21)
        .unwrap();
    let result = qb.get_query().execute().unwrap();
    assert!(matches!(result, Execution::Inserted(())));
    assert_eq!(
        store.calls(),
        vec![RecordedCall::Insert {
            document: doc! { "name": "awesome", "age": 21 },
            options: doc! {},
        }]
    );
}

#[test]
fn update_one_and_many_hit_their_own_driver_calls() {
    let (store, mut qb) = session();
    qb.update()
        .upsert(true)
        .field("foo")
        .equals("bar")
        .set("buzz")
        .unwrap();
    qb.get_query().execute().unwrap();

    let (store_many, mut qb) = session();
    qb.update_many().field("counter").inc(1).unwrap();
    qb.get_query().execute().unwrap();

    assert_eq!(
        store.calls(),
        vec![RecordedCall::UpdateOne {
            filter: doc! { "foo": "bar" },
            update: doc! { "$set": { "foo": "buzz" } },
            options: doc! { "upsert": true },
        }]
    );
    assert_eq!(
        store_many.calls(),
        vec![RecordedCall::UpdateMany {
            filter: doc! {},
            update: doc! { "$inc": { "counter": 1 } },
            options: doc! {},
        }]
    );
}

#[test]
fn remove_dispatches_the_filter() {
    let (store, mut qb) = session();
    qb.remove().field("expired").equals(true);
    let result = qb.get_query().execute().unwrap();
    assert!(matches!(result, Execution::Deleted(())));
    assert_eq!(
        store.calls(),
        vec![RecordedCall::Delete { filter: doc! { "expired": true }, options: doc! {} }]
    );
}

#[test]
fn group_merges_filter_and_caller_options() {
    let (store, mut qb) = session();
    qb.group(
        doc! { "dept": 1 },
        doc! { "total": 0 },
        "function(doc, out) { out.total += doc.amount; }",
    )
    .field("active")
    .equals(true);

    let query = qb.get_query_with(doc! { "finalize": "function(out) {}" });
    let result = query.execute().unwrap();
    assert!(matches!(result, Execution::Grouped(_)));
    assert_eq!(
        store.calls(),
        vec![RecordedCall::Group {
            keys: doc! { "dept": 1 },
            initial: doc! { "total": 0 },
            reduce: "function(doc, out) { out.total += doc.amount; }".to_string(),
            options: doc! {
                "cond": { "active": true },
                "finalize": "function(out) {}",
            },
        }]
    );
}

#[test]
fn group_with_empty_filter_has_no_cond() {
    let (store, mut qb) = session();
    qb.group(doc! { "dept": 1 }, doc! { "n": 0 }, "function(d, o) { o.n += 1; }");
    qb.get_query().execute().unwrap();
    let calls = store.calls();
    let RecordedCall::Group { options, .. } = &calls[0] else {
        panic!("expected a group call, got {calls:?}");
    };
    assert!(!options.contains_key("cond"));
}

#[test]
fn find_and_modify_kinds_are_unsupported_at_execute() {
    let (store, mut qb) = session();
    qb.find_and_update().field("a").equals(1);
    let err = qb.get_query().execute().unwrap_err();
    assert!(matches!(
        err,
        QueryError::UnsupportedOperation(OperationKind::FindAndUpdate)
    ));

    qb.find_and_remove();
    let err = qb.get_query().execute().unwrap_err();
    assert!(matches!(
        err,
        QueryError::UnsupportedOperation(OperationKind::FindAndRemove)
    ));

    // Nothing reached the store.
    assert_eq!(store.calls(), vec![]);
}

#[test]
fn driver_errors_propagate_verbatim() {
    let (store, mut qb) = session();
    qb.field("a").equals(1);
    store.fail_next("socket closed");
    let err = qb.get_query().execute().unwrap_err();
    assert!(matches!(err, QueryError::Driver(_)));
    // Transparent wrapping: the driver's own message is the display output.
    assert_eq!(err.to_string(), "socket closed");
}

#[test]
fn one_builder_can_finalize_more_than_once() {
    let (store, mut qb) = session();
    qb.field("n").gt(0);
    qb.get_query().execute().unwrap();
    qb.field("n").lt(10);
    qb.get_query().execute().unwrap();
    assert_eq!(
        store.calls(),
        vec![
            RecordedCall::Find { filter: doc! { "n": { "$gt": 0 } }, projection: None },
            RecordedCall::Find {
                filter: doc! { "n": { "$gt": 0, "$lt": 10 } },
                projection: None,
            },
        ]
    );
}
