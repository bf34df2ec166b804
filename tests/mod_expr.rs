use bson::{Bson, doc};
use docquery::{Expr, QueryError, expr};

#[test]
fn bare_equality_assigns_without_wrapping() {
    let mut e = Expr::new();
    e.field("name").equals("alice");
    assert_eq!(e.filter(), &doc! { "name": "alice" });

    let mut e = Expr::new();
    e.field("tags").equals(vec![Bson::from("a"), Bson::from("b")]);
    assert_eq!(e.filter(), &doc! { "tags": ["a", "b"] });
}

#[test]
fn wrapping_law_on_the_same_field() {
    let mut e = Expr::new();
    e.field("x").equals(5).field("x").gt(1);
    assert_eq!(e.filter(), &doc! { "x": { "$eq": 5, "$gt": 1 } });
}

#[test]
fn cursor_persists_until_the_next_field_call() {
    // No second field() call: gt applies to the same field and still wraps.
    let mut e = Expr::new();
    e.field("x").equals(5).gt(1).lt(9);
    assert_eq!(e.filter(), &doc! { "x": { "$eq": 5, "$gt": 1, "$lt": 9 } });
}

#[test]
fn get_filter_is_a_pure_read() {
    let mut e = Expr::new();
    e.field("age").gte(21);
    let first = e.filter().clone();
    let second = e.filter().clone();
    assert_eq!(first, second);
    assert_eq!(e.filter(), &doc! { "age": { "$gte": 21 } });
}

#[test]
fn scenario_find_filter() {
    let mut e = Expr::new();
    e.field("name")
        .is_not_in(["Matthew", "Boris"])
        .field("age")
        .gte(21)
        .field("attributes")
        .is_type("object")
        .unwrap();
    assert_eq!(
        e.filter(),
        &doc! {
            "name": { "$nin": ["Matthew", "Boris"] },
            "age": { "$gte": 21 },
            "attributes": { "$type": 3 },
        }
    );
}

#[test]
fn is_type_name_and_code_are_equivalent() {
    let mut by_name = Expr::new();
    by_name.field("attributes").is_type("object").unwrap();
    let mut by_code = Expr::new();
    by_code.field("attributes").is_type(3).unwrap();
    assert_eq!(by_name.filter(), by_code.filter());

    // Names are case-insensitive.
    let mut upper = Expr::new();
    upper.field("attributes").is_type("OBJECT").unwrap();
    assert_eq!(upper.filter(), by_code.filter());
}

#[test]
fn is_type_rejects_unknown_names() {
    let mut e = Expr::new();
    let err = e.field("x").is_type("tuple").unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[test]
fn sort_normalizes_orders() {
    let mut e = Expr::new();
    e.sort_many([("a", "asc"), ("b", "desc")]);
    assert_eq!(e.filter(), &doc! { "$sort": { "a": 1, "b": -1 } });

    let mut e = Expr::new();
    e.sort_many([("a", 5), ("b", -3)]);
    assert_eq!(e.filter(), &doc! { "$sort": { "a": 1, "b": -1 } });

    let mut e = Expr::new();
    e.field("scores").sort("value", "ASC");
    assert_eq!(e.filter(), &doc! { "scores": { "$sort": { "value": 1 } } });
}

#[test]
fn logical_composition_accepts_exprs_and_documents() {
    let mut adult = expr();
    adult.field("age").gte(18);

    let mut e = Expr::new();
    e.add_and(&adult).add_and(doc! { "active": true });
    assert_eq!(
        e.filter(),
        &doc! { "$and": [ { "age": { "$gte": 18 } }, { "active": true } ] }
    );

    let mut e = Expr::new();
    e.add_nor(doc! { "banned": true });
    assert_eq!(e.filter(), &doc! { "$nor": [ { "banned": true } ] });
}

#[test]
fn elem_match_with_sub_expression() {
    let mut sub = expr();
    sub.field("score").gt(80).field("score").lt(90);

    let mut e = Expr::new();
    e.field("results").elem_match(&sub);
    assert_eq!(
        e.filter(),
        &doc! { "results": { "$elemMatch": { "score": { "$gt": 80, "$lt": 90 } } } }
    );
}

#[test]
fn text_search_and_case_sensitivity() {
    let mut e = Expr::new();
    assert!(matches!(
        e.case_sensitive(true).unwrap_err(),
        QueryError::Precondition(_)
    ));

    e.text("coffee").case_sensitive(true).unwrap();
    assert_eq!(
        e.filter(),
        &doc! { "$text": { "$search": "coffee", "$caseSensitive": true } }
    );

    e.case_sensitive(false).unwrap();
    assert_eq!(e.filter(), &doc! { "$text": { "$search": "coffee" } });
}

#[test]
fn comment_and_where_are_top_level() {
    let mut e = Expr::new();
    e.field("a").equals(1).comment("audit").where_js("this.a > 0");
    assert_eq!(
        e.filter(),
        &doc! { "a": 1, "$comment": "audit", "$where": "this.a > 0" }
    );
}

#[test]
fn update_operators_without_field_fail() {
    let mut e = Expr::new();
    assert!(matches!(e.set("x", true).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.unset().unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.inc(1).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.mul(2).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.min(1).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.max(1).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.rename("y").unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.set_on_insert(1).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.bit_and(1).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.push(1).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.push_all([1]).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.pull(1).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.pull_all([1]).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.add_to_set(1).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.add_many_to_set([1]).unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.pop_first().unwrap_err(), QueryError::MissingFieldCursor));
    assert!(matches!(e.pop_last().unwrap_err(), QueryError::MissingFieldCursor));
    // The failed calls left no partial state behind.
    assert_eq!(e.update(), &doc! {});
}

#[test]
fn update_operators_group_by_operator_then_field() {
    let mut e = Expr::new();
    e.field("counter").inc(1).unwrap();
    e.field("visits").inc(5).unwrap();
    e.field("legacy").unset().unwrap();
    e.field("score").mul(2).unwrap();
    e.field("low").min(3).unwrap().field("high").max(9).unwrap();
    e.field("old_name").rename("new_name").unwrap();
    e.field("created").set_on_insert("now").unwrap();
    assert_eq!(
        e.update(),
        &doc! {
            "$inc": { "counter": 1, "visits": 5 },
            "$unset": { "legacy": 1 },
            "$mul": { "score": 2 },
            "$min": { "low": 3 },
            "$max": { "high": 9 },
            "$rename": { "old_name": "new_name" },
            "$setOnInsert": { "created": "now" },
        }
    );
}

#[test]
fn array_update_operators() {
    let mut e = Expr::new();
    e.field("items")
        .push(doc! { "name": "a" })
        .unwrap()
        .field("bulk")
        .push_all([1, 2, 3])
        .unwrap()
        .field("junk")
        .pull("stale")
        .unwrap()
        .field("junk_many")
        .pull_all(["x", "y"])
        .unwrap()
        .field("tags")
        .add_to_set("fresh")
        .unwrap();
    assert_eq!(
        e.update(),
        &doc! {
            "$push": { "items": { "name": "a" } },
            "$pushAll": { "bulk": [1, 2, 3] },
            "$pull": { "junk": "stale" },
            "$pullAll": { "junk_many": ["x", "y"] },
            "$addToSet": { "tags": "fresh" },
        }
    );
}

#[test]
fn filter_serializes_to_the_driver_json_shape() {
    let mut e = Expr::new();
    e.field("age").gte(21).field("name").equals("alice");
    let json = serde_json::to_value(e.filter()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "age": { "$gte": 21 }, "name": "alice" })
    );
}

#[test]
fn range_builds_half_open_interval() {
    let mut e = Expr::new();
    e.field("age").range(18, 65);
    assert_eq!(e.filter(), &doc! { "age": { "$gte": 18, "$lt": 65 } });
}
