use std::sync::Arc;

use serde_json::json;

use jobrouter::table::{Dispatch, JobTable, RouteUpdate};

fn update(name: &str, url: &str, method: &str) -> RouteUpdate {
    RouteUpdate {
        name: name.to_string(),
        url: url.to_string(),
        method: method.to_string(),
    }
}

#[test]
fn test_resolve_delegated_entry() {
    let mut table = JobTable::new();
    table.register_delegated("routes", "/routes", "GET");

    match table.resolve("routes") {
        Some(Dispatch::Delegated(route)) => {
            assert_eq!(route.url, "/routes");
            assert_eq!(route.method, "GET");
        }
        other => panic!("expected delegated entry, got {other:?}"),
    }
}

#[test]
fn test_resolve_local_entry() {
    let mut table = JobTable::new();
    table.register_local("Get Saved Modules", Arc::new(|_| Ok(json!([]))));

    match table.resolve("Get Saved Modules") {
        Some(Dispatch::Local(handler)) => {
            assert_eq!(handler(json!({})).unwrap(), json!([]));
        }
        other => panic!("expected local entry, got {other:?}"),
    }
}

#[test]
fn test_resolve_unknown_name() {
    let table = JobTable::new();
    assert!(table.resolve("nope").is_none());
}

#[test]
fn test_refresh_routes_upserts_delegated_entries() {
    let mut table = JobTable::new();
    table.register_delegated("routes", "/routes", "GET");

    let applied = table.refresh_routes(vec![
        update("routes", "/v2/routes", "POST"),
        update("diagram", "/diagram", "GET"),
    ]);
    assert_eq!(applied, 2);
    assert_eq!(table.len(), 2);

    match table.resolve("routes") {
        Some(Dispatch::Delegated(route)) => {
            assert_eq!(route.url, "/v2/routes");
            assert_eq!(route.method, "POST");
        }
        other => panic!("expected delegated entry, got {other:?}"),
    }
    assert!(table.resolve("diagram").is_some());
}

#[test]
fn test_refresh_routes_cannot_displace_local_handler() {
    let mut table = JobTable::new();
    table.register_local("Get Saved Modules", Arc::new(|_| Ok(json!([]))));

    let applied = table.refresh_routes(vec![update("Get Saved Modules", "/steal", "GET")]);
    assert_eq!(applied, 0);

    assert!(matches!(
        table.resolve("Get Saved Modules"),
        Some(Dispatch::Local(_))
    ));
}
