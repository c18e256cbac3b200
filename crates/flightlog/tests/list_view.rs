//! List view behavior through the public API: URL in, URL out.

use flightlog::model::DroneModel;
use flightlog::query::{PageSize, QueryString};
use flightlog::{active_filters, MemoryUrlStore, QuerySpec, QueryUpdate, UrlStore};

fn spec(qs: &str) -> QuerySpec {
    QuerySpec::parse(&QueryString::parse(qs))
}

#[test]
fn test_canonical_urls_are_stable() {
    for qs in [
        "",
        "search=foo",
        "date_from=2024-01-01&date_to=2024-02-01&page=4&per_page=100",
        "drone_model=CX10%2CXLT&pilot=Alex+K&tags=night%2Csurvey",
    ] {
        let params = QueryString::parse(qs);
        let noop = QueryUpdate::default().apply(&params);
        assert_eq!(noop.to_string(), qs);
        assert_eq!(QuerySpec::parse(&noop), QuerySpec::parse(&params));
    }
}

#[test]
fn test_invalid_values_fall_back() {
    let s = spec("per_page=30&page=-2&drone_model=XLT,X99,XLT,S1&date_from=soon");
    assert_eq!(s.page_size, PageSize::TwentyFive);
    assert_eq!(s.page, 1);
    assert_eq!(s.drone_models, vec![DroneModel::Xlt, DroneModel::S1]);
    assert!(s.date_from.is_none());
}

#[test]
fn test_every_filter_change_restarts_paging() {
    let params = QueryString::parse("search=foo&page=3&per_page=50");
    let updates = [
        QueryUpdate::search("bar"),
        QueryUpdate::pilot(Some("Alex".to_string())),
        QueryUpdate::drone_models(vec![DroneModel::S1]),
        QueryUpdate::tags(vec!["night".to_string()]),
        QueryUpdate::date_range(None, None),
        QueryUpdate::clear_all(),
    ];
    for update in &updates {
        let next = update.apply(&params);
        assert!(!next.contains("page"), "{update:?} kept page");
        assert_eq!(next.get("per_page"), Some("50"));
    }
}

#[test]
fn test_paging_keeps_filters() {
    let store = MemoryUrlStore::from_query("pilot=Alex&tags=night");
    store.apply(&QueryUpdate::page(2));
    store.apply(&QueryUpdate::page_size(PageSize::Hundred));
    assert_eq!(
        store.get().to_string(),
        "page=2&per_page=100&pilot=Alex&tags=night"
    );
}

#[test]
fn test_chip_removal_round_trip() {
    let store = MemoryUrlStore::from_query(
        "date_from=2024-01-01&date_to=2024-01-31&drone_model=XLT&pilot=Alex&page=2",
    );
    let current = QuerySpec::parse(&store.get());
    let chips = active_filters(&current);
    assert_eq!(chips.len(), 3);
    assert_eq!(chips[0].label, "Date: 2024-01-01 to 2024-01-31");

    store.apply(&chips[0].filter.removal(&current));
    assert_eq!(store.get().to_string(), "drone_model=XLT&pilot=Alex");
}
