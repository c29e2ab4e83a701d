use atlas_desk::model::{Request, RequestStatus};
use atlas_desk::store::{RequestStore, StatusFilter, PAGE_SIZE};
use chrono::{Duration, TimeZone, Utc};

fn request(id: &str, status: RequestStatus, client: &str) -> Request {
    Request {
        id: id.to_string(),
        client_name: Some(client.to_string()),
        client_phone: None,
        service_name: Some("Men's cut".to_string()),
        requested_date: Some("2025-02-15".to_string()),
        requested_time: Some("11:00".to_string()),
        status,
        original_message: None,
        source_channel_id: None,
        created_at: Utc.with_ymd_and_hms(2025, 2, 10, 9, 0, 0).unwrap(),
        updated_at: None,
    }
}

fn numbered(n: usize) -> Vec<Request> {
    (1..=n)
        .map(|i| {
            request(
                &format!("req_{i:03}"),
                RequestStatus::Pending,
                &format!("Client {i}"),
            )
        })
        .collect()
}

#[test]
fn filter_yields_exact_subset_in_original_order() {
    let mut store = RequestStore::new(PAGE_SIZE);
    store.replace_all(vec![
        request("a", RequestStatus::Pending, "Ana"),
        request("b", RequestStatus::Confirmed, "Carlos"),
        request("c", RequestStatus::Pending, "Maria"),
        request("d", RequestStatus::Denied, "Pedro"),
        request("e", RequestStatus::Pending, "Laura"),
    ]);

    store.set_filter(StatusFilter::Only(RequestStatus::Pending));
    let ids: Vec<&str> = store.visible().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c", "e"]);

    store.set_filter(StatusFilter::All);
    assert_eq!(store.visible().len(), 5);
}

#[test]
fn pagination_splits_45_records_into_three_pages() {
    let mut store = RequestStore::new(PAGE_SIZE);
    store.replace_all(numbered(45));

    assert_eq!(store.page_count(), 3);

    assert!(store.set_page(1));
    let page1: Vec<&str> = store.page_slice().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(page1.len(), 20);
    assert_eq!(page1[0], "req_001");
    assert_eq!(page1[19], "req_020");

    assert!(store.set_page(2));
    let page2: Vec<&str> = store.page_slice().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(page2[0], "req_021");
    assert_eq!(page2[19], "req_040");

    assert!(store.set_page(3));
    let page3: Vec<&str> = store.page_slice().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(page3.len(), 5);
    assert_eq!(page3[4], "req_045");

    // Page 4 does not exist; the request is rejected and state unchanged.
    assert!(!store.set_page(4));
    assert_eq!(store.page(), 3);
    assert!(!store.set_page(0));
}

#[test]
fn search_combines_with_filter_and_clears_idempotently() {
    let mut store = RequestStore::new(PAGE_SIZE);
    store.replace_all(vec![
        request("a", RequestStatus::Pending, "Ana Garcia"),
        request("b", RequestStatus::Confirmed, "Ana Torres"),
        request("c", RequestStatus::Pending, "Carlos Ruiz"),
    ]);

    store.set_filter(StatusFilter::Only(RequestStatus::Pending));
    let before_search: Vec<String> = store
        .visible()
        .iter()
        .map(|r| r.id.clone())
        .collect();

    store.set_search("ANA");
    let ids: Vec<&str> = store.visible().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a"]);

    // Clearing the search restores the filter-only view exactly.
    store.set_search("");
    let after_clear: Vec<String> = store.visible().iter().map(|r| r.id.clone()).collect();
    assert_eq!(after_clear, before_search);
}

#[test]
fn filter_and_search_changes_reset_the_page() {
    let mut store = RequestStore::new(PAGE_SIZE);
    store.replace_all(numbered(45));
    assert!(store.set_page(3));

    store.set_search("client");
    assert_eq!(store.page(), 1);

    assert!(store.set_page(2));
    store.set_filter(StatusFilter::Only(RequestStatus::Pending));
    assert_eq!(store.page(), 1);
}

#[test]
fn replace_all_clamps_a_now_out_of_range_page() {
    let mut store = RequestStore::new(PAGE_SIZE);
    store.replace_all(numbered(45));
    assert!(store.set_page(3));

    store.replace_all(numbered(10));
    assert_eq!(store.page(), 1);
    assert_eq!(store.page_slice().len(), 10);
}

#[test]
fn find_misses_records_outside_the_filtered_view() {
    let mut store = RequestStore::new(PAGE_SIZE);
    store.replace_all(vec![
        request("a", RequestStatus::Pending, "Ana"),
        request("b", RequestStatus::Confirmed, "Carlos"),
    ]);

    store.set_filter(StatusFilter::Only(RequestStatus::Pending));
    assert!(store.find("a").is_some());
    assert!(store.find("b").is_none());

    store.set_filter(StatusFilter::All);
    assert!(store.find("b").is_some());
}

#[test]
fn counts_cover_the_full_set_regardless_of_filter() {
    let mut store = RequestStore::new(PAGE_SIZE);
    store.replace_all(vec![
        request("a", RequestStatus::Pending, "Ana"),
        request("b", RequestStatus::Confirmed, "Carlos"),
        request("c", RequestStatus::Denied, "Maria"),
    ]);
    store.set_filter(StatusFilter::Only(RequestStatus::Denied));

    let counts = store.counts();
    assert_eq!(counts.total, 3);
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.confirmed, 1);
    assert_eq!(counts.denied, 1);
}

#[test]
fn fresh_markers_expire_on_schedule() {
    let t0 = Utc.with_ymd_and_hms(2025, 2, 10, 9, 0, 0).unwrap();
    let mut store = RequestStore::new(PAGE_SIZE);
    store.replace_all(numbered(2));

    store.mark_fresh(
        vec!["req_001".to_string()],
        t0 + Duration::milliseconds(1000),
    );
    assert!(store.is_fresh("req_001"));
    assert!(!store.is_fresh("req_002"));

    store.expire_fresh(t0 + Duration::milliseconds(999));
    assert!(store.is_fresh("req_001"));

    store.expire_fresh(t0 + Duration::milliseconds(1000));
    assert!(!store.is_fresh("req_001"));
}
