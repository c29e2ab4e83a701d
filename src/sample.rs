//! Fixed sample dataset served in local-fallback mode.

use crate::model::{Request, RequestStatus};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

struct Seed {
    id: &'static str,
    channel: &'static str,
    name: &'static str,
    phone: &'static str,
    service: &'static str,
    date: &'static str,
    time: &'static str,
    status: RequestStatus,
    message: &'static str,
    created: &'static str,
    updated: Option<&'static str>,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "sample_001",
        channel: "111222333",
        name: "Ana Garcia",
        phone: "+34 612 345 678",
        service: "Cut + color",
        date: "2025-02-15",
        time: "11:00",
        status: RequestStatus::Pending,
        message: "Hi, I'd like an appointment on Friday at 11",
        created: "2025-02-10T09:23:11Z",
        updated: None,
    },
    Seed {
        id: "sample_002",
        channel: "444555666",
        name: "Carlos Ruiz",
        phone: "+34 698 765 432",
        service: "Men's cut",
        date: "2025-02-14",
        time: "10:30",
        status: RequestStatus::Confirmed,
        message: "Good morning, could I get a haircut Thursday at 10:30?",
        created: "2025-02-09T14:05:22Z",
        updated: Some("2025-02-09T15:00:00Z"),
    },
    Seed {
        id: "sample_003",
        channel: "777888999",
        name: "Maria Lopez",
        phone: "+34 655 111 222",
        service: "Highlights + cut",
        date: "2025-02-16",
        time: "09:00",
        status: RequestStatus::Pending,
        message: "I want highlights and a cut early on Saturday",
        created: "2025-02-10T08:12:45Z",
        updated: None,
    },
    Seed {
        id: "sample_004",
        channel: "101112131",
        name: "Pedro Sanchez",
        phone: "+34 677 333 444",
        service: "Shave",
        date: "2025-02-13",
        time: "17:00",
        status: RequestStatus::Denied,
        message: "I need a shave Wednesday afternoon",
        created: "2025-02-08T11:30:00Z",
        updated: Some("2025-02-08T12:00:00Z"),
    },
    Seed {
        id: "sample_005",
        channel: "141516171",
        name: "Laura Fernandez",
        phone: "+34 622 555 666",
        service: "Full color",
        date: "2025-02-17",
        time: "12:00",
        status: RequestStatus::Pending,
        message: "Hello! I'd like a full color on Monday at noon",
        created: "2025-02-10T10:45:33Z",
        updated: None,
    },
    Seed {
        id: "sample_006",
        channel: "181920212",
        name: "Javier Moreno",
        phone: "+34 633 777 888",
        service: "Cut + beard trim",
        date: "2025-02-14",
        time: "16:00",
        status: RequestStatus::Confirmed,
        message: "Haircut and beard trim Thursday at 4, please",
        created: "2025-02-09T09:15:00Z",
        updated: Some("2025-02-09T10:00:00Z"),
    },
    Seed {
        id: "sample_007",
        channel: "222324252",
        name: "Sofia Martin",
        phone: "+34 644 999 000",
        service: "Event styling",
        date: "2025-02-18",
        time: "10:00",
        status: RequestStatus::Confirmed,
        message: "I need styling for a wedding on Tuesday at 10",
        created: "2025-02-10T07:00:00Z",
        updated: Some("2025-02-10T08:00:00Z"),
    },
    Seed {
        id: "sample_008",
        channel: "262728293",
        name: "Diego Torres",
        phone: "+34 611 222 333",
        service: "Fade cut",
        date: "2025-02-15",
        time: "14:00",
        status: RequestStatus::Pending,
        message: "I'd like a fade on Friday afternoon",
        created: "2025-02-10T11:20:00Z",
        updated: None,
    },
    Seed {
        id: "sample_009",
        channel: "303132333",
        name: "Elena Navarro",
        phone: "+34 655 444 555",
        service: "Keratin treatment",
        date: "2025-02-19",
        time: "11:30",
        status: RequestStatus::Pending,
        message: "Hi, I want a keratin treatment on Wednesday",
        created: "2025-02-10T12:00:00Z",
        updated: None,
    },
    Seed {
        id: "sample_010",
        channel: "343536373",
        name: "Roberto Diaz",
        phone: "+34 677 666 777",
        service: "Men's cut",
        date: "2025-02-12",
        time: "09:30",
        status: RequestStatus::Denied,
        message: "Haircut tomorrow first thing if possible",
        created: "2025-02-07T16:40:00Z",
        updated: Some("2025-02-07T17:00:00Z"),
    },
    Seed {
        id: "sample_011",
        channel: "383940414",
        name: "Isabel Castro",
        phone: "+34 699 888 111",
        service: "Cut + highlights",
        date: "2025-02-20",
        time: "15:00",
        status: RequestStatus::Confirmed,
        message: "Cut and highlights Thursday at 3pm",
        created: "2025-02-10T13:10:00Z",
        updated: Some("2025-02-10T14:00:00Z"),
    },
    Seed {
        id: "sample_012",
        channel: "424344454",
        name: "Fernando Gil",
        phone: "+34 622 333 444",
        service: "Classic shave",
        date: "2025-02-14",
        time: "13:00",
        status: RequestStatus::Pending,
        message: "A classic shave Thursday at midday",
        created: "2025-02-10T14:30:00Z",
        updated: None,
    },
];

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().expect("sample timestamps are valid RFC 3339")
}

static SAMPLE: Lazy<Vec<Request>> = Lazy::new(|| {
    let mut out: Vec<Request> = SEEDS
        .iter()
        .map(|s| Request {
            id: s.id.to_string(),
            client_name: Some(s.name.to_string()),
            client_phone: Some(s.phone.to_string()),
            service_name: Some(s.service.to_string()),
            requested_date: Some(s.date.to_string()),
            requested_time: Some(s.time.to_string()),
            status: s.status,
            original_message: Some(s.message.to_string()),
            source_channel_id: Some(s.channel.to_string()),
            created_at: ts(s.created),
            updated_at: s.updated.map(ts),
        })
        .collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
});

/// Fresh copy of the sample requests, newest first (same order the live
/// gateway returns).
pub fn sample_requests() -> Vec<Request> {
    SAMPLE.clone()
}

/// Sample documents for the generic-collection browser, keyed by name.
/// Unknown collections yield an empty set, same as an empty remote one.
pub fn sample_collection(name: &str) -> Vec<serde_json::Value> {
    use serde_json::json;
    match name {
        "mentors" => vec![
            json!({"_id": "m_001", "name": "Lucia Prats", "email": "lucia@example.com", "skills": ["color", "styling"]}),
            json!({"_id": "m_002", "name": "Oscar Vidal", "email": "oscar@example.com", "skills": ["fades"]}),
        ],
        "projects" => vec![
            json!({"_id": "p_001", "title": "Spring campaign", "owner": "lucia", "status": "active"}),
        ],
        "tasks" => vec![
            json!({"_id": "t_001", "title": "Order supplies", "assignee": "oscar", "done": false}),
            json!({"_id": "t_002", "title": "Update price list", "assignee": "lucia", "done": true}),
        ],
        "users" => vec![
            json!({"_id": "u_001", "username": "admin", "email": "admin@example.com", "role": "admin"}),
        ],
        "resources" => vec![
            json!({"_id": "r_001", "title": "Booking guide", "url": "https://example.com/guide", "kind": "doc"}),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_has_twelve_requests_newest_first() {
        let docs = sample_requests();
        assert_eq!(docs.len(), 12);
        for pair in docs.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn updated_at_set_only_on_terminal_statuses() {
        for doc in sample_requests() {
            if doc.status.is_terminal() {
                assert!(doc.updated_at.is_some(), "{} should be updated", doc.id);
            } else {
                assert!(doc.updated_at.is_none(), "{} should not be updated", doc.id);
            }
        }
    }

    #[test]
    fn known_collections_have_documents() {
        for name in ["mentors", "projects", "tasks", "users", "resources"] {
            assert!(!sample_collection(name).is_empty(), "{name}");
        }
        assert!(sample_collection("nope").is_empty());
    }
}
