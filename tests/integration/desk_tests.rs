use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use visitor_desk::{
    config::AppConfig,
    models::{AlertBucket, CheckInVisitor, Gender, UpdateVisitor, VisitorFilter, VisitorType},
    repository::{MemoryPresenceStore, MemoryVisitorStore, Repository},
    services::search,
    AppError, AppState,
};

fn seeded_state() -> (Arc<MemoryVisitorStore>, AppState) {
    let now = Utc::now();
    let ago = |h: i64| (now - Duration::hours(h)).to_rfc3339();

    let store = Arc::new(MemoryVisitorStore::from_documents(
        vec![
            json!({"id": "v1", "visitorName": "Jane Doe", "phoneNumber": "0712345678",
                   "gender": "Female", "visitorType": "foot", "tagNumber": "T-1",
                   "timeIn": ago(13)}),
            json!({"id": "v2", "visitorName": "Bob Otieno", "visitorType": "vehicle",
                   "refNumber": "KDA 123A", "tagNotGiven": true,
                   "timeIn": {"seconds": (now - Duration::hours(25)).timestamp(),
                              "nanoseconds": 0}}),
            json!({"id": "v3", "visitorName": "Ann Wanjiru", "tagNumber": "T-3",
                   "timeIn": (now - Duration::hours(19)).timestamp_millis()}),
            json!({"id": "v4", "visitorName": "Carl", "tagNumber": "T-4",
                   "timeIn": ago(2)}),
            json!({"id": "v5", "visitorName": "Dora", "tagNumber": "T-5",
                   "timeIn": ago(30), "timeOut": ago(20), "isCheckedOut": true}),
        ],
        now,
    ));

    let repository = Repository::new(store.clone(), Arc::new(MemoryPresenceStore::default()));
    (store, AppState::new(AppConfig::default(), repository))
}

#[tokio::test]
async fn test_alert_report_over_seeded_documents() {
    let (_store, state) = seeded_state();
    let report = state.services.alerts.report(Utc::now()).await.unwrap();

    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.critical, 1);
    assert_eq!(report.summary.high, 1);
    assert_eq!(report.summary.medium, 1);

    let ids: Vec<&str> = report.visitors.iter().map(|o| o.visitor.id.as_str()).collect();
    assert_eq!(ids, vec!["v2", "v3", "v1"]);
    assert_eq!(report.visitors[0].bucket, AlertBucket::Critical);
    assert_eq!(report.visitors[0].duration, "1d 1h");
}

#[tokio::test]
async fn test_check_in_search_and_check_out() {
    let (store, state) = seeded_state();
    let visitors = &state.services.visitors;

    let mut subscription = visitors.subscribe(VisitorFilter::CheckedIn).await.unwrap();
    assert_eq!(subscription.current().len(), 4);

    let new = visitors
        .check_in(
            CheckInVisitor {
                visitor_name: "Eve Achieng".into(),
                phone_number: "0733111222".into(),
                id_number: "30111222".into(),
                residence: "Karen".into(),
                institution_occupation: "Student".into(),
                purpose_of_visit: "Library".into(),
                gender: Some(Gender::Female),
                visitor_type: VisitorType::Foot,
                ref_number: None,
                tag_number: None,
                tag_not_given: true,
            },
            Utc::now(),
        )
        .await
        .unwrap();

    let snapshot = subscription.changed().await.unwrap();
    assert_eq!(snapshot.len(), 5);

    let found = visitors.search("no tag", VisitorFilter::CheckedIn).await.unwrap();
    let names: Vec<&str> = found.iter().map(|v| v.visitor_name.as_str()).collect();
    assert_eq!(names, vec!["Bob Otieno", "Eve Achieng"]);

    let all = visitors.list(VisitorFilter::All).await.unwrap();
    assert_eq!(search::filter("kda", &all).len(), 0);
    assert_eq!(search::filter("KDA", &all).len(), 1);

    visitors.check_out(&new.id, Utc::now()).await.unwrap();
    let snapshot = subscription.changed().await.unwrap();
    assert_eq!(snapshot.len(), 4);

    let err = visitors.check_out(&new.id, Utc::now()).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(err.report().error, "Duplicate");

    drop(subscription);
    assert_eq!(store.subscriber_count(), 0);
}

#[tokio::test]
async fn test_edit_keeps_lifecycle_fields() {
    let (_store, state) = seeded_state();
    let visitors = &state.services.visitors;
    let before = visitors.get("v2").await.unwrap();

    let after = visitors
        .update(
            "v2",
            UpdateVisitor {
                tag_number: Some("T-22".into()),
                ref_number: Some("KDB 987Z".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(after.time_in, before.time_in);
    assert_eq!(after.visitor_type, VisitorType::Vehicle);
    assert!(!after.tag_not_given);
    assert_eq!(after.real_tag(), Some("T-22"));
    assert_eq!(after.ref_number.as_deref(), Some("KDB 987Z"));

    let missing = visitors
        .update(
            "nope",
            UpdateVisitor {
                residence: Some("Karen".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_dashboard() {
    let (_store, state) = seeded_state();
    let stats = state.services.dashboard.stats(Utc::now()).await.unwrap();

    assert_eq!(stats.checked_in, 4);
    assert_eq!(stats.checked_in_vehicle, 1);
    assert_eq!(stats.checked_in_foot, 3);
    assert_eq!(stats.without_tag, 1);
    assert_eq!(stats.alerts.total, 3);
}

#[tokio::test]
async fn test_presence_roster() {
    let (_store, state) = seeded_state();
    let presence = &state.services.presence;

    presence.heartbeat("desk-a").await.unwrap();
    presence.heartbeat("desk-b").await.unwrap();
    presence.go_offline("desk-a").await.unwrap();

    let online = presence.online_users(Utc::now()).await.unwrap();
    assert_eq!(online.len(), 1);
    assert_eq!(online[0].user_id, "desk-b");
}

#[tokio::test]
async fn test_monitor_publishes_from_state() {
    let (_store, state) = seeded_state();
    let monitor = state.alert_monitor();
    let mut reports = monitor.reports();

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let task = tokio::spawn(monitor.run(async move {
        let _ = stop_rx.await;
    }));

    reports.changed().await.unwrap();
    assert_eq!(reports.borrow().summary.total, 3);

    stop_tx.send(()).unwrap();
    task.await.unwrap().unwrap();
}
