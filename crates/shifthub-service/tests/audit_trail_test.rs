//! Integration tests for the audit trail as driven by checklist
//! operations: one entry per successful mutation, session context in the
//! metadata, and cursor pagination over real service output.

mod helpers;

use std::collections::HashSet;

use shifthub_entity::audit::{AuditEventType, AuditQuery};
use shifthub_entity::checklist::Task;

use helpers::{TestSite, alice, bob, night, night_at_2300, wait_for_view};

#[tokio::test]
async fn test_every_successful_mutation_writes_one_entry() {
    let site = TestSite::new();
    let client = site.client();

    // First selection of a fresh session writes two entries.
    client
        .select_shift(&night(), &alice(), night_at_2300())
        .await
        .unwrap();

    let view = client.engine().snapshot();
    let task_id = view.tasks[0].id;
    let aux_id = view.auxiliary[0].id;

    client.toggle_completed(task_id, &alice()).await.unwrap();
    client
        .set_note(task_id, "float short by 20", &alice())
        .await
        .unwrap();
    client.toggle_in_progress(task_id, &alice()).await.unwrap();
    client.toggle_in_progress(task_id, &alice()).await.unwrap();
    client.toggle_auxiliary(aux_id, &alice()).await.unwrap();
    client.reset_all(&alice()).await.unwrap();

    let page = site.audit.query(AuditQuery::default()).await.unwrap();
    assert_eq!(page.entries.len(), 8);
    assert!(!page.has_more);

    // Newest first.
    let actions: Vec<&str> = page.entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(
        actions,
        vec![
            "reset_all",
            "completed",
            "released",
            "claimed",
            "note_added",
            "completed",
            "shift_selected",
            "session_created",
        ]
    );
}

#[tokio::test]
async fn test_after_state_matches_the_resulting_task() {
    let site = TestSite::new();
    let client = site.client();
    client
        .select_shift(&night(), &alice(), night_at_2300())
        .await
        .unwrap();

    let task_id = client.engine().snapshot().tasks[0].id;
    let returned = client.toggle_completed(task_id, &alice()).await.unwrap();

    let page = site
        .audit
        .query(AuditQuery {
            event_types: vec![AuditEventType::TaskCompleted],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.entries.len(), 1);
    let entry = &page.entries[0];

    assert_eq!(entry.entity_type, "task");
    assert_eq!(entry.entity_id.as_deref(), Some(task_id.to_string().as_str()));

    let before: Task = serde_json::from_value(entry.before_state.clone().unwrap()).unwrap();
    let after: Task = serde_json::from_value(entry.after_state.clone().unwrap()).unwrap();
    assert!(!before.completed);
    assert_eq!(after, returned);
}

#[tokio::test]
async fn test_entries_carry_session_context_metadata() {
    let site = TestSite::new();
    let client = site.client();
    client
        .select_shift(&night(), &alice(), night_at_2300())
        .await
        .unwrap();
    let task_id = client.engine().snapshot().tasks[0].id;
    client.toggle_completed(task_id, &alice()).await.unwrap();

    let page = site
        .audit
        .query(AuditQuery {
            event_types: vec![AuditEventType::TaskCompleted],
            ..Default::default()
        })
        .await
        .unwrap();
    let entry = &page.entries[0];

    assert_eq!(
        entry.metadata.get("session_key"),
        Some(&serde_json::Value::String("night_2024-03-09".to_string()))
    );
    assert_eq!(
        entry.metadata.get("shift"),
        Some(&serde_json::Value::String("Night".to_string()))
    );
    assert!(entry.tags.contains(&"checklist".to_string()));
}

#[tokio::test]
async fn test_query_filters_by_actor_across_clients() {
    let site = TestSite::new();
    let client_a = site.client();
    let client_b = site.client();

    client_a
        .select_shift(&night(), &alice(), night_at_2300())
        .await
        .unwrap();
    client_b
        .select_shift(&night(), &bob(), night_at_2300())
        .await
        .unwrap();

    let ids: Vec<u32> = client_a
        .engine()
        .snapshot()
        .tasks
        .iter()
        .map(|t| t.id)
        .collect();
    client_a.toggle_completed(ids[0], &alice()).await.unwrap();

    let mut view_b = client_b.engine().subscribe_view();
    wait_for_view(&mut view_b, "first completion pushed", |v| {
        v.tasks.iter().any(|t| t.id == ids[0] && t.completed)
    })
    .await;
    client_b.toggle_completed(ids[1], &bob()).await.unwrap();

    let page = site
        .audit
        .query(AuditQuery {
            actor_id: Some("user-bob".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!page.entries.is_empty());
    assert!(page.entries.iter().all(|e| e.actor_id == "user-bob"));
    // Bob's selection of the existing session plus one completion.
    assert_eq!(page.entries.len(), 2);
}

#[tokio::test]
async fn test_cursor_pagination_walks_service_output() {
    let site = TestSite::new();
    let client = site.client();
    client
        .select_shift(&night(), &alice(), night_at_2300())
        .await
        .unwrap();

    let ids: Vec<u32> = client
        .engine()
        .snapshot()
        .tasks
        .iter()
        .map(|t| t.id)
        .take(5)
        .collect();
    for id in &ids {
        client.toggle_completed(*id, &alice()).await.unwrap();
    }

    // 2 selection entries + 5 completions, walked in pages of 3.
    let mut seen = HashSet::new();
    let mut cursor = None;
    let mut pages = 0;
    loop {
        let page = site
            .audit
            .query(AuditQuery {
                page_size: Some(3),
                cursor,
                ..Default::default()
            })
            .await
            .unwrap();
        for entry in &page.entries {
            assert!(seen.insert(entry.id), "entry {} repeated", entry.id);
        }
        pages += 1;
        if !page.has_more {
            break;
        }
        cursor = page.cursor;
    }

    assert_eq!(seen.len(), 7);
    assert_eq!(pages, 3);
}

#[tokio::test]
async fn test_rejected_claim_leaves_no_audit_entry() {
    let site = TestSite::new();
    let client_a = site.client();
    let client_b = site.client();

    client_a
        .select_shift(&night(), &alice(), night_at_2300())
        .await
        .unwrap();
    client_b
        .select_shift(&night(), &bob(), night_at_2300())
        .await
        .unwrap();

    let task_id = client_a.engine().snapshot().tasks[0].id;
    client_a.toggle_in_progress(task_id, &alice()).await.unwrap();

    let mut view_b = client_b.engine().subscribe_view();
    wait_for_view(&mut view_b, "claim pushed to second client", |v| {
        v.tasks
            .iter()
            .any(|t| t.id == task_id && t.in_progress_by.is_some())
    })
    .await;

    let before = site.audit.query(AuditQuery::default()).await.unwrap();
    client_b.toggle_in_progress(task_id, &bob()).await.unwrap_err();
    let after = site.audit.query(AuditQuery::default()).await.unwrap();

    assert_eq!(before.entries.len(), after.entries.len());
}

#[tokio::test]
async fn test_stats_reflect_service_activity() {
    let site = TestSite::new();
    let client = site.client();
    client
        .select_shift(&night(), &alice(), night_at_2300())
        .await
        .unwrap();
    let task_id = client.engine().snapshot().tasks[0].id;
    client.toggle_completed(task_id, &alice()).await.unwrap();
    client.toggle_completed(task_id, &alice()).await.unwrap();

    let stats = site.audit.stats(Some(1)).await.unwrap();
    assert_eq!(stats.total_events, 4);
    assert_eq!(stats.events_by_type.get("task_completed"), Some(&1));
    assert_eq!(stats.events_by_type.get("task_uncompleted"), Some(&1));
    assert_eq!(
        stats.events_by_actor.get("AL (alice@example.com)"),
        Some(&4)
    );
}
