//! CRUD contracts for the authenticated resources.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use common::TestApp;
use serde_json::{Value, json};

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Request handling
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_json_is_400_with_detail() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/tasks")
        .header(header::AUTHORIZATION, format!("Bearer {}", alice.access))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.send(req).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body["detail"].is_string());
}

#[tokio::test]
async fn bad_query_and_path_are_400() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let resp = app.get("/api/tasks?status=urgent", &alice.access).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let resp = app.get("/api/tasks/abc", &alice.access).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let resp = app.get("/api/projects?limit=0", &alice.access).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

// ─────────────────────────────────────────────────────────────────────────────
// Users & profile
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn users_list_search_and_update() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let _ = app.register("bob").await;

    let all = app.get("/api/users", &alice.access).await;
    let names: Vec<&str> = all.body.as_array().unwrap().iter().map(|u| u["username"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["alice", "bob"]);

    let found = app.get("/api/users/search?q=BO", &alice.access).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body.as_array().unwrap().len(), 1);
    assert_eq!(found.body[0]["username"], "bob");

    let empty = app.get("/api/users/search?q=", &alice.access).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let taken = app
        .put("/api/users/me", &alice.access, json!({ "email": "bob@example.com" }))
        .await;
    assert_eq!(taken.status, StatusCode::BAD_REQUEST);

    let updated = app
        .put("/api/users/me", &alice.access, json!({ "full_name": "Alice Liddell" }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["full_name"], "Alice Liddell");
}

#[tokio::test]
async fn profile_defaults_and_updates() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let profile = app.get("/api/profile", &alice.access).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["theme_preference"], "light");
    assert_eq!(profile.body["timezone"], "UTC");

    let updated = app
        .put(
            "/api/profile",
            &alice.access,
            json!({ "theme_preference": "dark", "bio": "hello" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["theme_preference"], "dark");
    assert_eq!(updated.body["bio"], "hello");
    assert_eq!(updated.body["id"], profile.body["id"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn task_crud_is_scoped_to_owner() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;

    let created = app
        .post("/api/tasks", &alice.access, json!({ "title": "Write report", "priority": "high" }))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_i64().unwrap();
    assert_eq!(created.body["status"], "todo");

    assert_eq!(ids(&app.get("/api/tasks", &alice.access).await.body), vec![id]);
    assert!(ids(&app.get("/api/tasks", &bob.access).await.body).is_empty());

    let foreign = app.get(&format!("/api/tasks/{id}"), &bob.access).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
    assert_eq!(foreign.body["detail"], "Task not found");
    let foreign_put = app
        .put(&format!("/api/tasks/{id}"), &bob.access, json!({ "title": "x" }))
        .await;
    assert_eq!(foreign_put.status, StatusCode::NOT_FOUND);

    let done = app
        .request(
            Method::PATCH,
            &format!("/api/tasks/{id}"),
            Some(&alice.access),
            Some(json!({ "status": "done" })),
        )
        .await;
    assert_eq!(done.status, StatusCode::OK);
    assert_eq!(done.body["status"], "done");
    assert!(done.body["completed_at"].is_string());
    assert_eq!(done.body["title"], "Write report");

    let deleted = app.delete(&format!("/api/tasks/{id}"), &alice.access).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Task deleted successfully");
    let gone = app.get(&format!("/api/tasks/{id}"), &alice.access).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn task_filters_and_stats() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    for (title, status) in [("alpha", "todo"), ("beta", "done"), ("gamma", "in_progress")] {
        let resp = app
            .post("/api/tasks", &alice.access, json!({ "title": title, "status": status }))
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
    }

    let done = app.get("/api/tasks?status=done", &alice.access).await;
    assert_eq!(done.body.as_array().unwrap().len(), 1);
    assert_eq!(done.body[0]["title"], "beta");

    let search = app.get("/api/tasks?search=AMM", &alice.access).await;
    assert_eq!(search.body[0]["title"], "gamma");

    let sorted = app
        .get("/api/tasks?sort_by=status&sort_order=asc", &alice.access)
        .await;
    let titles: Vec<&str> = sorted.body.as_array().unwrap().iter().map(|t| t["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["alpha", "gamma", "beta"]);

    let stats = app.get("/api/tasks/stats", &alice.access).await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.body["total"], 3);
    assert_eq!(stats.body["completed"], 1);
    assert_eq!(stats.body["by_status"]["todo"], 1);
}

#[tokio::test]
async fn task_with_inaccessible_project_is_404() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let project = app.post("/api/projects", &bob.access, json!({ "title": "Bob's" })).await;
    let pid = project.body["id"].as_i64().unwrap();

    let resp = app
        .post("/api/tasks", &alice.access, json!({ "title": "sneaky", "project_id": pid }))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["detail"], "Project not found");
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn project_access_rules() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let carol = app.register("carol").await;
    let bob_id = app.user_id(&bob).await;

    let created = app
        .post("/api/projects", &alice.access, json!({ "title": "Apollo" }))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["status"], "planning");
    let pid = created.body["id"].as_i64().unwrap();
    let uri = format!("/api/projects/{pid}");

    assert_eq!(app.get(&uri, &bob.access).await.status, StatusCode::NOT_FOUND);

    let added = app
        .post(&format!("{uri}/members"), &alice.access, json!({ "user_id": bob_id }))
        .await;
    assert_eq!(added.status, StatusCode::CREATED);
    assert_eq!(added.body["role"], "member");

    let dup = app
        .post(&format!("{uri}/members"), &alice.access, json!({ "user_id": bob_id }))
        .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);

    let as_member = app.get(&uri, &bob.access).await;
    assert_eq!(as_member.status, StatusCode::OK);
    assert_eq!(ids(&app.get("/api/projects", &bob.access).await.body), vec![pid]);

    let member_edit = app.put(&uri, &bob.access, json!({ "title": "Hijacked" })).await;
    assert_eq!(member_edit.status, StatusCode::FORBIDDEN);
    assert_eq!(member_edit.body["detail"], "Not authorized to modify this project");

    assert_eq!(app.get(&uri, &carol.access).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&uri, &carol.access).await.status, StatusCode::NOT_FOUND);

    let owner_edit = app
        .put(&uri, &alice.access, json!({ "status": "active", "description": "Moon" }))
        .await;
    assert_eq!(owner_edit.status, StatusCode::OK);
    assert_eq!(owner_edit.body["status"], "active");

    let members = app.get(&format!("{uri}/members"), &bob.access).await;
    let roles: Vec<&str> = members.body.as_array().unwrap().iter().map(|m| m["role"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["owner", "member"]);

    let timeline = app.get(&format!("{uri}/activities"), &alice.access).await;
    let actions: Vec<&str> = timeline.body.as_array().unwrap().iter().map(|a| a["action_type"].as_str().unwrap()).collect();
    assert_eq!(actions, vec!["update", "add_member", "create"]);

    let owner_id = app.user_id(&alice).await;
    let remove_owner = app
        .delete(&format!("{uri}/members/{owner_id}"), &alice.access)
        .await;
    assert_eq!(remove_owner.status, StatusCode::BAD_REQUEST);

    let removed = app.delete(&format!("{uri}/members/{bob_id}"), &alice.access).await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(app.get(&uri, &bob.access).await.status, StatusCode::NOT_FOUND);
    let again = app.delete(&format!("{uri}/members/{bob_id}"), &alice.access).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let deleted = app.delete(&uri, &alice.access).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(app.get(&uri, &alice.access).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn project_sub_resources_and_idea_links() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let pid = app
        .post("/api/projects", &alice.access, json!({ "title": "Apollo" }))
        .await
        .body["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/projects/{pid}");

    let task = app
        .post("/api/tasks", &alice.access, json!({ "title": "Build", "project_id": pid }))
        .await;
    assert_eq!(ids(&app.get(&format!("{uri}/tasks"), &alice.access).await.body), vec![task.body["id"].as_i64().unwrap()]);

    let idea = app
        .post(
            "/api/ideas",
            &alice.access,
            json!({ "title": "Rocket", "description": "big", "tags": ["space", " space ", "fuel"] }),
        )
        .await;
    assert_eq!(idea.status, StatusCode::CREATED);
    let idea_id = idea.body["id"].as_i64().unwrap();
    assert_eq!(idea.body["tags"].as_array().unwrap().len(), 2);

    let available = app.get(&format!("/api/ideas/available?project_id={pid}"), &alice.access).await;
    assert_eq!(ids(&available.body), vec![idea_id]);

    let linked = app
        .request(Method::POST, &format!("{uri}/ideas/{idea_id}"), Some(&alice.access), None)
        .await;
    assert_eq!(linked.status, StatusCode::OK);
    assert_eq!(linked.body["id"], idea_id);
    let relink = app
        .request(Method::POST, &format!("{uri}/ideas/{idea_id}"), Some(&alice.access), None)
        .await;
    assert_eq!(relink.status, StatusCode::BAD_REQUEST);

    assert_eq!(ids(&app.get(&format!("{uri}/ideas"), &alice.access).await.body), vec![idea_id]);
    let available = app.get(&format!("/api/ideas/available?project_id={pid}"), &alice.access).await;
    assert!(ids(&available.body).is_empty());

    let unlinked = app.delete(&format!("{uri}/ideas/{idea_id}"), &alice.access).await;
    assert_eq!(unlinked.status, StatusCode::NO_CONTENT);
    let unlinked_again = app.delete(&format!("{uri}/ideas/{idea_id}"), &alice.access).await;
    assert_eq!(unlinked_again.status, StatusCode::NOT_FOUND);
    assert_eq!(unlinked_again.body["detail"], "Idea is not linked to this project");

    let timeline = app.get(&format!("{uri}/activities?limit=2"), &alice.access).await;
    let actions: Vec<&str> = timeline.body.as_array().unwrap().iter().map(|a| a["action_type"].as_str().unwrap()).collect();
    assert_eq!(actions, vec!["unlink", "link"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Activities, journals, logs, ideas
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn activities_filter_by_type() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    for kind in ["run", "read", "run"] {
        let resp = app
            .post("/api/activities", &alice.access, json!({ "type": kind, "data": { "km": 5 } }))
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
    }
    let bad = app
        .post("/api/activities", &alice.access, json!({ "type": "run", "data": [1] }))
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let runs = app.get("/api/activities?type=run", &alice.access).await;
    assert_eq!(runs.body.as_array().unwrap().len(), 2);
    assert_eq!(runs.body[0]["data"]["km"], 5);
    let limited = app.get("/api/activities?limit=1", &alice.access).await;
    assert_eq!(limited.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn journal_and_entries() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;

    let journal = app.post("/api/journals", &alice.access, json!({ "title": "Diary" })).await;
    assert_eq!(journal.status, StatusCode::CREATED);
    let jid = journal.body["id"].as_i64().unwrap();
    let uri = format!("/api/journals/{jid}");
    assert_eq!(app.get(&uri, &bob.access).await.status, StatusCode::NOT_FOUND);

    let entry = app
        .post(
            &format!("{uri}/entries"),
            &alice.access,
            json!({ "content": "Good day", "mood": "happy", "tags": ["work"] }),
        )
        .await;
    assert_eq!(entry.status, StatusCode::CREATED);
    let eid = entry.body["id"].as_i64().unwrap();
    let _ = app
        .post(&format!("{uri}/entries"), &alice.access, json!({ "content": "Meh", "tags": ["home"] }))
        .await;

    let tagged = app.get(&format!("{uri}/entries?tag=work"), &alice.access).await;
    assert_eq!(ids(&tagged.body), vec![eid]);
    let foreign = app.get(&format!("{uri}/entries"), &bob.access).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let updated = app
        .put(&format!("{uri}/entries/{eid}"), &alice.access, json!({ "mood": null }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert!(updated.body["mood"].is_null());
    assert_eq!(updated.body["content"], "Good day");

    let renamed = app.put(&uri, &alice.access, json!({ "title": "Log book" })).await;
    assert_eq!(renamed.body["title"], "Log book");

    let removed = app.delete(&format!("{uri}/entries/{eid}"), &alice.access).await;
    assert_eq!(removed.status, StatusCode::OK);
    let gone = app.get(&format!("{uri}/entries/{eid}"), &alice.access).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    assert_eq!(app.delete(&uri, &alice.access).await.status, StatusCode::OK);
    assert_eq!(app.get(&uri, &alice.access).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logs_and_entries() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let log = app
        .post("/api/logs", &alice.access, json!({ "title": "Sprint", "log_type": "progress" }))
        .await;
    assert_eq!(log.status, StatusCode::CREATED);
    let lid = log.body["id"].as_i64().unwrap();
    let uri = format!("/api/logs/{lid}");

    let progress = app.get("/api/logs?log_type=progress", &alice.access).await;
    assert_eq!(ids(&progress.body), vec![lid]);
    let issues = app.get("/api/logs?log_type=issue", &alice.access).await;
    assert!(ids(&issues.body).is_empty());

    let first = app.post(&format!("{uri}/entries"), &alice.access, json!({ "content": "one" })).await;
    let eid = first.body["id"].as_i64().unwrap();
    let second = app.post(&format!("{uri}/entries"), &alice.access, json!({ "content": "two" })).await;
    let page = app.get(&format!("{uri}/entries?limit=1"), &alice.access).await;
    assert_eq!(ids(&page.body), vec![second.body["id"].as_i64().unwrap()]);

    let edited = app
        .put(&format!("{uri}/entries/{eid}"), &alice.access, json!({ "content": "uno" }))
        .await;
    assert_eq!(edited.body["content"], "uno");
    let missing = app
        .put(&format!("{uri}/entries/9999"), &alice.access, json!({ "content": "x" }))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["detail"], "Log entry not found");

    let updated = app.put(&uri, &alice.access, json!({ "content": "notes" })).await;
    assert_eq!(updated.body["content"], "notes");
    assert_eq!(updated.body["log_type"], "progress");

    assert_eq!(app.delete(&uri, &alice.access).await.status, StatusCode::OK);
    let gone = app.get(&uri, &alice.access).await;
    assert_eq!(gone.body["detail"], "Log not found");
}

#[tokio::test]
async fn ideas_tags_and_update() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let idea = app
        .post("/api/ideas", &alice.access, json!({ "title": "App", "tags": ["mobile"] }))
        .await;
    let id = idea.body["id"].as_i64().unwrap();
    let uri = format!("/api/ideas/{id}");

    let updated = app
        .put(&uri, &alice.access, json!({ "status": "in_progress", "tags": ["web", "mobile"] }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["status"], "in_progress");
    let tags: Vec<&str> = updated.body["tags"].as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(tags, vec!["mobile", "web"]);

    let all_tags = app.get("/api/ideas/tags", &alice.access).await;
    assert_eq!(all_tags.body.as_array().unwrap().len(), 2);

    let by_tag = app.get("/api/ideas?tag=web", &alice.access).await;
    assert_eq!(ids(&by_tag.body), vec![id]);

    assert_eq!(app.delete(&uri, &alice.access).await.status, StatusCode::OK);
    assert_eq!(app.get(&uri, &alice.access).await.status, StatusCode::NOT_FOUND);
}

// ─────────────────────────────────────────────────────────────────────────────
// Concepts & mindmaps
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn concept_notes_require_authorship_to_change() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let bob_id = app.user_id(&bob).await;
    let pid = app
        .post("/api/projects", &alice.access, json!({ "title": "Apollo" }))
        .await
        .body["id"]
        .as_i64()
        .unwrap();
    let _ = app
        .post(&format!("/api/projects/{pid}/members"), &alice.access, json!({ "user_id": bob_id }))
        .await;

    let note = app
        .post("/api/concepts", &alice.access, json!({ "title": "Idea", "content": "x", "project_id": pid }))
        .await;
    assert_eq!(note.status, StatusCode::CREATED);
    let nid = note.body["id"].as_i64().unwrap();
    let uri = format!("/api/concepts/{nid}");

    assert_eq!(app.get(&uri, &bob.access).await.status, StatusCode::OK);
    let listed = app.get(&format!("/api/concepts/project/{pid}"), &bob.access).await;
    assert_eq!(ids(&listed.body), vec![nid]);

    let edit = app.put(&uri, &bob.access, json!({ "content": "y" })).await;
    assert_eq!(edit.status, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&uri, &bob.access).await.status, StatusCode::FORBIDDEN);

    let edit = app.put(&uri, &alice.access, json!({ "content": "y" })).await;
    assert_eq!(edit.body["content"], "y");
    let deleted = app.delete(&uri, &alice.access).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&uri, &alice.access).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mindmaps_follow_project_access() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let pid = app
        .post("/api/projects", &alice.access, json!({ "title": "Apollo" }))
        .await
        .body["id"]
        .as_i64()
        .unwrap();

    let map = app
        .post(
            "/api/mindmaps",
            &alice.access,
            json!({ "title": "Plan", "data": { "nodes": [] }, "project_id": pid }),
        )
        .await;
    assert_eq!(map.status, StatusCode::CREATED);
    let mid = map.body["id"].as_i64().unwrap();
    let uri = format!("/api/mindmaps/{mid}");

    assert_eq!(app.get(&uri, &bob.access).await.status, StatusCode::NOT_FOUND);
    let listed = app
        .get(&format!("/api/mindmaps/projects/{pid}/mindmaps"), &alice.access)
        .await;
    assert_eq!(ids(&listed.body), vec![mid]);
    assert_eq!(ids(&app.get(&format!("/api/projects/{pid}/mindmaps"), &alice.access).await.body), vec![mid]);

    let updated = app
        .put(&uri, &alice.access, json!({ "data": { "nodes": [{ "id": 1 }] } }))
        .await;
    assert_eq!(updated.body["data"]["nodes"][0]["id"], 1);
    assert_eq!(updated.body["title"], "Plan");

    assert_eq!(app.delete(&uri, &alice.access).await.status, StatusCode::OK);
    assert_eq!(app.get(&uri, &alice.access).await.status, StatusCode::NOT_FOUND);
}

// ─────────────────────────────────────────────────────────────────────────────
// Bugs & AI
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn bug_report_appends_markdown_without_auth() {
    let app = TestApp::new();
    let report = json!({
        "title": "Crash",
        "description": "It broke",
        "systemInfo": "{\"os\":\"linux\"}",
        "errorLogs": ["boom"],
    });
    let resp = app.request(Method::POST, "/api/bugs/report", None, Some(report)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Bug report successfully submitted");

    let text = std::fs::read_to_string(&app.bug_reports).unwrap();
    assert!(text.starts_with("# Bug Reports\n"));
    assert!(text.contains("## Crash"));
    assert!(text.contains("boom"));
}

#[tokio::test]
async fn ai_facade_returns_placeholders() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let unauth = app.request(Method::GET, "/api/ai/status", None, None).await;
    assert_eq!(unauth.status, StatusCode::UNAUTHORIZED);

    let status = app.get("/api/ai/status", &alice.access).await;
    assert_eq!(status.body["model"], "gpt-3.5-turbo");

    let init = app
        .post("/api/ai/initialize", &alice.access, json!({ "model_path": "local-model" }))
        .await;
    assert_eq!(init.status, StatusCode::OK);
    assert_eq!(app.get("/api/ai/status", &alice.access).await.body["model"], "local-model");

    let generated = app.post("/api/ai/generate", &alice.access, json!({ "prompt": "hi" })).await;
    assert_eq!(generated.body["response"], "AI response placeholder");

    let sentiment = app
        .post("/api/ai/analyze/journal", &alice.access, json!({ "entry": "fine" }))
        .await;
    assert_eq!(sentiment.body["sentiment"]["sentiment"], "neutral");

    let goals = app
        .post("/api/ai/suggest/goals", &alice.access, json!({ "user_data": {} }))
        .await;
    assert_eq!(goals.body["suggestions"].as_array().unwrap().len(), 2);

    let category = app
        .post("/api/ai/categorize/activity", &alice.access, json!({ "activity_data": {} }))
        .await;
    assert_eq!(category.body["category"], "activity_category");

    let _ = app
        .post("/api/activities", &alice.access, json!({ "type": "run", "data": {} }))
        .await;
    let processed = app
        .post("/api/ai/process/data", &alice.access, json!({ "data_types": ["activity", "journal_entry"] }))
        .await;
    assert_eq!(processed.body["message"], "Processed 1 documents");
    assert_eq!(processed.body["types"], json!(["activity", "journal_entry"]));

    let task = app.post("/api/tasks", &alice.access, json!({ "title": "Ship" })).await;
    let tid = task.body["id"].as_i64().unwrap();
    let optimized = app.get(&format!("/api/ai/optimize-task/{tid}"), &alice.access).await;
    assert_eq!(optimized.body["task_id"], tid);
    assert!(optimized.body["suggestions"].as_array().unwrap().len() >= 1);
    let missing = app.get("/api/ai/optimize-task/9999", &alice.access).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let analysis = app
        .post(
            "/api/ai/analyze-task",
            &alice.access,
            json!({ "title": "Ship", "description": "Release 1.0" }),
        )
        .await;
    assert_eq!(analysis.status, StatusCode::OK);
    assert_eq!(analysis.body["priority"], "medium");
    assert!(analysis.body["estimated_hours"].as_f64().is_some());
    assert!(analysis.body["tags"].is_array());
    assert!(analysis.body["potential_challenges"].as_array().unwrap().is_empty());
    let untitled = app
        .post("/api/ai/analyze-task", &alice.access, json!({ "title": "" }))
        .await;
    assert_eq!(untitled.status, StatusCode::BAD_REQUEST);
}
