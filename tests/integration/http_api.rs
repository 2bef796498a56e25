// Test-specific lint overrides: integration tests use unwrap/expect freely,
// and some pedantic/nursery lints are not appropriate for test code.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    clippy::missing_docs_in_private_items
)]

//! End-to-end tests for the task CRUD API over a real socket.
//!
//! Each test starts an in-process server on an OS-assigned port and drives
//! it with a plain HTTP client. These tests validate:
//! - The full create/list/get/update/delete lifecycle and status codes
//! - Merge semantics of partial updates (only provided fields change)
//! - Input rejection: blank/overlong titles, malformed JSON, bad ids
//! - The partial-failure contract: a failed save returns 500 but the
//!   in-memory mutation stands

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use taskboard_core::store::TaskStore;
use taskboard_core::task::Task;
use taskboard_server::api::{self, AppState};

/// Starts a server backed by a store on the given path (None = in-memory).
async fn start_server(path: Option<PathBuf>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let state = Arc::new(AppState::new(TaskStore::open(path)));
    api::start_server("127.0.0.1:0", state)
        .await
        .expect("failed to start test server")
}

/// Creates a task via POST and returns the server's representation.
async fn create_task(client: &reqwest::Client, addr: SocketAddr, title: &str) -> Task {
    let res = client
        .post(format!("http://{addr}/tasks"))
        .json(&json!({ "title": title }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);
    res.json().await.unwrap()
}

#[tokio::test]
async fn create_then_list_then_get() {
    let (addr, _handle) = start_server(None).await;
    let client = reqwest::Client::new();

    let created = create_task(&client, addr, "Apprendre Rust").await;
    assert_eq!(created.title, "Apprendre Rust");
    assert!(!created.done);

    let list: Vec<Task> = reqwest::get(format!("http://{addr}/tasks"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0], created);

    let fetched: Task = reqwest::get(format!("http://{addr}/tasks/{}", created.id))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn update_merges_only_provided_fields() {
    let (addr, _handle) = start_server(None).await;
    let client = reqwest::Client::new();
    let created = create_task(&client, addr, "Initial").await;

    // Flip `done` only; the title must survive.
    let res = client
        .put(format!("http://{addr}/tasks/{}", created.id))
        .json(&json!({ "done": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let updated: Task = res.json().await.unwrap();
    assert_eq!(updated.title, "Initial");
    assert!(updated.done);

    // Change the title only; `done` must survive.
    let res = client
        .put(format!("http://{addr}/tasks/{}", created.id))
        .json(&json!({ "title": "Initial (v2)" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let updated: Task = res.json().await.unwrap();
    assert_eq!(updated.title, "Initial (v2)");
    assert!(updated.done);

    // The stored record matches what the handler returned.
    let fetched: Task = reqwest::get(format!("http://{addr}/tasks/{}", created.id))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_both_fields_at_once() {
    let (addr, _handle) = start_server(None).await;
    let client = reqwest::Client::new();
    let created = create_task(&client, addr, "Apprendre Go").await;

    let res = client
        .put(format!("http://{addr}/tasks/{}", created.id))
        .json(&json!({ "title": "Apprendre Go (v2)", "done": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let updated: Task = res.json().await.unwrap();
    assert_eq!(updated.title, "Apprendre Go (v2)");
    assert!(updated.done);
}

#[tokio::test]
async fn update_blank_title_is_400_and_changes_nothing() {
    let (addr, _handle) = start_server(None).await;
    let client = reqwest::Client::new();
    let created = create_task(&client, addr, "Init").await;

    let res = client
        .put(format!("http://{addr}/tasks/{}", created.id))
        .json(&json!({ "title": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);

    let fetched: Task = reqwest::get(format!("http://{addr}/tasks/{}", created.id))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn update_unknown_id_is_404() {
    let (addr, _handle) = start_server(None).await;
    let client = reqwest::Client::new();

    let res = client
        .put(format!("http://{addr}/tasks/9999"))
        .json(&json!({ "title": "Ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn update_malformed_json_is_400() {
    let (addr, _handle) = start_server(None).await;
    let client = reqwest::Client::new();
    let created = create_task(&client, addr, "Init").await;

    let res = client
        .put(format!("http://{addr}/tasks/{}", created.id))
        .header("content-type", "application/json")
        .body("{")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let (addr, _handle) = start_server(None).await;
    let client = reqwest::Client::new();
    let created = create_task(&client, addr, "A supprimer").await;

    let res = client
        .delete(format!("http://{addr}/tasks/{}", created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 204);

    let res = reqwest::get(format!("http://{addr}/tasks/{}", created.id))
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn delete_unknown_id_is_404() {
    let (addr, _handle) = start_server(None).await;
    let client = reqwest::Client::new();

    let res = client
        .delete(format!("http://{addr}/tasks/1234"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn ids_keep_increasing_across_deletes() {
    let (addr, _handle) = start_server(None).await;
    let client = reqwest::Client::new();

    let first = create_task(&client, addr, "first").await;
    client
        .delete(format!("http://{addr}/tasks/{}", first.id))
        .send()
        .await
        .unwrap();
    let second = create_task(&client, addr, "second").await;
    assert!(second.id > first.id);
}

#[tokio::test]
async fn persistence_errors_return_500_on_every_mutation() {
    // A directory as the data file makes every save fail.
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(AppState::new(TaskStore::new(Some(dir.path().to_path_buf()))));
    let seeded = state.store.create("temp");
    let (addr, _handle) = api::start_server("127.0.0.1:0", Arc::clone(&state))
        .await
        .expect("failed to start test server");
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{addr}/tasks"))
        .json(&json!({ "title": "X" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 500);

    let res = client
        .put(format!("http://{addr}/tasks/{}", seeded.id))
        .json(&json!({ "done": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 500);

    let res = client
        .delete(format!("http://{addr}/tasks/{}", seeded.id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 500);
}
