//! End-to-end drag-and-drop: optimistic local commit, server
//! submission, and the no-rollback failure path.

use std::net::SocketAddr;
use std::sync::Arc;

use tackboard::api::{ApiClient, ClientError};
use tackboard::drag::{DragSession, DropTarget};
use tackboard::state::BoardState;
use tackboard_proto::id::{BoardId, ListId, TaskId};
use tackboard_proto::rest::{CreateBoardRequest, CreateListRequest, CreateTaskRequest};
use tackboard_server::server::{self, AppState};

async fn start_server() -> SocketAddr {
    let state = Arc::new(AppState::with_bcrypt_cost(4));
    let (addr, _handle) = server::start_server_with_state("127.0.0.1:0", state)
        .await
        .expect("failed to start test server");
    addr
}

async fn signup(addr: SocketAddr, name: &str, email: &str) -> ApiClient {
    let mut client = ApiClient::new(&format!("http://{addr}")).unwrap();
    client.signup(name, email, "secret123").await.unwrap();
    client
}

/// Builds a board with two lists of three tasks each and loads it into
/// a fresh replica.
async fn seeded_board(client: &ApiClient) -> (BoardState, BoardId, Vec<ListId>, Vec<TaskId>) {
    let board = client
        .create_board(&CreateBoardRequest {
            title: "Dragboard".to_string(),
            description: None,
            background: None,
        })
        .await
        .unwrap()
        .id;

    let mut lists = Vec::new();
    let mut tasks = Vec::new();
    for list_title in ["Todo", "Doing"] {
        let list = client
            .create_list(
                board,
                &CreateListRequest {
                    title: list_title.to_string(),
                },
            )
            .await
            .unwrap()
            .id;
        for i in 0..3 {
            tasks.push(
                client
                    .create_task(
                        list,
                        &CreateTaskRequest {
                            title: format!("{list_title} {i}"),
                            description: None,
                            priority: None,
                            due_date: None,
                            labels: Vec::new(),
                            assignees: Vec::new(),
                        },
                    )
                    .await
                    .unwrap()
                    .id,
            );
        }
        lists.push(list);
    }

    let mut state = BoardState::new();
    state.load(client.board(board).await.unwrap());
    (state, board, lists, tasks)
}

fn local_order(state: &BoardState, list: ListId) -> Vec<TaskId> {
    state.tasks_for_list(list).iter().map(|t| t.id).collect()
}

#[tokio::test]
async fn same_list_drag_commits_and_server_agrees() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (mut state, board, lists, tasks) = seeded_board(&client).await;

    // Drag "Todo 0" onto "Todo 2".
    let mut session = DragSession::new();
    session.begin(&state, tasks[0]).unwrap();
    let batch = session
        .drop_on(&mut state, DropTarget::Task(tasks[2]))
        .unwrap();

    // The local replica already shows the final order before the
    // server hears about it.
    let optimistic = local_order(&state, lists[0]);
    assert_eq!(optimistic, vec![tasks[1], tasks[2], tasks[0]]);

    client.reorder_tasks(&batch.into_request()).await.unwrap();

    let mut fresh = BoardState::new();
    fresh.load(client.board(board).await.unwrap());
    assert_eq!(local_order(&fresh, lists[0]), optimistic);
}

#[tokio::test]
async fn cross_list_drag_commits_and_server_agrees() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (mut state, board, lists, tasks) = seeded_board(&client).await;

    // Hover "Todo 1" across into the second list, then drop it on
    // "Doing 0".
    let mut session = DragSession::new();
    session.begin(&state, tasks[1]).unwrap();
    session
        .hover(&mut state, DropTarget::List(lists[1]))
        .unwrap();
    let batch = session
        .drop_on(&mut state, DropTarget::Task(tasks[3]))
        .unwrap();

    let optimistic_src = local_order(&state, lists[0]);
    let optimistic_dest = local_order(&state, lists[1]);
    assert_eq!(optimistic_src, vec![tasks[0], tasks[2]]);
    assert_eq!(optimistic_dest[0], tasks[1]);

    client.reorder_tasks(&batch.into_request()).await.unwrap();

    let mut fresh = BoardState::new();
    fresh.load(client.board(board).await.unwrap());
    assert_eq!(local_order(&fresh, lists[0]), optimistic_src);
    assert_eq!(local_order(&fresh, lists[1]), optimistic_dest);
}

#[tokio::test]
async fn rejected_commit_keeps_optimistic_state() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (mut state, board, lists, tasks) = seeded_board(&client).await;

    let mut session = DragSession::new();
    session.begin(&state, tasks[0]).unwrap();
    let batch = session
        .drop_on(&mut state, DropTarget::Task(tasks[2]))
        .unwrap();
    let optimistic = local_order(&state, lists[0]);

    // The board disappears before the batch lands.
    client.delete_board(board).await.unwrap();
    let err = client.reorder_tasks(&batch.into_request()).await.unwrap_err();
    match err {
        ClientError::Api { status, .. } => assert_eq!(status, 404),
        other => panic!("expected Api error, got {other:?}"),
    }

    // No rollback: the replica keeps the optimistic order until fresh
    // server state replaces it.
    assert_eq!(local_order(&state, lists[0]), optimistic);
}

#[tokio::test]
async fn drag_batch_renumbers_from_zero() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (mut state, _board, lists, tasks) = seeded_board(&client).await;

    let mut session = DragSession::new();
    session.begin(&state, tasks[2]).unwrap();
    let batch = session
        .drop_on(&mut state, DropTarget::Task(tasks[0]))
        .unwrap();

    let mut positions: Vec<i64> = batch
        .placements
        .iter()
        .filter(|p| p.list == lists[0])
        .map(|p| p.position)
        .collect();
    positions.sort_unstable();
    assert_eq!(positions, vec![0, 1, 2]);
}
