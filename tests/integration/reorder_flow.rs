//! End-to-end reorder tests: append positions, placement batches, and
//! the activity trail they leave.

use std::net::SocketAddr;
use std::sync::Arc;

use tackboard::api::ApiClient;
use tackboard_proto::id::{BoardId, ListId, TaskId};
use tackboard_proto::model::{ActionKind, ListPlacement, TaskPlacement};
use tackboard_proto::rest::{
    CreateBoardRequest, CreateListRequest, CreateTaskRequest, PageQuery, ReorderListsRequest,
    ReorderTasksRequest,
};
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

async fn board_with_list(client: &ApiClient) -> (BoardId, ListId) {
    let board = client
        .create_board(&CreateBoardRequest {
            title: "Sprint".to_string(),
            description: None,
            background: None,
        })
        .await
        .unwrap();
    let list = client
        .create_list(
            board.id,
            &CreateListRequest {
                title: "Todo".to_string(),
            },
        )
        .await
        .unwrap();
    (board.id, list.id)
}

async fn add_task(client: &ApiClient, list: ListId, title: &str) -> TaskId {
    client
        .create_task(
            list,
            &CreateTaskRequest {
                title: title.to_string(),
                description: None,
                priority: None,
                due_date: None,
                labels: Vec::new(),
                assignees: Vec::new(),
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn new_tasks_append_after_max_position() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (board, list) = board_with_list(&client).await;

    let t0 = add_task(&client, list, "first").await;
    let t1 = add_task(&client, list, "second").await;
    let t2 = add_task(&client, list, "third").await;

    let detail = client.board(board).await.unwrap();
    let positions: Vec<(TaskId, i64)> = detail.tasks.iter().map(|t| (t.id, t.position)).collect();
    assert_eq!(positions, vec![(t0, 0), (t1, 1), (t2, 2)]);

    // Deleting the middle task leaves a gap; the next append goes
    // after the max, not into the gap.
    client.delete_task(t1).await.unwrap();
    let t3 = add_task(&client, list, "fourth").await;
    let detail = client.board(board).await.unwrap();
    let t3_pos = detail.tasks.iter().find(|t| t.id == t3).unwrap().position;
    assert_eq!(t3_pos, 3);
}

#[tokio::test]
async fn reorder_within_list_changes_canonical_order() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (board, list) = board_with_list(&client).await;

    let t0 = add_task(&client, list, "a").await;
    let t1 = add_task(&client, list, "b").await;
    let t2 = add_task(&client, list, "c").await;

    // Move the first task to the end.
    client
        .reorder_tasks(&ReorderTasksRequest {
            tasks: vec![
                TaskPlacement { task: t1, list, position: 0 },
                TaskPlacement { task: t2, list, position: 1 },
                TaskPlacement { task: t0, list, position: 2 },
            ],
            board: Some(board),
        })
        .await
        .unwrap();

    let detail = client.board(board).await.unwrap();
    let order: Vec<TaskId> = detail.tasks.iter().map(|t| t.id).collect();
    assert_eq!(order, vec![t1, t2, t0]);
}

#[tokio::test]
async fn cross_list_reorder_moves_task() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (board, list_a) = board_with_list(&client).await;
    let list_b = client
        .create_list(
            board,
            &CreateListRequest {
                title: "Doing".to_string(),
            },
        )
        .await
        .unwrap()
        .id;

    let task = add_task(&client, list_a, "migrates").await;
    client
        .reorder_tasks(&ReorderTasksRequest {
            tasks: vec![TaskPlacement {
                task,
                list: list_b,
                position: 0,
            }],
            board: Some(board),
        })
        .await
        .unwrap();

    let moved = client.task(task).await.unwrap();
    assert_eq!(moved.list, list_b);
    assert_eq!(moved.board, board);
}

#[tokio::test]
async fn batch_with_unknown_task_applies_surviving_rows() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (board, list) = board_with_list(&client).await;

    let keep = add_task(&client, list, "keep").await;
    let doomed = add_task(&client, list, "doomed").await;
    client.delete_task(doomed).await.unwrap();

    // The batch still names the deleted task; the surviving row must
    // apply and the call must succeed.
    client
        .reorder_tasks(&ReorderTasksRequest {
            tasks: vec![
                TaskPlacement { task: doomed, list, position: 0 },
                TaskPlacement { task: keep, list, position: 1 },
            ],
            board: Some(board),
        })
        .await
        .unwrap();

    let survivor = client.task(keep).await.unwrap();
    assert_eq!(survivor.position, 1);
}

#[tokio::test]
async fn task_reorder_leaves_one_activity_entry_with_count() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (board, list) = board_with_list(&client).await;

    let t0 = add_task(&client, list, "a").await;
    let t1 = add_task(&client, list, "b").await;

    client
        .reorder_tasks(&ReorderTasksRequest {
            tasks: vec![
                TaskPlacement { task: t1, list, position: 0 },
                TaskPlacement { task: t0, list, position: 1 },
            ],
            board: Some(board),
        })
        .await
        .unwrap();

    let activity = client.board_activity(board, PageQuery::default()).await.unwrap();
    let moves: Vec<_> = activity
        .iter()
        .filter(|a| a.action == ActionKind::TaskMoved)
        .collect();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].details.task_count, Some(2));
}

#[tokio::test]
async fn list_reorder_leaves_no_activity_entry() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (board, list_a) = board_with_list(&client).await;
    let list_b = client
        .create_list(
            board,
            &CreateListRequest {
                title: "Doing".to_string(),
            },
        )
        .await
        .unwrap()
        .id;

    let before = client
        .board_activity(board, PageQuery::default())
        .await
        .unwrap()
        .len();

    client
        .reorder_lists(&ReorderListsRequest {
            lists: vec![
                ListPlacement { list: list_b, position: 0 },
                ListPlacement { list: list_a, position: 1 },
            ],
            board: Some(board),
        })
        .await
        .unwrap();

    let detail = client.board(board).await.unwrap();
    let order: Vec<ListId> = detail.lists.iter().map(|l| l.id).collect();
    assert_eq!(order, vec![list_b, list_a]);

    let after = client
        .board_activity(board, PageQuery::default())
        .await
        .unwrap()
        .len();
    assert_eq!(before, after);
}

#[tokio::test]
async fn empty_reorder_batch_is_trivial_success() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (board, _list) = board_with_list(&client).await;

    let before = client
        .board_activity(board, PageQuery::default())
        .await
        .unwrap()
        .len();

    client
        .reorder_tasks(&ReorderTasksRequest {
            tasks: Vec::new(),
            board: Some(board),
        })
        .await
        .unwrap();

    // No side effects: the activity trail is untouched.
    let after = client
        .board_activity(board, PageQuery::default())
        .await
        .unwrap()
        .len();
    assert_eq!(before, after);
}

#[tokio::test]
async fn sequential_reorders_last_write_wins() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (board, list) = board_with_list(&client).await;

    let a = add_task(&client, list, "A").await;
    let b = add_task(&client, list, "B").await;
    let c = add_task(&client, list, "C").await;

    client
        .reorder_tasks(&ReorderTasksRequest {
            tasks: vec![
                TaskPlacement { task: b, list, position: 0 },
                TaskPlacement { task: a, list, position: 1 },
                TaskPlacement { task: c, list, position: 2 },
            ],
            board: Some(board),
        })
        .await
        .unwrap();

    client
        .reorder_tasks(&ReorderTasksRequest {
            tasks: vec![
                TaskPlacement { task: c, list, position: 0 },
                TaskPlacement { task: a, list, position: 1 },
                TaskPlacement { task: b, list, position: 2 },
            ],
            board: Some(board),
        })
        .await
        .unwrap();

    // The second call alone describes the final state.
    let detail = client.board(board).await.unwrap();
    let order: Vec<TaskId> = detail.tasks.iter().map(|t| t.id).collect();
    assert_eq!(order, vec![c, a, b]);
}

#[tokio::test]
async fn reorder_resolves_board_from_first_placement() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let (_board, list) = board_with_list(&client).await;
    let task = add_task(&client, list, "solo").await;

    // No explicit board id: the server resolves it from the
    // placement's destination list.
    client
        .reorder_tasks(&ReorderTasksRequest {
            tasks: vec![TaskPlacement {
                task,
                list,
                position: 7,
            }],
            board: None,
        })
        .await
        .unwrap();

    assert_eq!(client.task(task).await.unwrap().position, 7);
}
