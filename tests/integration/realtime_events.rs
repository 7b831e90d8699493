//! Realtime fan-out tests: board topics, event scoping, and the
//! absence of echo suppression.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tackboard::api::ApiClient;
use tackboard::sync::EventFeed;
use tackboard_proto::event::BoardEvent;
use tackboard_proto::id::{BoardId, ListId};
use tackboard_proto::model::TaskPlacement;
use tackboard_proto::rest::{CreateBoardRequest, CreateListRequest, CreateTaskRequest, ReorderTasksRequest};
use tackboard_server::server::{self, AppState};
use tokio::time::timeout;

const EVENT_WAIT: Duration = Duration::from_secs(5);

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

async fn make_board(client: &ApiClient, title: &str) -> BoardId {
    client
        .create_board(&CreateBoardRequest {
            title: title.to_string(),
            description: None,
            background: None,
        })
        .await
        .unwrap()
        .id
}

async fn make_list(client: &ApiClient, board: BoardId, title: &str) -> ListId {
    client
        .create_list(
            board,
            &CreateListRequest {
                title: title.to_string(),
            },
        )
        .await
        .unwrap()
        .id
}

async fn next_event(feed: &mut EventFeed) -> BoardEvent {
    timeout(EVENT_WAIT, feed.next_event())
        .await
        .expect("timed out waiting for event")
        .expect("feed error")
}

#[tokio::test]
async fn subscriber_receives_task_created() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let board = make_board(&client, "Live").await;
    let list = make_list(&client, board, "Todo").await;

    let mut feed = EventFeed::connect(&format!("ws://{addr}/ws")).await.unwrap();
    feed.join(board).await.unwrap();

    let task = client
        .create_task(
            list,
            &CreateTaskRequest {
                title: "Broadcast me".to_string(),
                description: None,
                priority: None,
                due_date: None,
                labels: Vec::new(),
                assignees: Vec::new(),
            },
        )
        .await
        .unwrap();

    // The mutating client's own event comes back too; there is no echo
    // suppression.
    match next_event(&mut feed).await {
        BoardEvent::TaskCreated(created) => assert_eq!(created.id, task.id),
        other => panic!("expected TaskCreated, got {other:?}"),
    }
}

#[tokio::test]
async fn events_are_scoped_to_joined_boards() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let watched = make_board(&client, "Watched").await;
    let ignored = make_board(&client, "Ignored").await;

    let mut feed = EventFeed::connect(&format!("ws://{addr}/ws")).await.unwrap();
    feed.join(watched).await.unwrap();

    // Mutate the unjoined board first, then the joined one. The first
    // event to arrive must be for the joined board.
    make_list(&client, ignored, "Invisible").await;
    let visible = make_list(&client, watched, "Visible").await;

    match next_event(&mut feed).await {
        BoardEvent::ListCreated(list) => {
            assert_eq!(list.id, visible);
            assert_eq!(list.board, watched);
        }
        other => panic!("expected ListCreated, got {other:?}"),
    }
}

#[tokio::test]
async fn reorder_fans_out_one_event_with_full_batch() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let board = make_board(&client, "Live").await;
    let list = make_list(&client, board, "Todo").await;

    let mut tasks = Vec::new();
    for title in ["a", "b", "c"] {
        tasks.push(
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
                .id,
        );
    }

    let mut feed = EventFeed::connect(&format!("ws://{addr}/ws")).await.unwrap();
    feed.join(board).await.unwrap();

    let batch = vec![
        TaskPlacement { task: tasks[2], list, position: 0 },
        TaskPlacement { task: tasks[0], list, position: 1 },
        TaskPlacement { task: tasks[1], list, position: 2 },
    ];
    client
        .reorder_tasks(&ReorderTasksRequest {
            tasks: batch.clone(),
            board: Some(board),
        })
        .await
        .unwrap();

    match next_event(&mut feed).await {
        BoardEvent::TasksReordered { board: b, placements } => {
            assert_eq!(b, board);
            assert_eq!(placements, batch);
        }
        other => panic!("expected TasksReordered, got {other:?}"),
    }
}

#[tokio::test]
async fn leave_stops_delivery_for_that_board() {
    let addr = start_server().await;
    let client = signup(addr, "Ann", "ann@example.com").await;
    let left = make_board(&client, "Left").await;
    let kept = make_board(&client, "Kept").await;

    let mut feed = EventFeed::connect(&format!("ws://{addr}/ws")).await.unwrap();
    feed.join(left).await.unwrap();
    feed.join(kept).await.unwrap();
    feed.leave(left).await.unwrap();

    // Leave carries no ack; give the server a moment to process it
    // before mutating.
    tokio::time::sleep(Duration::from_millis(100)).await;

    make_list(&client, left, "Unseen").await;
    let seen = make_list(&client, kept, "Seen").await;

    match next_event(&mut feed).await {
        BoardEvent::ListCreated(list) => assert_eq!(list.id, seen),
        other => panic!("expected ListCreated, got {other:?}"),
    }
}

#[tokio::test]
async fn two_subscribers_both_receive() {
    let addr = start_server().await;
    let owner = signup(addr, "Ann", "ann@example.com").await;
    let board = make_board(&owner, "Shared").await;

    let url = format!("ws://{addr}/ws");
    let mut feed_a = EventFeed::connect(&url).await.unwrap();
    let mut feed_b = EventFeed::connect(&url).await.unwrap();
    feed_a.join(board).await.unwrap();
    feed_b.join(board).await.unwrap();

    let list = make_list(&owner, board, "Todo").await;

    for feed in [&mut feed_a, &mut feed_b] {
        match next_event(feed).await {
            BoardEvent::ListCreated(created) => assert_eq!(created.id, list),
            other => panic!("expected ListCreated, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn board_delete_reaches_subscribers() {
    let addr = start_server().await;
    let owner = signup(addr, "Ann", "ann@example.com").await;
    let board = make_board(&owner, "Doomed").await;

    let mut feed = EventFeed::connect(&format!("ws://{addr}/ws")).await.unwrap();
    feed.join(board).await.unwrap();

    owner.delete_board(board).await.unwrap();

    match next_event(&mut feed).await {
        BoardEvent::BoardDeleted { board: b } => assert_eq!(b, board),
        other => panic!("expected BoardDeleted, got {other:?}"),
    }
    feed.close().await.unwrap();
}
