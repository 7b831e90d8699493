//! Property-based serialization round-trip tests.
//!
//! Uses proptest to verify:
//! 1. Any valid `Task` or `Board` survives encode → decode.
//! 2. Any `BoardEvent` survives encode → decode.
//! 3. Any client/server frame survives encode → decode.
//! 4. Random bytes never cause a panic in decode (returns `Err` gracefully).

use proptest::prelude::*;
use tackboard_proto::event::{self, BoardEvent};
use tackboard_proto::id::{BoardId, ListId, TaskId, UserId};
use tackboard_proto::model::{Board, List, Priority, Task, TaskPlacement, UserProfile};
use tackboard_proto::wire::{self, ClientFrame, ServerFrame};
use uuid::Uuid;

// --- Strategies for protocol types ---

fn arb_user_id() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

fn arb_board_id() -> impl Strategy<Value = BoardId> {
    any::<u128>().prop_map(|n| BoardId::from_uuid(Uuid::from_u128(n)))
}

fn arb_list_id() -> impl Strategy<Value = ListId> {
    any::<u128>().prop_map(|n| ListId::from_uuid(Uuid::from_u128(n)))
}

fn arb_task_id() -> impl Strategy<Value = TaskId> {
    any::<u128>().prop_map(|n| TaskId::from_uuid(Uuid::from_u128(n)))
}

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High),
        Just(Priority::Urgent),
    ]
}

fn arb_board() -> impl Strategy<Value = Board> {
    (
        arb_board_id(),
        "[^\x00]{1,100}",
        ".{0,200}",
        arb_user_id(),
        prop::collection::vec(arb_user_id(), 1..5),
        "#[0-9a-f]{6}",
        any::<u64>(),
        any::<u64>(),
    )
        .prop_map(
            |(id, title, description, owner, members, background, created_at, updated_at)| Board {
                id,
                title,
                description,
                owner,
                members,
                background,
                created_at,
                updated_at,
            },
        )
}

fn arb_list() -> impl Strategy<Value = List> {
    (
        arb_list_id(),
        "[^\x00]{1,100}",
        arb_board_id(),
        any::<i64>(),
        any::<u64>(),
        any::<u64>(),
    )
        .prop_map(|(id, title, board, position, created_at, updated_at)| List {
            id,
            title,
            board,
            position,
            created_at,
            updated_at,
        })
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        (
            arb_task_id(),
            "[^\x00]{1,200}",
            ".{0,500}",
            arb_list_id(),
            arb_board_id(),
            any::<i64>(),
        ),
        (
            prop::collection::vec(arb_user_id(), 0..4),
            arb_priority(),
            prop::option::of(any::<u64>()),
            prop::collection::vec("[a-z]{1,12}", 0..4),
            any::<u64>(),
            any::<u64>(),
        ),
    )
        .prop_map(
            |(
                (id, title, description, list, board, position),
                (assignees, priority, due_date, labels, created_at, updated_at),
            )| Task {
                id,
                title,
                description,
                list,
                board,
                position,
                assignees,
                priority,
                due_date,
                labels,
                created_at,
                updated_at,
            },
        )
}

fn arb_placement() -> impl Strategy<Value = TaskPlacement> {
    (arb_task_id(), arb_list_id(), any::<i64>()).prop_map(|(task, list, position)| TaskPlacement {
        task,
        list,
        position,
    })
}

fn arb_profile() -> impl Strategy<Value = UserProfile> {
    (
        arb_user_id(),
        "[^\x00]{1,50}",
        "[a-z]{1,16}@[a-z]{1,16}\\.com",
        prop::option::of("[^\x00]{1,64}"),
    )
        .prop_map(|(id, name, email, avatar)| UserProfile {
            id,
            name,
            email,
            avatar,
        })
}

fn arb_event() -> impl Strategy<Value = BoardEvent> {
    prop_oneof![
        arb_task().prop_map(BoardEvent::TaskCreated),
        arb_task().prop_map(BoardEvent::TaskUpdated),
        (arb_task_id(), arb_list_id(), arb_board_id())
            .prop_map(|(task, list, board)| BoardEvent::TaskDeleted { task, list, board }),
        (arb_board_id(), prop::collection::vec(arb_placement(), 0..16))
            .prop_map(|(board, placements)| BoardEvent::TasksReordered { board, placements }),
        arb_list().prop_map(BoardEvent::ListCreated),
        (arb_list_id(), arb_board_id())
            .prop_map(|(list, board)| BoardEvent::ListDeleted { list, board }),
        arb_board().prop_map(BoardEvent::BoardUpdated),
        arb_board_id().prop_map(|board| BoardEvent::BoardDeleted { board }),
        (arb_board(), arb_profile())
            .prop_map(|(board, member)| BoardEvent::MemberAdded { board, member }),
    ]
}

fn arb_client_frame() -> impl Strategy<Value = ClientFrame> {
    prop_oneof![
        arb_board_id().prop_map(|board| ClientFrame::Join { board }),
        arb_board_id().prop_map(|board| ClientFrame::Leave { board }),
    ]
}

fn arb_server_frame() -> impl Strategy<Value = ServerFrame> {
    prop_oneof![
        arb_board_id().prop_map(|board| ServerFrame::Joined { board }),
        arb_event().prop_map(ServerFrame::Event),
        "[^\x00]{0,100}".prop_map(|reason| ServerFrame::Error { reason }),
    ]
}

// --- Properties ---

proptest! {
    #[test]
    fn task_round_trip(task in arb_task()) {
        let bytes = postcard::to_allocvec(&task).unwrap();
        let back: Task = postcard::from_bytes(&bytes).unwrap();
        prop_assert_eq!(task, back);
    }

    #[test]
    fn board_round_trip(board in arb_board()) {
        let bytes = postcard::to_allocvec(&board).unwrap();
        let back: Board = postcard::from_bytes(&bytes).unwrap();
        prop_assert_eq!(board, back);
    }

    #[test]
    fn event_round_trip(ev in arb_event()) {
        let bytes = event::encode(&ev).unwrap();
        let back = event::decode(&bytes).unwrap();
        prop_assert_eq!(ev, back);
    }

    #[test]
    fn event_board_id_survives_round_trip(ev in arb_event()) {
        let bytes = event::encode(&ev).unwrap();
        let back = event::decode(&bytes).unwrap();
        prop_assert_eq!(ev.board_id(), back.board_id());
    }

    #[test]
    fn client_frame_round_trip(frame in arb_client_frame()) {
        let bytes = wire::encode_client(&frame).unwrap();
        let back = wire::decode_client(&bytes).unwrap();
        prop_assert_eq!(frame, back);
    }

    #[test]
    fn server_frame_round_trip(frame in arb_server_frame()) {
        let bytes = wire::encode_server(&frame).unwrap();
        let back = wire::decode_server(&bytes).unwrap();
        prop_assert_eq!(frame, back);
    }

    #[test]
    fn event_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        // Must return Ok or Err, never panic.
        let _ = event::decode(&bytes);
    }

    #[test]
    fn frame_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = wire::decode_client(&bytes);
        let _ = wire::decode_server(&bytes);
    }
}
