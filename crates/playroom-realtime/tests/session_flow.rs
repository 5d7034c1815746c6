//! End-to-end engine tests over the in-memory directory and message store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

use playroom_core::config::realtime::RealtimeConfig;
use playroom_directory::memory::{MemoryDirectory, MemoryMessageStore};
use playroom_entity::game::GameRequestStatus;
use playroom_realtime::game::engine::FirstMoverPicker;
use playroom_realtime::{ClientEvent, RealtimeEngine, ServerEvent};

/// Always opens with the first player.
struct FixedFirstMover;

impl FirstMoverPicker for FixedFirstMover {
    fn pick(&self, players: [Uuid; 2]) -> Uuid {
        players[0]
    }
}

struct Harness {
    directory: Arc<MemoryDirectory>,
    engine: RealtimeEngine,
}

impl Harness {
    fn new() -> Self {
        let directory = Arc::new(MemoryDirectory::new());
        let messages = Arc::new(MemoryMessageStore::new());
        let engine = RealtimeEngine::with_first_mover(
            RealtimeConfig::default(),
            directory.clone(),
            messages,
            Arc::new(FixedFirstMover),
        );
        Self { directory, engine }
    }
}

fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_presence_lifecycle_over_repeated_sessions() {
    let h = Harness::new();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    h.directory.add_friendship((alice, "alice"), (bob, "bob"));

    let (_bob_handle, mut bob_rx) = h.engine.connect(bob).await;

    for _ in 0..3 {
        let (alice_handle, _alice_rx) = h.engine.connect(alice).await;
        assert!(matches!(
            bob_rx.recv().await.unwrap(),
            ServerEvent::FriendOnline { user_id } if user_id == alice
        ));

        h.engine.disconnect(alice, alice_handle.id).await;
        assert!(matches!(
            bob_rx.recv().await.unwrap(),
            ServerEvent::FriendOffline { user_id } if user_id == alice
        ));
    }

    assert_eq!(h.engine.connection_count(), 1);
    assert_eq!(h.directory.mirrored_online(alice), Some(false));
}

#[tokio::test]
async fn test_reconnect_race_keeps_fresh_connection() {
    let h = Harness::new();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    h.directory.add_friendship((alice, "alice"), (bob, "bob"));

    let (_bob_handle, mut bob_rx) = h.engine.connect(bob).await;
    let (old_handle, _old_rx) = h.engine.connect(alice).await;
    let (_new_handle, _new_rx) = h.engine.connect(alice).await;
    assert!(!old_handle.is_alive());
    drain(&mut bob_rx);

    // The stale socket closing must not take the fresh connection down.
    h.engine.disconnect(alice, old_handle.id).await;
    assert_eq!(h.engine.connection_count(), 2);
    assert!(drain(&mut bob_rx)
        .iter()
        .all(|e| !matches!(e, ServerEvent::FriendOffline { .. })));
}

#[tokio::test]
async fn test_invite_accept_and_play_to_win() {
    let h = Harness::new();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    let game_id = Uuid::new_v4();

    let (_alice_handle, mut alice_rx) = h.engine.connect(alice).await;
    let (_bob_handle, mut bob_rx) = h.engine.connect(bob).await;

    h.engine
        .handle_event(
            alice,
            ClientEvent::GameInvite {
                game_id,
                from: alice,
                to: bob,
                expires_at: None,
            },
        )
        .await;

    let bob_events = drain(&mut bob_rx);
    assert!(bob_events.iter().any(|e| matches!(
        e,
        ServerEvent::ReceiveGameInvite { status: GameRequestStatus::Pending, .. }
    )));

    h.engine
        .handle_event(
            bob,
            ClientEvent::GameInviteAccepted {
                game_id,
                from: alice,
                to: bob,
            },
        )
        .await;

    let alice_events = drain(&mut alice_rx);
    assert!(alice_events
        .iter()
        .any(|e| matches!(e, ServerEvent::GameInviteAccepted { .. })));
    assert!(alice_events.iter().any(|e| matches!(
        e,
        ServerEvent::GameStart { starting_player, .. } if *starting_player == alice
    )));
    assert_eq!(h.engine.active_games(), 1);

    // alice takes the left column.
    let moves = [(alice, 0), (bob, 1), (alice, 3), (bob, 2), (alice, 6)];
    for (player, position) in moves {
        h.engine
            .handle_event(
                player,
                ClientEvent::GameMove {
                    game_id,
                    position,
                    player,
                    opponent: None,
                },
            )
            .await;
    }

    let bob_events = drain(&mut bob_rx);
    let game_overs: Vec<_> = bob_events
        .iter()
        .filter(|e| matches!(e, ServerEvent::GameOver { .. }))
        .collect();
    assert_eq!(game_overs.len(), 1);
    assert!(matches!(
        game_overs[0],
        ServerEvent::GameOver { winner: Some(w), is_draw: false, .. } if *w == alice
    ));
    assert_eq!(h.engine.active_games(), 0);
}

#[tokio::test]
async fn test_disconnect_mid_game_forfeits() {
    let h = Harness::new();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    let game_id = Uuid::new_v4();

    let (alice_handle, _alice_rx) = h.engine.connect(alice).await;
    let (_bob_handle, mut bob_rx) = h.engine.connect(bob).await;

    h.engine
        .handle_event(
            alice,
            ClientEvent::GameInvite {
                game_id,
                from: alice,
                to: bob,
                expires_at: None,
            },
        )
        .await;
    h.engine
        .handle_event(
            bob,
            ClientEvent::GameInviteAccepted {
                game_id,
                from: alice,
                to: bob,
            },
        )
        .await;
    drain(&mut bob_rx);

    h.engine.disconnect(alice, alice_handle.id).await;

    let bob_events = drain(&mut bob_rx);
    assert!(bob_events.iter().any(|e| matches!(
        e,
        ServerEvent::OpponentDisconnected { game_id: g } if *g == game_id
    )));
    assert_eq!(h.engine.active_games(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_invite_expires_for_both_sides() {
    let h = Harness::new();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    let game_id = Uuid::new_v4();

    let (_alice_handle, mut alice_rx) = h.engine.connect(alice).await;
    let (_bob_handle, mut bob_rx) = h.engine.connect(bob).await;

    h.engine
        .handle_event(
            alice,
            ClientEvent::GameInvite {
                game_id,
                from: alice,
                to: bob,
                expires_at: None,
            },
        )
        .await;
    assert_eq!(h.engine.pending_invites(), 1);

    tokio::time::sleep(Duration::from_secs(
        RealtimeConfig::default().invite_ttl_seconds + 1,
    ))
    .await;
    tokio::task::yield_now().await;

    assert_eq!(h.engine.pending_invites(), 0);
    assert!(drain(&mut alice_rx)
        .iter()
        .any(|e| matches!(e, ServerEvent::GameInviteExpired { .. })));
    assert!(drain(&mut bob_rx)
        .iter()
        .any(|e| matches!(e, ServerEvent::GameInviteExpired { .. })));

    // Accepting after expiry neither revives the invite nor starts a game.
    h.engine
        .handle_event(
            bob,
            ClientEvent::GameInviteAccepted {
                game_id,
                from: alice,
                to: bob,
            },
        )
        .await;
    assert_eq!(h.engine.active_games(), 0);

    let requests = h.directory.game_requests(bob);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].status, GameRequestStatus::Expired);
}

#[tokio::test]
async fn test_ping_pong_and_online_friends_query() {
    let h = Harness::new();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    h.directory.add_friendship((alice, "alice"), (bob, "bob"));

    let (_alice_handle, mut alice_rx) = h.engine.connect(alice).await;
    let (_bob_handle, _bob_rx) = h.engine.connect(bob).await;
    // Discard the FriendOnline presence event from bob's connect.
    drain(&mut alice_rx);

    h.engine.handle_event(alice, ClientEvent::Ping).await;
    assert!(matches!(alice_rx.recv().await.unwrap(), ServerEvent::Pong));

    h.engine
        .handle_event(alice, ClientEvent::GetOnlineFriends)
        .await;
    assert!(matches!(
        alice_rx.recv().await.unwrap(),
        ServerEvent::OnlineFriendsList { users } if users == vec![bob]
    ));
}
