use serde_json::json;

use crate::common::{TestServer, play_moves, sync_all};

// Builds
//   . . . . .
//   . W B . .
//   W . W B .
//   . W B . .
//   . . . . B
// with black (seat 0) to play at (1,2), taking the white stone at (2,2).
const KO_SETUP: &[(usize, i32, i32)] = &[
    (0, 2, 1),
    (1, 1, 1),
    (0, 3, 2),
    (1, 0, 2),
    (0, 2, 3),
    (1, 2, 2),
    (0, 4, 4),
    (1, 1, 3),
];

#[tokio::test]
async fn immediate_retake_is_a_ko_violation() {
    let server = TestServer::start().await;
    let (room_id, mut clients) = server.start_match(2, 5).await;
    play_moves(&room_id, &mut clients, KO_SETUP).await;

    clients[0].play(&room_id, 1, 2).await;
    let states = sync_all(&mut clients).await;
    assert_eq!(states[0]["captured"], json!([[2, 2]]));
    assert_eq!(states[0]["state"]["ko"], json!({"pos": [2, 2], "illegal": 2}));

    clients[1].play(&room_id, 2, 2).await;
    let err = clients[1].recv_kind("error").await;
    assert_eq!(err["message"], "ko violation");
    clients[0].expect_silence().await;
}

#[tokio::test]
async fn ko_is_lifted_by_a_pass() {
    let server = TestServer::start().await;
    let (room_id, mut clients) = server.start_match(2, 5).await;
    play_moves(&room_id, &mut clients, KO_SETUP).await;
    play_moves(&room_id, &mut clients, &[(0, 1, 2)]).await;

    clients[1].pass(&room_id).await;
    let states = sync_all(&mut clients).await;
    assert!(states[0]["state"]["ko"].is_null());
    assert_eq!(states[0]["state"]["pass_count"], 1);
}

#[tokio::test]
async fn ko_only_binds_the_next_player() {
    let server = TestServer::start().await;
    let (room_id, mut clients) = server.start_match(2, 5).await;
    play_moves(&room_id, &mut clients, KO_SETUP).await;
    play_moves(&room_id, &mut clients, &[(0, 1, 2)]).await;

    // White plays elsewhere; black fills the ko and the restriction is gone.
    let state = play_moves(&room_id, &mut clients, &[(1, 4, 0), (0, 2, 2)]).await;
    assert!(state["state"]["ko"].is_null());
    assert_eq!(state["state"]["board"][2 * 5 + 2], 1);
}
