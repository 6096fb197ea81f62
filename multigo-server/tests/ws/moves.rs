use serde_json::json;

use crate::common::{TestServer, play_moves, sync_all};

fn cell(state: &serde_json::Value, x: usize, y: usize) -> u64 {
    let size = state["state"]["size"].as_u64().unwrap() as usize;
    state["state"]["board"][y * size + x].as_u64().unwrap()
}

#[tokio::test]
async fn play_places_stone_and_rotates() {
    let server = TestServer::start().await;
    let (room_id, mut clients) = server.start_match(3, 9).await;
    let ids: Vec<u64> = clients.iter().map(|c| c.player_id).collect();

    clients[0].play(&room_id, 4, 4).await;
    let states = sync_all(&mut clients).await;
    for state in &states {
        assert_eq!(cell(state, 4, 4), 1);
        assert_eq!(state["current_player"], ids[1]);
        assert_eq!(state["state"]["current_player"], 2);
    }

    let state = play_moves(&room_id, &mut clients, &[(1, 3, 3), (2, 5, 5)]).await;
    assert_eq!(cell(&state, 3, 3), 2);
    assert_eq!(cell(&state, 5, 5), 3);
    assert_eq!(state["current_player"], ids[0]);
}

#[tokio::test]
async fn out_of_turn_goes_only_to_sender() {
    let server = TestServer::start().await;
    let (room_id, mut clients) = server.start_match(2, 9).await;

    clients[1].play(&room_id, 0, 0).await;
    let err = clients[1].recv_kind("error").await;
    assert_eq!(err["message"], "out of turn");
    clients[0].expect_silence().await;
}

#[tokio::test]
async fn occupied_and_off_board_points() {
    let server = TestServer::start().await;
    let (room_id, mut clients) = server.start_match(2, 9).await;

    play_moves(&room_id, &mut clients, &[(0, 2, 2)]).await;

    clients[1].play(&room_id, 2, 2).await;
    let err = clients[1].recv_kind("error").await;
    assert_eq!(err["message"], "overwrite");

    clients[1].play(&room_id, 9, 0).await;
    let err = clients[1].recv_kind("error").await;
    assert_eq!(err["message"], "not on board");

    clients[1].play(&room_id, -1, 0).await;
    let err = clients[1].recv_kind("error").await;
    assert_eq!(err["message"], "Invalid coordinates");

    // Still the second seat's turn after the rejections.
    let state = play_moves(&room_id, &mut clients, &[(1, 3, 3)]).await;
    assert_eq!(cell(&state, 3, 3), 2);
}

#[tokio::test]
async fn suicide_is_rejected() {
    let server = TestServer::start().await;
    let (room_id, mut clients) = server.start_match(2, 5).await;

    play_moves(
        &room_id,
        &mut clients,
        &[
            (0, 1, 2),
            (1, 4, 4),
            (0, 3, 2),
            (1, 4, 0),
            (0, 2, 1),
            (1, 0, 4),
            (0, 2, 3),
        ],
    )
    .await;

    clients[1].play(&room_id, 2, 2).await;
    let err = clients[1].recv_kind("error").await;
    assert_eq!(err["message"], "suicide");

    let (_, body) = server.get_room(&room_id).await;
    assert_eq!(body["board"][2 * 5 + 2], 0);
    assert_eq!(body["current_player"], 2);
}

#[tokio::test]
async fn corner_capture_scores_a_prisoner() {
    let server = TestServer::start().await;
    let (room_id, mut clients) = server.start_match(2, 5).await;

    play_moves(&room_id, &mut clients, &[(0, 1, 0), (1, 0, 0)]).await;

    clients[0].play(&room_id, 0, 1).await;
    let states = sync_all(&mut clients).await;
    for state in &states {
        assert_eq!(state["captured"], json!([[0, 0]]));
        assert_eq!(cell(state, 0, 0), 0);
        assert_eq!(state["state"]["prisoners"], json!([1, 0]));
        assert_eq!(state["state"]["ko"], json!({"pos": [0, 0], "illegal": 2}));
    }
}

#[tokio::test]
async fn state_carries_position_hash() {
    let server = TestServer::start().await;
    let (room_id, mut clients) = server.start_match(2, 9).await;

    let (_, before) = server.get_room(&room_id).await;
    let state = play_moves(&room_id, &mut clients, &[(0, 4, 4)]).await;

    let hash = state["state"]["hash"].as_str().unwrap();
    assert_eq!(hash.len(), 16);
    assert_ne!(before["hash"], state["state"]["hash"]);
}
