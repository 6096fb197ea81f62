use crate::common::TestServer;

#[tokio::test]
async fn health_check_responds() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .get(format!("http://{}/up", server.addr))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn each_connection_gets_its_own_player_id() {
    let server = TestServer::start().await;
    let a = server.connect().await;
    let b = server.connect().await;
    assert!(a.player_id > 0);
    assert_ne!(a.player_id, b.player_id);
}

#[tokio::test]
async fn unknown_room_is_404() {
    let server = TestServer::start().await;
    let (status, body) = server.get_room("ZZZZZ").await;
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Room not found");
}

#[tokio::test]
async fn garbage_messages_get_errors() {
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    client.send(serde_json::json!({"action": "dance"})).await;
    let err = client.recv_kind("error").await;
    assert_eq!(err["message"], "Unknown action: dance");

    client.send(serde_json::json!({"action": "play", "x": 1, "y": 1})).await;
    let err = client.recv_kind("error").await;
    assert_eq!(err["message"], "Missing room_id");
}
