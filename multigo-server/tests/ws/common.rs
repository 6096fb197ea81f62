#![allow(dead_code)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use multigo_server::config::ServerConfig;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite;

/// A running test server on an ephemeral port.
pub struct TestServer {
    pub addr: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Self {
        let (router, _state) = multigo_server::build_router(ServerConfig::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            use axum::extract::Request;
            use tower::Layer as _;
            use tower_http::normalize_path::NormalizePathLayer;

            let app = NormalizePathLayer::trim_trailing_slash().layer(router);
            axum::serve(
                listener,
                axum::ServiceExt::<Request>::into_make_service(app),
            )
            .await
            .unwrap();
        });

        TestServer {
            addr,
            client: reqwest::Client::new(),
        }
    }

    /// Open a WebSocket connection and consume the `init` message.
    pub async fn connect(&self) -> WsClient {
        let url = format!("ws://{}/ws", self.addr);
        let (stream, _response) = tokio_tungstenite::connect_async(url)
            .await
            .expect("WebSocket connect failed");

        let (sink, stream) = stream.split();
        let mut client = WsClient {
            sink,
            stream,
            player_id: 0,
        };
        let init = client.recv_kind("init").await;
        client.player_id = init["player_id"].as_u64().expect("init without player_id");
        client
    }

    /// GET /api/rooms/{id}; returns status and JSON body.
    pub async fn get_room(&self, room_id: &str) -> (reqwest::StatusCode, Value) {
        let resp = self
            .client
            .get(format!("http://{}/api/rooms/{room_id}", self.addr))
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    /// Connect `room_size` players, seat them all in a new room and start the game.
    /// Every client has consumed every broadcast up to and including the start.
    pub async fn start_match(&self, room_size: u8, board_size: u8) -> (String, Vec<WsClient>) {
        let mut clients = Vec::new();
        for _ in 0..room_size {
            clients.push(self.connect().await);
        }

        let room_id = clients[0].create_room(room_size, board_size).await;
        for i in 1..clients.len() {
            clients[i].join_room(&room_id).await;
            for client in clients.iter_mut().take(i + 1) {
                client.recv_kind("state").await;
            }
        }

        clients[0].start_game(&room_id).await;
        let states = sync_all(&mut clients).await;
        assert_eq!(states[0]["stage"], "playing");

        (room_id, clients)
    }
}

/// Receive the next `state` broadcast on every client.
pub async fn sync_all(clients: &mut [WsClient]) -> Vec<Value> {
    let mut states = Vec::new();
    for client in clients.iter_mut() {
        states.push(client.recv_kind("state").await);
    }
    states
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// A WebSocket client wrapping a split tokio-tungstenite connection.
pub struct WsClient {
    sink: futures_util::stream::SplitSink<WsStream, tungstenite::Message>,
    stream: futures_util::stream::SplitStream<WsStream>,
    pub player_id: u64,
}

impl WsClient {
    /// Send a JSON message.
    pub async fn send(&mut self, msg: Value) {
        self.sink
            .send(tungstenite::Message::Text(msg.to_string().into()))
            .await
            .expect("WS send failed");
    }

    /// Receive the next text message as JSON (5s timeout).
    pub async fn recv(&mut self) -> Value {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive with a custom timeout.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Value {
        let msg = tokio::time::timeout(timeout, self.stream.next())
            .await
            .expect("WS recv timed out")
            .expect("WS stream ended")
            .expect("WS recv error");

        match msg {
            tungstenite::Message::Text(text) => {
                serde_json::from_str(&text).expect("WS message not valid JSON")
            }
            other => panic!("Expected text WS message, got: {other:?}"),
        }
    }

    /// Skip messages until one has a matching `kind` field. Returns that message.
    pub async fn recv_kind(&mut self, kind: &str) -> Value {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        loop {
            let remaining = deadline - tokio::time::Instant::now();
            let msg = self.recv_timeout(remaining).await;
            if msg.get("kind").and_then(|k| k.as_str()) == Some(kind) {
                return msg;
            }
        }
    }

    /// Assert that nothing arrives within a short window.
    pub async fn expect_silence(&mut self) {
        let next = tokio::time::timeout(Duration::from_millis(200), self.stream.next()).await;
        assert!(next.is_err(), "expected no message, got {next:?}");
    }

    // -- Room and game action helpers --
    // Action helpers only SEND. Tests recv and assert responses themselves, since
    // every seated player also receives the broadcast.

    /// Create a room, wait for `room_created` and the first `state`. Returns the room id.
    pub async fn create_room(&mut self, room_size: u8, board_size: u8) -> String {
        self.send(json!({"action": "create_room", "room_size": room_size, "board_size": board_size}))
            .await;
        let created = self.recv_kind("room_created").await;
        self.recv_kind("state").await;
        created["room_id"].as_str().expect("room id missing").to_string()
    }

    pub async fn join_room(&mut self, room_id: &str) {
        self.send(json!({"action": "join_room", "room_id": room_id}))
            .await;
    }

    pub async fn leave_room(&mut self, room_id: &str) {
        self.send(json!({"action": "leave_room", "room_id": room_id}))
            .await;
    }

    pub async fn start_game(&mut self, room_id: &str) {
        self.send(json!({"action": "start_game", "room_id": room_id}))
            .await;
    }

    pub async fn play(&mut self, room_id: &str, x: i32, y: i32) {
        self.send(json!({"action": "play", "room_id": room_id, "x": x, "y": y}))
            .await;
    }

    pub async fn pass(&mut self, room_id: &str) {
        self.send(json!({"action": "pass", "room_id": room_id}))
            .await;
    }

    pub async fn resign(&mut self, room_id: &str) {
        self.send(json!({"action": "resign", "room_id": room_id}))
            .await;
    }

    pub async fn mark(&mut self, room_id: &str, x: i32, y: i32) {
        self.send(json!({"action": "mark", "room_id": room_id, "x": x, "y": y}))
            .await;
    }

    pub async fn confirm(&mut self, room_id: &str) {
        self.send(json!({"action": "confirm", "room_id": room_id}))
            .await;
    }

    /// Close the WebSocket connection (simulates browser close / disconnect).
    pub async fn close(self) {
        let mut sink = self.sink;
        let _ = sink.close().await;
    }
}

/// Play `moves` as (seat index, x, y) in order, with every client consuming each broadcast.
pub async fn play_moves(room_id: &str, clients: &mut [WsClient], moves: &[(usize, i32, i32)]) -> Value {
    let mut last = Value::Null;
    for &(seat, x, y) in moves {
        clients[seat].play(room_id, x, y).await;
        last = sync_all(clients).await.remove(0);
    }
    last
}

/// Every seat passes once, in turn order starting from seat 0.
pub async fn all_pass(room_id: &str, clients: &mut [WsClient]) -> Value {
    let mut last = Value::Null;
    for seat in 0..clients.len() {
        clients[seat].pass(room_id).await;
        last = sync_all(clients).await.remove(0);
    }
    last
}
