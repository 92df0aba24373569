//! WebSocket engine against a scripted in-test server.
//!
//! Each test binds a listener on 127.0.0.1:0, accepts one socket and
//! plays a fixed script of service messages.

use std::future::Future;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use mdpad_collab::{
    ClientMsg, ConnectionState, ReconnectPolicy, SessionConnection, WsEngine,
};
use mdpad_core::{Location, PresenceRegistry, SessionId, UserInfo};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

type ServerSocket = WebSocketStream<TcpStream>;

/// Accept one WebSocket connection and hand it to `script`.
async fn serve_once<F, Fut>(script: F) -> u16
where
    F: FnOnce(ServerSocket) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let socket = tokio_tungstenite::accept_async(stream).await.unwrap();
        script(socket).await;
    });
    port
}

async fn send_json(socket: &mut ServerSocket, value: serde_json::Value) {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

fn open(port: u16) -> SessionConnection<WsEngine> {
    let location = Location::parse(&format!("http://127.0.0.1:{port}")).unwrap();
    let id = SessionId::parse("doc").unwrap();
    let address = location.remote_endpoint(&id);
    SessionConnection::open(
        id,
        address,
        WsEngine::new(),
        ReconnectPolicy::fixed(Duration::from_millis(100)),
        (),
    )
}

/// Feed events into the connection until `done` holds.
async fn pump(
    connection: &mut SessionConnection<WsEngine>,
    presence: &mut PresenceRegistry,
    done: impl Fn(&SessionConnection<WsEngine>, &PresenceRegistry) -> bool,
) {
    while !done(connection, presence) {
        let event = timeout(Duration::from_secs(2), connection.recv())
            .await
            .expect("no event within 2s");
        connection.dispatch(event, presence, Instant::now());
    }
}

fn presence() -> PresenceRegistry {
    PresenceRegistry::new(UserInfo::new("Ada", 42))
}

// ─── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_announces_local_info() {
    let (info_tx, mut info_rx) = mpsc::unbounded_channel();
    let port = serve_once(move |mut socket| async move {
        while let Some(Ok(Message::Text(text))) = socket.next().await {
            let msg: ClientMsg = serde_json::from_str(text.as_str()).unwrap();
            let _ = info_tx.send(msg);
        }
    })
    .await;

    let mut connection = open(port);
    let mut presence = presence();
    pump(&mut connection, &mut presence, |c, _| {
        c.state() == ConnectionState::Connected
    })
    .await;

    let first = timeout(Duration::from_secs(2), info_rx.recv()).await.unwrap();
    assert_eq!(first, Some(ClientMsg::ClientInfo(UserInfo::new("Ada", 42))));

    presence.set_local_name("Grace");
    assert!(connection.publish_info(presence.local()));
    let second = timeout(Duration::from_secs(2), info_rx.recv()).await.unwrap();
    assert_eq!(second, Some(ClientMsg::ClientInfo(UserInfo::new("Grace", 42))));
}

#[tokio::test]
async fn test_roster_follows_join_and_leave() {
    let port = serve_once(|mut socket| async move {
        send_json(&mut socket, json!({"Identity": 1})).await;
        send_json(&mut socket, json!({"UserInfo": {"id": 1, "info": {"name": "me", "hue": 1}}})).await;
        send_json(&mut socket, json!({"UserInfo": {"id": 2, "info": {"name": "Grace", "hue": 200}}})).await;
        send_json(&mut socket, json!({"UserInfo": {"id": 3, "info": {"name": "Linus", "hue": 90}}})).await;
        send_json(&mut socket, json!({"UserCursor": {"id": 3, "data": {"cursors": [4], "selections": []}}})).await;
        send_json(&mut socket, json!({"UserInfo": {"id": 2, "info": null}})).await;
        // Keep the socket open until the client goes away.
        while socket.next().await.is_some() {}
    })
    .await;

    let mut connection = open(port);
    let mut presence = presence();
    pump(&mut connection, &mut presence, |_, p| {
        p.roster().len() == 1 && p.roster().contains_key(&3)
    })
    .await;

    assert_eq!(connection.state(), ConnectionState::Connected);
    assert_eq!(presence.roster()[&3].name, "Linus");
    assert!(!presence.roster().contains_key(&1));
}

#[tokio::test]
async fn test_history_gap_desynchronizes() {
    let port = serve_once(|mut socket| async move {
        send_json(&mut socket, json!({"Identity": 1})).await;
        send_json(&mut socket, json!({"History": {"start": 0, "operations": [{}, {}]}})).await;
        send_json(&mut socket, json!({"History": {"start": 7, "operations": [{}]}})).await;
        while socket.next().await.is_some() {}
    })
    .await;

    let mut connection = open(port);
    let mut presence = presence();
    pump(&mut connection, &mut presence, |c, _| c.state().is_terminal()).await;

    assert_eq!(connection.reconnect_deadline(), None);
    connection.dispose();
}

#[tokio::test]
async fn test_server_close_schedules_reconnect() {
    let port = serve_once(|mut socket| async move {
        send_json(&mut socket, json!({"Identity": 1})).await;
        let _ = socket.close(None).await;
    })
    .await;

    let mut connection = open(port);
    let mut presence = presence();
    pump(&mut connection, &mut presence, |c, _| {
        c.state() == ConnectionState::Connected
    })
    .await;
    pump(&mut connection, &mut presence, |c, _| {
        c.reconnect_deadline().is_some()
    })
    .await;

    assert_eq!(connection.state(), ConnectionState::Disconnected);
    assert_eq!(connection.failures(), 1);
}

#[tokio::test]
async fn test_unreachable_endpoint_reports_disconnected() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut connection = open(port);
    let mut presence = presence();
    pump(&mut connection, &mut presence, |c, _| {
        c.reconnect_deadline().is_some()
    })
    .await;

    assert_eq!(connection.state(), ConnectionState::Disconnected);
    assert!(connection.poll_reconnect(Instant::now() + Duration::from_secs(1)));
    assert_eq!(connection.generation(), 2);
}
