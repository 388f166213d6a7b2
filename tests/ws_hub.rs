//! End-to-end tests over real TCP WebSocket connections.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_test::assert_ok;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use wshub_rs::{FanoutPredicate, HubConfig, HubServer, ServerConfig};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

struct TestServer {
    server: Arc<HubServer>,
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start(config: ServerConfig, hub_config: HubConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(HubServer::with_hub_config(config, hub_config));
        let (tx, rx) = oneshot::channel();

        let running = Arc::clone(&server);
        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            running.serve_until(listener, shutdown).await.unwrap();
        });

        Self {
            server,
            addr,
            shutdown: Some(tx),
        }
    }

    async fn connect(&self, query: &str) -> WsStream {
        let url = format!("ws://{}/echo{}", self.addr, query);
        let (ws, _) = assert_ok!(connect_async(url).await);
        ws
    }

    /// Wait until the hub has registered exactly `count` sessions
    async fn wait_for_members(&self, count: usize) {
        let registry = Arc::clone(self.server.hub().registry());
        tokio::time::timeout(WAIT, async move {
            while registry.len().await != count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("registry never reached expected size");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn next_data(ws: &mut WsStream) -> Message {
    loop {
        let msg = tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("timed out waiting for message")
            .expect("stream ended")
            .expect("read error");
        match msg {
            Message::Ping(_) | Message::Pong(_) => continue,
            other => return other,
        }
    }
}

async fn assert_silent(ws: &mut WsStream) {
    let result = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(result.is_err(), "expected no message, got {:?}", result);
}

#[tokio::test]
async fn consumers_receive_broadcast() {
    let server = TestServer::start(ServerConfig::default(), HubConfig::default()).await;

    let mut a = server.connect("?role=consumer").await;
    let mut b = server.connect("?role=consumer").await;
    let mut c = server.connect("").await;
    server.wait_for_members(3).await;

    a.send(Message::text("hello")).await.unwrap();

    assert_eq!(next_data(&mut b).await, Message::text("hello"));
    assert_silent(&mut a).await;
    assert_silent(&mut c).await;
}

#[tokio::test]
async fn producer_to_consumers_in_order() {
    let server = TestServer::start(ServerConfig::default(), HubConfig::default()).await;

    let mut producer = server.connect("?role=producer").await;
    let mut consumer = server.connect("?role=consumer").await;
    server.wait_for_members(2).await;

    for i in 0..25 {
        producer.send(Message::text(format!("tick {}", i))).await.unwrap();
    }
    producer
        .send(Message::binary(Bytes::from_static(&[0xde, 0xad])))
        .await
        .unwrap();

    for i in 0..25 {
        assert_eq!(next_data(&mut consumer).await, Message::text(format!("tick {}", i)));
    }
    assert_eq!(
        next_data(&mut consumer).await,
        Message::binary(Bytes::from_static(&[0xde, 0xad]))
    );
    assert_silent(&mut producer).await;
}

#[tokio::test]
async fn everyone_predicate_echoes_to_sender() {
    let hub_config = HubConfig::default().fanout(FanoutPredicate::everyone());
    let server = TestServer::start(ServerConfig::default(), hub_config).await;

    let mut client = server.connect("").await;
    server.wait_for_members(1).await;

    client.send(Message::text("ping?")).await.unwrap();

    assert_eq!(next_data(&mut client).await, Message::text("ping?"));
}

#[tokio::test]
async fn disconnect_removes_session() {
    let server = TestServer::start(ServerConfig::default(), HubConfig::default()).await;

    let mut leaving = server.connect("?role=consumer").await;
    let mut staying = server.connect("?role=consumer").await;
    let mut producer = server.connect("?role=producer").await;
    server.wait_for_members(3).await;

    leaving.close(None).await.unwrap();
    server.wait_for_members(2).await;

    producer.send(Message::text("after")).await.unwrap();
    assert_eq!(next_data(&mut staying).await, Message::text("after"));

    // The active count drops once the writer side has finished too
    let hub = Arc::clone(server.server.hub());
    tokio::time::timeout(WAIT, async move {
        while hub.stats().active_connections != 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("session never finished closing");
    assert_eq!(server.server.hub().stats().total_connections, 3);
}

#[tokio::test]
async fn abrupt_drop_tears_down_only_that_session() {
    let server = TestServer::start(ServerConfig::default(), HubConfig::default()).await;

    let vanishing = server.connect("?role=consumer").await;
    let mut staying = server.connect("?role=consumer").await;
    let mut producer = server.connect("?role=producer").await;
    server.wait_for_members(3).await;

    // No close frame: the socket just goes away
    drop(vanishing);
    server.wait_for_members(2).await;

    producer.send(Message::text("still here")).await.unwrap();
    assert_eq!(next_data(&mut staying).await, Message::text("still here"));
    assert_silent(&mut producer).await;
}

#[tokio::test]
async fn unknown_path_is_rejected() {
    let server = TestServer::start(ServerConfig::default(), HubConfig::default()).await;

    let url = format!("ws://{}/elsewhere", server.addr);
    assert!(connect_async(url).await.is_err());
    assert_eq!(server.server.hub().registry().len().await, 0);
}

#[tokio::test]
async fn connection_limit_enforced() {
    let config = ServerConfig::default().max_connections(1);
    let server = TestServer::start(config, HubConfig::default()).await;

    let _first = server.connect("?role=consumer").await;
    server.wait_for_members(1).await;

    let url = format!("ws://{}/echo", server.addr);
    assert!(connect_async(url).await.is_err());
    assert_eq!(server.server.hub().registry().len().await, 1);
}
