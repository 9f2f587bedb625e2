//! End-to-end tests: real TCP connections against a running server.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use chatregd::config::ServerConfig;
use chatregd::registry::spawn_registry;
use chatregd::server::ChatServer;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn start_server(max_clients: usize, max_name_len: usize) -> (SocketAddr, CancellationToken) {
    let config = ServerConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        max_clients,
        max_name_len,
    };
    let registry = spawn_registry();
    let cancel_token = CancellationToken::new();
    let server = ChatServer::bind(&config, registry, cancel_token.clone())
        .await
        .expect("bind on loopback");
    let addr = server.local_addr().expect("bound address");

    tokio::spawn(async move { server.run().await });

    (addr, cancel_token)
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Client {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (read_half, write_half) = stream.into_split();
        Client {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.expect("send");
        self.writer.write_all(b"\n").await.expect("send");
    }

    async fn recv(&mut self) -> String {
        let mut line = String::new();
        let n = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("reply within timeout")
            .expect("read");
        assert!(n > 0, "unexpected end of stream");
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        line
    }

    /// Returns `None` if no line arrives within `wait`.
    async fn try_recv(&mut self, wait: Duration) -> Option<String> {
        let mut line = String::new();
        match timeout(wait, self.reader.read_line(&mut line)).await {
            Ok(Ok(n)) if n > 0 => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
            _ => None,
        }
    }

    async fn recv_eof(&mut self) {
        let mut line = String::new();
        let n = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("eof within timeout")
            .expect("read");
        assert_eq!(n, 0, "expected end of stream, got {line:?}");
    }
}

#[tokio::test]
async fn test_happy_path_over_tcp() {
    let (addr, _cancel) = start_server(8, 16).await;
    let mut client = Client::connect(addr).await;

    client.send("NEW alice").await;
    assert_eq!(client.recv().await, "OK");

    client.send("INFO").await;
    assert_eq!(client.recv().await, "LIST 1 127.0.0.1 alice");

    // BYE is acknowledged before the connection closes
    client.send("BYE").await;
    assert_eq!(client.recv().await, "BYE");
    client.recv_eof().await;
}

#[tokio::test]
async fn test_validation_errors_are_not_fatal() {
    let (addr, _cancel) = start_server(8, 5).await;
    let mut client = Client::connect(addr).await;

    client.send("NEW").await;
    assert_eq!(client.recv().await, "ERROR No username given");

    client.send("NEW bob!").await;
    assert_eq!(
        client.recv().await,
        "ERROR Whitespace and special characters are prohibited"
    );

    client.send("NEW toolong").await;
    assert_eq!(client.recv().await, "ERROR Name too long - maximum allowed: 5");

    // All three rejections left the session serving commands
    client.send("INFO").await;
    assert_eq!(client.recv().await, "LIST 0");

    client.send("NEW bob").await;
    assert_eq!(client.recv().await, "OK");
}

#[tokio::test]
async fn test_unknown_command_closes_and_deregisters() {
    let (addr, _cancel) = start_server(8, 16).await;

    let mut client = Client::connect(addr).await;
    client.send("NEW alice").await;
    assert_eq!(client.recv().await, "OK");

    client.send("FOO").await;
    assert_eq!(client.recv().await, "ERROR unknown command FOO");
    client.recv_eof().await;

    // The entry is removed during teardown; poll a fresh connection
    // until the removal is visible.
    let mut observer = Client::connect(addr).await;
    let mut listing = String::new();
    for _ in 0..50 {
        observer.send("INFO").await;
        listing = observer.recv().await;
        if listing == "LIST 0" {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(listing, "LIST 0");
}

#[tokio::test]
async fn test_bye_removal_visible_to_other_connections() {
    let (addr, _cancel) = start_server(8, 16).await;

    let mut alice = Client::connect(addr).await;
    alice.send("NEW alice").await;
    assert_eq!(alice.recv().await, "OK");

    let mut observer = Client::connect(addr).await;
    observer.send("INFO").await;
    assert_eq!(observer.recv().await, "LIST 1 127.0.0.1 alice");

    // Logout happens before the BYE acknowledgement, so once the
    // reply has arrived no other connection can still see the entry
    alice.send("BYE").await;
    assert_eq!(alice.recv().await, "BYE");

    observer.send("INFO").await;
    assert_eq!(observer.recv().await, "LIST 0");
}

#[tokio::test]
async fn test_shared_identity_overwrites() {
    let (addr, _cancel) = start_server(8, 16).await;

    // Both connections come from 127.0.0.1 and share one identity,
    // like clients behind a proxy
    let mut first = Client::connect(addr).await;
    first.send("NEW alice").await;
    assert_eq!(first.recv().await, "OK");

    let mut second = Client::connect(addr).await;
    second.send("NEW bob").await;
    assert_eq!(second.recv().await, "OK");

    first.send("INFO").await;
    assert_eq!(first.recv().await, "LIST 1 127.0.0.1 bob");
}

#[tokio::test]
async fn test_saturated_pool_defers_session_start() {
    let (addr, _cancel) = start_server(1, 16).await;

    // First client occupies the only worker
    let mut first = Client::connect(addr).await;
    first.send("NEW alice").await;
    assert_eq!(first.recv().await, "OK");

    // Second client is accepted but its session has no worker yet:
    // the INFO sits unanswered
    let mut second = Client::connect(addr).await;
    second.send("INFO").await;
    assert_eq!(second.try_recv(Duration::from_millis(300)).await, None);

    // Releasing the first worker lets the queued session run
    first.send("BYE").await;
    assert_eq!(first.recv().await, "BYE");

    assert_eq!(second.recv().await, "LIST 0");
}

#[tokio::test]
async fn test_abrupt_disconnect_cleans_up() {
    let (addr, _cancel) = start_server(8, 16).await;

    let mut client = Client::connect(addr).await;
    client.send("NEW alice").await;
    assert_eq!(client.recv().await, "OK");

    // Drop the socket without BYE
    drop(client);

    let mut observer = Client::connect(addr).await;
    let mut listing = String::new();
    for _ in 0..50 {
        observer.send("INFO").await;
        listing = observer.recv().await;
        if listing == "LIST 0" {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(listing, "LIST 0");
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let (addr, cancel) = start_server(8, 16).await;

    // Prove the server was accepting, then cancel it
    let mut client = Client::connect(addr).await;
    client.send("INFO").await;
    assert_eq!(client.recv().await, "LIST 0");

    cancel.cancel();
    sleep(Duration::from_millis(50)).await;

    // New connections are refused or go unanswered once the accept
    // loop has stopped
    match TcpStream::connect(addr).await {
        Err(_) => {}
        Ok(stream) => {
            let (read_half, mut write_half) = stream.into_split();
            let _ = write_half.write_all(b"INFO\n").await;
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();
            let got_reply = matches!(
                timeout(Duration::from_millis(300), reader.read_line(&mut line)).await,
                Ok(Ok(n)) if n > 0
            );
            assert!(!got_reply, "server replied after shutdown: {line:?}");
        }
    }
}
