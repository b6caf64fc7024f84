//! RPC adapter integration tests
//!
//! Runs a scripted JSON-line daemon on an ephemeral loopback port and drives
//! the probe and control adapters against it.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use hl_core::error::RpcError;
use hl_core::rpc::RpcRequest;
use hl_core::traits::{DaemonControl, StatusProbe};
use hl_core::HostAddress;
use hl_manager::{DaemonClient, RpcDaemonControl, RpcStatusProbe};

/// How the fake daemon answers a request
#[derive(Clone, Copy)]
enum Reply {
    /// Well-behaved daemon
    Normal,
    /// Answer every request with an error
    Error,
    /// Close the connection without answering
    Hangup,
    /// Never answer
    Silent,
}

/// Serve connections on 127.0.0.1 until the test ends
async fn spawn_daemon(reply: Reply) -> (HostAddress, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let (reader, mut writer) = stream.into_split();
                let mut lines = BufReader::new(reader).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let request: RpcRequest = serde_json::from_str(&line).unwrap();
                    let response = match (reply, request) {
                        (Reply::Hangup, _) => return,
                        (Reply::Silent, _) => {
                            tokio::time::sleep(Duration::from_secs(60)).await;
                            return;
                        }
                        (Reply::Error, _) => "{\"type\":\"error\",\"message\":\"busy\"}\n",
                        (Reply::Normal, RpcRequest::Ping) => "{\"type\":\"pong\"}\n",
                        (Reply::Normal, RpcRequest::Shutdown) => "{\"type\":\"ok\"}\n",
                    };
                    if writer.write_all(response.as_bytes()).await.is_err() {
                        return;
                    }
                }
            });
        }
    });

    (HostAddress::new("127.0.0.1", port).unwrap(), handle)
}

/// A loopback port with nothing listening
async fn closed_port() -> HostAddress {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    HostAddress::new("127.0.0.1", port).unwrap()
}

#[tokio::test]
async fn test_probe_running_daemon() {
    let (address, _daemon) = spawn_daemon(Reply::Normal).await;
    let probe = RpcStatusProbe::new(Duration::from_secs(2));

    assert!(probe.ping(&address).await);
}

#[tokio::test]
async fn test_probe_localhost_name_dials_loopback() {
    let (address, _daemon) = spawn_daemon(Reply::Normal).await;
    let by_name = HostAddress::localhost(address.port());
    let probe = RpcStatusProbe::new(Duration::from_secs(2));

    assert!(probe.ping(&by_name).await);
}

#[tokio::test]
async fn test_probe_nothing_listening() {
    let address = closed_port().await;
    let probe = RpcStatusProbe::new(Duration::from_secs(2));

    assert!(!probe.ping(&address).await);
}

#[tokio::test]
async fn test_probe_error_reply_is_offline() {
    let (address, _daemon) = spawn_daemon(Reply::Error).await;
    let probe = RpcStatusProbe::new(Duration::from_secs(2));

    assert!(!probe.ping(&address).await);
}

#[tokio::test]
async fn test_probe_silent_daemon_times_out() {
    let (address, _daemon) = spawn_daemon(Reply::Silent).await;
    let probe = RpcStatusProbe::new(Duration::from_millis(100));

    assert!(!probe.ping(&address).await);
}

#[tokio::test]
async fn test_client_reuses_connection() {
    let (address, _daemon) = spawn_daemon(Reply::Normal).await;
    let mut client = DaemonClient::new(address).with_timeout(Duration::from_secs(2));

    assert!(client.ping().await.unwrap());
    assert!(client.ping().await.unwrap());
}

#[tokio::test]
async fn test_client_timeout_error() {
    let (address, _daemon) = spawn_daemon(Reply::Silent).await;
    let mut client = DaemonClient::new(address).with_timeout(Duration::from_millis(100));

    let result = client.ping().await;

    assert!(matches!(result, Err(RpcError::Timeout(_))));
}

#[tokio::test]
async fn test_shutdown_acknowledged() {
    let (address, _daemon) = spawn_daemon(Reply::Normal).await;
    let control = RpcDaemonControl::new(Duration::from_secs(2));

    control.shutdown(&address).await.unwrap();
}

#[tokio::test]
async fn test_shutdown_hangup_counts_as_success() {
    let (address, _daemon) = spawn_daemon(Reply::Hangup).await;
    let control = RpcDaemonControl::new(Duration::from_secs(2));

    control.shutdown(&address).await.unwrap();
}

#[tokio::test]
async fn test_shutdown_error_reply() {
    let (address, _daemon) = spawn_daemon(Reply::Error).await;
    let control = RpcDaemonControl::new(Duration::from_secs(2));

    let result = control.shutdown(&address).await;

    match result {
        Err(RpcError::Remote(message)) => assert_eq!(message, "busy"),
        other => panic!("Expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_shutdown_nothing_listening() {
    let address = closed_port().await;
    let control = RpcDaemonControl::new(Duration::from_secs(2));

    let result = control.shutdown(&address).await;

    assert!(matches!(result, Err(RpcError::Io(_))));
}
