//! Tests for network::mock

mod common;

use std::time::Duration;

use chatline_core::network::*;
use common::fixtures;

fn config() -> TransportConfig {
    TransportConfig {
        server_url: "ws://mock/ws".to_string(),
        connect_timeout: Duration::from_secs(1),
    }
}

#[tokio::test]
async fn test_open_hands_peer_to_test() {
    let transport = MockTransport::new();
    let mut pipe = transport.open(&config()).await.unwrap();
    let mut peer = transport.accept().await.unwrap();

    assert_eq!(transport.open_count(), 1);
    assert_eq!(transport.last_config().unwrap().server_url, "ws://mock/ws");

    let text = encode_message(&ClientEnvelope::seen("m-1")).unwrap();
    pipe.sender.send(Frame::Text(text)).await.unwrap();
    assert_eq!(peer.recv_envelope().await.unwrap(), ClientEnvelope::seen("m-1"));

    assert!(peer.send(&fixtures::online("bob")));
    match pipe.receiver.receive().await.unwrap() {
        Frame::Text(text) => assert_eq!(decode_text(&text).unwrap(), fixtures::online("bob")),
        other => panic!("unexpected frame {:?}", other),
    }
}

#[tokio::test]
async fn test_injected_error_fails_next_open_only() {
    let transport = MockTransport::new();
    transport.inject_error(NetworkError::ConnectionFailed("refused".into()));

    let first = transport.open(&config()).await;
    assert!(matches!(first, Err(NetworkError::ConnectionFailed(_))));
    assert!(transport.try_accept().is_none());

    assert!(transport.open(&config()).await.is_ok());
    assert!(transport.try_accept().is_some());
    assert_eq!(transport.open_count(), 2);
}

#[tokio::test]
async fn test_dropping_peer_closes_client_receiver() {
    let transport = MockTransport::new();
    let mut pipe = transport.open(&config()).await.unwrap();
    drop(transport.accept().await.unwrap());

    assert_eq!(
        pipe.receiver.receive().await.unwrap_err(),
        NetworkError::ConnectionClosed
    );
}

#[tokio::test]
async fn test_peer_fail_surfaces_error() {
    let transport = MockTransport::new();
    let mut pipe = transport.open(&config()).await.unwrap();
    let peer = transport.accept().await.unwrap();

    peer.fail(NetworkError::ReceiveFailed("reset".into()));
    assert_eq!(
        pipe.receiver.receive().await.unwrap_err(),
        NetworkError::ReceiveFailed("reset".into())
    );
}

#[tokio::test]
async fn test_fail_sends() {
    let transport = MockTransport::new();
    let mut pipe = transport.open(&config()).await.unwrap();
    let peer = transport.accept().await.unwrap();

    peer.fail_sends();
    let result = pipe.sender.send(Frame::Text("{}".into())).await;
    assert!(matches!(result, Err(NetworkError::SendFailed(_))));
}

#[tokio::test]
async fn test_close_is_seen_by_peer() {
    let transport = MockTransport::new();
    let mut pipe = transport.open(&config()).await.unwrap();
    let mut peer = transport.accept().await.unwrap();

    pipe.sender.close().await.unwrap();
    pipe.sender.close().await.unwrap();
    peer.closed().await;

    assert_eq!(
        pipe.sender.send(Frame::Text("{}".into())).await.unwrap_err(),
        NetworkError::ConnectionClosed
    );
}

#[tokio::test]
async fn test_auto_pong() {
    let transport = MockTransport::new();
    transport.set_auto_pong(true);
    let mut pipe = transport.open(&config()).await.unwrap();
    let mut peer = transport.accept().await.unwrap();

    pipe.sender.send(Frame::Ping(vec![0, 1])).await.unwrap();
    assert_eq!(peer.recv_frame().await.unwrap(), Frame::Ping(vec![0, 1]));
    assert_eq!(pipe.receiver.receive().await.unwrap(), Frame::Pong(vec![0, 1]));
}

#[tokio::test]
async fn test_drain_skips_control_and_garbage() {
    let transport = MockTransport::new();
    let mut pipe = transport.open(&config()).await.unwrap();
    let mut peer = transport.accept().await.unwrap();

    pipe.sender.send(Frame::Ping(vec![1])).await.unwrap();
    pipe.sender.send(Frame::Text("garbage".into())).await.unwrap();
    let text = encode_message(&ClientEnvelope::typing("bob", true)).unwrap();
    pipe.sender.send(Frame::Binary(text.into_bytes())).await.unwrap();

    assert_eq!(
        peer.drain_envelopes(),
        vec![ClientEnvelope::typing("bob", true)]
    );
    assert!(peer.drain_envelopes().is_empty());
}
