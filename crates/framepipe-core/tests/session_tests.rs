//! End-to-end session tests over a live Unix socket server.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;

use framepipe_core::testing::PipeTestHarness;
use framepipe_core::wire::{Frame, WireFormat};

/// A text file bigger than one 1024-byte transport chunk round-trips as a
/// single frame, uppercased, with its byte count preserved.
#[tokio::test]
async fn test_streaming_multi_chunk_roundtrip() {
    let harness = PipeTestHarness::new(WireFormat::Streaming).await;
    let mut framed = harness.connect().await;

    let request: String = "the quick brown fox! "
        .chars()
        .cycle()
        .take(2050)
        .collect();
    assert_eq!(request.len(), 2050);

    framed.send(Frame::new(request.clone())).await.unwrap();
    let response = framed.next().await.unwrap().unwrap();

    assert_eq!(response.len(), 2050);
    assert_eq!(response.text(), request.to_uppercase());

    drop(framed);
    harness.shutdown().await.unwrap();
}

/// Bounded-format exchange asserted on the raw wire bytes: "ping" goes out
/// as `[4]ping` and comes back as `[15]Processed: ping`.
#[tokio::test]
async fn test_bounded_wire_bytes() {
    let harness = PipeTestHarness::new(WireFormat::Bounded).await;
    let mut stream = harness.connect_raw().await;

    stream.write_all(&[4]).await.unwrap();
    stream.write_all(b"ping").await.unwrap();

    let mut response = [0u8; 16];
    stream.read_exact(&mut response).await.unwrap();

    assert_eq!(response[0], 15);
    assert_eq!(&response[1..], b"Processed: ping");

    drop(stream);
    harness.shutdown().await.unwrap();
}

/// Several files' worth of frames flow sequentially over one connection.
#[tokio::test]
async fn test_sequential_frames_on_one_connection() {
    let harness = PipeTestHarness::new(WireFormat::Streaming).await;
    let mut framed = harness.connect().await;

    for request in ["first file", "second file", "third file"] {
        framed.send(Frame::new(request)).await.unwrap();
        let response = framed.next().await.unwrap().unwrap();
        assert_eq!(response.text(), request.to_uppercase());
    }

    drop(framed);
    harness.shutdown().await.unwrap();
}

/// A client that connects and closes without sending anything is a normal
/// end of session; the server keeps serving.
#[tokio::test]
async fn test_empty_session_then_next_client() {
    let harness = PipeTestHarness::new(WireFormat::Streaming).await;

    let framed = harness.connect().await;
    drop(framed);

    let mut framed = harness.connect().await;
    framed.send(Frame::new("still alive")).await.unwrap();
    let response = framed.next().await.unwrap().unwrap();
    assert_eq!(response.text(), "STILL ALIVE");

    drop(framed);
    harness.shutdown().await.unwrap();
}

/// Connections are handled strictly one at a time: a second client's
/// traffic is serviced only after the first session fully closes.
#[tokio::test]
async fn test_serial_accept_ordering() {
    let harness = PipeTestHarness::new(WireFormat::Streaming).await;

    // First session: exchange one frame, then hold the connection open.
    let mut first = harness.connect().await;
    first.send(Frame::new("held")).await.unwrap();
    assert_eq!(first.next().await.unwrap().unwrap().text(), "HELD");

    // Second client connects and sends while the first session is live.
    let mut second = harness.connect().await;
    second.send(Frame::new("waiting")).await.unwrap();

    // No response while the first session is open.
    let premature = timeout(Duration::from_millis(200), second.next()).await;
    assert!(premature.is_err(), "second client answered mid-session");

    // Closing the first session unblocks the second.
    drop(first);
    let response = timeout(Duration::from_secs(2), second.next())
        .await
        .expect("second client starved after first session closed")
        .unwrap()
        .unwrap();
    assert_eq!(response.text(), "WAITING");

    drop(second);
    harness.shutdown().await.unwrap();
}

/// A configured transform override applies regardless of wire format.
#[tokio::test]
async fn test_transform_override() {
    use framepipe_core::config::PipeConfig;
    use framepipe_core::server::ResponseTransform;

    let mut config = PipeConfig::default();
    config.wire.format = WireFormat::Streaming;
    config.server.transform = Some(ResponseTransform::Tagged {
        prefix: "Seen: ".to_string(),
    });

    let harness = PipeTestHarness::with_config(config).await;
    let mut framed = harness.connect().await;

    framed.send(Frame::new("payload")).await.unwrap();
    let response = framed.next().await.unwrap().unwrap();
    assert_eq!(response.text(), "Seen: payload");

    drop(framed);
    harness.shutdown().await.unwrap();
}
