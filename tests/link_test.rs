//! Tests for the TCP peer link on the loopback interface.

use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use twist_tac_toe::net::{Backoff, LinkEvent, LinkEvents, LinkSettings, PeerLink};
use twist_tac_toe::{ConnectionStatus, PeerMessage, Transport};

const WAIT: Duration = Duration::from_secs(5);
const HELLO_LIMIT: Duration = Duration::from_millis(300);

fn quick_settings() -> LinkSettings {
    LinkSettings::new(
        Duration::from_secs(2),
        Backoff::new(Duration::from_millis(20), 2),
    )
}

async fn next(events: &mut LinkEvents) -> LinkEvent {
    timeout(WAIT, events.recv())
        .await
        .expect("event in time")
        .expect("link still running")
}

async fn next_status(events: &mut LinkEvents) -> ConnectionStatus {
    loop {
        if let LinkEvent::Status(status) = next(events).await {
            return status;
        }
    }
}

async fn next_message(events: &mut LinkEvents) -> PeerMessage {
    loop {
        if let LinkEvent::Message(message) = next(events).await {
            return message;
        }
    }
}

#[tokio::test]
async fn test_guest_joins_and_messages_flow_both_ways() {
    let host = PeerLink::host("127.0.0.1:0", "K7PQX".to_string(), HELLO_LIMIT)
        .await
        .expect("bind");
    let addr = host.local_addr().to_string();
    let (mut host_tx, mut host_events) = host.split();
    assert_eq!(next_status(&mut host_events).await, ConnectionStatus::Waiting);

    // Codes are matched case-insensitively.
    let guest = PeerLink::join(addr, "k7pqx".to_string(), quick_settings())
        .await
        .expect("join");
    let (mut guest_tx, mut guest_events) = guest.split();
    assert_eq!(
        next_status(&mut host_events).await,
        ConnectionStatus::Connected
    );
    assert_eq!(
        next_status(&mut guest_events).await,
        ConnectionStatus::Connected
    );

    guest_tx.send(&PeerMessage::RequestState).expect("send");
    assert_eq!(
        next_message(&mut host_events).await,
        PeerMessage::RequestState
    );

    let count = PeerMessage::WinCount {
        host_wins: 2,
        guest_wins: 1,
    };
    host_tx.send(&PeerMessage::SquareClick { index: 3 }).expect("send");
    host_tx.send(&count).expect("send");
    assert_eq!(
        next_message(&mut guest_events).await,
        PeerMessage::SquareClick { index: 3 }
    );
    assert_eq!(next_message(&mut guest_events).await, count);
}

#[tokio::test]
async fn test_wrong_room_code_is_refused() {
    let host = PeerLink::host("127.0.0.1:0", "K7PQX".to_string(), HELLO_LIMIT)
        .await
        .expect("bind");
    let addr = host.local_addr().to_string();

    let joined = PeerLink::join(addr, "ZZZZZ".to_string(), quick_settings()).await;
    assert!(joined.is_err());
}

#[tokio::test]
async fn test_unreachable_host_fails_to_join() {
    let host = PeerLink::host("127.0.0.1:0", "K7PQX".to_string(), HELLO_LIMIT)
        .await
        .expect("bind");
    let addr = host.local_addr().to_string();
    drop(host);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let joined = PeerLink::join(addr, "K7PQX".to_string(), quick_settings()).await;
    assert!(joined.is_err());
}

#[tokio::test]
async fn test_guest_retries_then_gives_up_when_host_leaves() {
    let host = PeerLink::host("127.0.0.1:0", "K7PQX".to_string(), HELLO_LIMIT)
        .await
        .expect("bind");
    let addr = host.local_addr().to_string();
    let guest = PeerLink::join(addr, "K7PQX".to_string(), quick_settings())
        .await
        .expect("join");
    let (_guest_tx, mut guest_events) = guest.split();
    assert_eq!(
        next_status(&mut guest_events).await,
        ConnectionStatus::Connected
    );

    drop(host);

    assert_eq!(
        next_status(&mut guest_events).await,
        ConnectionStatus::Disconnected
    );
    assert_eq!(
        next_status(&mut guest_events).await,
        ConnectionStatus::Reconnecting { attempt: 1 }
    );
    assert_eq!(
        next_status(&mut guest_events).await,
        ConnectionStatus::Reconnecting { attempt: 2 }
    );
    assert!(matches!(
        next_status(&mut guest_events).await,
        ConnectionStatus::Failed { .. }
    ));
}

#[tokio::test]
async fn test_silent_connection_does_not_block_the_room() {
    let host = PeerLink::host("127.0.0.1:0", "K7PQX".to_string(), HELLO_LIMIT)
        .await
        .expect("bind");
    let addr = host.local_addr().to_string();
    let (_host_tx, mut host_events) = host.split();
    assert_eq!(next_status(&mut host_events).await, ConnectionStatus::Waiting);

    let _silent = TcpStream::connect(&addr).await.expect("connect");
    tokio::time::sleep(Duration::from_millis(50)).await;

    let guest = PeerLink::join(addr, "K7PQX".to_string(), quick_settings())
        .await
        .expect("join after the silent connection is dropped");
    let (_guest_tx, mut guest_events) = guest.split();
    assert_eq!(
        next_status(&mut guest_events).await,
        ConnectionStatus::Connected
    );
    assert_eq!(
        next_status(&mut host_events).await,
        ConnectionStatus::Waiting
    );
    assert_eq!(
        next_status(&mut host_events).await,
        ConnectionStatus::Connected
    );
}
