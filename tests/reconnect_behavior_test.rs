//! Reconnection-notification tests: the supervisor must retry silently and
//! never spam duplicate status events.

use std::time::Duration;

use laser_panel::{LaserPanel, LinkEvent, LinkState, Settings};
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

fn test_settings(port: u16) -> Settings {
    let mut settings = Settings::default();
    settings.connection.host = "127.0.0.1".into();
    settings.connection.port = port;
    settings.connection.poll_interval = Duration::from_millis(25);
    settings.connection.connect_timeout = Duration::from_millis(500);
    settings
}

async fn next_event(events: &mut UnboundedReceiver<LinkEvent>) -> LinkEvent {
    timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for a link event")
        .expect("event channel closed")
}

/// A window of ~12 poll intervals in which no event may arrive.
async fn assert_silence(events: &mut UnboundedReceiver<LinkEvent>) {
    let extra = timeout(Duration::from_millis(300), events.recv()).await;
    assert!(
        extra.is_err(),
        "expected silent retries, got {:?}",
        extra.unwrap()
    );
}

#[tokio::test]
async fn unreachable_endpoint_emits_connecting_exactly_once() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let (panel, mut events) = LaserPanel::spawn(test_settings(port));

    assert_eq!(
        next_event(&mut events).await,
        LinkEvent::StatusChanged(LinkState::Connecting)
    );

    // Attempts keep failing every tick; none of them may produce an event.
    assert_silence(&mut events).await;

    // Once the controller appears the link comes up on its own.
    let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
    let (_server, _) = timeout(Duration::from_secs(5), listener.accept())
        .await
        .expect("no connect attempt after endpoint came up")
        .unwrap();
    assert_eq!(
        next_event(&mut events).await,
        LinkEvent::StatusChanged(LinkState::Connected)
    );

    panel.shutdown().await;
}

#[tokio::test]
async fn lost_link_emits_a_single_waiting_notification() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let (panel, mut events) = LaserPanel::spawn(test_settings(port));
    let (server, _) = listener.accept().await.unwrap();

    assert_eq!(
        next_event(&mut events).await,
        LinkEvent::StatusChanged(LinkState::Connecting)
    );
    assert_eq!(
        next_event(&mut events).await,
        LinkEvent::StatusChanged(LinkState::Connected)
    );

    // Take the whole endpoint down so reconnect attempts fail.
    drop(server);
    drop(listener);

    assert_eq!(
        next_event(&mut events).await,
        LinkEvent::StatusChanged(LinkState::Lost)
    );

    // Exactly one waiting notification for the whole outage...
    assert_eq!(
        next_event(&mut events).await,
        LinkEvent::StatusChanged(LinkState::Connecting)
    );
    // ...and nothing more while the attempts keep failing.
    assert_silence(&mut events).await;

    // Endpoint returns: next tick reconnects, single Connected event.
    let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
    let (_server, _) = timeout(Duration::from_secs(5), listener.accept())
        .await
        .expect("no reconnect after endpoint came back")
        .unwrap();
    assert_eq!(
        next_event(&mut events).await,
        LinkEvent::StatusChanged(LinkState::Connected)
    );

    panel.shutdown().await;
}

#[tokio::test]
async fn repeated_outages_each_report_lost() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let (panel, mut events) = LaserPanel::spawn(test_settings(port));

    assert_eq!(
        next_event(&mut events).await,
        LinkEvent::StatusChanged(LinkState::Connecting)
    );

    for _ in 0..2 {
        let (server, _) = timeout(Duration::from_secs(5), listener.accept())
            .await
            .expect("no connect attempt")
            .unwrap();
        assert_eq!(
            next_event(&mut events).await,
            LinkEvent::StatusChanged(LinkState::Connected)
        );

        drop(server);
        assert_eq!(
            next_event(&mut events).await,
            LinkEvent::StatusChanged(LinkState::Lost)
        );
    }

    panel.shutdown().await;
}
