use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use assert_matches::assert_matches;

use typetype::relay::tcp::{self, TcpSink};
use typetype::relay::{ClientEvent, EventSink, Relay, ServerEvent, TestResults};

const WAIT: Duration = Duration::from_secs(5);

fn wait_for_members(relay: &Relay, count: usize) {
    let deadline = Instant::now() + WAIT;
    while relay.member_count() < count {
        assert!(Instant::now() < deadline, "members never joined");
        thread::sleep(Duration::from_millis(10));
    }
}

fn client(addr: std::net::SocketAddr) -> (TcpSink, mpsc::Receiver<ServerEvent>) {
    let (tx, rx) = mpsc::channel();
    let sink = TcpSink::connect(addr, move |event| tx.send(event).is_ok()).unwrap();
    (sink, rx)
}

#[test]
fn events_fan_out_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let relay = Relay::new();
    let server_relay = relay.clone();
    thread::spawn(move || tcp::serve(listener, server_relay));

    let (mut alice, alice_rx) = client(addr);
    let (mut bob, bob_rx) = client(addr);
    wait_for_members(&relay, 2);

    alice
        .emit(&ClientEvent::StartTest {
            timestamp: 1_700_000_000_000,
        })
        .unwrap();
    let started = bob_rx.recv_timeout(WAIT).unwrap();
    assert_matches!(&started, ServerEvent::UserStartedTest { user_id } if user_id.starts_with("user-"));

    bob.emit(&ClientEvent::TestComplete {
        results: TestResults {
            wpm: 42.0,
            accuracy: 97.5,
            time: 60,
            errors: 3,
        },
    })
    .unwrap();
    assert_matches!(
        alice_rx.recv_timeout(WAIT).unwrap(),
        ServerEvent::UserTestComplete { results, user_id } => {
            assert_eq!(results.errors, 3);
            assert_ne!(user_id.as_str(), started.user_id());
        }
    );

    // The sender never hears its own event.
    assert!(alice_rx.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn malformed_lines_are_skipped() {
    use std::io::Write;
    use std::net::TcpStream;

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let relay = Relay::new();
    let server_relay = relay.clone();
    thread::spawn(move || tcp::serve(listener, server_relay));

    let mut raw = TcpStream::connect(addr).unwrap();
    let (_listener_sink, rx) = client(addr);
    wait_for_members(&relay, 2);

    raw.write_all(b"not json\n{\"event\":\"unknown\"}\n").unwrap();
    raw.write_all(
        b"{\"event\":\"typingProgress\",\"data\":{\"progress\":50.0,\"wpm\":30.0,\"accuracy\":90.0}}\n",
    )
    .unwrap();

    assert_matches!(
        rx.recv_timeout(WAIT).unwrap(),
        ServerEvent::UserTypingProgress { progress, .. } if progress == 50.0
    );
}

#[test]
fn disconnect_leaves_relay() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let relay = Relay::new();
    let server_relay = relay.clone();
    thread::spawn(move || tcp::serve(listener, server_relay));

    let (sink, _rx) = client(addr);
    wait_for_members(&relay, 1);
    drop(sink);

    let deadline = Instant::now() + WAIT;
    while relay.member_count() > 0 {
        assert!(Instant::now() < deadline, "member never left");
        thread::sleep(Duration::from_millis(10));
    }
}
