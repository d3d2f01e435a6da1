//! Line-delimited JSON transport for the relay.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::mpsc::Receiver;
use std::thread;

use tracing::{debug, info, warn};

use crate::relay::message::{ClientEvent, ServerEvent};
use crate::relay::{EventSink, Relay, RelayError};

/// Accept connections forever, joining each one to `relay`.
pub fn serve(listener: TcpListener, relay: Relay) -> io::Result<()> {
    info!(addr = %listener.local_addr()?, "relay_listening");
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let relay = relay.clone();
                thread::spawn(move || handle_connection(stream, relay));
            }
            Err(err) => warn!(%err, "relay_accept_failed"),
        }
    }
    Ok(())
}

fn handle_connection(stream: TcpStream, relay: Relay) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let (user_id, rx) = relay.join();
    debug!(user = %user_id, %peer, "relay_connection_open");

    let writer = match stream.try_clone() {
        Ok(w) => w,
        Err(err) => {
            warn!(user = %user_id, %err, "relay_clone_failed");
            relay.leave(&user_id);
            return;
        }
    };
    let writer_thread = thread::spawn(move || forward_events(writer, rx));

    for line in BufReader::new(stream).lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ClientEvent>(&line) {
            Ok(event) => {
                relay.publish(&user_id, event);
            }
            Err(err) => warn!(user = %user_id, %err, "relay_malformed_event"),
        }
    }

    // Leaving drops our inbox sender, which ends the writer loop.
    relay.leave(&user_id);
    let _ = writer_thread.join();
    debug!(user = %user_id, %peer, "relay_connection_closed");
}

fn forward_events(mut stream: TcpStream, rx: Receiver<ServerEvent>) {
    for event in rx {
        let Ok(mut line) = serde_json::to_string(&event) else {
            continue;
        };
        line.push('\n');
        if stream.write_all(line.as_bytes()).is_err() {
            break;
        }
    }
    let _ = stream.shutdown(Shutdown::Both);
}

/// Client side of the TCP relay.
pub struct TcpSink {
    stream: TcpStream,
}

impl TcpSink {
    /// Connect to a relay. Incoming events are handed to `on_event` from a
    /// background thread until it returns `false` or the connection drops.
    pub fn connect<A, F>(addr: A, mut on_event: F) -> Result<Self, RelayError>
    where
        A: ToSocketAddrs,
        F: FnMut(ServerEvent) -> bool + Send + 'static,
    {
        let stream = TcpStream::connect(addr)?;
        let reader = stream.try_clone()?;
        thread::spawn(move || {
            for line in BufReader::new(reader).lines() {
                let Ok(line) = line else { break };
                match serde_json::from_str::<ServerEvent>(&line) {
                    Ok(event) => {
                        if !on_event(event) {
                            break;
                        }
                    }
                    Err(err) => debug!(%err, "relay_unreadable_event"),
                }
            }
        });
        Ok(Self { stream })
    }
}

impl EventSink for TcpSink {
    fn emit(&mut self, event: &ClientEvent) -> Result<(), RelayError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        self.stream.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl Drop for TcpSink {
    fn drop(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
