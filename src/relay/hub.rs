use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::relay::message::{ClientEvent, ServerEvent, UserId};
use crate::relay::{EventSink, RelayError};

struct Member {
    id: UserId,
    tx: Sender<ServerEvent>,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    members: Vec<Member>,
}

/// In-process fan-out: every published event reaches all members but its sender.
#[derive(Clone, Default)]
pub struct Relay {
    inner: Arc<Mutex<HubInner>>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new member and hand back its id and inbox.
    pub fn join(&self) -> (UserId, Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel();
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = format!("user-{}", inner.next_id);
        inner.members.push(Member { id: id.clone(), tx });
        info!(user = %id, members = inner.members.len(), "relay_join");
        (id, rx)
    }

    pub fn leave(&self, id: &str) {
        let mut inner = self.lock();
        inner.members.retain(|m| m.id != id);
        info!(user = %id, members = inner.members.len(), "relay_leave");
    }

    /// Fan `event` out to everyone except `from`. Members whose inbox is gone are dropped.
    pub fn publish(&self, from: &str, event: ClientEvent) -> usize {
        let name = event.name();
        let broadcast = event.into_broadcast(from);
        let mut inner = self.lock();
        let mut delivered = 0;
        inner.members.retain(|m| {
            if m.id == from {
                return true;
            }
            match m.tx.send(broadcast.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => {
                    debug!(user = %m.id, "relay_prune");
                    false
                }
            }
        });
        debug!(from, event = name, delivered, "relay_publish");
        delivered
    }

    pub fn member_count(&self) -> usize {
        self.lock().members.len()
    }

    pub fn connect(&self) -> RelayConnection {
        let (user_id, rx) = self.join();
        RelayConnection {
            relay: self.clone(),
            user_id,
            rx,
        }
    }
}

/// An in-process relay member. Leaves the relay when dropped.
pub struct RelayConnection {
    relay: Relay,
    user_id: UserId,
    rx: Receiver<ServerEvent>,
}

impl RelayConnection {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn drain(&self) -> Vec<ServerEvent> {
        self.rx.try_iter().collect()
    }
}

impl EventSink for RelayConnection {
    fn emit(&mut self, event: &ClientEvent) -> Result<(), RelayError> {
        self.relay.publish(&self.user_id, event.clone());
        Ok(())
    }
}

impl Drop for RelayConnection {
    fn drop(&mut self) {
        self.relay.leave(&self.user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(p: f64) -> ClientEvent {
        ClientEvent::TypingProgress {
            progress: p,
            wpm: 10.0,
            accuracy: 100.0,
        }
    }

    #[test]
    fn test_publish_skips_sender() {
        let relay = Relay::new();
        let mut alice = relay.connect();
        let bob = relay.connect();
        let carol = relay.connect();

        alice.emit(&ClientEvent::StartTest { timestamp: 5 }).unwrap();

        assert!(alice.drain().is_empty());
        let expected = ServerEvent::UserStartedTest {
            user_id: alice.user_id().to_string(),
        };
        assert_eq!(bob.drain(), vec![expected.clone()]);
        assert_eq!(carol.drain(), vec![expected]);
    }

    #[test]
    fn test_per_sender_order_preserved() {
        let relay = Relay::new();
        let mut alice = relay.connect();
        let bob = relay.connect();
        for p in [10.0, 20.0, 30.0] {
            alice.emit(&progress(p)).unwrap();
        }
        let seen: Vec<f64> = bob
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::UserTypingProgress { progress, .. } => Some(progress),
                _ => None,
            })
            .collect();
        assert_eq!(seen, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_dead_members_pruned() {
        let relay = Relay::new();
        let (alice, _alice_rx) = relay.join();
        let (_bob, bob_rx) = relay.join();
        drop(bob_rx);
        assert_eq!(relay.member_count(), 2);
        assert_eq!(relay.publish(&alice, progress(1.0)), 0);
        assert_eq!(relay.member_count(), 1);
    }

    #[test]
    fn test_drop_leaves_relay() {
        let relay = Relay::new();
        let conn = relay.connect();
        assert_eq!(relay.member_count(), 1);
        drop(conn);
        assert_eq!(relay.member_count(), 0);
    }

    #[test]
    fn test_user_ids_unique() {
        let relay = Relay::new();
        let a = relay.connect();
        let b = relay.connect();
        assert_ne!(a.user_id(), b.user_id());
    }
}
