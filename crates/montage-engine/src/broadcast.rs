//! Pushing full-record snapshots to local observers and remote peers.

use std::sync::{Arc, Weak};

use montage_core::MontageTest;
use parking_lot::Mutex;

use crate::store::WorldId;

type Listener = Arc<dyn Fn(&WorldId, &MontageTest) + Send + Sync>;

/// A remote peer that receives every saved snapshot.
pub trait PeerLink: Send + Sync {
    /// Send a snapshot.
    fn publish(&self, world: &WorldId, test: &MontageTest);
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    peers: Vec<Arc<dyn PeerLink>>,
}

/// Fans snapshots out to subscribers. Clones share one registry.
#[derive(Clone, Default)]
pub struct Broadcaster {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("Broadcaster")
            .field("listeners", &registry.listeners.len())
            .field("peers", &registry.peers.len())
            .finish()
    }
}

impl Broadcaster {
    /// A broadcaster with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `listener` with every snapshot until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    #[must_use = "dropping the subscription unsubscribes at once"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&WorldId, &MontageTest) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push((id, Arc::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Register a remote peer.
    pub fn add_peer(&self, peer: Arc<dyn PeerLink>) {
        self.registry.lock().peers.push(peer);
    }

    /// Number of local listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }

    /// Deliver a snapshot to every listener and peer.
    ///
    /// The registry lock is released before any callback runs, so listeners
    /// may subscribe or unsubscribe from inside a callback.
    pub fn broadcast(&self, world: &WorldId, test: &MontageTest) {
        let (listeners, peers) = {
            let registry = self.registry.lock();
            let listeners: Vec<Listener> =
                registry.listeners.iter().map(|(_, l)| l.clone()).collect();
            (listeners, registry.peers.clone())
        };
        for listener in listeners {
            listener(world, test);
        }
        for peer in peers {
            peer.publish(world, test);
        }
    }
}

/// Handle returned by [`Broadcaster::subscribe`]. The listener stays
/// registered for as long as the handle lives.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Stop receiving snapshots.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_core::{MontageDifficulty, NewTest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> MontageTest {
        MontageTest::create(NewTest::new(MontageDifficulty::Easy))
    }

    #[test]
    fn listeners_receive_snapshots() {
        let broadcaster = Broadcaster::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = broadcaster.subscribe(move |world, test| {
            sink.lock().push((world.clone(), test.name.clone()));
        });

        broadcaster.broadcast(&"w".into(), &sample());
        assert_eq!(
            seen.lock().as_slice(),
            &[(WorldId::from("w"), "Montage Test".to_string())]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let broadcaster = Broadcaster::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let sub = broadcaster.subscribe(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        broadcaster.broadcast(&"w".into(), &sample());
        sub.unsubscribe();
        broadcaster.broadcast(&"w".into(), &sample());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(broadcaster.listener_count(), 0);
    }

    #[test]
    fn dropping_subscription_unregisters_listener() {
        let broadcaster = Broadcaster::new();
        let count = Arc::new(AtomicUsize::new(0));
        {
            let counter = count.clone();
            let _sub = broadcaster.subscribe(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            assert_eq!(broadcaster.listener_count(), 1);
        }
        assert_eq!(broadcaster.listener_count(), 0);
        broadcaster.broadcast(&"w".into(), &sample());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscription_outliving_broadcaster_drops_quietly() {
        let broadcaster = Broadcaster::new();
        let sub = broadcaster.subscribe(|_, _| {});
        drop(broadcaster);
        drop(sub);
    }

    struct CountingPeer(AtomicUsize);

    impl PeerLink for CountingPeer {
        fn publish(&self, _world: &WorldId, _test: &MontageTest) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn peers_receive_snapshots() {
        let broadcaster = Broadcaster::new();
        let peer = Arc::new(CountingPeer(AtomicUsize::new(0)));
        broadcaster.add_peer(peer.clone());
        broadcaster.clone().broadcast(&"w".into(), &sample());
        assert_eq!(peer.0.load(Ordering::SeqCst), 1);
    }
}
