//! Scene change notifications.
//!
//! Consumers either register a callback with [`Observers::subscribe`] and
//! remove it with [`Observers::unsubscribe`], or take a [`flume::Receiver`]
//! from [`Observers::channel`] and drain it on their own schedule. Dropping
//! the receiver ends that subscription.

use slotmap::SlotMap;

use crate::scene::{CameraKey, LightKey, ShapeKey, SubscriptionId};

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    ShapeAdded(ShapeKey),
    ShapeRemoved(ShapeKey),
    /// Elements, colours, material or shader variables of a shape changed.
    GeometryChanged(ShapeKey),
    /// A shape's transform (or an animation overlay on it) changed.
    TransformChanged(ShapeKey),
    CameraChanged(CameraKey),
    LightChanged(LightKey),
    TextureLoaded(String),
    TextureFailed { url: String, message: String },
}

type Callback = Box<dyn FnMut(&SceneEvent)>;

#[derive(Default)]
pub struct Observers {
    callbacks: SlotMap<SubscriptionId, Callback>,
    senders: Vec<flume::Sender<SceneEvent>>,
}

impl Observers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&SceneEvent) + 'static) -> SubscriptionId {
        self.callbacks.insert(Box::new(callback))
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.callbacks.remove(id).is_some()
    }

    /// An unbounded event stream.
    pub fn channel(&mut self) -> flume::Receiver<SceneEvent> {
        let (tx, rx) = flume::unbounded();
        self.senders.push(tx);
        rx
    }

    pub fn emit(&mut self, event: &SceneEvent) {
        log::trace!("scene event {event:?}");
        for callback in self.callbacks.values_mut() {
            callback(event);
        }
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len() + self.senders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.callbacks.clear();
        self.senders.clear();
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("callbacks", &self.callbacks.len())
            .field("channels", &self.senders.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut observers = Observers::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = observers.subscribe(move |_| counter.set(counter.get() + 1));
        observers.emit(&SceneEvent::TextureLoaded("a.png".into()));
        assert!(observers.unsubscribe(id));
        observers.emit(&SceneEvent::TextureLoaded("a.png".into()));
        assert_eq!(hits.get(), 1);
        assert!(!observers.unsubscribe(id));
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let mut observers = Observers::new();
        let rx = observers.channel();
        drop(observers.channel());
        observers.emit(&SceneEvent::TextureLoaded("b.png".into()));
        assert_eq!(rx.try_recv().ok(), Some(SceneEvent::TextureLoaded("b.png".into())));
        assert_eq!(observers.len(), 1);
    }
}
