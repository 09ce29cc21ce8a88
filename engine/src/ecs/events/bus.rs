//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Event bus implementation

use super::types::PartEvent;
use std::sync::{Arc, PoisonError, RwLock};

pub type EventHandler = Box<dyn Fn(&PartEvent) + Send + Sync>;

/// Event bus for publishing and subscribing to part events
///
/// Events are queued on publish and delivered in order by
/// [`EventBus::process_events`], once per tick.
pub struct EventBus {
    handlers: Arc<RwLock<Vec<EventHandler>>>,
    event_queue: Arc<RwLock<Vec<PartEvent>>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(Vec::new())),
            event_queue: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Subscribe to events with a handler function
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&PartEvent) + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers.push(Box::new(handler));
    }

    /// Publish an event to the queue
    pub fn publish(&self, event: PartEvent) {
        let mut queue = self.event_queue.write().unwrap_or_else(PoisonError::into_inner);
        queue.push(event);
    }

    /// Process all queued events
    pub fn process_events(&self) {
        let mut queue = self.event_queue.write().unwrap_or_else(PoisonError::into_inner);
        let events: Vec<_> = queue.drain(..).collect();
        drop(queue);

        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        for event in events {
            for handler in handlers.iter() {
                handler(&event);
            }
        }
    }

    /// Clear all queued events without processing
    pub fn clear(&self) {
        let mut queue = self.event_queue.write().unwrap_or_else(PoisonError::into_inner);
        queue.clear();
    }

    /// Get the number of queued events
    pub fn queue_len(&self) -> usize {
        let queue = self.event_queue.read().unwrap_or_else(PoisonError::into_inner);
        queue.len()
    }

    /// Copy of the queued events, oldest first
    pub fn pending(&self) -> Vec<PartEvent> {
        let queue = self.event_queue.read().unwrap_or_else(PoisonError::into_inner);
        queue.clone()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
            event_queue: Arc::clone(&self.event_queue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partledger_common::PartId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn withdrawn() -> PartEvent {
        PartEvent::PartWithdrawn { part: PartId::new() }
    }

    #[test]
    fn test_event_bus() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        bus.subscribe(move |_event| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(withdrawn());

        assert_eq!(bus.queue_len(), 1);

        bus.process_events();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(bus.queue_len(), 0);
    }

    #[test]
    fn test_handlers_see_publish_order() {
        let bus = EventBus::new();
        let seen = Arc::new(RwLock::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        bus.subscribe(move |event| sink.write().unwrap().push(event.clone()));
        bus.subscribe(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        let part = PartId::new();
        let published = vec![
            PartEvent::PartWithdrawn { part },
            PartEvent::PartDestroyed { part, destroyed: 1 },
        ];
        for event in published.clone() {
            bus.publish(event);
        }
        bus.process_events();

        assert_eq!(*seen.read().unwrap(), published);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clear() {
        let bus = EventBus::new();

        bus.publish(withdrawn());

        assert_eq!(bus.queue_len(), 1);
        bus.clear();
        assert_eq!(bus.queue_len(), 0);
    }

    #[test]
    fn test_clones_share_queue() {
        let bus = EventBus::new();
        let other = bus.clone();

        other.publish(withdrawn());
        assert_eq!(bus.pending().len(), 1);
    }
}
