//! Inbound event pipeline.
//!
//! Ties the components together the way a bridge uses them: every event
//! pushed by the service refreshes the read models first, then goes through
//! the ordering queue to the bridge's handler.

use crate::actor::Actor;
use crate::config::BridgeConfig;
use crate::error::ValidationError;
use crate::queue::EventQueue;
use crate::tracker::StateTracker;
use appbridge_proto::Event;
use std::future::Future;
use std::sync::Arc;
use tracing::trace;

/// Routes pushed events through the read models and the ordering queue.
pub struct EventPipeline<T, E> {
    bot: Arc<Actor>,
    tracker: Option<StateTracker>,
    queue: EventQueue<T, E>,
}

impl<T, E> std::fmt::Debug for EventPipeline<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPipeline")
            .field("bot", &self.bot.user_id())
            .field("tracker", &self.tracker)
            .field("queue", &self.queue)
            .finish()
    }
}

impl<T, E> EventPipeline<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Build a pipeline around the bridge's bot actor.
    ///
    /// The bot's membership store receives membership and power level
    /// updates from every event.
    pub fn new(bot: Arc<Actor>, queue: EventQueue<T, E>) -> Self {
        Self {
            bot,
            tracker: None,
            queue,
        }
    }

    /// Build a pipeline with a queue and tracker from configuration.
    pub fn from_config<F>(bot: Arc<Actor>, config: &BridgeConfig, handler: F) -> Result<Self, ValidationError>
    where
        F: Fn(Event, Result<T, E>) + Send + Sync + 'static,
    {
        let queue = EventQueue::from_config(&config.queue, handler)?;
        let tracker = StateTracker::from_config(Arc::clone(bot.client()), &config.state);
        Ok(Self::new(bot, queue).with_tracker(tracker))
    }

    /// Also keep `tracker` up to date.
    pub fn with_tracker(mut self, tracker: StateTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn bot(&self) -> &Arc<Actor> {
        &self.bot
    }

    pub fn tracker(&self) -> Option<&StateTracker> {
        self.tracker.as_ref()
    }

    pub fn queue(&self) -> &EventQueue<T, E> {
        &self.queue
    }

    /// Handle one pushed event.
    ///
    /// `data_ready` resolves to whatever the handler needs for this event;
    /// the handler sees its result in the order the queue's policy dictates.
    pub fn dispatch<F>(&self, event: Event, data_ready: F)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        trace!(room_id = %event.room_id, event_type = %event.event_type, "dispatching event");
        self.bot.on_event(&event);
        if let Some(tracker) = &self.tracker {
            tracker.on_event(&event);
        }
        self.queue.push(event, data_ready);
        self.queue.consume();
    }
}
