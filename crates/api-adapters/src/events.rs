//! In-process fan-out of comment events to GraphQL subscribers.

use domains::{Comment, CommentEvent, EventPublisher};
use futures_util::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

const DEFAULT_CAPACITY: usize = 256;

/// `tokio::sync::broadcast` backed event bus. No replay: a subscriber only
/// sees events published after it subscribed.
#[derive(Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<CommentEvent>,
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CommentEvent> {
        self.sender.subscribe()
    }

    /// Comments carried by the events `select` accepts. Lagging subscribers
    /// skip what they missed.
    pub fn comments<F>(&self, select: F) -> impl Stream<Item = Comment> + Send + 'static
    where
        F: Fn(CommentEvent) -> Option<Comment> + Send + 'static,
    {
        BroadcastStream::new(self.subscribe()).filter_map(move |msg| {
            let picked = match msg {
                Ok(event) => select(event),
                Err(err) => {
                    warn!(error = %err, "subscriber lagged behind the event bus");
                    None
                }
            };
            futures_util::future::ready(picked)
        })
    }
}

impl EventPublisher for BroadcastEventBus {
    fn publish(&self, event: CommentEvent) {
        let name = event.name();
        let comment_id = event.comment().id;
        match self.sender.send(event) {
            Ok(receivers) => debug!(event = name, comment_id, receivers, "event published"),
            Err(_) => debug!(event = name, comment_id, "event dropped, no subscribers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn comment(id: i64) -> Comment {
        Comment { id, content: "Great post!".into(), created_at: Utc::now(), author_id: 1, post_id: 1, score: 0 }
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_fine() {
        BroadcastEventBus::default().publish(CommentEvent::Added(comment(1)));
    }

    #[tokio::test]
    async fn stream_yields_only_selected_events() {
        let bus = BroadcastEventBus::default();
        let stream = bus.comments(|event| match event {
            CommentEvent::VoteUpdated(c) if c.id == 2 => Some(c),
            _ => None,
        });
        tokio::pin!(stream);

        bus.publish(CommentEvent::VoteUpdated(comment(1)));
        bus.publish(CommentEvent::Added(comment(2)));
        bus.publish(CommentEvent::VoteUpdated(comment(2)));

        let next = stream.next().await.unwrap();
        assert_eq!(next.id, 2);
    }
}
