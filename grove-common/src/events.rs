//! Event types for the Grove event system
//!
//! Provides the shared event enum and the broadcast EventBus used for
//! SSE streaming and cross-component notification inside the portal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Grove event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GroveEvent {
    /// A new project was created
    ProjectCreated {
        project_id: Uuid,
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// An onboarding asset was minted for a project
    AssetMinted {
        project_id: Uuid,
        /// Asset kind ("idea" or "vision")
        kind: String,
        /// Transaction identifier returned by the minting service
        tx_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A project linked its Discord community
    CommunityLinked {
        project_id: Uuid,
        guild_id: String,
        guild_name: String,
        timestamp: DateTime<Utc>,
    },

    /// A community activity was counted toward progression
    ActivityCounted {
        project_id: Uuid,
        activity_id: String,
        /// Classification category ("paper", "ordinary", "low_value")
        category: String,
        messages_count: u64,
        papers_shared: u64,
        timestamp: DateTime<Utc>,
    },

    /// A shared research paper was detected
    PaperShared {
        project_id: Uuid,
        activity_id: String,
        confidence: u8,
        papers_shared: u64,
        timestamp: DateTime<Utc>,
    },

    /// Live member count was refreshed from the platform
    MemberCountRefreshed {
        project_id: Uuid,
        member_count: u64,
        timestamp: DateTime<Utc>,
    },

    /// A project advanced to a new level
    LevelAdvanced {
        project_id: Uuid,
        from_level: i64,
        to_level: i64,
        timestamp: DateTime<Utc>,
    },

    /// A chat exchange was relayed through the LLM
    ChatExchange {
        project_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl GroveEvent {
    /// Event type name used as the SSE event name
    pub fn event_type(&self) -> &str {
        match self {
            GroveEvent::ProjectCreated { .. } => "ProjectCreated",
            GroveEvent::AssetMinted { .. } => "AssetMinted",
            GroveEvent::CommunityLinked { .. } => "CommunityLinked",
            GroveEvent::ActivityCounted { .. } => "ActivityCounted",
            GroveEvent::PaperShared { .. } => "PaperShared",
            GroveEvent::MemberCountRefreshed { .. } => "MemberCountRefreshed",
            GroveEvent::LevelAdvanced { .. } => "LevelAdvanced",
            GroveEvent::ChatExchange { .. } => "ChatExchange",
        }
    }
}

/// Broadcast event bus shared across portal components
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GroveEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<GroveEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    pub fn emit(
        &self,
        event: GroveEvent,
    ) -> Result<usize, broadcast::error::SendError<GroveEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Used for non-critical events where it's acceptable if no component
    /// is currently listening (SSE feed updates).
    pub fn emit_lossy(&self, event: GroveEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_names_are_stable() {
        let event = GroveEvent::LevelAdvanced {
            project_id: Uuid::new_v4(),
            from_level: 2,
            to_level: 3,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type(), "LevelAdvanced");
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = GroveEvent::MemberCountRefreshed {
            project_id: Uuid::new_v4(),
            member_count: 42,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"MemberCountRefreshed""#));
        assert!(json.contains(r#""member_count":42"#));
    }

    #[tokio::test]
    async fn emit_reaches_subscriber() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit_lossy(GroveEvent::ProjectCreated {
            project_id: Uuid::new_v4(),
            name: "test".to_string(),
            timestamp: Utc::now(),
        });

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type(), "ProjectCreated");
    }

    #[test]
    fn emit_lossy_does_not_panic_without_subscribers() {
        let bus = EventBus::new(2);
        for _ in 0..10 {
            bus.emit_lossy(GroveEvent::ChatExchange {
                project_id: Uuid::new_v4(),
                timestamp: Utc::now(),
            });
        }
    }
}
