//! The game session: one room, its gateway binding and its connections.
//!
//! Locking discipline: every handler takes the room lock once, mutates and
//! collects everything it needs (outcomes, broadcast targets, durable rows),
//! then releases the lock before any broadcast or persistence await. Nothing
//! awaits while holding the lock, so handlers serialize cleanly and cannot
//! deadlock against each other.
//!
//! Persistence is fire-and-forget: writes run on detached tasks and a
//! failure is logged as "persistence skipped", never surfaced to clients.
//! The only awaited gateway read is the rejoin lookup.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ContentStore, GameMode, MessagePusher, PersistedPlayer, PersistenceGateway,
    PusherChannel, Room, RoomRecordId,
};
use crate::infrastructure::dto::websocket::{ClientEvent, ServerEvent};

pub struct GameSession {
    pub(crate) room: Mutex<Room>,
    pub(crate) gateway: Arc<dyn PersistenceGateway>,
    pub(crate) pusher: Arc<dyn MessagePusher>,
    pub(crate) content: Arc<ContentStore>,
    /// Backend record this room is bound to; `None` means memory-only and
    /// rejoin is unavailable.
    pub(crate) binding: Option<RoomRecordId>,
}

impl GameSession {
    pub fn new(
        room: Room,
        gateway: Arc<dyn PersistenceGateway>,
        pusher: Arc<dyn MessagePusher>,
        content: Arc<ContentStore>,
        binding: Option<RoomRecordId>,
    ) -> Self {
        Self {
            room: Mutex::new(room),
            gateway,
            pusher,
            content,
            binding,
        }
    }

    /// A socket was accepted: register its outbound channel and push the
    /// current room occupancy so the client can decide to join or rejoin.
    pub async fn connection_opened(&self, id: ConnectionId, sender: PusherChannel) {
        self.pusher.register(id.clone(), sender).await;
        let phase = { self.room.lock().await.phase() };
        self.send(&id, &ServerEvent::State(phase.code())).await;
    }

    /// A socket closed (or errored): run the departure flow, then drop the
    /// outbound channel.
    pub async fn connection_closed(&self, id: &ConnectionId) {
        self.handle_disconnect(id).await;
        self.pusher.unregister(id).await;
    }

    /// Route one validated client event to its handler.
    pub async fn dispatch(&self, id: &ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::Name(username) => self.handle_join(id, &username).await,
            ClientEvent::Rejoin { username } => self.handle_rejoin(id, &username).await,
            ClientEvent::Ready { ready, mode } => self.handle_ready(id, ready, mode).await,
            ClientEvent::Unjail(option) => self.handle_unjail(id, option).await,
            ClientEvent::RollDice => self.handle_roll_dice(id).await,
            ClientEvent::ChorchRoll { is_chance, rolls } => {
                self.handle_chorch_roll(id, is_chance, rolls).await
            }
            ClientEvent::PlayerUpdate { player_id, p_json } => {
                self.handle_player_update(id, &player_id, &p_json).await
            }
            ClientEvent::FinishTurn(snapshot) => self.handle_finish_turn(id, &snapshot).await,
            ClientEvent::Message(text) => self.handle_message(id, text).await,
            ClientEvent::Pay { balance, from, to } => {
                self.handle_pay(id, balance, &from, &to).await
            }
            ClientEvent::Mouse { x, y } => self.handle_mouse(id, x, y).await,
            ClientEvent::History(entry) => self.handle_history(id, entry).await,
            ClientEvent::Trade => self.handle_trade(id).await,
            ClientEvent::CancelTrade => self.handle_cancel_trade(id).await,
            ClientEvent::SubmitTrade(proposal) => self.handle_submit_trade(id, &proposal).await,
            ClientEvent::TradeUpdate(proposal) => self.handle_trade_update(id, &proposal).await,
        }
    }

    /// A JSON view of the room for the debug endpoint.
    pub async fn snapshot_room(&self) -> serde_json::Value {
        let room = self.room.lock().await;
        serde_json::to_value(&*room).unwrap_or(serde_json::Value::Null)
    }

    // ── delivery helpers ────────────────────────────────────────────

    pub(crate) async fn send(&self, target: &ConnectionId, event: &ServerEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => {
                if let Err(e) = self.pusher.push_to(target, &payload).await {
                    tracing::debug!("delivery to '{}' failed: {}", target, e);
                }
            }
            Err(e) => tracing::error!("failed to serialize server event: {}", e),
        }
    }

    pub(crate) async fn broadcast(&self, targets: &[ConnectionId], event: &ServerEvent) {
        if targets.is_empty() {
            return;
        }
        match serde_json::to_string(event) {
            Ok(payload) => self.pusher.broadcast(targets, &payload).await,
            Err(e) => tracing::error!("failed to serialize server event: {}", e),
        }
    }

    // ── fire-and-forget persistence ─────────────────────────────────

    pub(crate) fn persist_player(&self, row: PersistedPlayer) {
        let Some(binding) = self.binding.clone() else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            if let Err(e) = gateway.upsert_player(&binding, &row).await {
                tracing::debug!("persistence skipped for player '{}': {}", row.username, e);
            }
        });
    }

    pub(crate) fn persist_all_players(&self, rows: Vec<PersistedPlayer>) {
        let Some(binding) = self.binding.clone() else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            for row in rows {
                if let Err(e) = gateway.upsert_player(&binding, &row).await {
                    tracing::debug!("persistence skipped for player '{}': {}", row.username, e);
                }
            }
        });
    }

    pub(crate) fn persist_room_update(
        &self,
        turn: Option<ConnectionId>,
        started: bool,
        mode: Option<GameMode>,
    ) {
        let Some(binding) = self.binding.clone() else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        let turn_id = turn.map(|id| id.as_str().to_string());
        tokio::spawn(async move {
            if let Err(e) = gateway.update_room(&binding, turn_id, started, mode).await {
                tracing::debug!("persistence skipped for room state: {}", e);
            }
        });
    }

    pub(crate) fn persist_disconnect(&self, connection_id: String) {
        let Some(binding) = self.binding.clone() else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            if let Err(e) = gateway.mark_disconnected(&binding, &connection_id).await {
                tracing::debug!("persistence skipped for disconnect '{}': {}", connection_id, e);
            }
        });
    }

    pub(crate) fn persist_rebind(&self, username: String, new_connection_id: String) {
        let Some(binding) = self.binding.clone() else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            if let Err(e) = gateway
                .rebind_connection_id(&binding, &username, &new_connection_id)
                .await
            {
                tracing::debug!("persistence skipped for rebind '{}': {}", username, e);
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::infrastructure::persistence::InMemoryGateway;
    use crate::infrastructure::pusher::websocket::WebSocketMessagePusher;

    /// A connected test client: its id plus the receiving end of its
    /// outbound channel.
    pub(crate) struct TestClient {
        pub id: ConnectionId,
        pub rx: mpsc::UnboundedReceiver<String>,
    }

    impl TestClient {
        /// Next queued payload, parsed. Panics when the queue is empty.
        pub fn recv_event(&mut self) -> serde_json::Value {
            let raw = self.rx.try_recv().expect("expected a queued event");
            serde_json::from_str(&raw).expect("server events are valid JSON")
        }

        pub fn drain(&mut self) {
            while self.rx.try_recv().is_ok() {}
        }
    }

    pub(crate) fn memory_session() -> GameSession {
        let content = Arc::new(ContentStore::bundled());
        let room = Room::new("TEST01", content.default_mode(), 6);
        GameSession::new(
            room,
            Arc::new(InMemoryGateway::new()),
            Arc::new(WebSocketMessagePusher::new()),
            content,
            None,
        )
    }

    pub(crate) async fn connect(session: &GameSession, raw_id: &str) -> TestClient {
        let id = ConnectionId::new(raw_id);
        let (tx, rx) = mpsc::unbounded_channel();
        session.connection_opened(id.clone(), tx).await;
        TestClient { id, rx }
    }

    #[tokio::test]
    async fn test_connection_opened_pushes_the_room_phase() {
        // given (precondition): a fresh joinable room
        let session = memory_session();

        // when (operation): a socket connects
        let mut client = connect(&session, "conn-a").await;

        // then (expected result): it is told the room is joinable
        let event = client.recv_event();
        assert_eq!(event["event"], "state");
        assert_eq!(event["data"], 0);
    }

    #[tokio::test]
    async fn test_dispatch_join_then_roster_is_visible() {
        let session = memory_session();
        let mut a = connect(&session, "conn-a").await;
        a.drain();

        session
            .dispatch(&a.id, ClientEvent::Name("alice".to_string()))
            .await;

        let event = a.recv_event();
        assert_eq!(event["event"], "initials");
        assert_eq!(event["data"]["turn_id"], "conn-a");
        assert_eq!(event["data"]["other_players"][0]["username"], "alice");
    }

    #[tokio::test]
    async fn test_snapshot_room_serializes() {
        let session = memory_session();
        let mut a = connect(&session, "conn-a").await;
        a.drain();
        session
            .dispatch(&a.id, ClientEvent::Name("alice".to_string()))
            .await;

        let snapshot = session.snapshot_room().await;

        assert_eq!(snapshot["code"], "TEST01");
        assert!(snapshot["members"]["conn-a"].is_object());
    }
}
