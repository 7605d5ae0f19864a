//! Trade negotiation relay and settlement.
//!
//! The open/update/cancel phases are pure relays; the room only mutates on
//! submission. Every phase reaches the whole room, the sender included, so
//! clients drive their trade UI off the broadcast alone. Every trade message
//! is gated on membership and on the room mode allowing deals.

use crate::common::time::clock_time;
use crate::domain::{ConnectionId, TradeProposal};
use crate::infrastructure::dto::websocket::{EmptyPayload, ServerEvent, SubmitTradePayload};
use crate::usecase::session::GameSession;

impl GameSession {
    /// Broadcast targets for a trade message, or `None` when the sender is
    /// not a member or the selected mode forbids deals.
    async fn trade_targets(&self, id: &ConnectionId) -> Option<Vec<ConnectionId>> {
        let room = self.room.lock().await;
        if !room.contains(id) || !room.mode().allow_deals {
            return None;
        }
        Some(room.member_ids())
    }

    pub(crate) async fn handle_trade(&self, id: &ConnectionId) {
        let Some(targets) = self.trade_targets(id).await else {
            return;
        };
        self.broadcast(&targets, &ServerEvent::Trade(EmptyPayload {}))
            .await;
    }

    pub(crate) async fn handle_cancel_trade(&self, id: &ConnectionId) {
        let Some(targets) = self.trade_targets(id).await else {
            return;
        };
        self.broadcast(&targets, &ServerEvent::CancelTrade(EmptyPayload {}))
            .await;
    }

    pub(crate) async fn handle_trade_update(&self, id: &ConnectionId, proposal: &TradeProposal) {
        let Some(targets) = self.trade_targets(id).await else {
            return;
        };
        self.broadcast(&targets, &ServerEvent::TradeUpdate(proposal.clone()))
            .await;
    }

    /// Settle an accepted trade: swap the offered tokens and balances, then
    /// broadcast both updated snapshots to the whole room.
    pub(crate) async fn handle_submit_trade(&self, id: &ConnectionId, proposal: &TradeProposal) {
        let (outcome, targets, rows) = {
            let mut room = self.room.lock().await;
            if !room.contains(id) || !room.mode().allow_deals {
                return;
            }
            let Some(outcome) = room.execute_trade(proposal) else {
                return;
            };
            room.push_log(format!("{{{}}} {}", clock_time(), outcome.summary));
            let rows: Vec<_> = [&proposal.turn_player.id, &proposal.against_player.id]
                .into_iter()
                .filter_map(|member| room.persisted_member(member))
                .collect();
            (outcome, room.member_ids(), rows)
        };
        tracing::info!("{}", outcome.summary);

        self.broadcast(
            &targets,
            &ServerEvent::SubmitTrade(SubmitTradePayload {
                p_jsons: vec![outcome.initiator, outcome.respondent],
                action: outcome.summary,
            }),
        )
        .await;

        self.persist_all_players(rows);
    }
}
