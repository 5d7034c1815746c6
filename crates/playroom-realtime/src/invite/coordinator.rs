//! Invitation coordinator — the pending-invite table and its lifecycle.
//!
//! Every pending invitation lives in memory with an absolute expiry taken
//! from the server clock. A per-invite timer retires invitations that
//! receive no answer, so a challenged user going silent never leaves the
//! inviter's UI hanging. Directory writes mirror each transition for the
//! pull-based request list; they are best-effort and never gate delivery.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use playroom_directory::traits::UserDirectory;
use playroom_entity::game::{GameRequest, GameRequestStatus};

use crate::connection::registry::ConnectionRegistry;
use crate::message::types::ServerEvent;
use crate::metrics::RealtimeMetrics;

/// A pending invitation awaiting accept, decline, or expiry.
#[derive(Debug, Clone)]
pub struct PendingInvitation {
    pub game_id: Uuid,
    pub from: Uuid,
    pub to: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Result of an accept attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteOutcome {
    /// The invitation was pending and is now resolved.
    Resolved,
    /// No matching pending invitation exists (unknown, already answered,
    /// or expired).
    NotPending,
}

/// Owns the pending-invitation table.
pub struct InvitationCoordinator {
    pending: DashMap<Uuid, PendingInvitation>,
    directory: Arc<dyn UserDirectory>,
    connections: Arc<ConnectionRegistry>,
    metrics: Arc<RealtimeMetrics>,
    ttl: Duration,
}

impl InvitationCoordinator {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        connections: Arc<ConnectionRegistry>,
        metrics: Arc<RealtimeMetrics>,
        ttl: Duration,
    ) -> Self {
        Self {
            pending: DashMap::new(),
            directory,
            connections,
            metrics,
            ttl,
        }
    }

    /// Register a new invitation and deliver it to the challenged user.
    ///
    /// The expiry is computed from the server clock regardless of any
    /// client-proposed value, so countdowns do not drift with client
    /// clock skew. Re-inviting with a game ID that is already pending is
    /// rejected silently.
    pub async fn invite(self: Arc<Self>, game_id: Uuid, from: Uuid, to: Uuid) {
        if self.pending.contains_key(&game_id) {
            tracing::debug!(game_id = %game_id, "Duplicate invite for pending game, ignoring");
            return;
        }

        let sent_at = Utc::now();
        let expires_at = sent_at
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::seconds(30));

        self.pending.insert(
            game_id,
            PendingInvitation {
                game_id,
                from,
                to,
                expires_at,
            },
        );

        if let Err(e) = self
            .directory
            .append_game_request(
                to,
                GameRequest {
                    game_id,
                    from,
                    status: GameRequestStatus::Pending,
                    sent_at,
                    expires_at,
                },
            )
            .await
        {
            tracing::warn!(game_id = %game_id, error = %e, "Failed to persist game request");
        }

        self.connections.send(
            to,
            ServerEvent::ReceiveGameInvite {
                game_id,
                from,
                expires_at,
                status: GameRequestStatus::Pending,
            },
        );
        self.connections.send(to, ServerEvent::UpdateGameRequests);
        self.metrics.record_invite_sent();

        tracing::info!(game_id = %game_id, from = %from, to = %to, "Game invitation sent");

        let coordinator = Arc::clone(&self);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            coordinator.expire(game_id).await;
        });
    }

    /// Resolve an invitation as accepted.
    ///
    /// Only the invited pair may accept, and only while the invitation is
    /// still pending. On success the caller starts the game session.
    pub async fn accept(&self, game_id: Uuid, from: Uuid, to: Uuid) -> InviteOutcome {
        let removed = self
            .pending
            .remove_if(&game_id, |_, inv| inv.from == from && inv.to == to);

        let Some((_, invitation)) = removed else {
            tracing::debug!(game_id = %game_id, "Accept for non-pending invitation, ignoring");
            return InviteOutcome::NotPending;
        };

        self.mirror_status(invitation.to, invitation.from, GameRequestStatus::Accepted)
            .await;

        self.connections.send(
            invitation.from,
            ServerEvent::GameInviteAccepted {
                game_id,
                from: invitation.from,
                to: invitation.to,
            },
        );
        self.connections
            .send(invitation.from, ServerEvent::UpdateGameRequests);
        self.connections
            .send(invitation.to, ServerEvent::UpdateGameRequests);

        tracing::info!(game_id = %game_id, "Game invitation accepted");
        InviteOutcome::Resolved
    }

    /// Resolve an invitation as declined.
    ///
    /// The wire event carries no game ID, so the pending table is scanned
    /// for the (from, to) pair. The table only ever holds unanswered
    /// invitations, so the scan is small.
    pub async fn decline(&self, from: Uuid, to: Uuid) -> InviteOutcome {
        let game_id = self
            .pending
            .iter()
            .find(|entry| entry.from == from && entry.to == to)
            .map(|entry| entry.game_id);

        let Some(game_id) = game_id else {
            tracing::debug!(from = %from, to = %to, "Decline with no pending invitation, ignoring");
            return InviteOutcome::NotPending;
        };
        if self.pending.remove(&game_id).is_none() {
            return InviteOutcome::NotPending;
        }

        self.mirror_status(to, from, GameRequestStatus::Declined).await;

        self.connections
            .send(from, ServerEvent::GameInviteDeclined { from, to });
        self.connections.send(from, ServerEvent::UpdateGameRequests);
        self.connections.send(to, ServerEvent::UpdateGameRequests);

        tracing::info!(game_id = %game_id, "Game invitation declined");
        InviteOutcome::Resolved
    }

    /// Retire an invitation that received no answer.
    ///
    /// Called by the per-invite timer; an invitation already resolved by
    /// accept or decline is simply gone from the table and this is a no-op.
    pub async fn expire(&self, game_id: Uuid) {
        let Some((_, invitation)) = self.pending.remove(&game_id) else {
            return;
        };

        self.mirror_status(invitation.to, invitation.from, GameRequestStatus::Expired)
            .await;

        let event = ServerEvent::GameInviteExpired {
            game_id,
            from: invitation.from,
            to: invitation.to,
        };
        self.connections.send(invitation.from, event.clone());
        self.connections.send(invitation.to, event);
        self.connections
            .send(invitation.to, ServerEvent::UpdateGameRequests);

        tracing::info!(game_id = %game_id, "Game invitation expired");
    }

    /// Number of invitations currently pending.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    async fn mirror_status(&self, user_id: Uuid, from: Uuid, status: GameRequestStatus) {
        if let Err(e) = self
            .directory
            .update_game_request_status(user_id, from, status)
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to mirror game request status");
        }
    }
}
