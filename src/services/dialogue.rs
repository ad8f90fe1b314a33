use std::sync::Arc;
use std::time::Duration;

use crate::errors::StoreError;
use crate::models::{Inbound, Intent, LeadRecord, Reply, Session, SessionKey};
use crate::services::booking::{self, StepOutcome};
use crate::services::intent::classify;
use crate::services::knowledge::KnowledgeResponder;
use crate::services::normalize::now_string;
use crate::services::sessions::SessionStore;
use crate::services::storage::LeadStore;

/// Routes each message to the booking flow or the knowledge responder.
///
/// Priority: a booking in progress, then fresh booking intent, then consultation.
pub struct DialogueRouter {
    sessions: Arc<SessionStore>,
    knowledge: KnowledgeResponder,
    store: Arc<dyn LeadStore>,
    store_timeout: Duration,
}

impl DialogueRouter {
    pub fn new(
        sessions: Arc<SessionStore>,
        knowledge: KnowledgeResponder,
        store: Arc<dyn LeadStore>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            sessions,
            knowledge,
            store,
            store_timeout,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub async fn handle(&self, msg: &Inbound) -> Reply {
        let handle = self.sessions.handle(&msg.key);
        let mut session = handle.lock().await;
        self.refresh(&msg.key, &mut session);

        let text = msg.text.trim();
        let intent = classify(text);
        tracing::info!(
            session = %msg.key,
            step = session.step.as_str(),
            intent = ?intent,
            "processing message"
        );

        if !session.is_idle() {
            if intent == Intent::Cancel {
                booking::cancel(&mut session);
                return Reply::text(booking::CANCELLED);
            }
            match booking::advance(&mut session, text) {
                StepOutcome::Prompt(reply) => return reply,
                StepOutcome::Completed(record) => return self.finalize(&msg.key, record).await,
                StepOutcome::NotInProgress => {}
            }
        }

        match intent {
            Intent::Book => booking::begin(
                &mut session,
                msg.key.source,
                msg.telegram_username.as_deref(),
            ),
            Intent::Cancel => Reply::text(booking::NOTHING_TO_CANCEL),
            // Only this key waits on the answer; other sessions are not blocked.
            Intent::GeneralQuestion => Reply::text(self.knowledge.consult(text).await),
        }
    }

    /// Explicit entry point: resets the session and starts a booking right away.
    pub async fn start(&self, msg: &Inbound) -> Reply {
        let handle = self.sessions.handle(&msg.key);
        let mut session = handle.lock().await;
        self.refresh(&msg.key, &mut session);

        if booking::cancel(&mut session) {
            tracing::info!(session = %msg.key, "booking restarted");
        }
        booking::begin(
            &mut session,
            msg.key.source,
            msg.telegram_username.as_deref(),
        )
    }

    pub async fn cancel(&self, key: &SessionKey) -> Reply {
        let handle = self.sessions.handle(key);
        let mut session = handle.lock().await;
        self.refresh(key, &mut session);

        if booking::cancel(&mut session) {
            tracing::info!(session = %key, "booking cancelled");
            Reply::text(booking::CANCELLED)
        } else {
            Reply::text(booking::NOTHING_TO_CANCEL)
        }
    }

    fn refresh(&self, key: &SessionKey, session: &mut Session) {
        if session.is_expired() && !session.is_idle() {
            tracing::info!(session = %key, step = session.step.as_str(), "session expired, discarding booking");
            session.reset();
        }
        session.touch(self.sessions.ttl());
    }

    async fn finalize(&self, key: &SessionKey, mut record: LeadRecord) -> Reply {
        record.created_at = Some(now_string());

        match self.persist(&record).await {
            Ok(location) => {
                tracing::info!(
                    session = %key,
                    lead_id = %record.lead_id,
                    location = %location,
                    "lead saved"
                );
                Reply::text(booking::confirmation(&record.lead_id))
            }
            Err(e) => {
                tracing::error!(
                    session = %key,
                    lead_id = %record.lead_id,
                    error = %e,
                    "failed to save lead"
                );
                Reply::text(booking::SAVE_FAILED)
            }
        }
    }

    async fn persist(&self, record: &LeadRecord) -> Result<String, StoreError> {
        match tokio::time::timeout(self.store_timeout, self.store.append(record)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.store_timeout)),
        }
    }
}
