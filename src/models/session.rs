use std::fmt;

use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LeadRecord, LeadSource};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStep {
    #[default]
    Idle,
    AskName,
    AskPhone,
    AskService,
    AskDate,
    AskTime,
    AskCategory,
    AskComments,
}

impl BookingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStep::Idle => "idle",
            BookingStep::AskName => "ask_name",
            BookingStep::AskPhone => "ask_phone",
            BookingStep::AskService => "ask_service",
            BookingStep::AskDate => "ask_date",
            BookingStep::AskTime => "ask_time",
            BookingStep::AskCategory => "ask_category",
            BookingStep::AskComments => "ask_comments",
        }
    }

    /// The step that follows this one. `AskComments` wraps to `Idle` once the lead is saved.
    pub fn next(&self) -> BookingStep {
        match self {
            BookingStep::Idle => BookingStep::AskName,
            BookingStep::AskName => BookingStep::AskPhone,
            BookingStep::AskPhone => BookingStep::AskService,
            BookingStep::AskService => BookingStep::AskDate,
            BookingStep::AskDate => BookingStep::AskTime,
            BookingStep::AskTime => BookingStep::AskCategory,
            BookingStep::AskCategory => BookingStep::AskComments,
            BookingStep::AskComments => BookingStep::Idle,
        }
    }
}

/// Channel-qualified conversation identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub source: LeadSource,
    pub id: String,
}

impl SessionKey {
    pub fn web(id: impl Into<String>) -> Self {
        Self {
            source: LeadSource::Web,
            id: id.into(),
        }
    }

    pub fn telegram(chat_id: i64) -> Self {
        Self {
            source: LeadSource::Telegram,
            id: chat_id.to_string(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source.as_str(), self.id)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub step: BookingStep,
    /// Present while a booking is in progress.
    pub record: Option<LeadRecord>,
    pub last_activity: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl Session {
    pub fn new(ttl: Duration) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            step: BookingStep::Idle,
            record: None,
            last_activity: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.step == BookingStep::Idle
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().naive_utc() >= self.expires_at
    }

    pub fn touch(&mut self, ttl: Duration) {
        let now = Utc::now().naive_utc();
        self.last_activity = now;
        self.expires_at = now + ttl;
    }

    pub fn reset(&mut self) {
        self.step = BookingStep::Idle;
        self.record = None;
    }
}
