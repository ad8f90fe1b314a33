use super::SessionKey;

/// A text message from either front-end, already stripped of transport details.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub key: SessionKey,
    pub text: String,
    /// `@username` of a Telegram sender, when they have one.
    pub telegram_username: Option<String>,
}

impl Inbound {
    pub fn web(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: SessionKey::web(session_id),
            text: text.into(),
            telegram_username: None,
        }
    }

    pub fn telegram(chat_id: i64, text: impl Into<String>, username: Option<&str>) -> Self {
        Self {
            key: SessionKey::telegram(chat_id),
            text: text.into(),
            telegram_username: username.map(|u| format!("@{}", u.trim_start_matches('@'))),
        }
    }
}
