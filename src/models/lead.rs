use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LeadSource {
    Web,
    Telegram,
}

impl LeadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::Web => "web",
            LeadSource::Telegram => "telegram",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MasterCategory {
    Stylist,
    TopStylist,
    LeadStylist,
    ArtDirector,
}

impl MasterCategory {
    pub const ALL: [MasterCategory; 4] = [
        MasterCategory::Stylist,
        MasterCategory::TopStylist,
        MasterCategory::LeadStylist,
        MasterCategory::ArtDirector,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            MasterCategory::Stylist => "Стилист",
            MasterCategory::TopStylist => "Топ-Стилист",
            MasterCategory::LeadStylist => "Ведущий Стилист",
            MasterCategory::ArtDirector => "Арт-Директор",
        }
    }

    /// Case-insensitive match against the display names.
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.display_name().to_lowercase() == wanted)
    }
}

/// A booking request being assembled by a session and eventually appended to the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadRecord {
    pub lead_id: String,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub client_name: String,
    pub phone: String,
    pub service: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub master_category: String,
    pub comments: String,
    pub telegram_username: String,
    /// Stamped when the record is persisted, not when the session starts.
    pub created_at: Option<String>,
}

impl LeadRecord {
    pub fn new(lead_id: String, source: LeadSource, telegram_username: Option<&str>) -> Self {
        Self {
            lead_id,
            source,
            status: LeadStatus::New,
            client_name: String::new(),
            phone: String::new(),
            service: String::new(),
            preferred_date: String::new(),
            preferred_time: String::new(),
            master_category: String::new(),
            comments: String::new(),
            telegram_username: telegram_username.unwrap_or_default().to_string(),
            created_at: None,
        }
    }

    /// Column order of the leads sheet.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.created_at.clone().unwrap_or_default(),
            self.source.as_str().to_string(),
            self.client_name.clone(),
            self.phone.clone(),
            self.service.clone(),
            self.preferred_date.clone(),
            self.preferred_time.clone(),
            self.master_category.clone(),
            self.comments.clone(),
            self.status.as_str().to_string(),
            self.telegram_username.clone(),
            self.lead_id.clone(),
        ]
    }
}
