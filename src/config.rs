use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub google_credentials_path: String,
    pub spreadsheet_id: String,
    pub sheet_range: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub telegram_bot_token: String,
    pub cors_allow_origins: String,
    pub session_ttl_minutes: i64,
    pub external_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            google_credentials_path: env::var("GOOGLE_APPLICATION_CREDENTIALS")
                .unwrap_or_else(|_| "creds/service_account.json".to_string()),
            spreadsheet_id: env::var("GOOGLE_SHEETS_SPREADSHEET_ID").unwrap_or_default(),
            sheet_range: env::var("GOOGLE_SHEETS_RANGE")
                .unwrap_or_else(|_| "artbeauty_sheet_leads!A:L".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            cors_allow_origins: env::var("CORS_ALLOW_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            session_ttl_minutes: env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            external_timeout_secs: env::var("EXTERNAL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
        }
    }

    pub fn external_timeout(&self) -> Duration {
        Duration::from_secs(self.external_timeout_secs)
    }

    /// Origins for the CORS layer; `None` means any origin.
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_allow_origins
            .split(',')
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_origins(origins: &str) -> AppConfig {
        AppConfig {
            cors_allow_origins: origins.to_string(),
            ..AppConfig::from_env()
        }
    }

    #[test]
    fn test_wildcard_origin_allows_any() {
        assert_eq!(config_with_origins("*").allowed_origins(), None);
        assert_eq!(config_with_origins("").allowed_origins(), None);
    }

    #[test]
    fn test_origin_list_is_split_and_trimmed() {
        let origins = config_with_origins("https://a.tilda.ws, https://b.example").allowed_origins();
        assert_eq!(
            origins,
            Some(vec![
                "https://a.tilda.ws".to_string(),
                "https://b.example".to_string()
            ])
        );
    }
}
