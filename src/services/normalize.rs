use chrono::Local;

/// Digits in a complete `+7XXXXXXXXXX` number.
pub const PHONE_DIGITS: usize = 11;

/// Canonicalizes a KZ/RU phone number to `+7XXXXXXXXXX`.
///
/// Never fails: short input yields a short string, and digits past the eleventh
/// are dropped.
pub fn normalize_phone(raw: &str) -> String {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if let Some(rest) = digits.strip_prefix('8') {
        digits = format!("7{rest}");
    }
    if !digits.starts_with('7') {
        digits.insert(0, '7');
    }
    digits.truncate(PHONE_DIGITS);

    format!("+{digits}")
}

/// Whether a normalized number carries the full eleven digits.
pub fn is_complete_phone(normalized: &str) -> bool {
    normalized
        .strip_prefix('+')
        .map(|d| d.len() == PHONE_DIGITS && d.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// `L-` followed by six uppercase hex characters taken from a v4 UUID.
pub fn generate_lead_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("L-{}", hex[..6].to_uppercase())
}

pub fn now_string() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
