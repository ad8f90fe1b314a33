use crate::models::Intent;

const BOOKING_KEYWORDS: &[&str] = &[
    "записать",
    "запиш",
    "бронь",
    "забронировать",
    "хочу записаться",
    "нужна стрижка",
    "хочу стрижку",
    "окрашивание",
    "маникюр",
    "педикюр",
    "хочу к мастеру",
    "могу записаться",
    "airtouch",
    "контуринг",
    "укладка",
    "стилист",
    "топ-стилист",
    "арт-директор",
];

const CANCEL_COMMANDS: &[&str] = &["/cancel", "отмена"];

/// Coarse keyword check for booking intent.
pub fn looks_like_booking(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let t = text.to_lowercase();
    BOOKING_KEYWORDS.iter().any(|k| t.contains(k))
}

pub fn is_cancel_command(text: &str) -> bool {
    let t = text.trim().to_lowercase();
    CANCEL_COMMANDS.iter().any(|c| t == *c)
}

pub fn classify(text: &str) -> Intent {
    if is_cancel_command(text) {
        Intent::Cancel
    } else if looks_like_booking(text) {
        Intent::Book
    } else {
        Intent::GeneralQuestion
    }
}
