pub mod health;
pub mod telegram;
pub mod webchat;
