use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup};
use teloxide::utils::command::BotCommands;

use crate::models::{Inbound, Reply, SessionKey};
use crate::state::AppState;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "начать запись")]
    Start,
    #[command(description = "отменить запись")]
    Cancel,
}

/// Long-polls Telegram until the process is interrupted.
pub async fn run_bot(bot: Bot, state: Arc<AppState>) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!(error = %e, "failed to register bot commands");
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_message().endpoint(message_handler));

    tracing::info!("starting Telegram dispatcher");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn command_handler(bot: Bot, msg: Message, cmd: Command, state: Arc<AppState>) -> HandlerResult {
    let reply = match cmd {
        Command::Start => state.dialogue.start(&inbound(&msg, "")).await,
        Command::Cancel => state.dialogue.cancel(&SessionKey::telegram(msg.chat.id.0)).await,
    };
    send_reply(&bot, msg.chat.id, reply).await
}

async fn message_handler(bot: Bot, msg: Message, state: Arc<AppState>) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if text.starts_with('/') {
        return Ok(());
    }

    let reply = state.dialogue.handle(&inbound(&msg, text.trim())).await;
    send_reply(&bot, msg.chat.id, reply).await
}

fn inbound(msg: &Message, text: &str) -> Inbound {
    let username = msg.from.as_ref().and_then(|u| u.username.as_deref());
    Inbound::telegram(msg.chat.id.0, text, username)
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> HandlerResult {
    bot.send_message(chat_id, reply.text)
        .reply_markup(reply_markup(&reply.suggestions))
        .await?;
    Ok(())
}

/// One-row keyboard of suggested answers, or removal of any previous keyboard.
pub fn reply_markup(suggestions: &[String]) -> ReplyMarkup {
    if suggestions.is_empty() {
        return ReplyMarkup::KeyboardRemove(KeyboardRemove::new());
    }
    let row: Vec<KeyboardButton> = suggestions.iter().map(KeyboardButton::new).collect();
    ReplyMarkup::Keyboard(
        KeyboardMarkup::new(vec![row])
            .resize_keyboard()
            .one_time_keyboard(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse() {
        assert!(matches!(Command::parse("/start", "salonbot"), Ok(Command::Start)));
        assert!(matches!(Command::parse("/cancel", "salonbot"), Ok(Command::Cancel)));
        assert!(Command::parse("/unknown", "salonbot").is_err());
    }

    #[test]
    fn test_reply_markup() {
        assert!(matches!(reply_markup(&[]), ReplyMarkup::KeyboardRemove(_)));

        let suggestions = vec!["Стилист".to_string(), "Арт-Директор".to_string()];
        match reply_markup(&suggestions) {
            ReplyMarkup::Keyboard(keyboard) => {
                assert_eq!(keyboard.keyboard.len(), 1);
                assert_eq!(keyboard.keyboard[0].len(), 2);
                assert_eq!(keyboard.keyboard[0][1].text, "Арт-Директор");
            }
            other => panic!("unexpected markup {other:?}"),
        }
    }
}
