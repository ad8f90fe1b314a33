use crate::models::{BookingStep, LeadRecord, LeadSource, MasterCategory, Reply, Session};
use crate::services::normalize::{generate_lead_id, is_complete_phone, normalize_phone};

const NO_COMMENTS: &str = "нет";
const SERVICE_SUGGESTIONS: [&str; 3] = ["Маникюр", "Стрижка", "Окрашивание"];

pub const SAVE_FAILED: &str = "Не удалось сохранить запись, попробуйте ещё раз позже.";
pub const CANCELLED: &str = "Ок, отменяем. Если захотите, начнём заново.";
pub const NOTHING_TO_CANCEL: &str = "Сейчас нет активной записи. Чем могу помочь?";

#[derive(Debug)]
pub enum StepOutcome {
    /// Answer stored, session moved on to the step this prompt asks about.
    Prompt(Reply),
    /// Last answer stored; the session is idle again and the record is ready to persist.
    Completed(LeadRecord),
    /// The session had no booking in progress.
    NotInProgress,
}

/// Prompt shown while the session waits in `step`.
pub fn prompt_for(step: BookingStep) -> Reply {
    match step {
        BookingStep::Idle => Reply::text("Чем могу помочь?"),
        BookingStep::AskName => Reply::text("Отлично! Давайте оформим запись. Как вас зовут?"),
        BookingStep::AskPhone => Reply::text("Укажите ваш телефон (например, +7 701 000 00 00):"),
        BookingStep::AskService => Reply::with_suggestions(
            "Какую услугу вы хотите? (например, Маникюр/Стрижка/Окрашивание)",
            SERVICE_SUGGESTIONS,
        ),
        BookingStep::AskDate => Reply::text("Желаемая дата (в формате ГГГГ-ММ-ДД):"),
        BookingStep::AskTime => Reply::text("Желаемое время (например, 15:00):"),
        BookingStep::AskCategory => {
            let names: Vec<&str> = MasterCategory::ALL.iter().map(|c| c.display_name()).collect();
            Reply::with_suggestions(
                format!("Выберите категорию мастера: {}", names.join(" / ")),
                names,
            )
        }
        BookingStep::AskComments => Reply::with_suggestions(
            "Есть ли дополнительные пожелания? Если нет — напишите «нет».",
            [NO_COMMENTS],
        ),
    }
}

pub fn confirmation(lead_id: &str) -> String {
    format!(
        "Отлично! Сохраняю вашу запись…\n\
         ✅ Готово! Мы свяжемся с вами для подтверждения.\n\
         ID заявки: {lead_id}"
    )
}

/// Starts a booking with a fresh lead id, discarding whatever was in progress.
pub fn begin(session: &mut Session, source: LeadSource, telegram_username: Option<&str>) -> Reply {
    let record = LeadRecord::new(generate_lead_id(), source, telegram_username);
    tracing::debug!(lead_id = %record.lead_id, source = source.as_str(), "booking started");

    session.record = Some(record);
    session.step = BookingStep::AskName;
    prompt_for(BookingStep::AskName)
}

/// Stores `text` as the answer to the current step and moves to the next one.
pub fn advance(session: &mut Session, text: &str) -> StepOutcome {
    let step = session.step;
    if step == BookingStep::Idle {
        return StepOutcome::NotInProgress;
    }
    let Some(record) = session.record.as_mut() else {
        tracing::warn!(step = step.as_str(), "booking step without a record, resetting");
        session.reset();
        return StepOutcome::NotInProgress;
    };

    let text = text.trim();
    match step {
        BookingStep::Idle => unreachable!("idle handled above"),
        BookingStep::AskName => record.client_name = text.to_string(),
        BookingStep::AskPhone => {
            record.phone = normalize_phone(text);
            if !is_complete_phone(&record.phone) {
                tracing::warn!(lead_id = %record.lead_id, phone = %record.phone, "incomplete phone number accepted");
            }
        }
        BookingStep::AskService => record.service = text.to_string(),
        BookingStep::AskDate => record.preferred_date = text.to_string(),
        BookingStep::AskTime => record.preferred_time = text.to_string(),
        BookingStep::AskCategory => {
            record.master_category = match MasterCategory::parse(text) {
                Some(category) => category.display_name().to_string(),
                None => {
                    tracing::debug!(lead_id = %record.lead_id, category = text, "unrecognized master category");
                    text.to_string()
                }
            };
        }
        BookingStep::AskComments => {
            record.comments = if text.to_lowercase() == NO_COMMENTS {
                String::new()
            } else {
                text.to_string()
            };
        }
    }

    let next = step.next();
    tracing::debug!(from = step.as_str(), to = next.as_str(), "booking step advanced");

    if next == BookingStep::Idle {
        let record = session.record.take();
        session.reset();
        return match record {
            Some(record) => StepOutcome::Completed(record),
            None => StepOutcome::NotInProgress,
        };
    }

    session.step = next;
    StepOutcome::Prompt(prompt_for(next))
}

/// Drops any booking in progress. Returns whether there was one.
pub fn cancel(session: &mut Session) -> bool {
    let was_active = !session.is_idle();
    session.reset();
    was_active
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fresh() -> Session {
        Session::new(Duration::minutes(30))
    }

    fn started() -> Session {
        let mut session = fresh();
        begin(&mut session, LeadSource::Web, None);
        session
    }

    #[test]
    fn test_begin_assigns_lead_id_and_asks_name() {
        let mut session = fresh();
        let reply = begin(&mut session, LeadSource::Telegram, Some("@anna"));

        assert_eq!(session.step, BookingStep::AskName);
        assert!(reply.text.contains("Как вас зовут"));
        let record = session.record.as_ref().unwrap();
        assert!(record.lead_id.starts_with("L-"));
        assert_eq!(record.source, LeadSource::Telegram);
        assert_eq!(record.telegram_username, "@anna");
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_full_sequence() {
        let mut session = started();
        let lead_id = session.record.as_ref().unwrap().lead_id.clone();

        let answers = [
            ("Анна", BookingStep::AskPhone),
            ("8 701 234 56 78", BookingStep::AskService),
            ("Маникюр", BookingStep::AskDate),
            ("2025-06-15", BookingStep::AskTime),
            ("15:00", BookingStep::AskCategory),
            ("топ-стилист", BookingStep::AskComments),
        ];
        for (answer, expected) in answers {
            match advance(&mut session, answer) {
                StepOutcome::Prompt(reply) => assert_eq!(reply, prompt_for(expected)),
                other => panic!("unexpected outcome {other:?}"),
            }
            assert_eq!(session.step, expected);
            assert_eq!(session.record.as_ref().unwrap().lead_id, lead_id);
        }

        let record = match advance(&mut session, "НЕТ") {
            StepOutcome::Completed(record) => record,
            other => panic!("unexpected outcome {other:?}"),
        };
        assert!(session.is_idle());
        assert!(session.record.is_none());
        assert_eq!(record.lead_id, lead_id);
        assert_eq!(record.client_name, "Анна");
        assert_eq!(record.phone, "+77012345678");
        assert_eq!(record.service, "Маникюр");
        assert_eq!(record.preferred_date, "2025-06-15");
        assert_eq!(record.preferred_time, "15:00");
        assert_eq!(record.master_category, "Топ-Стилист");
        assert_eq!(record.comments, "");
    }

    #[test]
    fn test_free_text_accepted_without_validation() {
        let mut session = started();
        advance(&mut session, "Анна");
        advance(&mut session, "123");
        advance(&mut session, "что-нибудь");
        advance(&mut session, "послезавтра");
        advance(&mut session, "вечером");
        advance(&mut session, "любой мастер");

        let record = session.record.as_ref().unwrap();
        assert_eq!(record.phone, "+7123");
        assert_eq!(record.preferred_date, "послезавтра");
        assert_eq!(record.master_category, "любой мастер");
        assert_eq!(session.step, BookingStep::AskComments);
    }

    #[test]
    fn test_comments_kept_when_not_no() {
        let mut session = started();
        for answer in ["Анна", "87012345678", "Стрижка", "2025-06-15", "12:00", "Стилист"] {
            advance(&mut session, answer);
        }
        match advance(&mut session, "Нет аллергии на краску") {
            StepOutcome::Completed(record) => assert_eq!(record.comments, "Нет аллергии на краску"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_advance_on_idle_session() {
        let mut session = fresh();
        assert!(matches!(advance(&mut session, "Анна"), StepOutcome::NotInProgress));
        assert!(session.is_idle());
    }

    #[test]
    fn test_cancel_from_any_step() {
        for steps in 0..7 {
            let mut session = started();
            for _ in 0..steps {
                advance(&mut session, "x");
            }
            assert!(cancel(&mut session));
            assert!(session.is_idle());
            assert!(session.record.is_none());
        }
        assert!(!cancel(&mut fresh()));
    }

    #[test]
    fn test_category_prompt_lists_all_categories() {
        let reply = prompt_for(BookingStep::AskCategory);
        assert_eq!(reply.suggestions.len(), 4);
        assert!(reply.text.contains("Стилист / Топ-Стилист / Ведущий Стилист / Арт-Директор"));
    }
}
