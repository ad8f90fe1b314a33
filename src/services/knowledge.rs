use std::sync::Arc;
use std::time::Duration;

use crate::services::ai::{LlmProvider, Message};

pub const FALLBACK_ANSWER: &str = "Извините, сейчас не могу ответить. Попробуйте чуть позже.";

const TEMPERATURE: f32 = 0.3;
const MAX_ATTEMPTS: usize = 2;

const PERSONA: &str = "Ты - ассистент салона красоты ArtBeauty.\n\
Главное: консультируешь по услугам и записываешь клиентов. \
Если клиент хочет записаться — собираешь имя, телефон, услугу, дату, время, мастера и комментарии. \
После сохранения подтверждаешь запись. \
Отвечай тёпло и профессионально. Никаких технических ссылок или меток.";

#[derive(Debug, Clone, Copy)]
pub struct KnowledgeEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const KNOWLEDGE_BASE: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        question: "Что входит в стандартную процедуру окрашивания в вашем салоне?",
        answer: "В стоимость включены осветление тонирование и укладка.",
    },
    KnowledgeEntry {
        question: "Можно ли провести окрашивание в день консультации?",
        answer: "Да если у мастера будет свободное время после консультации можно сделать окрашивание сразу.",
    },
    KnowledgeEntry {
        question: "Какие категории мастеров есть в вашем салоне?",
        answer: "Стилист, Топ-Стилист, Ведущий Стилист и Арт-Директор.",
    },
    KnowledgeEntry {
        question: "Каковы цены на услуги различных мастеров?",
        answer: "Цена зависит от категории мастера и сложности услуги: от 12 тыс. руб. у стилиста до 30 тыс. руб. у арт-директора.",
    },
    KnowledgeEntry {
        question: "Какие услуги кроме стрижек и окрашиваний?",
        answer: "Маникюр, педикюр и косметология.",
    },
    KnowledgeEntry {
        question: "Часы работы?",
        answer: "С 10:00 до 20:00, пн–сб. Воскресенье — выходной.",
    },
    KnowledgeEntry {
        question: "Адрес?",
        answer: "Москва, ул. Новый Арбат, 77",
    },
];

pub fn knowledge_base_text() -> String {
    KNOWLEDGE_BASE
        .iter()
        .map(|e| format!("Q: {}\nA: {}", e.question, e.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Answers informational questions from the salon knowledge base.
pub struct KnowledgeResponder {
    llm: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl KnowledgeResponder {
    pub fn new(llm: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Never fails: any error, timeout or empty answer yields [`FALLBACK_ANSWER`].
    pub async fn consult(&self, message: &str) -> String {
        let messages = [
            Message::system(format!("База знаний:\n{}", knowledge_base_text())),
            Message::user(message.trim()),
        ];

        for attempt in 1..=MAX_ATTEMPTS {
            let call = self.llm.chat(PERSONA, &messages, TEMPERATURE);
            match tokio::time::timeout(self.timeout, call).await {
                Ok(Ok(answer)) => {
                    let answer = answer.trim();
                    if !answer.is_empty() {
                        return answer.to_string();
                    }
                    tracing::warn!(attempt, "knowledge service returned an empty answer");
                }
                Ok(Err(e)) => {
                    tracing::warn!(attempt, error = %e, "knowledge service call failed");
                }
                Err(_) => {
                    tracing::warn!(attempt, timeout = ?self.timeout, "knowledge service call timed out");
                }
            }
        }

        FALLBACK_ANSWER.to_string()
    }
}
