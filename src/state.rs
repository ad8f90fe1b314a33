use crate::config::AppConfig;
use crate::services::dialogue::DialogueRouter;

pub struct AppState {
    pub config: AppConfig,
    pub dialogue: DialogueRouter,
}
