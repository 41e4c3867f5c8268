use crate::config::AppConfig;
use crate::services::conversation::Dispatcher;
use crate::services::messaging::MessagingProvider;

pub struct AppState {
    pub config: AppConfig,
    pub dispatcher: Dispatcher,
    pub messaging: Box<dyn MessagingProvider>,
}
