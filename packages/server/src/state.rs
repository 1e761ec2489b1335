use crate::config::AppConfig;
use crate::store::ReceiptStore;

#[derive(Clone)]
pub struct AppState {
    pub store: ReceiptStore,
    pub config: AppConfig,
}
