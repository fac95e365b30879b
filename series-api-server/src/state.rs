use std::sync::Arc;

use series_api_acl::TableRegistry;
use series_api_config::Config;
use series_api_db::SeriesStore;

/// 핸들러에 주입되는 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SeriesStore>,
    pub registry: Arc<TableRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn SeriesStore>, registry: Arc<TableRegistry>, config: Config) -> Self {
        Self {
            store,
            registry,
            config: Arc::new(config),
        }
    }
}
