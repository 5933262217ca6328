use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::config::SiteConfig;
use crate::content_loader::{PostRegistry, SiteContent};
use crate::layout::DefaultLayout;

pub type RefreshBroadcaster = broadcast::Sender<()>;

pub struct AppState {
    pub config: SiteConfig,
    pub layout: RwLock<DefaultLayout>,
    pub home_html: RwLock<String>,
    pub not_found_html: RwLock<String>, // supports {{slug}} placeholder
    pub registry: RwLock<PostRegistry>,
}

impl AppState {
    pub fn new(config: SiteConfig, content: SiteContent) -> Self {
        Self {
            config,
            layout: RwLock::new(content.layout),
            home_html: RwLock::new(content.home_html),
            not_found_html: RwLock::new(content.not_found_html),
            registry: RwLock::new(content.registry),
        }
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub app_state: Arc<AppState>,
    pub broadcaster: RefreshBroadcaster,
}

impl axum::extract::FromRef<RouterState> for Arc<AppState> {
    fn from_ref(state: &RouterState) -> Self {
        state.app_state.clone()
    }
}

impl axum::extract::FromRef<RouterState> for RefreshBroadcaster {
    fn from_ref(state: &RouterState) -> Self {
        state.broadcaster.clone()
    }
}
