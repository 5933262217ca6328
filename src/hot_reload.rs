use std::{path::Path, sync::Arc, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use notify_debouncer_full::{
    new_debouncer, DebouncedEvent,
    notify::{RecursiveMode, Watcher, Error as NotifyError},
};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info};

use crate::content_loader::reload_content;
use crate::state::{AppState, RefreshBroadcaster};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(tx): State<RefreshBroadcaster>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, tx))
}

async fn handle_socket(mut socket: WebSocket, tx: RefreshBroadcaster) {
    let mut rx = tx.subscribe();

    if rx.recv().await.is_ok() {
        if socket.send(Message::Text("reload".into())).await.is_err() {
            debug!("Client disconnected before reload message could be sent");
        }
    }
}

/// Emacs lock files (`.#name`) and backups (`name~`).
fn is_editor_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |s| s.starts_with(".#") || s.ends_with('~'))
}

fn is_relevant(event: &DebouncedEvent) -> bool {
    let kind_matters = event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove();
    kind_matters && !event.event.paths.iter().any(|p| is_editor_temp_file(p))
}

pub fn start_content_watcher(tx: RefreshBroadcaster, app_state: Arc<AppState>) {
    info!("Starting content watcher for hot-reload...");
    tokio::spawn(async move {
        let (watcher_tx, mut watcher_rx) = tokio::sync::mpsc::channel(1);
        let content_dir = app_state.config.content_dir.clone();

        let handler = move |res: Result<Vec<DebouncedEvent>, Vec<NotifyError>>| match res {
            Ok(events) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant(e))
                    .flat_map(|e| &e.event.paths)
                    .collect();
                if changed.is_empty() {
                    return;
                }
                debug!("Relevant file change detected: {:?}", changed);
                // A full channel already has a reload queued.
                if let Err(TrySendError::Closed(_)) = watcher_tx.try_send(()) {
                    error!("Content watcher channel closed");
                }
            }
            Err(errors) => {
                for e in errors {
                    error!("Watcher error: {}", e);
                }
            }
        };

        let mut debouncer = match new_debouncer(Duration::from_millis(200), None, handler) {
            Ok(debouncer) => debouncer,
            Err(e) => {
                error!("Failed to create content watcher, hot reload disabled: {}", e);
                return;
            }
        };
        if let Err(e) = debouncer.watcher().watch(&content_dir, RecursiveMode::Recursive) {
            error!(
                dir = %content_dir.display(),
                "Failed to watch content directory, hot reload disabled: {}", e
            );
            return;
        }

        while watcher_rx.recv().await.is_some() {
            info!("Content change detected, reloading content and sending signal...");
            reload_content(&app_state).await;

            // No subscribers just means no browser is open.
            if tx.send(()).is_err() {
                debug!("No hot-reload clients connected");
            }
        }
    });
}
