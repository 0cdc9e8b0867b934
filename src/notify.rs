use serde::Serialize;
use serde_json::Value;
use tauri::{AppHandle, Emitter};

/// Outbound channel from the controllers to the webview. Controllers never
/// hold an `AppHandle` directly; everything user-visible goes through this
/// trait.
pub trait Notifier: Send + Sync {
    /// A user-visible notice the frontend must surface (validation failures,
    /// persistence errors). One call per failed operation.
    fn notify(&self, message: &str);

    /// Broadcast a state change to any listening view.
    fn emit(&self, event: &str, payload: Value);
}

pub struct AppNotifier {
    app_handle: AppHandle,
}

impl AppNotifier {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

#[derive(Serialize, Clone)]
struct NotificationEvent<'a> {
    message: &'a str,
}

impl Notifier for AppNotifier {
    fn notify(&self, message: &str) {
        let _ = self
            .app_handle
            .emit("notification", NotificationEvent { message });
    }

    fn emit(&self, event: &str, payload: Value) {
        let _ = self.app_handle.emit(event, payload);
    }
}
