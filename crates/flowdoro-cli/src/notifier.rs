//! Terminal bell plus desktop notification.

use std::io::Write;

use flowdoro_core::storage::NotificationsConfig;
use flowdoro_core::{Alert, Notifier};
use notify_rust::Notification;

pub struct TerminalNotifier {
    enabled: bool,
    desktop: bool,
}

impl TerminalNotifier {
    pub fn new(config: &NotificationsConfig) -> Self {
        Self {
            enabled: config.enabled,
            desktop: config.desktop,
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, alert: Alert) {
        if !self.enabled {
            return;
        }

        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();

        if self.desktop {
            // The notification daemon can be slow or absent; never wait on it.
            std::thread::spawn(move || {
                let shown = Notification::new()
                    .summary(alert.title())
                    .body(alert.body())
                    .appname("flowdoro")
                    .icon("alarm-clock")
                    .show();
                if let Err(e) = shown {
                    tracing::debug!(error = %e, "desktop notification failed");
                }
            });
        }
    }
}
