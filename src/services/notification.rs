// 通知
//
// 搜索失败时向用户发出一次性通知（toast）。核心逻辑只负责发出，
// 不关心如何显示，也不等待任何返回。

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::RwLock;

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub severity: Severity,
    /// 页面自动关闭前的显示时长
    pub dismiss_after_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub const DEFAULT_DISMISS_MS: u64 = 5000;

    pub fn new(title: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            body: None,
            severity,
            dismiss_after_ms: Self::DEFAULT_DISMISS_MS,
            created_at: Utc::now(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// 通知出口
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// 记录最近通知的通知中心，页面轮询时取走
pub struct NotificationCenter {
    entries: RwLock<VecDeque<Notification>>,
    capacity: usize,
}

impl NotificationCenter {
    pub const DEFAULT_CAPACITY: usize = 20;

    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// 取走全部待显示的通知
    pub fn drain(&self) -> Vec<Notification> {
        match self.entries.write() {
            Ok(mut entries) => entries.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Danger | Severity::Warning => {
                tracing::warn!("Notification: {} {:?}", notification.title, notification.body)
            }
            Severity::Info | Severity::Success => {
                tracing::info!("Notification: {}", notification.title)
            }
        }

        if let Ok(mut entries) = self.entries.write() {
            // 超出容量时丢弃最旧的
            while entries.len() >= self.capacity {
                entries.pop_front();
            }
            entries.push_back(notification);
        }
    }
}
