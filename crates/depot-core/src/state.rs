use std::collections::VecDeque;

use serde::Serialize;

use crate::config::Config;
use crate::config::ReplyPolicy;
use crate::navigation::NavigationContext;
use crate::requests::Route;
use crate::view::ViewKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Idle,
    Requested,
    Connected,
    ServerClosed,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Requested => "Connecting",
            Self::Connected => "Connected",
            Self::ServerClosed => "Server closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub seq: u64,
    pub ts_ms: i64,
    pub level: StatusLevel,
    pub message: String,
}

/// Bounded status-line history; the newest entry is what a status bar shows.
#[derive(Debug, Clone, Serialize)]
pub struct StatusBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<StatusEntry>,
}

impl StatusBuffer {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn push(&mut self, level: StatusLevel, message: impl Into<String>) {
        let entry = StatusEntry {
            seq: self.next_seq,
            ts_ms: chrono::Utc::now().timestamp_millis(),
            level,
            message: message.into(),
        };
        self.next_seq += 1;

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(StatusLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(StatusLevel::Warn, message);
    }

    pub fn latest(&self) -> Option<&StatusEntry> {
        self.buf.back()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.next_seq = 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEntry> {
        self.buf.iter()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Everything the foreground executor owns. Only `reduce` mutates it, apart
/// from the send-failure warning a session records.
#[derive(Debug, Clone, Serialize)]
pub struct ClientState {
    pub route: Route,
    pub view_file_location: String,
    pub reply_policy: ReplyPolicy,
    pub active_view: ViewKind,
    pub connection: ConnectionStatus,
    contexts: [NavigationContext; 4],
    pub metadata: Vec<String>,
    pub description: Vec<String>,
    pub last_file: Option<String>,
    pub pending_file_view: bool,
    pub status: StatusBuffer,
}

impl ClientState {
    pub fn new(route: Route, root: &str) -> Self {
        Self {
            route,
            view_file_location: String::new(),
            reply_policy: ReplyPolicy::default(),
            active_view: ViewKind::Browse,
            connection: ConnectionStatus::Idle,
            contexts: ViewKind::ALL.map(|view| NavigationContext::new(view, root)),
            metadata: Vec::new(),
            description: Vec::new(),
            last_file: None,
            pending_file_view: false,
            status: StatusBuffer::new(200),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let route = Route {
            server: config.server_endpoint(),
            client: config.client_endpoint(),
        };
        let mut state = Self::new(route, &config.repository.root);
        state.view_file_location = config.repository.view_file_location.clone();
        state.reply_policy = config.repository.reply_policy;
        state.status = StatusBuffer::new(config.repository.status_capacity);
        state
    }

    pub fn context(&self, view: ViewKind) -> &NavigationContext {
        &self.contexts[view.index()]
    }

    pub fn context_mut(&mut self, view: ViewKind) -> &mut NavigationContext {
        &mut self.contexts[view.index()]
    }

    pub fn contexts(&self) -> impl Iterator<Item = &NavigationContext> {
        self.contexts.iter()
    }

    pub fn status_text(&self) -> &str {
        self.status.latest().map_or("", |entry| entry.message.as_str())
    }
}
