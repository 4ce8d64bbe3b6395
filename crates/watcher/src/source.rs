//! Notification sources: streams of raw change events for a directory
//!
//! The daemon only needs "produces events" and "produces errors". The
//! notify-backed source is used in production; [`ChannelSource`] lets other
//! producers (and tests) feed events in directly.

use crate::error::WatchError;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Kind of raw change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEventKind {
    /// File created (or renamed into place)
    Create,
    /// File contents written
    Write,
    /// File removed
    Remove,
    /// File renamed away
    Rename,
    /// Metadata, access, or anything else
    Other,
}

impl FsEventKind {
    /// Whether this kind can indicate new file contents
    pub fn may_change_contents(self) -> bool {
        matches!(self, FsEventKind::Create | FsEventKind::Write)
    }
}

impl fmt::Display for FsEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FsEventKind::Create => "CREATE",
            FsEventKind::Write => "WRITE",
            FsEventKind::Remove => "REMOVE",
            FsEventKind::Rename => "RENAME",
            FsEventKind::Other => "OTHER",
        };
        f.write_str(name)
    }
}

/// A single raw change for one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    /// Path that changed
    pub path: PathBuf,
    /// Type of change
    pub kind: FsEventKind,
}

impl FsEvent {
    pub fn new(path: impl Into<PathBuf>, kind: FsEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for FsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.path.display())
    }
}

/// Live subscription: event and error streams plus the backend handle
///
/// Dropping (or [`Subscription::close`]) releases the backend.
pub struct Subscription {
    /// Raw change events, in arrival order
    pub events: mpsc::UnboundedReceiver<FsEvent>,
    /// Backend errors
    pub errors: mpsc::UnboundedReceiver<anyhow::Error>,
    handle: Option<Box<dyn Send>>,
}

impl Subscription {
    pub fn new(
        events: mpsc::UnboundedReceiver<FsEvent>,
        errors: mpsc::UnboundedReceiver<anyhow::Error>,
        handle: impl Send + 'static,
    ) -> Self {
        Self {
            events,
            errors,
            handle: Some(Box::new(handle)),
        }
    }

    /// Release the backend and close both streams
    pub fn close(mut self) {
        self.handle.take();
        self.events.close();
        self.errors.close();
    }
}

/// Something that can subscribe to change notifications for paths
pub trait NotificationSource: Send {
    /// Subscribe to every path in `paths` (non-recursively)
    fn subscribe(&mut self, paths: &[PathBuf]) -> Result<Subscription, WatchError>;
}

/// OS notification facility via the `notify` crate
#[derive(Debug, Default)]
pub struct NotifySource;

impl NotifySource {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSource for NotifySource {
    fn subscribe(&mut self, paths: &[PathBuf]) -> Result<Subscription, WatchError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for fs_event in translate(event) {
                    let _ = event_tx.send(fs_event);
                }
            }
            Err(e) => {
                let _ = error_tx.send(anyhow::Error::new(e));
            }
        })
        .map_err(WatchError::Backend)?;

        for path in paths {
            watcher
                .watch(path, RecursiveMode::NonRecursive)
                .map_err(|source| WatchError::Subscribe {
                    path: path.clone(),
                    source,
                })?;
        }

        Ok(Subscription::new(event_rx, error_rx, watcher))
    }
}

/// Flatten a notify event into one [`FsEvent`] per path
///
/// A rename onto a path counts as a create there, so write-temp-then-rename
/// deployments are seen as the file appearing.
pub fn translate(event: Event) -> Vec<FsEvent> {
    match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut paths = event.paths.into_iter();
            let mut out = Vec::with_capacity(2);
            if let Some(from) = paths.next() {
                out.push(FsEvent::new(from, FsEventKind::Rename));
            }
            if let Some(to) = paths.next() {
                out.push(FsEvent::new(to, FsEventKind::Create));
            }
            out
        }
        kind => {
            let kind = map_kind(&kind);
            event
                .paths
                .into_iter()
                .map(|path| FsEvent::new(path, kind))
                .collect()
        }
    }
}

fn map_kind(kind: &EventKind) -> FsEventKind {
    match kind {
        EventKind::Create(_) => FsEventKind::Create,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
            FsEventKind::Write
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => FsEventKind::Create,
        EventKind::Modify(ModifyKind::Name(_)) => FsEventKind::Rename,
        EventKind::Remove(_) => FsEventKind::Remove,
        _ => FsEventKind::Other,
    }
}

/// In-memory notification source fed through a [`ChannelFeed`]
pub struct ChannelSource {
    events: Option<mpsc::UnboundedReceiver<FsEvent>>,
    errors: Option<mpsc::UnboundedReceiver<anyhow::Error>>,
    subscribed: Arc<Mutex<Vec<PathBuf>>>,
}

/// Producer side of a [`ChannelSource`]
#[derive(Clone)]
pub struct ChannelFeed {
    events: mpsc::UnboundedSender<FsEvent>,
    errors: mpsc::UnboundedSender<anyhow::Error>,
    subscribed: Arc<Mutex<Vec<PathBuf>>>,
}

impl ChannelSource {
    pub fn new() -> (Self, ChannelFeed) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        let subscribed = Arc::new(Mutex::new(Vec::new()));

        let source = Self {
            events: Some(event_rx),
            errors: Some(error_rx),
            subscribed: Arc::clone(&subscribed),
        };
        let feed = ChannelFeed {
            events: event_tx,
            errors: error_tx,
            subscribed,
        };
        (source, feed)
    }
}

impl NotificationSource for ChannelSource {
    fn subscribe(&mut self, paths: &[PathBuf]) -> Result<Subscription, WatchError> {
        let (events, errors) = match (self.events.take(), self.errors.take()) {
            (Some(events), Some(errors)) => (events, errors),
            _ => return Err(WatchError::AlreadyRunning),
        };
        self.subscribed.lock().extend(paths.iter().cloned());
        Ok(Subscription::new(events, errors, ()))
    }
}

impl ChannelFeed {
    /// Deliver an event; returns `false` once the subscription is closed
    pub fn send(&self, event: FsEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Deliver a backend error
    pub fn send_error(&self, err: anyhow::Error) -> bool {
        self.errors.send(err).is_ok()
    }

    /// Paths the daemon subscribed to
    pub fn subscribed(&self) -> Vec<PathBuf> {
        self.subscribed.lock().clone()
    }

    /// Whether the subscribed paths include `path`
    pub fn is_subscribed(&self, path: &Path) -> bool {
        self.subscribed.lock().iter().any(|p| p == path)
    }
}
