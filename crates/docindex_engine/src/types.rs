/// One raw content item from a source page: the rendered blob handed to the
/// extractor plus its canonical URL. `wiki` marks items coming from a
/// wiki-style API rather than a generic web page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub url: String,
    pub body: String,
    pub wiki: bool,
}

/// One page of a paginated content source, offset/limit style.
///
/// `size == limit` means more pages may exist and the next fetch should use
/// `start + limit`; `size < limit` means the source is exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagePayload {
    pub items: Vec<SourceItem>,
    pub size: u64,
    pub limit: u64,
    pub start: u64,
}

/// Emitted once per indexed page for external reporting. The surrounding
/// CLI/logging decides how to render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub source: String,
    pub record_count: usize,
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Sink forwarding events over a channel to whoever reports progress.
pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<ProgressEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}
