//! Live render loop: one renderer, one table body, one frame at a time.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::renderers::Renderer;
use crate::table::TableBody;

/// Source of inbound text frames, in arrival order.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    /// Next frame payload, `None` once the connection is closed.
    async fn next_frame(&mut self) -> Option<Result<String>>;
}

/// Destination of each freshly rendered table body.
pub trait RenderSink {
    fn publish(&mut self, body: &TableBody) -> Result<()>;
}

/// What happens to the visible rows when a frame cannot be rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Leave the previous rows in place.
    #[default]
    KeepRows,
    /// Empty the table and publish the empty body.
    ClearRows,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LiveStats {
    pub frames_received: u64,
    /// Frames whose rows reached the sink
    pub frames_rendered: u64,
    pub frames_rejected: u64,
    /// Publications the sink refused (rendered or cleared tables alike)
    pub publish_failures: u64,
    /// Rows in the last table the sink accepted
    pub last_row_count: usize,
}

pub struct LiveRenderer<R> {
    renderer: R,
    body: TableBody,
    policy: ErrorPolicy,
    stats: LiveStats,
}

impl<R: Renderer> LiveRenderer<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            body: TableBody::new(),
            policy: ErrorPolicy::default(),
            stats: LiveStats::default(),
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn body(&self) -> &TableBody {
        &self.body
    }

    pub fn stats(&self) -> &LiveStats {
        &self.stats
    }

    /// Handle a single frame: render it fully, then replace and publish.
    pub fn handle_frame<K: RenderSink>(&mut self, payload: &str, sink: &mut K) -> Result<usize> {
        self.stats.frames_received += 1;

        match self.renderer.render(&mut self.body, payload) {
            Ok(count) => {
                self.publish(sink)?;
                self.stats.frames_rendered += 1;
                debug!("rendered {} rows", count);
                Ok(count)
            }
            Err(e) => {
                self.stats.frames_rejected += 1;
                if self.policy == ErrorPolicy::ClearRows {
                    self.body.clear();
                    self.publish(sink)?;
                }
                Err(e)
            }
        }
    }

    fn publish<K: RenderSink>(&mut self, sink: &mut K) -> Result<()> {
        if let Err(e) = sink.publish(&self.body) {
            self.stats.publish_failures += 1;
            return Err(e);
        }
        self.stats.last_row_count = self.body.len();
        Ok(())
    }

    /// Drive the loop until the source closes.
    ///
    /// Frame failures are logged and skipped; the next frame gets a fresh
    /// attempt. A transport error ends the loop, there is no reconnect.
    pub async fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<LiveStats>
    where
        S: FrameSource,
        K: RenderSink,
    {
        while let Some(frame) = source.next_frame().await {
            let payload = frame?;
            if let Err(e) = self.handle_frame(&payload, sink) {
                if e.is_payload_error() {
                    warn!("frame rejected ({:?} policy): {}", self.policy, e);
                } else {
                    warn!("failed to publish rendered table: {}", e);
                }
            }
        }

        info!(
            "connection closed after {} frames ({} rendered, {} rejected, {} publish failures)",
            self.stats.frames_received,
            self.stats.frames_rendered,
            self.stats.frames_rejected,
            self.stats.publish_failures
        );
        Ok(self.stats.clone())
    }
}
