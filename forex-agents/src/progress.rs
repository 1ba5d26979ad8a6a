use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// One step of the fixed pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Rate,
    News,
    Synthesis,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Rate, Stage::News, Stage::Synthesis];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Rate => "Collecting Exchange Rate Data",
            Stage::News => "Gathering Financial News",
            Stage::Synthesis => "Generating Analysis Report",
        }
    }

    /// Pipeline state while this stage runs.
    pub fn state(&self) -> PipelineState {
        match self {
            Stage::Rate => PipelineState::FetchingRate,
            Stage::News => PipelineState::FetchingNews,
            Stage::Synthesis => PipelineState::Synthesizing,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Rate => "rate",
            Stage::News => "news",
            Stage::Synthesis => "synthesis",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Started,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    FetchingRate,
    FetchingNews,
    Synthesizing,
    Complete,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed)
    }

    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Idle, FetchingRate)
            | (FetchingRate, FetchingNews)
            | (FetchingNews, Synthesizing)
            | (Synthesizing, Complete) => true,
            (FetchingRate | FetchingNews | Synthesizing, Failed) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressEvent {
    Transition { from: PipelineState, to: PipelineState },
    Stage { stage: Stage, status: StageStatus },
}

/// Receives progress checkpoints from a pipeline run.
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&self, _event: &ProgressEvent) {}
}

/// Logs every checkpoint through `tracing`.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Transition { from, to } => info!(?from, ?to, "pipeline state changed"),
            ProgressEvent::Stage { stage, status: StageStatus::Failed } => warn!(%stage, "stage failed"),
            ProgressEvent::Stage { stage, status } => info!(%stage, ?status, "{}", stage.label()),
        }
    }
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct CollectingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    /// States visited, starting from `Idle`.
    pub fn states(&self) -> Vec<PipelineState> {
        let events = self.events.lock();
        let mut states = vec![PipelineState::Idle];
        states.extend(events.iter().filter_map(|e| match e {
            ProgressEvent::Transition { to, .. } => Some(*to),
            _ => None,
        }));
        states
    }
}

impl ProgressSink for CollectingProgress {
    fn on_event(&self, event: &ProgressEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Forwards events to a channel. A dropped receiver is ignored.
pub struct ChannelProgress {
    tx: UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgress {
    fn on_event(&self, event: &ProgressEvent) {
        let _ = self.tx.send(event.clone());
    }
}
