//! Event-bus protocol shared by all runtime components.
//!
//! This module defines the message payloads exchanged between the session
//! manager, the sampling worker and the display layer.

use crate::backends::CatalogRecord;
use crate::sampler::DrawOutcome;

/// Top-level envelope for all bus traffic.
#[derive(Debug, Clone)]
pub enum Message {
    Session(SessionMessage),
}

/// Render-ready view of the sampling session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    /// Incremented on every published snapshot.
    pub version: u64,
    /// Most recently accepted record, if any draw has succeeded.
    pub record: Option<CatalogRecord>,
    pub in_progress: bool,
    /// Exclusion tokens in display order.
    pub exclusions: Vec<String>,
}

/// Session-domain commands and notifications.
#[derive(Debug, Clone)]
pub enum SessionMessage {
    /// User asked for the next record. Ignored while a draw is running.
    RequestNext,
    /// User clicked a displayed value.
    ExcludeValue(String),
    /// User removed a token from the exclusion list.
    UnexcludeValue(String),
    /// User removed the token at a display position.
    UnexcludeAt(usize),
    RequestSnapshot,
    /// Posted by the sampling worker when its draw ends.
    /// `outcome` is `None` when the sampler refused an overlapping draw.
    DrawFinished {
        draw_id: String,
        outcome: Option<DrawOutcome>,
    },
    SnapshotUpdated(SessionSnapshot),
    ExclusionListChanged(Vec<String>),
    /// No admissible record was found within the retry bound.
    NoAdmissibleRecord {
        attempts: u32,
    },
}
