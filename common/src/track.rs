use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a track: the (artist, title) pair.
///
/// Two candidates are the same track exactly when their keys are equal;
/// comparison is case sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackKey {
    pub artist: String,
    pub title: String,
}

impl TrackKey {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// The knowledge sources that read and write the blackboard.
///
/// Doubles as the provenance tag on candidates and hypotheses and as the
/// subscription token candidates hold for feedback delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceId {
    Info,
    Similar,
    Tags,
    Playcount,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceId::Info => "InfoSource",
            SourceId::Similar => "SimilarTrackSource",
            SourceId::Tags => "TagSource",
            SourceId::Playcount => "PlaycountSource",
        };
        f.write_str(name)
    }
}

/// User reaction to a presented recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    Accepted,
    Rejected,
}

/// A track under consideration as a recommendation.
///
/// Created by a knowledge source after an external lookup and owned by the
/// blackboard once admitted to the pool. Tags are fetched lazily and cached
/// here; `extra` keeps provider fields the engine has no named slot for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub key: TrackKey,
    pub listeners: u64,
    pub duration_secs: u64,
    pub playcount: u64,
    pub url: Option<String>,
    pub tags: Option<Vec<String>>,
    /// The source that produced this candidate.
    pub source: SourceId,
    subscribers: Vec<SourceId>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Candidate {
    pub fn new(key: TrackKey, source: SourceId) -> Self {
        Self {
            key,
            listeners: 0,
            duration_secs: 0,
            playcount: 0,
            url: None,
            tags: None,
            source,
            subscribers: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Register a source's interest in feedback on this candidate.
    ///
    /// Subscribing twice is a no-op: each source is notified at most once
    /// per feedback event, in first-subscription order.
    pub fn subscribe(&mut self, source: SourceId) {
        if !self.subscribers.contains(&source) {
            self.subscribers.push(source);
        }
    }

    pub fn unsubscribe(&mut self, source: SourceId) {
        self.subscribers.retain(|s| *s != source);
    }

    /// Interested sources, in subscription order.
    pub fn subscribers(&self) -> &[SourceId] {
        &self.subscribers
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, listeners: {}, duration: {}, playcount: {}",
            self.key, self.listeners, self.duration_secs, self.playcount
        )?;
        match &self.tags {
            Some(tags) => {
                let shown: Vec<&str> = tags.iter().take(3).map(String::as_str).collect();
                write!(f, ", tags: {:?}", shown)?;
                if tags.len() > 3 {
                    write!(f, " ({} more)...", tags.len() - 3)?;
                }
                Ok(())
            }
            None => write!(f, ", tags: none"),
        }
    }
}
