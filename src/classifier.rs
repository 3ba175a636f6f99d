use std::collections::{HashMap, HashSet};

use serde_derive::Serialize;
use tracing::debug;

use crate::annotation::Annotation;
use crate::config::{ClassifierConfig, DuplicatePolicy};
use crate::frame::Frame;
use crate::observation::TrackObservation;
use crate::track::{Direction, TrackState};

/// Per-frame output of [`DirectionClassifier::process_frame`].
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub frame: u64,
    pub timestamp: f32,
    pub total_tracked: usize,
    pub towards_count: usize,
    pub annotations: Vec<Annotation>,
}

/// Infers whether each tracked person walks towards or away from the camera from the
/// vertical displacement of its centroid between consecutive sightings, and keeps
/// cumulative counts over the whole stream.
///
/// Frames have to be fed in their original order. Counts only ever grow: a track that
/// received a direction keeps contributing to `total_tracked` even while it is not
/// observed, and also after it has been evicted.
#[derive(Debug, Clone)]
pub struct DirectionClassifier {
    config: ClassifierConfig,
    tracks: HashMap<u32, TrackState>,
    retired_total: usize,
    retired_towards: usize,
    frames_processed: u64,
}

impl DirectionClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            tracks: HashMap::new(),
            retired_total: 0,
            retired_towards: 0,
            frames_processed: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn process_frame(&mut self, frame: &Frame) -> FrameSummary {
        let accepted = self.select(frame);
        let mut annotations = Vec::with_capacity(accepted.len());

        for (track_id, obs) in accepted {
            if obs.bbox.is_degenerate() {
                debug!(frame = frame.index, track_id, bbox = ?obs.bbox, "degenerate box");
            }

            let centroid = obs.centroid();

            let direction = match self.tracks.get_mut(&track_id) {
                Some(state) => {
                    state.observe(centroid, frame.index);
                    state.direction
                }
                None => {
                    self.tracks
                        .insert(track_id, TrackState::new(track_id, centroid, frame.index));
                    Direction::Unknown
                }
            };

            annotations.push(Annotation::new(track_id, obs.bbox, direction));
        }

        if let Some(max_unseen) = self.config.evict_after {
            self.evict(frame.index, max_unseen);
        }

        self.frames_processed += 1;

        let (total_tracked, towards_count) = self.totals();

        FrameSummary {
            frame: frame.index,
            timestamp: frame.timestamp,
            total_tracked,
            towards_count,
            annotations,
        }
    }

    /// Cumulative `(total_tracked, towards_count)` over every track seen so far.
    pub fn totals(&self) -> (usize, usize) {
        let mut total = self.retired_total;
        let mut towards = self.retired_towards;

        for state in self.tracks.values() {
            match state.direction {
                Direction::Towards => {
                    total += 1;
                    towards += 1;
                }
                Direction::Away => total += 1,
                Direction::Unknown => {}
            }
        }

        (total, towards)
    }

    #[inline]
    pub fn state(&self, track_id: u32) -> Option<&TrackState> {
        self.tracks.get(&track_id)
    }

    #[inline]
    pub fn tracks(&self) -> impl Iterator<Item = &TrackState> {
        self.tracks.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[inline]
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn reset(&mut self) {
        self.tracks.clear();
        self.retired_total = 0;
        self.retired_towards = 0;
        self.frames_processed = 0;
    }

    fn accepts(&self, obs: &TrackObservation) -> Option<u32> {
        // NaN confidences never pass the floor
        if obs.class != self.config.person_class || !(obs.confidence >= self.config.min_confidence) {
            return None;
        }

        obs.track_id
    }

    /// Filters the frame down to person observations with an identity. Unless the policy is
    /// `Sequential`, only one observation per track id is kept. Input order is preserved.
    fn select<'a>(&self, frame: &'a Frame) -> Vec<(u32, &'a TrackObservation)> {
        let candidates: Vec<_> = frame
            .iter()
            .filter_map(|obs| Some((self.accepts(obs)?, obs)))
            .collect();

        if self.config.duplicate_policy == DuplicatePolicy::Sequential {
            return candidates;
        }

        let mut winners: HashMap<u32, usize> = HashMap::with_capacity(candidates.len());
        let mut duplicated = HashSet::new();

        for (idx, &(id, obs)) in candidates.iter().enumerate() {
            match winners.get(&id) {
                None => {
                    winners.insert(id, idx);
                }
                Some(&best) => {
                    duplicated.insert(id);

                    let replace = match self.config.duplicate_policy {
                        DuplicatePolicy::Sequential | DuplicatePolicy::LastWins => true,
                        DuplicatePolicy::FirstWins => false,
                        DuplicatePolicy::HighestConfidence => {
                            obs.confidence > candidates[best].1.confidence
                        }
                    };

                    if replace {
                        winners.insert(id, idx);
                    }
                }
            }
        }

        if !duplicated.is_empty() {
            debug!(
                frame = frame.index,
                ids = ?duplicated,
                "duplicate track ids in frame, resolved by {:?}",
                self.config.duplicate_policy
            );
        }

        candidates
            .into_iter()
            .enumerate()
            .filter(|(idx, (id, _))| winners.get(id) == Some(idx))
            .map(|(_, item)| item)
            .collect()
    }

    fn evict(&mut self, now: u64, max_unseen: u64) {
        let mut evicted = Vec::new();

        self.tracks.retain(|&id, state| {
            let keep = now.saturating_sub(state.last_seen) <= max_unseen;
            if !keep {
                evicted.push((id, state.direction));
            }
            keep
        });

        for (id, direction) in evicted {
            debug!(track_id = id, ?direction, "evicting stale track");

            match direction {
                Direction::Towards => {
                    self.retired_total += 1;
                    self.retired_towards += 1;
                }
                Direction::Away => self.retired_total += 1,
                Direction::Unknown => {}
            }
        }
    }
}

impl Default for DirectionClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}
