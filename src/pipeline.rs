use tracing::{debug, info};

use crate::classifier::{DirectionClassifier, FrameSummary};
use crate::error::Error;
use crate::sink::FrameSink;
use crate::source::Tracker;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub annotated: u64,
    pub total_tracked: usize,
    pub towards_count: usize,
}

/// Pulls frames from a [`Tracker`] one at a time, classifies them and hands every
/// result to all sinks before asking for the next frame.
pub struct Pipeline<T> {
    tracker: T,
    classifier: DirectionClassifier,
    sinks: Vec<Box<dyn FrameSink>>,
    progress_every: u64,
}

impl<T: Tracker> Pipeline<T> {
    pub fn new(tracker: T, classifier: DirectionClassifier) -> Self {
        Self {
            tracker,
            classifier,
            sinks: Vec::new(),
            progress_every: 0,
        }
    }

    pub fn with_sink<S: FrameSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.sinks.push(sink);
    }

    pub fn progress_every(mut self, frames: u64) -> Self {
        self.progress_every = frames;
        self
    }

    #[inline]
    pub fn classifier(&self) -> &DirectionClassifier {
        &self.classifier
    }

    /// Processes a single frame. Returns `Ok(None)` at end of stream.
    pub fn step(&mut self) -> Result<Option<FrameSummary>, Error> {
        let frame = match self.tracker.next_frame_tracks()? {
            Some(frame) => frame,
            None => return Ok(None),
        };

        let summary = self.classifier.process_frame(&frame);

        debug!(
            frame = frame.index,
            observations = frame.len(),
            annotated = summary.annotations.len(),
            total = summary.total_tracked,
            towards = summary.towards_count,
            "frame classified"
        );

        for sink in &mut self.sinks {
            sink.write(&frame, &summary)?;
        }

        Ok(Some(summary))
    }

    /// Drains the tracker and finishes every sink.
    pub fn run(mut self) -> Result<(RunStats, DirectionClassifier), Error> {
        let mut stats = RunStats::default();

        info!(sinks = self.sinks.len(), "starting direction classification");

        while let Some(summary) = self.step()? {
            stats.frames += 1;
            stats.annotated += summary.annotations.len() as u64;
            stats.total_tracked = summary.total_tracked;
            stats.towards_count = summary.towards_count;

            if self.progress_every > 0 && stats.frames % self.progress_every == 0 {
                info!(
                    frames = stats.frames,
                    total = stats.total_tracked,
                    towards = stats.towards_count,
                    "progress"
                );
            }
        }

        for sink in &mut self.sinks {
            sink.finish()?;
        }

        info!(
            frames = stats.frames,
            total = stats.total_tracked,
            towards = stats.towards_count,
            "classification complete"
        );

        Ok((stats, self.classifier))
    }
}
