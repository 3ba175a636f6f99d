pub mod annotation;
pub mod bbox;
pub mod classifier;
pub mod config;
pub mod error;
pub mod frame;
pub mod observation;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod track;

#[cfg(feature = "video")]
pub mod render;

pub use annotation::{Annotation, Color};
pub use classifier::{DirectionClassifier, FrameSummary};
pub use config::{ClassifierConfig, Config, DuplicatePolicy};
pub use error::Error;
pub use frame::Frame;
pub use observation::TrackObservation;
pub use pipeline::{Pipeline, RunStats};
pub use source::Tracker;
pub use track::{Direction, TrackState};
