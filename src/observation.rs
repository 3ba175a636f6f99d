use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};

/// One tracked detection as reported by the external tracker for a single frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TrackObservation {
    /// Stable identity assigned by the tracker, absent while the tracker has not confirmed one
    #[serde(rename = "id", default)]
    pub track_id: Option<u32>,
    #[serde(rename = "c")]
    pub class: i32,
    #[serde(rename = "p", default = "full_confidence")]
    pub confidence: f32,
    pub bbox: BBox<Ltrb>,
}

fn full_confidence() -> f32 {
    1.0
}

impl TrackObservation {
    pub fn new(track_id: Option<u32>, class: i32, bbox: BBox<Ltrb>) -> Self {
        Self {
            track_id,
            class,
            confidence: 1.0,
            bbox,
        }
    }

    #[inline]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    #[inline(always)]
    pub fn centroid(&self) -> na::Point2<i32> {
        self.bbox.centroid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_field_names() {
        let obs: TrackObservation =
            serde_json::from_str(r#"{"id": 5, "c": 0, "p": 0.75, "bbox": [10, 10, 30, 30]}"#)
                .unwrap();

        assert_eq!(obs.track_id, Some(5));
        assert_eq!(obs.class, 0);
        assert_eq!(obs.confidence, 0.75);
        assert_eq!(obs.centroid(), na::Point2::new(20, 20));
    }

    #[test]
    fn missing_id_and_confidence() {
        let obs: TrackObservation =
            serde_json::from_str(r#"{"c": 0, "bbox": [0, 0, 4, 4]}"#).unwrap();
        assert_eq!(obs.track_id, None);
        assert_eq!(obs.confidence, 1.0);

        let obs: TrackObservation =
            serde_json::from_str(r#"{"id": null, "c": 2, "bbox": [0, 0, 4, 4]}"#).unwrap();
        assert_eq!(obs.track_id, None);
    }
}
