use crate::observation::TrackObservation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub index: u64,
    pub timestamp: f32, // in seconds
    pub observations: Vec<TrackObservation>,
}

impl Frame {
    pub fn new(index: u64, timestamp: f32, observations: Vec<TrackObservation>) -> Self {
        Self {
            index,
            timestamp,
            observations,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &TrackObservation> {
        self.observations.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
