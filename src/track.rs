use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Unknown,
    Towards,
    Away,
}

impl Direction {
    /// Moving down-frame is read as approaching the camera.
    #[inline]
    pub fn from_vertical_step(prev_y: i32, curr_y: i32) -> Self {
        if curr_y > prev_y {
            Direction::Towards
        } else {
            Direction::Away
        }
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        !matches!(self, Direction::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackState {
    pub track_id: u32,
    pub last_centroid: na::Point2<i32>,
    pub direction: Direction,

    // number of observations applied to this track
    pub sightings: u32,

    // index of the frame this track was last observed in
    pub last_seen: u64,
}

impl TrackState {
    pub fn new(track_id: u32, centroid: na::Point2<i32>, frame: u64) -> Self {
        Self {
            track_id,
            last_centroid: centroid,
            direction: Direction::Unknown,
            sightings: 1,
            last_seen: frame,
        }
    }

    pub fn observe(&mut self, centroid: na::Point2<i32>, frame: u64) {
        self.direction = Direction::from_vertical_step(self.last_centroid.y, centroid.y);
        self.last_centroid = centroid;
        self.sightings += 1;
        self.last_seen = frame;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_height_counts_as_away() {
        assert_eq!(Direction::from_vertical_step(20, 20), Direction::Away);
        assert_eq!(Direction::from_vertical_step(20, 19), Direction::Away);
        assert_eq!(Direction::from_vertical_step(20, 21), Direction::Towards);
    }

    #[test]
    fn second_sighting_sets_direction() {
        let mut state = TrackState::new(1, na::Point2::new(5, 5), 0);
        assert_eq!(state.direction, Direction::Unknown);

        state.observe(na::Point2::new(5, 9), 3);
        assert_eq!(state.direction, Direction::Towards);
        assert_eq!(state.sightings, 2);
        assert_eq!(state.last_seen, 3);
        assert_eq!(state.last_centroid, na::Point2::new(5, 9));
    }
}
