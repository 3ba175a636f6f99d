use serde_derive::Serialize;

use crate::bbox::{BBox, Ltrb};
use crate::track::Direction;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Red,
    White,
}

impl Color {
    /// Blue-green-red channel order, as frame buffers store them.
    #[inline]
    pub fn bgr(&self) -> (f64, f64, f64) {
        match self {
            Color::Green => (0.0, 255.0, 0.0),
            Color::Red => (0.0, 0.0, 255.0),
            Color::White => (255.0, 255.0, 255.0),
        }
    }
}

impl From<Direction> for Color {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Towards => Color::Green,
            Direction::Away => Color::Red,
            Direction::Unknown => Color::White,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Annotation {
    pub track_id: u32,
    pub bbox: BBox<Ltrb>,
    pub direction: Direction,
    pub color: Color,
}

impl Annotation {
    pub fn new(track_id: u32, bbox: BBox<Ltrb>, direction: Direction) -> Self {
        Self {
            track_id,
            bbox,
            direction,
            color: direction.into(),
        }
    }

    #[inline]
    pub fn label(&self) -> String {
        format!("ID {}", self.track_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_follows_direction() {
        let bbox = BBox::ltrb(0.0, 0.0, 1.0, 1.0);

        assert_eq!(Annotation::new(1, bbox, Direction::Towards).color, Color::Green);
        assert_eq!(Annotation::new(1, bbox, Direction::Away).color, Color::Red);
        assert_eq!(Annotation::new(1, bbox, Direction::Unknown).color, Color::White);
    }

    #[test]
    fn label_text() {
        let ann = Annotation::new(42, BBox::ltrb(0.0, 0.0, 1.0, 1.0), Direction::Unknown);
        assert_eq!(ann.label(), "ID 42");
    }
}
