use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::marker::PhantomData;

pub trait BBoxFormat: std::fmt::Debug {}

/// Left-top-width-height format, contains left top corner and width-height
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ltwh;
impl BBoxFormat for Ltwh {}

/// Left-top-right-bottom format, contains left top and right bottom corners
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

/// Four coordinates tagged with their layout. Serialized as a plain `[f32; 4]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(transparent, bound = "")]
pub struct BBox<F: BBoxFormat>([f32; 4], #[serde(skip)] PhantomData<F>);

impl BBox<Ltwh> {
    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.0[3]
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], PhantomData)
    }

    #[inline]
    pub fn as_ltwh(&self) -> BBox<Ltwh> {
        self.into()
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.0[3]
    }

    /// Corners snapped to whole pixels (truncated toward zero).
    #[inline]
    pub fn pixels(&self) -> [i32; 4] {
        [
            self.left() as i32,
            self.top() as i32,
            self.right() as i32,
            self.bottom() as i32,
        ]
    }

    /// Integer center of the box: corners are truncated first, then the sum is halved.
    pub fn centroid(&self) -> na::Point2<i32> {
        let [l, t, r, b] = self.pixels();
        let cx = (l as i64 + r as i64) / 2;
        let cy = (t as i64 + b as i64) / 2;

        na::Point2::new(cx as i32, cy as i32)
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.left() < self.right() && self.top() < self.bottom())
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Ltwh> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        Self([v.0[0], v.0[1], v.0[2] - v.0[0], v.0[3] - v.0[1]], PhantomData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_of_integer_box() {
        let bbox = BBox::ltrb(10.0, 10.0, 30.0, 30.0);
        assert_eq!(bbox.centroid(), na::Point2::new(20, 20));
    }

    #[test]
    fn centroid_truncates_corners_then_halves() {
        // 10.9 -> 10, 21.7 -> 21, (10 + 21) / 2 = 15
        let bbox = BBox::ltrb(10.9, 3.2, 21.7, 8.9);
        assert_eq!(bbox.centroid(), na::Point2::new(15, 5));
    }

    #[test]
    fn centroid_of_degenerate_box_is_still_defined() {
        let bbox = BBox::ltrb(30.0, 40.0, 10.0, 20.0);
        assert!(bbox.is_degenerate());
        assert_eq!(bbox.centroid(), na::Point2::new(20, 30));
    }

    #[test]
    fn ltrb_to_ltwh() {
        let bbox = BBox::ltrb(10.0, 20.0, 40.0, 80.0).as_ltwh();
        assert_eq!(
            (bbox.left(), bbox.top(), bbox.width(), bbox.height()),
            (10.0, 20.0, 30.0, 60.0)
        );
    }

    #[test]
    fn serializes_as_plain_array() {
        let bbox = BBox::ltrb(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");

        let back: BBox<Ltrb> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bbox);
    }
}
