//! Geometry primitives for tracked surface patches.
//!
//! Bounding boxes live in anchor-local space; `Transform` places them in the
//! world. Extents follow the scan source's axes: x is width, y is height,
//! z is depth.

use core::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn norm(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).norm()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Axis-aligned bounding box given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of the given extents whose bottom face is centred on the origin.
    pub fn from_extents(width: f32, height: f32, depth: f32) -> Self {
        Self::new(
            Vec3::new(-width / 2.0, 0.0, -depth / 2.0),
            Vec3::new(width / 2.0, height, depth / 2.0),
        )
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn depth(&self) -> f32 {
        self.max.z - self.min.z
    }

    /// Y coordinate of the top face.
    #[inline]
    pub fn top_y(&self) -> f32 {
        self.max.y
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    pub fn volume(&self) -> f32 {
        if self.is_degenerate() {
            return 0.0;
        }
        self.width() * self.height() * self.depth()
    }

    /// Frontal area seen by the user (width * height).
    pub fn frontal_area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Non-finite, inverted, or zero-sized in every axis.
    pub fn is_degenerate(&self) -> bool {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return true;
        }
        let (w, h, d) = (self.width(), self.height(), self.depth());
        if w < 0.0 || h < 0.0 || d < 0.0 {
            return true;
        }
        w == 0.0 && h == 0.0 && d == 0.0
    }
}

/// Column-major 4x4 world transform (`cols[c][r]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub cols: [[f32; 4]; 4],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn from_translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [t.x, t.y, t.z, 1.0];
        m
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.cols[3][0], self.cols[3][1], self.cols[3][2])
    }

    /// Apply the transform to a point (w = 1). Projective terms are ignored.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let c = &self.cols;
        Vec3::new(
            c[0][0] * p.x + c[1][0] * p.y + c[2][0] * p.z + c[3][0],
            c[0][1] * p.x + c[1][1] * p.y + c[2][1] * p.z + c[3][1],
            c[0][2] * p.x + c[1][2] * p.y + c[2][2] * p.z + c[3][2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extents_follow_axes() {
        let b = BoundingBox::new(Vec3::new(-1.0, 0.0, -0.25), Vec3::new(1.2, 2.1, 0.05));
        assert!((b.width() - 2.2).abs() < 1e-6);
        assert!((b.height() - 2.1).abs() < 1e-6);
        assert!((b.depth() - 0.3).abs() < 1e-6);
        assert_eq!(b.top_y(), 2.1);
    }

    #[test]
    fn degenerate_boxes_have_zero_volume() {
        let zero = BoundingBox::new(Vec3::ZERO, Vec3::ZERO);
        assert!(zero.is_degenerate());
        assert_eq!(zero.volume(), 0.0);

        let inverted = BoundingBox::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 1.0));
        assert!(inverted.is_degenerate());

        let nan = BoundingBox::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(nan.is_degenerate());
    }

    #[test]
    fn flat_plane_is_not_degenerate() {
        let floor = BoundingBox::from_extents(3.0, 0.0, 3.0);
        assert!(!floor.is_degenerate());
        assert_eq!(floor.volume(), 0.0);
    }

    #[test]
    fn translation_moves_points() {
        let t = Transform::from_translation(Vec3::new(0.0, 0.0, -2.0));
        let p = t.transform_point(Vec3::new(0.5, 1.0, 0.0));
        assert_eq!(p, Vec3::new(0.5, 1.0, -2.0));
        assert_eq!(t.translation(), Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn rotation_about_y_applies_columns() {
        // 90 degrees about +y: x -> -z
        let t = Transform {
            cols: [
                [0.0, 0.0, -1.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        };
        let p = t.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p, Vec3::new(0.0, 0.0, -1.0));
    }
}
