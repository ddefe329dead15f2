//! Geometry helpers for positioned keys

use serde::Serialize;

use crate::layout::Key;

/// Point in layout units (or scaled units when a key size is applied)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned bounds of a key set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }
}

/// Rotate `p` around `origin` by `angle` degrees (clockwise in screen space)
pub fn rotate_point(p: Point, origin: Point, angle: f64) -> Point {
    let (sin, cos) = angle.to_radians().sin_cos();
    let dx = p.x - origin.x;
    let dy = p.y - origin.y;
    Point {
        x: origin.x + dx * cos - dy * sin,
        y: origin.y + dx * sin + dy * cos,
    }
}

/// Corners of a key's primary rectangle after rotation, scaled by `unit`
pub fn key_corners(key: &Key, unit: f64) -> [Point; 4] {
    let (x, y) = (key.x * unit, key.y * unit);
    let (w, h) = (key.w * unit, key.h * unit);
    let corners = [
        Point { x, y },
        Point { x: x + w, y },
        Point { x: x + w, y: y + h },
        Point { x, y: y + h },
    ];
    if !key.is_rotated() {
        return corners;
    }
    let origin = Point {
        x: key.rotation_x * unit,
        y: key.rotation_y * unit,
    };
    corners.map(|p| rotate_point(p, origin, key.rotation_angle))
}

/// Bounding box of all keys, scaled by `unit`; empty input gives a zero box
pub fn bounding_box<'a>(keys: impl IntoIterator<Item = &'a Key>, unit: f64) -> BoundingBox {
    let mut corners = keys.into_iter().flat_map(|key| key_corners(key, unit));
    let Some(first) = corners.next() else {
        return BoundingBox::default();
    };

    let mut bounds = BoundingBox {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for corner in corners {
        bounds.include(corner);
    }
    bounds
}
