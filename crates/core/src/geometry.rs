use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Plane in `dot(normal, p) = dist` form.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f32,
}

impl Plane {
    pub const fn new(normal: Vec3, dist: f32) -> Self {
        Self { normal, dist }
    }

    pub fn from_normal_point(normal: Vec3, point: Vec3) -> Self {
        Self {
            normal,
            dist: normal.dot(point),
        }
    }

    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            dist: -self.dist,
        }
    }

    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.dist
    }

    /// A zero normal marks "no plane".
    pub fn is_valid(&self) -> bool {
        self.normal != Vec3::ZERO
    }

    pub fn approx_eq(&self, other: &Plane, eps: f32) -> bool {
        (self.normal - other.normal).abs().max_element() <= eps
            && (self.dist - other.dist).abs() <= eps
    }

    /// Matches either orientation of `other`.
    pub fn approx_eq_unsigned(&self, other: &Plane, eps: f32) -> bool {
        self.approx_eq(other, eps) || self.approx_eq(&other.flipped(), eps)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Vec3,
    pub end: Vec3,
}

impl Line {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    pub fn length_squared(&self) -> f32 {
        self.direction().length_squared()
    }

    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let dir = self.direction();
        let len_sq = dir.length_squared();
        if len_sq <= f32::EPSILON {
            return self.start;
        }
        let t = ((point - self.start).dot(dir) / len_sq).clamp(0.0, 1.0);
        self.start + dir * t
    }
}
