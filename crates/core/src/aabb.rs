use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::Plane;

/// Box sides in selection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    pub fn index(self) -> usize {
        match self {
            Face::PosX => 0,
            Face::NegX => 1,
            Face::PosY => 2,
            Face::NegY => 3,
            Face::PosZ => 4,
            Face::NegZ => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Face> {
        Face::ALL.get(index).copied()
    }

    pub fn axis(self) -> usize {
        self.index() / 2
    }

    pub fn is_positive(self) -> bool {
        self.index() % 2 == 0
    }
}

//        0 ----- 1
//        /|    /|
//       / |   / |
//      /  |  /  |
//    3 ----- 2  |
//     |  4|_|___|5
//     |  /  |   /
//     | /   |  /
//     |/    | /
//    7|_____|/6
//
// +Z is up (0..3), +Y is away from the viewer (0, 1, 4, 5).

/// Corner indices of each face, in `Face` order.
pub const FACE_CORNERS: [[usize; 4]; 6] = [
    [2, 1, 5, 6],
    [3, 7, 4, 0],
    [1, 0, 4, 5],
    [3, 2, 6, 7],
    [0, 1, 2, 3],
    [7, 6, 5, 4],
];

/// The 12 box edges, four per axis (x, then y, then z).
pub const EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [3, 2],
    [7, 6],
    [4, 5],
    [2, 1],
    [3, 0],
    [6, 5],
    [7, 4],
    [4, 0],
    [5, 1],
    [6, 2],
    [7, 3],
];

/// Faces bordering each entry of `EDGES`.
pub const EDGE_FACES: [[usize; 2]; 12] = [
    [4, 2],
    [4, 3],
    [5, 3],
    [5, 2],
    [4, 0],
    [4, 1],
    [5, 0],
    [5, 1],
    [1, 2],
    [2, 0],
    [0, 3],
    [3, 1],
];

/// Box stored as center plus half-widths along its local axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub origin: Vec3,
    pub extents: Vec3,
}

impl Aabb {
    pub fn new(origin: Vec3, extents: Vec3) -> Self {
        Self { origin, extents }
    }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            origin: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.origin - self.extents
    }

    pub fn max(&self) -> Vec3 {
        self.origin + self.extents
    }

    /// True when any axis has collapsed to zero.
    pub fn is_flat(&self) -> bool {
        self.extents.x == 0.0 || self.extents.y == 0.0 || self.extents.z == 0.0
    }

    fn oriented_axes(&self, rotation: &Mat4) -> [Vec3; 3] {
        [
            rotation.x_axis.truncate() * self.extents.x,
            rotation.y_axis.truncate() * self.extents.y,
            rotation.z_axis.truncate() * self.extents.z,
        ]
    }

    pub fn corners_oriented(&self, rotation: &Mat4) -> [Vec3; 8] {
        let [x, y, z] = self.oriented_axes(rotation);
        let o = self.origin;
        [
            o - x + y + z,
            o + x + y + z,
            o + x - y + z,
            o - x - y + z,
            o - x + y - z,
            o + x + y - z,
            o + x - y - z,
            o - x - y - z,
        ]
    }

    pub fn corners(&self) -> [Vec3; 8] {
        self.corners_oriented(&Mat4::IDENTITY)
    }

    /// Outward planes in `Face` order.
    pub fn planes_oriented(&self, rotation: &Mat4) -> [Plane; 6] {
        let [x, y, z] = self.oriented_axes(rotation);
        let axis_x = rotation.x_axis.truncate();
        let axis_y = rotation.y_axis.truncate();
        let axis_z = rotation.z_axis.truncate();
        let o = self.origin;
        [
            Plane::from_normal_point(axis_x, o + x),
            Plane::from_normal_point(-axis_x, o - x),
            Plane::from_normal_point(axis_y, o + y),
            Plane::from_normal_point(-axis_y, o - y),
            Plane::from_normal_point(axis_z, o + z),
            Plane::from_normal_point(-axis_z, o - z),
        ]
    }

    pub fn planes(&self) -> [Plane; 6] {
        self.planes_oriented(&Mat4::IDENTITY)
    }

    pub fn face_polygon(corners: &[Vec3; 8], face: Face) -> [Vec3; 4] {
        FACE_CORNERS[face.index()].map(|corner| corners[corner])
    }
}
