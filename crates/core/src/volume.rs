use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};
use serde::{Deserialize, Serialize};

use crate::geometry::Line;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub target: [f32; 3],
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            target: [0.0, 0.0, 0.0],
            distance: 10.0,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl CameraState {
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.target) + self.orbit_direction() * self.distance.max(0.1)
    }

    pub fn forward(&self) -> Vec3 {
        (Vec3::from(self.target) - self.position()).normalize_or_zero()
    }

    fn orbit_direction(&self) -> Vec3 {
        let pitch = self.pitch.clamp(-1.54, 1.54);
        let yaw = self.yaw;
        let cos_pitch = pitch.cos();
        let sin_pitch = pitch.sin();
        let cos_yaw = yaw.cos();
        let sin_yaw = yaw.sin();
        Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    Perspective {
        fov_y_deg: f32,
        near: f32,
        far: f32,
    },
    /// `fill` marks a full-screen ortho view where only one plane may be picked.
    Orthographic {
        half_height: f32,
        near: f32,
        far: f32,
        #[serde(default)]
        fill: bool,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y_deg: 45.0,
            near: 0.01,
            far: 1000.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        let aspect = aspect.max(1.0e-3);
        match *self {
            Projection::Perspective {
                fov_y_deg,
                near,
                far,
            } => Mat4::perspective_rh(fov_y_deg.to_radians(), aspect, near, far),
            Projection::Orthographic {
                half_height,
                near,
                far,
                ..
            } => {
                let half_width = half_height * aspect;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    near,
                    far,
                )
            }
        }
    }

    pub fn fill(&self) -> bool {
        matches!(self, Projection::Orthographic { fill: true, .. })
    }

    /// Eye position used for viewing and for facing tests.
    ///
    /// An orthographic view has no real eye, so it is placed half the depth
    /// range behind the target and the visible slab stays centered on it.
    pub fn eye(&self, camera: &CameraState) -> Vec3 {
        match *self {
            Projection::Perspective { .. } => camera.position(),
            Projection::Orthographic { near, far, .. } => {
                Vec3::from(camera.target) - camera.forward() * (0.5 * (near + far))
            }
        }
    }

    pub fn view_matrix(&self, camera: &CameraState) -> Mat4 {
        Mat4::look_at_rh(self.eye(camera), Vec3::from(camera.target), Vec3::Y)
    }
}

/// Hit quality for a pick: lower `distance` wins, then lower `depth`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionIntersection {
    pub depth: f32,
    pub distance: f32,
}

impl Default for SelectionIntersection {
    fn default() -> Self {
        Self {
            depth: 1.0,
            distance: 2.0,
        }
    }
}

impl SelectionIntersection {
    pub fn new(depth: f32, distance: f32) -> Self {
        Self { depth, distance }
    }

    pub fn is_valid(&self) -> bool {
        self.depth < 1.0
    }

    pub fn is_closer_than(&self, other: &SelectionIntersection) -> bool {
        if self.distance == other.distance {
            return self.depth < other.depth;
        }
        self.distance < other.distance
    }
}

/// Pick volume around the cursor.
///
/// `view_proj` maps world space into a pick space where the cursor sits at
/// x = y = 0 and the pick window spans [-1, 1]. Depth runs 0 (near) to 1 (far).
#[derive(Debug, Clone, Copy)]
pub struct SelectionVolume {
    view_proj: Mat4,
    screen_to_world: Mat4,
    modelview: Mat4,
    view_dir: Vec3,
    viewer: Vec3,
    fill: bool,
}

impl SelectionVolume {
    pub fn new(
        camera: &CameraState,
        projection: &Projection,
        aspect: f32,
        cursor: Vec2,
        pick_size: Vec2,
    ) -> Self {
        let eye = projection.eye(camera);
        let modelview = projection.view_matrix(camera);
        let camera_view_proj = projection.matrix(aspect) * modelview;
        let pick_size = pick_size.max(Vec2::splat(1.0e-6));
        let scissor = Mat4::from_scale(Vec3::new(1.0 / pick_size.x, 1.0 / pick_size.y, 1.0))
            * Mat4::from_translation(Vec3::new(-cursor.x, -cursor.y, 0.0));
        Self::from_matrices(
            scissor * camera_view_proj,
            modelview,
            eye,
            projection.fill(),
        )
    }

    /// Builds a volume from an already-scissored pick matrix.
    pub fn from_matrices(view_proj: Mat4, modelview: Mat4, viewer: Vec3, fill: bool) -> Self {
        let screen_to_world = view_proj.inverse();
        let near = screen_to_world.project_point3(Vec3::ZERO);
        let far = screen_to_world.project_point3(Vec3::Z);
        Self {
            view_proj,
            screen_to_world,
            modelview,
            view_dir: (far - near).normalize_or_zero(),
            viewer,
            fill,
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        self.view_proj
    }

    pub fn screen_to_world(&self) -> Mat4 {
        self.screen_to_world
    }

    pub fn modelview(&self) -> Mat4 {
        self.modelview
    }

    pub fn view_dir(&self) -> Vec3 {
        self.view_dir
    }

    pub fn viewer(&self) -> Vec3 {
        self.viewer
    }

    pub fn fill(&self) -> bool {
        self.fill
    }

    /// World point to pick-space coordinates.
    pub fn project(&self, world: Vec3) -> Vec3 {
        self.view_proj.project_point3(world)
    }

    pub fn unproject(&self, pick: Vec3) -> Vec3 {
        self.screen_to_world.project_point3(pick)
    }

    /// Tests the cursor against a planar quad.
    pub fn test_quad(&self, points: &[Vec3; 4]) -> SelectionIntersection {
        let clip = points.map(|point| self.view_proj * point.extend(1.0));
        let clipped = clip_polygon_by_near_plane(&clip);
        let mut best = SelectionIntersection::default();
        if clipped.len() < 3 {
            return best;
        }
        let ndc: Vec<Vec3> = clipped.iter().map(|c| c.xyz() / c.w).collect();

        for i in 1..ndc.len() - 1 {
            if let Some(depth) = triangle_depth_at_origin(ndc[0], ndc[i], ndc[i + 1]) {
                let hit = SelectionIntersection::new(depth, 0.0);
                if hit.is_closer_than(&best) {
                    best = hit;
                }
            }
        }
        if best.distance == 0.0 {
            return best;
        }

        for i in 0..ndc.len() {
            let a = ndc[i];
            let b = ndc[(i + 1) % ndc.len()];
            let (point, distance) = closest_on_segment_2d(a, b);
            if distance <= 1.0 {
                let hit = SelectionIntersection::new(point.z, distance);
                if hit.is_closer_than(&best) {
                    best = hit;
                }
            }
        }
        best
    }

    /// Clips `line` to the visible side of the near plane and rewrites it in
    /// pick space. Returns 2 when a visible part remains, 0 otherwise.
    pub fn clip_line_by_near_plane(&self, line: &mut Line) -> usize {
        let mut p0 = self.view_proj * line.start.extend(1.0);
        let mut p1 = self.view_proj * line.end.extend(1.0);
        let in0 = p0.z >= 0.0;
        let in1 = p1.z >= 0.0;
        match (in0, in1) {
            (false, false) => return 0,
            (true, false) => p1 = near_plane_crossing(p0, p1),
            (false, true) => p0 = near_plane_crossing(p0, p1),
            (true, true) => {}
        }
        line.start = p0.xyz() / p0.w;
        line.end = p1.xyz() / p1.w;
        2
    }
}

fn near_plane_crossing(a: Vec4, b: Vec4) -> Vec4 {
    let t = a.z / (a.z - b.z);
    let mut hit = a.lerp(b, t);
    hit.z = 0.0;
    hit
}

fn clip_polygon_by_near_plane(points: &[Vec4]) -> Vec<Vec4> {
    let mut out = Vec::with_capacity(points.len() + 1);
    for i in 0..points.len() {
        let current = points[i];
        let next = points[(i + 1) % points.len()];
        let current_in = current.z >= 0.0;
        let next_in = next.z >= 0.0;
        if current_in {
            out.push(current);
        }
        if current_in != next_in {
            out.push(near_plane_crossing(current, next));
        }
    }
    out
}

fn cross_2d(a: Vec3, b: Vec3) -> f32 {
    a.x * b.y - a.y * b.x
}

fn triangle_depth_at_origin(a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let area = cross_2d(b - a, c - a);
    if area.abs() <= f32::EPSILON {
        return None;
    }
    let wa = cross_2d(b, c) / area;
    let wb = cross_2d(c, a) / area;
    let wc = cross_2d(a, b) / area;
    if wa < 0.0 || wb < 0.0 || wc < 0.0 {
        return None;
    }
    Some(a.z * wa + b.z * wb + c.z * wc)
}

fn closest_on_segment_2d(a: Vec3, b: Vec3) -> (Vec3, f32) {
    let ab = (b - a).truncate();
    let len_sq = ab.length_squared();
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (-a.truncate().dot(ab) / len_sq).clamp(0.0, 1.0)
    };
    let point = a.lerp(b, t);
    (point, point.truncate().length())
}
