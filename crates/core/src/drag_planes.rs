use glam::{Mat4, Vec3};
use tracing::{debug, trace};

use crate::aabb::{Aabb, Face, EDGES, EDGE_FACES};
use crate::geometry::{Line, Plane};
use crate::selectable::{ObservedSelectable, SelectedPlanes, SelectionChangeCallback, Selector};
use crate::settings::PickSettings;
use crate::volume::{SelectionIntersection, SelectionVolume};

/// Rotates a world-space translation into the frame of `local`.
/// `local` must be a pure rotation.
pub fn translation_to_local(translation: Vec3, local: &Mat4) -> Vec3 {
    (local.transpose() * Mat4::from_translation(translation) * *local)
        .w_axis
        .truncate()
}

/// Inverse of [`translation_to_local`]. `local` must be a pure rotation.
pub fn translation_from_local(translation: Vec3, local: &Mat4) -> Vec3 {
    (*local * Mat4::from_translation(translation) * local.transpose())
        .w_axis
        .truncate()
}

/// Scale about `pivot` instead of the coordinate origin.
pub fn pivoted_scale(scale: Vec3, pivot: Vec3) -> Mat4 {
    Mat4::from_translation(pivot) * Mat4::from_scale(scale) * Mat4::from_translation(-pivot)
}

/// Running best candidate shared by the direct and indirect resolvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestPlaneData {
    pub plane: Plane,
    pub intersection: SelectionIntersection,
    pub closest_point: Vec3,
    pub dist: f32,
}

impl Default for BestPlaneData {
    fn default() -> Self {
        Self {
            plane: Plane::default(),
            intersection: SelectionIntersection::default(),
            closest_point: Vec3::ZERO,
            dist: f32::MAX,
        }
    }
}

impl BestPlaneData {
    pub fn is_valid(&self) -> bool {
        self.plane.is_valid()
    }

    /// True when the plane came from an actual cursor hit on a face.
    pub fn is_direct(&self) -> bool {
        self.intersection.is_valid()
    }
}

/// Per-face selection and resize state for a box being manipulated.
#[derive(Debug, Clone)]
pub struct DragPlanes {
    selectables: [ObservedSelectable; 6],
    bounds: Aabb,
    settings: PickSettings,
}

impl DragPlanes {
    pub fn new(on_changed: SelectionChangeCallback) -> Self {
        Self::with_settings(on_changed, PickSettings::default())
    }

    pub fn with_settings(on_changed: SelectionChangeCallback, settings: PickSettings) -> Self {
        Self {
            selectables: std::array::from_fn(|_| ObservedSelectable::new(on_changed.clone())),
            bounds: Aabb::default(),
            settings,
        }
    }

    /// Box captured by the last pick; resize evaluation starts from it.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn is_selected(&self) -> bool {
        self.selectables.iter().any(ObservedSelectable::is_selected)
    }

    pub fn set_selected(&mut self, selected: bool) {
        for selectable in &mut self.selectables {
            selectable.set_selected(selected);
        }
    }

    pub fn selectables(&self) -> &[ObservedSelectable; 6] {
        &self.selectables
    }

    pub fn selectable_mut(&mut self, face: Face) -> &mut ObservedSelectable {
        &mut self.selectables[face.index()]
    }

    pub fn is_face_selected(&self, face: Face) -> bool {
        self.selectables[face.index()].is_selected()
    }

    pub fn selected_faces(&self) -> Vec<Face> {
        Face::ALL
            .into_iter()
            .filter(|face| self.is_face_selected(*face))
            .collect()
    }

    /// Screen-space face pick.
    ///
    /// A face is a candidate when the cursor ray, taken at the depth of the
    /// face centroid, lies on the outer side of the face plane. The candidate
    /// whose normal is closest to perpendicular with the view direction wins;
    /// outside fill mode a runner-up within `face_tie_epsilon` is picked too.
    pub fn select_planes(
        &mut self,
        aabb: &Aabb,
        selector: &mut dyn Selector,
        volume: &SelectionVolume,
        on_plane: &mut dyn FnMut(&Plane),
        rotation: &Mat4,
    ) {
        let corners = aabb.corners_oriented(rotation);
        let planes = aabb.planes_oriented(rotation);
        let view_dir = volume.view_dir();
        let eps = self.settings.face_tie_epsilon;

        let mut best_dot = 1.0_f32;
        let mut picked: [Option<usize>; 2] = [None, None];

        for face in Face::ALL {
            let i = face.index();
            let quad = Aabb::face_polygon(&corners, face);
            let centroid = (quad[0] + quad[2]) * 0.5;
            let depth = volume.project(centroid).z;
            let closest_point = volume.unproject(Vec3::new(0.0, 0.0, depth));
            let normal = planes[i].normal;
            if quad
                .iter()
                .all(|corner| normal.dot(closest_point - *corner) > 0.0)
            {
                let dot = normal.dot(view_dir).abs();
                let diff = best_dot - dot;
                if diff > eps {
                    best_dot = dot;
                    picked = [Some(i), None];
                } else if diff.abs() <= eps && !volume.fill() {
                    picked[1] = Some(i);
                }
            }
        }

        for i in picked.into_iter().flatten() {
            trace!(face = ?Face::ALL[i], "face picked");
            selector.add(&mut self.selectables[i]);
            on_plane(&planes[i]);
        }

        self.bounds = *aabb;
    }

    /// Selects faces whose flipped plane is in `selected`.
    pub fn select_reversed_planes(
        &mut self,
        aabb: &Aabb,
        selector: &mut dyn Selector,
        selected: &dyn SelectedPlanes,
        rotation: &Mat4,
    ) {
        let planes = aabb.planes_oriented(rotation);
        for (selectable, plane) in self.selectables.iter_mut().zip(planes.iter()) {
            if selected.contains(&plane.flipped()) {
                selector.add(selectable);
            }
        }
    }

    /// Ray-against-face picking. Thin axes get a minimum thickness first.
    pub fn best_plane_direct(
        &mut self,
        aabb: &Aabb,
        volume: &SelectionVolume,
        data: &mut BestPlaneData,
        rotation: &Mat4,
    ) {
        let mut inflated = *aabb;
        for axis in 0..3 {
            if inflated.extents[axis] < self.settings.flat_extent_threshold {
                inflated.extents[axis] = self.settings.flat_extent_inflate;
            }
        }

        let corners = inflated.corners_oriented(rotation);
        let planes = inflated.planes_oriented(rotation);

        for face in Face::ALL {
            let intersection = volume.test_quad(&Aabb::face_polygon(&corners, face));
            if intersection.is_closer_than(&data.intersection) {
                data.intersection = intersection;
                data.plane = planes[face.index()];
            }
        }

        self.bounds = *aabb;
    }

    /// Edge-based picking for boxes too small or thin to hit directly.
    ///
    /// The edge nearest the cursor wins; on a near tie the edge pointing less
    /// directly at the cursor wins. The plane is then chosen among the two
    /// faces bordering that edge, never a face along a collapsed axis.
    pub fn best_plane_indirect(
        &mut self,
        aabb: &Aabb,
        volume: &SelectionVolume,
        data: &mut BestPlaneData,
        rotation: &Mat4,
    ) {
        let corners = aabb.corners_oriented(rotation);
        let planes = aabb.planes_oriented(rotation);
        let extents = aabb.extents;
        let eps = self.settings.edge_dist_epsilon;
        let some_extent_zero = aabb.is_flat();
        let view_dir = volume.view_dir();
        let viewer = volume.viewer();

        // Never pick a face lying on a collapsed axis; fall back to its neighbour.
        let usable = |face: usize, other: usize| {
            if extents[face / 2] == 0.0 {
                other
            } else {
                face
            }
        };

        let mut dot = 1.0_f32;
        for (edge_index, (edge, faces)) in EDGES.iter().zip(EDGE_FACES.iter()).enumerate() {
            if extents[edge_index / 4] == 0.0 {
                continue;
            }
            let mut line = Line::new(corners[edge[0]], corners[edge[1]]);
            if volume.clip_line_by_near_plane(&mut line) != 2 {
                continue;
            }

            let point_new = line.closest_point(Vec3::ZERO);
            let dist_new = point_new.length_squared();
            let dot_new = point_new
                .normalize_or_zero()
                .dot(line.direction().normalize_or_zero())
                .abs();

            let closer = data.dist - dist_new > eps;
            let ambiguous = (dist_new - data.dist).abs() < eps && dot_new < dot;
            if !closer && !ambiguous {
                continue;
            }

            let [face1, face2] = *faces;
            let chosen = if volume.fill() {
                if planes[face1].distance_to_point(viewer) <= 0.0 {
                    Some(usable(face1, face2))
                } else if planes[face2].distance_to_point(viewer) <= 0.0 {
                    Some(usable(face2, face1))
                } else {
                    None
                }
            } else if some_extent_zero || line.length_squared() > self.settings.edge_length_epsilon
            {
                let dot1 = planes[face1].normal.dot(view_dir).abs();
                let dot2 = planes[face2].normal.dot(view_dir).abs();
                if dot1 < dot2 {
                    Some(usable(face1, face2))
                } else {
                    Some(usable(face2, face1))
                }
            } else {
                None
            };

            if let Some(face) = chosen {
                trace!(
                    edge = edge_index,
                    face = ?Face::from_index(face),
                    dist = dist_new,
                    "edge candidate"
                );
                data.plane = planes[face];
                data.closest_point = point_new;
                data.dist = dist_new;
                dot = dot_new;
            }
        }

        self.bounds = *aabb;
    }

    /// Direct pick first, edge-based fallback second, then selects the
    /// resulting face.
    pub fn resolve_best_plane(
        &mut self,
        aabb: &Aabb,
        volume: &SelectionVolume,
        rotation: &Mat4,
    ) -> BestPlaneData {
        let mut data = BestPlaneData::default();
        self.best_plane_direct(aabb, volume, &mut data, rotation);
        if !data.is_direct() {
            self.best_plane_indirect(aabb, volume, &mut data, rotation);
        }
        if data.is_valid() {
            debug!(plane = ?data.plane, direct = data.is_direct(), "best plane resolved");
            self.select_by_plane(aabb, &data.plane, rotation);
        }
        data
    }

    pub fn select_by_plane(&mut self, aabb: &Aabb, plane: &Plane, rotation: &Mat4) {
        let planes = aabb.planes_oriented(rotation);
        let eps = self.settings.plane_epsilon;
        if let Some(i) = planes
            .iter()
            .position(|candidate| plane.approx_eq_unsigned(candidate, eps))
        {
            self.selectables[i].set_selected(true);
        }
    }

    /// Appends the corners of the face matching `plane`, if any.
    pub fn gather_polygons_by_plane(
        &self,
        aabb: &Aabb,
        plane: &Plane,
        polygons: &mut Vec<Vec<Vec3>>,
        rotation: &Mat4,
    ) {
        let corners = aabb.corners_oriented(rotation);
        let planes = aabb.planes_oriented(rotation);
        let eps = self.settings.plane_epsilon;
        if let Some(face) = Face::ALL
            .into_iter()
            .find(|face| plane.approx_eq_unsigned(&planes[face.index()], eps))
        {
            polygons.push(Aabb::face_polygon(&corners, face).to_vec());
        }
    }

    pub fn evaluate_resize(&self, translation: Vec3) -> Aabb {
        let mut min = self.bounds.min();
        let mut max = self.bounds.max();
        for face in Face::ALL {
            let axis = face.axis();
            if self.bounds.extents[axis] == 0.0 || !self.is_face_selected(face) {
                continue;
            }
            if face.is_positive() {
                max[axis] += translation[axis];
            } else {
                min[axis] += translation[axis];
            }
        }
        Aabb::from_min_max(min, max)
    }

    /// Resize for a box oriented by the pure rotation `rotation`.
    pub fn evaluate_resize_rotated(&self, translation: Vec3, rotation: &Mat4) -> Aabb {
        let mut aabb = self.evaluate_resize(translation_to_local(translation, rotation));
        aabb.origin =
            self.bounds.origin + translation_from_local(aabb.origin - self.bounds.origin, rotation);
        aabb
    }

    /// Translation plus scale about the original origin that maps the
    /// captured box onto its resized shape.
    pub fn evaluate_transform(&self, translation: Vec3) -> Mat4 {
        let aabb = self.evaluate_resize(translation);
        let old = self.bounds.extents;
        let ratio = |new: f32, old: f32| if old != 0.0 { new / old } else { 1.0 };
        let scale = Vec3::new(
            ratio(aabb.extents.x, old.x),
            ratio(aabb.extents.y, old.y),
            ratio(aabb.extents.z, old.z),
        );
        Mat4::from_translation(aabb.origin - self.bounds.origin)
            * pivoted_scale(scale, self.bounds.origin)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use glam::Vec2;

    use super::*;
    use crate::selectable::{ImmediateSelector, SelectedPlaneSet};
    use crate::volume::{CameraState, Projection};

    fn counting_planes() -> (DragPlanes, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let planes = DragPlanes::new(Rc::new(move |_: bool| {
            counter.set(counter.get() + 1)
        }));
        (planes, calls)
    }

    fn drag_planes() -> DragPlanes {
        counting_planes().0
    }

    fn with_bounds(bounds: Aabb, faces: &[Face]) -> DragPlanes {
        let mut planes = drag_planes();
        planes.bounds = bounds;
        for face in faces {
            planes.selectable_mut(*face).set_selected(true);
        }
        planes
    }

    fn cube() -> Aabb {
        Aabb::new(Vec3::ZERO, Vec3::splat(2.0))
    }

    // Eye at (0, 0, 10) looking down -Z.
    fn front_camera() -> CameraState {
        CameraState {
            target: [0.0, 0.0, 0.0],
            distance: 10.0,
            yaw: std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
        }
    }

    fn volume(cursor: Vec2, projection: Projection) -> SelectionVolume {
        SelectionVolume::new(&front_camera(), &projection, 1.0, cursor, Vec2::splat(0.01))
    }

    fn fill_ortho() -> Projection {
        Projection::Orthographic {
            half_height: 5.0,
            near: 0.01,
            far: 100.0,
            fill: true,
        }
    }

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1.0e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn set_selected_toggles_every_face_and_notifies_each_change() {
        let (mut planes, calls) = counting_planes();
        assert!(!planes.is_selected());
        planes.set_selected(true);
        assert!(planes.is_selected());
        assert_eq!(calls.get(), 6);
        planes.set_selected(true);
        assert_eq!(calls.get(), 6);
        planes.set_selected(false);
        assert!(!planes.is_selected());
        assert_eq!(calls.get(), 12);
    }

    #[test]
    fn zero_translation_keeps_bounds() {
        let bounds = Aabb::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 0.5, 2.0));
        let planes = with_bounds(bounds, &Face::ALL);
        assert_eq!(planes.evaluate_resize(Vec3::ZERO), bounds);
    }

    #[test]
    fn single_face_resize_moves_one_side() {
        let planes = with_bounds(cube(), &[Face::PosX]);
        let resized = planes.evaluate_resize(Vec3::new(1.0, 0.0, 0.0));
        assert_vec3_eq(resized.origin, Vec3::new(0.5, 0.0, 0.0));
        assert_vec3_eq(resized.extents, Vec3::new(2.5, 2.0, 2.0));
    }

    #[test]
    fn opposite_faces_both_follow_the_translation() {
        let planes = with_bounds(cube(), &[Face::PosX, Face::NegX]);
        let resized = planes.evaluate_resize(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(resized.max().x, 3.0);
        assert_eq!(resized.min().x, -1.0);

        let planes = with_bounds(cube(), &[Face::NegX]);
        let resized = planes.evaluate_resize(Vec3::new(-1.0, 0.0, 0.0));
        assert_vec3_eq(resized.min(), Vec3::new(-3.0, -2.0, -2.0));
        assert_vec3_eq(resized.max(), Vec3::splat(2.0));
    }

    #[test]
    fn flat_axis_is_not_resized() {
        let bounds = Aabb::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 2.0));
        let planes = with_bounds(bounds, &[Face::PosY, Face::PosZ]);
        let resized = planes.evaluate_resize(Vec3::new(0.0, 5.0, 1.0));
        assert_eq!(resized.extents.y, 0.0);
        assert_vec3_eq(resized.extents, Vec3::new(2.0, 0.0, 2.5));
    }

    #[test]
    fn rotated_resize_works_in_local_frame() {
        let rotation = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let local = translation_to_local(Vec3::Y, &rotation);
        assert_vec3_eq(local, Vec3::X);
        assert_vec3_eq(translation_from_local(local, &rotation), Vec3::Y);

        let bounds = Aabb::new(Vec3::new(1.0, 1.0, 0.0), Vec3::splat(2.0));
        let planes = with_bounds(bounds, &[Face::PosX]);
        let resized = planes.evaluate_resize_rotated(Vec3::Y, &rotation);
        assert_vec3_eq(resized.origin, Vec3::new(1.0, 1.5, 0.0));
        assert_vec3_eq(resized.extents, Vec3::new(2.5, 2.0, 2.0));
    }

    #[test]
    fn transform_scales_about_original_origin() {
        let planes = with_bounds(cube(), &[Face::PosX]);
        let matrix = planes.evaluate_transform(Vec3::new(1.0, 0.0, 0.0));
        assert_vec3_eq(matrix.transform_point3(Vec3::new(2.0, 0.0, 0.0)), Vec3::new(3.0, 0.0, 0.0));
        assert_vec3_eq(
            matrix.transform_point3(Vec3::new(-2.0, 1.0, 0.0)),
            Vec3::new(-2.0, 1.0, 0.0),
        );

        let offset = Aabb::new(Vec3::new(4.0, 0.0, 0.0), Vec3::splat(1.0));
        let planes = with_bounds(offset, &[Face::NegX]);
        let matrix = planes.evaluate_transform(Vec3::new(-2.0, 0.0, 0.0));
        assert_vec3_eq(matrix.transform_point3(Vec3::new(3.0, 0.0, 0.0)), Vec3::new(1.0, 0.0, 0.0));
        assert_vec3_eq(matrix.transform_point3(Vec3::new(5.0, 0.0, 0.0)), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn transform_keeps_unit_scale_on_flat_axis() {
        let bounds = Aabb::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(1.0, 0.0, 1.0));
        let planes = with_bounds(bounds, &Face::ALL);
        let matrix = planes.evaluate_transform(Vec3::new(0.0, 7.0, 0.0));
        let (scale, _, _) = matrix.to_scale_rotation_translation();
        assert_eq!(scale.y, 1.0);
        assert_vec3_eq(matrix.transform_point3(Vec3::new(0.0, 3.0, 0.0)), Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn select_planes_picks_the_side_face_next_to_the_cursor() {
        let mut planes = drag_planes();
        let mut selector = ImmediateSelector::default();
        let mut reported = Vec::new();
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        planes.select_planes(
            &aabb,
            &mut selector,
            &volume(Vec2::new(0.5, 0.0), Projection::default()),
            &mut |plane| reported.push(*plane),
            &Mat4::IDENTITY,
        );
        assert_eq!(planes.selected_faces(), vec![Face::PosX]);
        assert_eq!(selector.added, 1);
        assert_eq!(reported, vec![Plane::new(Vec3::X, 1.0)]);
        assert_eq!(planes.bounds(), aabb);
    }

    #[test]
    fn near_tied_faces_are_both_picked_outside_fill_mode() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);

        let mut planes = drag_planes();
        let mut selector = ImmediateSelector::default();
        planes.select_planes(
            &aabb,
            &mut selector,
            &volume(Vec2::new(0.5, 0.5), Projection::default()),
            &mut |_| {},
            &Mat4::IDENTITY,
        );
        assert_eq!(planes.selected_faces(), vec![Face::PosX, Face::PosY]);

        let mut planes = drag_planes();
        planes.select_planes(
            &aabb,
            &mut selector,
            &volume(Vec2::new(0.6, 0.3), Projection::default()),
            &mut |_| {},
            &Mat4::IDENTITY,
        );
        assert_eq!(planes.selected_faces(), vec![Face::PosY]);
    }

    #[test]
    fn fill_mode_picks_a_single_face() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let mut planes = drag_planes();
        let mut selector = ImmediateSelector::default();
        planes.select_planes(
            &aabb,
            &mut selector,
            &volume(Vec2::new(0.5, 0.5), fill_ortho()),
            &mut |_| {},
            &Mat4::IDENTITY,
        );
        assert_eq!(planes.selected_faces().len(), 1);
    }

    #[test]
    fn nothing_picked_when_cursor_is_inside_the_box_outline() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let mut planes = drag_planes();
        let mut selector = ImmediateSelector::default();
        planes.bounds = Aabb::new(Vec3::ONE, Vec3::ONE);
        planes.select_planes(
            &aabb,
            &mut selector,
            &volume(Vec2::ZERO, fill_ortho()),
            &mut |_| {},
            &Mat4::IDENTITY,
        );
        assert!(!planes.is_selected());
        assert_eq!(planes.bounds(), aabb);
    }

    #[test]
    fn reversed_planes_round_trip() {
        let aabb = Aabb::new(Vec3::new(0.5, -1.0, 2.0), Vec3::new(1.0, 2.0, 3.0));
        let rotation = Mat4::from_rotation_y(0.3);
        let mut flipped = SelectedPlaneSet::new(1.0e-4);
        for plane in aabb.planes_oriented(&rotation) {
            flipped.insert(plane.flipped());
        }
        let mut planes = drag_planes();
        let mut selector = ImmediateSelector::default();
        planes.select_reversed_planes(&aabb, &mut selector, &flipped, &rotation);
        assert_eq!(planes.selected_faces(), Face::ALL.to_vec());

        // The old top face now bounds the flipped box from below.
        let mut previous = SelectedPlaneSet::new(1.0e-4);
        previous.insert(aabb.planes()[Face::PosZ.index()]);
        let inverted = Aabb::from_min_max(Vec3::new(-0.5, -3.0, 5.0), Vec3::new(1.5, 1.0, 9.0));
        let mut planes = drag_planes();
        planes.select_reversed_planes(&inverted, &mut selector, &previous, &Mat4::IDENTITY);
        assert_eq!(planes.selected_faces(), vec![Face::NegZ]);
    }

    #[test]
    fn select_by_plane_matches_either_orientation() {
        let aabb = cube();
        let mut planes = drag_planes();
        planes.select_by_plane(&aabb, &Plane::new(Vec3::NEG_Y, 2.0).flipped(), &Mat4::IDENTITY);
        assert_eq!(planes.selected_faces(), vec![Face::NegY]);

        let mut planes = drag_planes();
        planes.select_by_plane(&aabb, &Plane::new(Vec3::X, 7.0), &Mat4::IDENTITY);
        assert!(!planes.is_selected());
    }

    #[test]
    fn gathered_polygon_is_coplanar_with_its_plane() {
        let aabb = Aabb::new(Vec3::new(1.0, 0.0, -1.0), Vec3::new(2.0, 1.0, 0.5));
        let rotation = Mat4::from_rotation_x(0.7);
        let plane = aabb.planes_oriented(&rotation)[Face::PosZ.index()];
        let planes = drag_planes();
        let mut polygons = Vec::new();
        planes.gather_polygons_by_plane(&aabb, &plane.flipped(), &mut polygons, &rotation);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].len(), 4);
        for point in &polygons[0] {
            assert!(plane.distance_to_point(*point).abs() < 1.0e-4);
        }

        let unrelated = Plane::new(Vec3::Y, 100.0);
        planes.gather_polygons_by_plane(&aabb, &unrelated, &mut polygons, &rotation);
        assert_eq!(polygons.len(), 1);
    }

    #[test]
    fn direct_pick_hits_the_front_face() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        let mut planes = drag_planes();
        let mut data = BestPlaneData::default();
        planes.best_plane_direct(
            &aabb,
            &volume(Vec2::ZERO, Projection::default()),
            &mut data,
            &Mat4::IDENTITY,
        );
        assert!(data.is_direct());
        assert!(data.plane.approx_eq(&Plane::new(Vec3::Z, 2.0), 1.0e-5));
        assert_eq!(planes.bounds(), aabb);
    }

    #[test]
    fn direct_pick_inflates_flat_patches() {
        // Flat in Z, picked from the side.
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 0.0));
        let camera = CameraState {
            target: [0.0, 0.0, 0.0],
            distance: 10.0,
            yaw: 0.0,
            pitch: 0.0,
        };
        let volume = SelectionVolume::new(
            &camera,
            &Projection::default(),
            1.0,
            Vec2::ZERO,
            Vec2::splat(0.01),
        );
        let mut planes = drag_planes();
        let mut data = BestPlaneData::default();
        planes.best_plane_direct(&aabb, &volume, &mut data, &Mat4::IDENTITY);
        assert!(data.is_direct());
        assert!(data.plane.approx_eq(&Plane::new(Vec3::X, 2.0), 1.0e-5));
        assert_eq!(planes.bounds(), aabb);
    }

    #[test]
    fn indirect_pick_prefers_the_edge_on_side_face() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let mut planes = drag_planes();
        let mut data = BestPlaneData::default();
        planes.best_plane_indirect(
            &aabb,
            &volume(Vec2::new(0.5, 0.0), Projection::default()),
            &mut data,
            &Mat4::IDENTITY,
        );
        assert!(data.is_valid());
        assert!(!data.is_direct());
        assert!(data.plane.approx_eq(&Plane::new(Vec3::X, 1.0), 1.0e-5));
        assert!(data.dist < f32::MAX);
    }

    #[test]
    fn indirect_pick_never_returns_a_collapsed_face() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        let mut planes = drag_planes();
        let mut data = BestPlaneData::default();
        planes.best_plane_indirect(
            &aabb,
            &volume(Vec2::new(0.5, 0.0), Projection::default()),
            &mut data,
            &Mat4::IDENTITY,
        );
        assert!(data.is_valid());
        assert_eq!(data.plane.normal.z, 0.0);
    }

    #[test]
    fn indirect_pick_in_fill_mode_uses_the_face_toward_the_viewer() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 4.0));
        let mut planes = drag_planes();
        let mut data = BestPlaneData::default();
        planes.best_plane_indirect(
            &aabb,
            &volume(Vec2::new(0.5, 0.0), fill_ortho()),
            &mut data,
            &Mat4::IDENTITY,
        );
        assert!(data.is_valid());
        assert!(data.plane.approx_eq(&Plane::new(Vec3::X, 1.0), 1.0e-5));
    }

    #[test]
    fn indirect_pick_in_fill_mode_handles_a_box_around_the_orbit_eye() {
        // Orbit eye at z = 10 sits inside this box.
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(20.0));
        let ortho = Projection::Orthographic {
            half_height: 40.0,
            near: 0.01,
            far: 100.0,
            fill: true,
        };
        let mut planes = drag_planes();
        let mut data = BestPlaneData::default();
        planes.best_plane_indirect(
            &aabb,
            &volume(Vec2::new(0.6, 0.0), ortho),
            &mut data,
            &Mat4::IDENTITY,
        );
        assert!(data.is_valid());
        assert!(data.plane.approx_eq(&Plane::new(Vec3::X, 20.0), 1.0e-3));
    }

    #[test]
    fn indirect_pick_in_fill_mode_swaps_out_a_collapsed_face() {
        // Eye at -Z looking down +Z, so world -X is screen right.
        let back_camera = CameraState {
            yaw: -std::f32::consts::FRAC_PI_2,
            ..front_camera()
        };
        let volume = SelectionVolume::new(
            &back_camera,
            &fill_ortho(),
            1.0,
            Vec2::new(0.5, 0.0),
            Vec2::splat(0.01),
        );
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        let mut planes = drag_planes();
        let mut data = BestPlaneData::default();
        planes.best_plane_indirect(&aabb, &volume, &mut data, &Mat4::IDENTITY);
        assert!(data.is_valid());
        assert_eq!(data.plane.normal.z, 0.0);
        assert_vec3_eq(data.plane.normal, Vec3::NEG_X);
    }

    #[test]
    fn indirect_near_tie_goes_to_the_edge_square_to_the_cursor() {
        // Identity pick space: the cursor is the origin and the view runs along +Z.
        let volume =
            SelectionVolume::from_matrices(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO, false);
        // The -X/-Z edge is 0.0025 closer than the thin -Y/-Z edge, well inside the
        // distance epsilon, but its closest point lies square to the edge.
        let aabb = Aabb::new(Vec3::new(2.0, 0.0, 1.0), Vec3::new(1.0, 0.05, 0.5));
        let mut planes = drag_planes();
        let mut data = BestPlaneData::default();
        planes.best_plane_indirect(&aabb, &volume, &mut data, &Mat4::IDENTITY);
        assert!(data.is_valid());
        assert_vec3_eq(data.plane.normal, Vec3::NEG_X);
        assert_vec3_eq(data.closest_point, Vec3::new(1.0, 0.0, 0.5));
        assert!((data.dist - 1.25).abs() < 1.0e-4);
    }

    #[test]
    fn resolve_falls_back_to_edges_and_selects_the_face() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let mut planes = drag_planes();
        let data = planes.resolve_best_plane(
            &aabb,
            &volume(Vec2::new(0.5, 0.0), Projection::default()),
            &Mat4::IDENTITY,
        );
        assert!(!data.is_direct());
        assert_eq!(planes.selected_faces(), vec![Face::PosX]);
    }
}
