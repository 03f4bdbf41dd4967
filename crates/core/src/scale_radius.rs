use glam::{Mat4, Vec3};

use crate::geometry::Plane;
use crate::selectable::{ObservedSelectable, SelectionChangeCallback, Selector};
use crate::volume::SelectionVolume;

/// Plane reported when the radius handle is picked. It matches no box face.
pub const RADIUS_HANDLE_PLANE: Plane = Plane::new(Vec3::new(2.0, 0.0, 0.0), 0.0);

/// Single handle driving a uniform radius, e.g. a light or sound falloff.
#[derive(Debug, Clone)]
pub struct ScaleRadius {
    selectable: ObservedSelectable,
    model: Mat4,
}

impl ScaleRadius {
    pub fn new(on_changed: SelectionChangeCallback) -> Self {
        Self {
            selectable: ObservedSelectable::new(on_changed),
            model: Mat4::IDENTITY,
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selectable.is_selected()
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selectable.set_selected(selected);
    }

    pub fn selectable(&self) -> &ObservedSelectable {
        &self.selectable
    }

    /// Captures the view so later drags are measured along screen-right.
    pub fn select_planes(
        &mut self,
        selector: &mut dyn Selector,
        volume: &SelectionVolume,
        on_plane: &mut dyn FnMut(&Plane),
    ) {
        self.model = volume.modelview();
        selector.add(&mut self.selectable);
        on_plane(&RADIUS_HANDLE_PLANE);
    }

    /// Signed radius change for a world-space drag.
    pub fn evaluate_resize(&self, translation: Vec3) -> f32 {
        let len = translation.length();
        if len == 0.0 {
            return 0.0;
        }
        let local = self.model.transform_vector3(translation).normalize_or_zero();
        local.x * len
    }
}
