mod aabb;
mod drag_planes;
mod geometry;
mod scale_radius;
mod selectable;
mod settings;
mod volume;

pub use aabb::{Aabb, Face, EDGES, EDGE_FACES, FACE_CORNERS};
pub use drag_planes::{
    pivoted_scale, translation_from_local, translation_to_local, BestPlaneData, DragPlanes,
};
pub use geometry::{Line, Plane};
pub use scale_radius::{ScaleRadius, RADIUS_HANDLE_PLANE};
pub use selectable::{
    ImmediateSelector, ObservedSelectable, SelectedPlaneSet, SelectedPlanes,
    SelectionChangeCallback, Selector,
};
pub use settings::PickSettings;
pub use volume::{CameraState, Projection, SelectionIntersection, SelectionVolume};
