use std::fmt;
use std::rc::Rc;

use crate::geometry::Plane;

/// Observer fired with the new state whenever a selectable flips.
pub type SelectionChangeCallback = Rc<dyn Fn(bool)>;

/// A single selection flag that reports changes to its observer.
#[derive(Clone)]
pub struct ObservedSelectable {
    selected: bool,
    on_changed: SelectionChangeCallback,
}

impl ObservedSelectable {
    pub fn new(on_changed: SelectionChangeCallback) -> Self {
        Self {
            selected: false,
            on_changed,
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        if self.selected != selected {
            self.selected = selected;
            (self.on_changed)(selected);
        }
    }
}

impl fmt::Debug for ObservedSelectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedSelectable")
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

/// Receives pick candidates from the box pickers.
pub trait Selector {
    fn add(&mut self, selectable: &mut ObservedSelectable);
}

/// Selects every candidate as soon as it is added.
#[derive(Debug, Default)]
pub struct ImmediateSelector {
    pub added: usize,
}

impl Selector for ImmediateSelector {
    fn add(&mut self, selectable: &mut ObservedSelectable) {
        self.added += 1;
        selectable.set_selected(true);
    }
}

pub trait SelectedPlanes {
    fn contains(&self, plane: &Plane) -> bool;
}

#[derive(Debug, Clone)]
pub struct SelectedPlaneSet {
    planes: Vec<Plane>,
    eps: f32,
}

impl SelectedPlaneSet {
    pub fn new(eps: f32) -> Self {
        Self {
            planes: Vec::new(),
            eps,
        }
    }

    /// Returns false if an equal plane is already present.
    pub fn insert(&mut self, plane: Plane) -> bool {
        if self.contains(&plane) {
            return false;
        }
        self.planes.push(plane);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plane> {
        self.planes.iter()
    }
}

impl SelectedPlanes for SelectedPlaneSet {
    fn contains(&self, plane: &Plane) -> bool {
        self.planes
            .iter()
            .any(|candidate| candidate.approx_eq(plane, self.eps))
    }
}
