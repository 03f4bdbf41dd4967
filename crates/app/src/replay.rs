use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;

use dragbox_core::{
    translation_to_local, Aabb, CameraState, DragPlanes, Face, ImmediateSelector, PickSettings,
    Plane, Projection, ScaleRadius, SelectedPlaneSet, SelectionChangeCallback, SelectionVolume,
};
use glam::{EulerRot, Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A recorded pick followed by a sequence of drag offsets.
#[derive(Debug, Deserialize)]
pub(crate) struct ReplayPlan {
    #[serde(default)]
    camera: CameraState,
    #[serde(default)]
    projection: Projection,
    #[serde(default = "default_aspect")]
    aspect: f32,
    /// Cursor in normalized device coordinates.
    #[serde(default)]
    cursor: [f32; 2],
    #[serde(default = "default_pick_size")]
    pick_size: [f32; 2],
    #[serde(rename = "box")]
    bounds: PlanBox,
    #[serde(default)]
    rotation_deg: [f32; 3],
    #[serde(default)]
    mode: PickMode,
    #[serde(default)]
    settings: PickSettings,
    #[serde(default)]
    drags: Vec<[f32; 3]>,
}

#[derive(Debug, Deserialize)]
struct PlanBox {
    origin: [f32; 3],
    extents: [f32; 3],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PickMode {
    #[default]
    Planes,
    Best,
    Radius,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReplayReport {
    mode: PickMode,
    selected_faces: Vec<Face>,
    picked_planes: Vec<Plane>,
    #[serde(skip_serializing_if = "Option::is_none")]
    direct_hit: Option<bool>,
    polygons: Vec<Vec<[f32; 3]>>,
    selection_changes: usize,
    steps: Vec<ReplayStep>,
}

#[derive(Debug, Serialize)]
struct ReplayStep {
    translation: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    resized: Option<Aabb>,
    /// Column-major, in the box's local frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    transform: Option<[f32; 16]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    radius_delta: Option<f32>,
}

struct ReplayArgs {
    plan_path: Option<PathBuf>,
    print: bool,
    log_level: Option<String>,
}

pub(crate) fn log_level_arg(args: &[String]) -> Result<Option<String>, String> {
    Ok(parse_replay_args(args)?.log_level)
}

pub(crate) fn run_replay(args: &[String]) -> Result<(), String> {
    let parsed = parse_replay_args(args)?;
    let plan_path = parsed
        .plan_path
        .ok_or_else(|| "--plan is required".to_string())?;
    let plan = load_replay_plan(&plan_path)?;
    info!("replay: loaded plan {:?}", plan_path);

    let report = run_plan(&plan);

    if parsed.print {
        let json = serde_json::to_string_pretty(&report).map_err(|err| err.to_string())?;
        println!("{json}");
    }

    info!(
        "replay: completed, {} face(s) selected, {} step(s)",
        report.selected_faces.len(),
        report.steps.len()
    );
    Ok(())
}

fn parse_replay_args(args: &[String]) -> Result<ReplayArgs, String> {
    let mut plan_path = None;
    let mut print = false;
    let mut log_level = None;
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--plan" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--plan requires a path".to_string())?;
                plan_path = Some(PathBuf::from(value));
            }
            "--log-level" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--log-level requires a value".to_string())?;
                log_level = Some(value.clone());
            }
            "--print" => {
                print = true;
            }
            "--help" | "-h" => {
                print_replay_help();
                process::exit(0);
            }
            other => return Err(format!("unknown argument {other}")),
        }
    }

    Ok(ReplayArgs {
        plan_path,
        print,
        log_level,
    })
}

fn print_replay_help() {
    println!("Usage: dragbox --plan <path> [options]");
    println!("  --plan <path>");
    println!("  --print");
    println!("  --log-level <off|error|warn|info|debug|trace>");
}

fn load_replay_plan(path: &Path) -> Result<ReplayPlan, String> {
    let data = std::fs::read(path).map_err(|err| err.to_string())?;
    parse_replay_plan(&data)
}

fn parse_replay_plan(data: &[u8]) -> Result<ReplayPlan, String> {
    serde_json::from_slice(data).map_err(|err| err.to_string())
}

fn default_aspect() -> f32 {
    1.0
}

fn default_pick_size() -> [f32; 2] {
    [0.01, 0.01]
}

fn plan_rotation(rotate_deg: [f32; 3]) -> Mat4 {
    let rot = Vec3::from(rotate_deg) * std::f32::consts::PI / 180.0;
    Mat4::from_euler(EulerRot::XYZ, rot.x, rot.y, rot.z)
}

fn counting_callback(changes: &Rc<Cell<usize>>) -> SelectionChangeCallback {
    let changes = changes.clone();
    Rc::new(move |selected: bool| {
        changes.set(changes.get() + 1);
        debug!("replay: selection changed to {selected}");
    })
}

pub(crate) fn run_plan(plan: &ReplayPlan) -> ReplayReport {
    let volume = SelectionVolume::new(
        &plan.camera,
        &plan.projection,
        plan.aspect,
        Vec2::from(plan.cursor),
        Vec2::from(plan.pick_size),
    );
    let aabb = Aabb::new(
        Vec3::from(plan.bounds.origin),
        Vec3::from(plan.bounds.extents).abs(),
    );
    let rotation = plan_rotation(plan.rotation_deg);
    let changes = Rc::new(Cell::new(0));
    let mut selector = ImmediateSelector::default();

    if plan.mode == PickMode::Radius {
        let mut picked_planes = Vec::new();
        let mut handle = ScaleRadius::new(counting_callback(&changes));
        handle.select_planes(&mut selector, &volume, &mut |plane| {
            picked_planes.push(*plane)
        });
        let steps = plan
            .drags
            .iter()
            .map(|drag| ReplayStep {
                translation: *drag,
                resized: None,
                transform: None,
                radius_delta: Some(handle.evaluate_resize(Vec3::from(*drag))),
            })
            .collect();
        return ReplayReport {
            mode: plan.mode,
            selected_faces: Vec::new(),
            picked_planes,
            direct_hit: None,
            polygons: Vec::new(),
            selection_changes: changes.get(),
            steps,
        };
    }

    let mut drag_planes = DragPlanes::with_settings(counting_callback(&changes), plan.settings);
    let mut picked = SelectedPlaneSet::new(plan.settings.plane_epsilon);
    let mut direct_hit = None;
    match plan.mode {
        PickMode::Best => {
            let data = drag_planes.resolve_best_plane(&aabb, &volume, &rotation);
            if data.is_valid() {
                picked.insert(data.plane);
            }
            direct_hit = Some(data.is_direct());
        }
        _ => {
            drag_planes.select_planes(
                &aabb,
                &mut selector,
                &volume,
                &mut |plane| {
                    picked.insert(*plane);
                },
                &rotation,
            );
        }
    }
    info!(
        "replay: picked {:?} ({:?})",
        drag_planes.selected_faces(),
        plan.mode
    );

    let mut polygons = Vec::new();
    for plane in picked.iter() {
        drag_planes.gather_polygons_by_plane(&aabb, plane, &mut polygons, &rotation);
    }

    let steps = plan
        .drags
        .iter()
        .map(|drag| {
            let translation = Vec3::from(*drag);
            let resized = drag_planes.evaluate_resize_rotated(translation, &rotation);
            let transform =
                drag_planes.evaluate_transform(translation_to_local(translation, &rotation));
            debug!("replay: drag {:?} -> {:?}", translation, resized);
            ReplayStep {
                translation: *drag,
                resized: Some(resized),
                transform: Some(transform.to_cols_array()),
                radius_delta: None,
            }
        })
        .collect();

    ReplayReport {
        mode: plan.mode,
        selected_faces: drag_planes.selected_faces(),
        picked_planes: picked.iter().copied().collect(),
        direct_hit,
        polygons: polygons
            .into_iter()
            .map(|polygon| polygon.into_iter().map(|p| p.to_array()).collect())
            .collect(),
        selection_changes: changes.get(),
        steps,
    }
}
