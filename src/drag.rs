//! Drag-select controller: press picks an object, move drags it across the
//! snapped grid (or rotates it about Y with Shift), release lets go.
//!
//! While the terrain brush is armed the pointer belongs to the brush engine
//! and drag selection stands down, mirroring the dispatch in the camera/brush
//! interaction protocol.

use bevy::{pbr::wireframe::Wireframe, prelude::*, window::CursorMoved};

use crate::{
    brush::TerrainBrush,
    camera_pan::PanCamera,
    grid,
    objects::PlacedObject,
    picking::ScenePicker,
    settings::EditorSettings,
};

pub struct DragPlugin;

impl Plugin for DragPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DragState>()
            .init_resource::<DragSettings>()
            .add_systems(
                Update,
                (toggle_drag_enabled, begin_drag, update_drag, end_drag).chain(),
            );
    }
}

/// Global drag-enable flag, toggled with T.
#[derive(Resource)]
pub struct DragSettings {
    pub enabled: bool,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// `Idle` when `target` is `None`, `Dragging` otherwise. `highlighted` lists
/// the mesh entities carrying the wireframe highlight so release can clear
/// exactly what press applied.
#[derive(Resource, Default)]
pub struct DragState {
    pub target: Option<Entity>,
    highlighted: Vec<Entity>,
}

fn toggle_drag_enabled(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut settings: ResMut<DragSettings>,
) {
    if keyboard.just_pressed(KeyCode::KeyT) {
        settings.enabled = !settings.enabled;
        if settings.enabled {
            info!("Object dragging ON");
        } else {
            info!("Object dragging OFF");
        }
    }
}

// ---------------------------------------------------------------------------
// Press / move / release
// ---------------------------------------------------------------------------

fn begin_drag(
    mouse: Res<ButtonInput<MouseButton>>,
    settings: Res<DragSettings>,
    brush: Res<TerrainBrush>,
    mut picker: ScenePicker,
    mut state: ResMut<DragState>,
    mut pan_cameras: Query<&mut PanCamera>,
    children: Query<&Children>,
    meshes: Query<(), With<Mesh3d>>,
    mut commands: Commands,
) {
    if !mouse.just_pressed(MouseButton::Left)
        || !settings.enabled
        || !brush.state.is_inactive()
        || state.target.is_some()
    {
        return;
    }

    let Some(hit) = picker.pick_object() else {
        return;
    };

    // Highlight every mesh of the draggable unit - for a group that is all
    // of its part meshes, for a plain object the object itself.
    let mut highlighted = Vec::new();
    collect_mesh_descendants(hit.entity, &children, &meshes, &mut highlighted);
    for &mesh_entity in &highlighted {
        commands.entity(mesh_entity).insert(Wireframe);
    }

    // Pre-drag hook: the camera must not pan away mid-drag.
    for mut pan in &mut pan_cameras {
        pan.enabled = false;
    }

    state.target = Some(hit.entity);
    state.highlighted = highlighted;
}

fn update_drag(
    mut cursor_moved: MessageReader<CursorMoved>,
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<DragState>,
    settings: Res<EditorSettings>,
    mut picker: ScenePicker,
    mut targets: Query<(&mut Transform, &PlacedObject)>,
) {
    let Some(target) = state.target else {
        cursor_moved.read().count();
        return;
    };
    if cursor_moved.read().count() == 0 {
        return;
    }
    // A miss keeps the last valid position.
    let Some(hit) = picker.pick_terrain() else {
        return;
    };
    let Ok((mut transform, placed)) = targets.get_mut(target) else {
        return;
    };

    if keyboard.pressed(KeyCode::ShiftLeft) {
        let delta = hit.point - transform.translation;
        transform.rotation = Quat::from_rotation_y(yaw_toward(delta.x, delta.z));
    } else {
        let s = settings.cell_size();
        transform.translation.x = grid::snap_to_cell_center(hit.point.x, s);
        transform.translation.z = grid::snap_to_cell_center(hit.point.z, s);
        transform.translation.y = placed.base_elevation + hit.point.y;
    }
}

fn end_drag(
    mouse: Res<ButtonInput<MouseButton>>,
    mut state: ResMut<DragState>,
    mut pan_cameras: Query<&mut PanCamera>,
    mut commands: Commands,
) {
    if !mouse.just_released(MouseButton::Left) || state.target.is_none() {
        return;
    }

    for mesh_entity in state.highlighted.drain(..) {
        if let Ok(mut ec) = commands.get_entity(mesh_entity) {
            ec.remove::<Wireframe>();
        }
    }
    state.target = None;

    for mut pan in &mut pan_cameras {
        pan.enabled = true;
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn collect_mesh_descendants(
    entity: Entity,
    children: &Query<&Children>,
    meshes: &Query<(), With<Mesh3d>>,
    out: &mut Vec<Entity>,
) {
    if meshes.contains(entity) {
        out.push(entity);
    }
    if let Ok(direct) = children.get(entity) {
        for &child in direct {
            collect_mesh_descendants(child, children, meshes, out);
        }
    }
}

/// Yaw that turns an object at the origin to face the point `(dx, dz)`.
pub fn yaw_toward(dx: f32, dz: f32) -> f32 {
    (-dz).atan2(dx)
}
