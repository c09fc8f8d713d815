//! The terrain brush engine.
//!
//! Arming a direction (raise/lower) spawns a square preview overlay that
//! follows the cursor and mirrors the land heights under it. While the left
//! button is held the footprint is stamped into the land heightfield - once
//! per pointer move and once per interval firing, so a held-but-motionless
//! stroke keeps deepening or raising the patch. Objects standing inside the
//! footprint ride the terrain.

use bevy::{camera::visibility::NoFrustumCulling, prelude::*, window::CursorMoved};

use crate::{
    EditorEntity,
    camera_pan::PanCamera,
    grid,
    heightfield::{Heightfield, PatchGrid, Terrain},
    objects::PlacedObject,
    picking::ScenePicker,
    settings::EditorSettings,
    stroke::IntervalDriver,
};

pub struct BrushPlugin;

impl Plugin for BrushPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TerrainBrush>().add_systems(
            Update,
            (
                handle_mode_keys,
                handle_stroke_buttons,
                handle_pointer_move,
                tick_stroke,
            )
                .chain(),
        );
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BrushDirection {
    Raise,
    Lower,
}

impl BrushDirection {
    pub fn signed_step(self, step: f32) -> f32 {
        match self {
            BrushDirection::Raise => step,
            BrushDirection::Lower => -step,
        }
    }
}

/// The spawned overlay entity together with its height buffer. Lives inside
/// the armed states only, so the overlay cannot outlive the edit mode.
pub struct Overlay {
    pub entity: Entity,
    pub patch: PatchGrid,
}

/// Explicit interaction state machine. `Stroking` carries a non-optional
/// cursor cell: a stroke cannot exist before the brush knows where it is.
#[derive(Default)]
pub enum BrushState {
    #[default]
    Inactive,
    Armed {
        direction: BrushDirection,
        overlay: Overlay,
        cursor: Option<IVec2>,
    },
    Stroking {
        direction: BrushDirection,
        overlay: Overlay,
        cursor: IVec2,
    },
}

impl BrushState {
    pub fn is_inactive(&self) -> bool {
        matches!(self, BrushState::Inactive)
    }

    pub fn is_stroking(&self) -> bool {
        matches!(self, BrushState::Stroking { .. })
    }

    pub fn direction(&self) -> Option<BrushDirection> {
        match self {
            BrushState::Inactive => None,
            BrushState::Armed { direction, .. } | BrushState::Stroking { direction, .. } => {
                Some(*direction)
            }
        }
    }

    pub fn overlay_entity(&self) -> Option<Entity> {
        match self {
            BrushState::Inactive => None,
            BrushState::Armed { overlay, .. } | BrushState::Stroking { overlay, .. } => {
                Some(overlay.entity)
            }
        }
    }

    pub fn cursor(&self) -> Option<IVec2> {
        match self {
            BrushState::Inactive => None,
            BrushState::Armed { cursor, .. } => *cursor,
            BrushState::Stroking { cursor, .. } => Some(*cursor),
        }
    }

    /// Mode toggle: same direction while armed deactivates and hands back the
    /// overlay entity to despawn; a different direction retargets in place;
    /// from inactive the brush arms with a freshly spawned overlay.
    pub fn toggle(
        &mut self,
        direction: BrushDirection,
        spawn_overlay: impl FnOnce() -> Overlay,
    ) -> Option<Entity> {
        let (next, despawn) = match std::mem::take(self) {
            BrushState::Inactive => (
                BrushState::Armed {
                    direction,
                    overlay: spawn_overlay(),
                    cursor: None,
                },
                None,
            ),
            BrushState::Armed {
                direction: current,
                overlay,
                cursor,
            } => {
                if current == direction {
                    (BrushState::Inactive, Some(overlay.entity))
                } else {
                    (
                        BrushState::Armed {
                            direction,
                            overlay,
                            cursor,
                        },
                        None,
                    )
                }
            }
            BrushState::Stroking {
                direction: current,
                overlay,
                cursor,
            } => {
                if current == direction {
                    (BrushState::Inactive, Some(overlay.entity))
                } else {
                    (
                        BrushState::Armed {
                            direction,
                            overlay,
                            cursor: Some(cursor),
                        },
                        None,
                    )
                }
            }
        };
        *self = next;
        despawn
    }

    pub fn set_cursor(&mut self, cell: IVec2) {
        match self {
            BrushState::Inactive => {}
            BrushState::Armed { cursor, .. } => *cursor = Some(cell),
            BrushState::Stroking { cursor, .. } => *cursor = cell,
        }
    }

    /// Armed with a known cursor cell -> stroking. Returns whether the
    /// transition happened.
    pub fn begin_stroke(&mut self) -> bool {
        let mut began = false;
        *self = match std::mem::take(self) {
            BrushState::Armed {
                direction,
                overlay,
                cursor: Some(cursor),
            } => {
                began = true;
                BrushState::Stroking {
                    direction,
                    overlay,
                    cursor,
                }
            }
            other => other,
        };
        began
    }

    /// Stroking -> armed. Elevations stay as last written.
    pub fn end_stroke(&mut self) -> bool {
        let mut ended = false;
        *self = match std::mem::take(self) {
            BrushState::Stroking {
                direction,
                overlay,
                cursor,
            } => {
                ended = true;
                BrushState::Armed {
                    direction,
                    overlay,
                    cursor: Some(cursor),
                }
            }
            other => other,
        };
        ended
    }
}

#[derive(Resource)]
pub struct TerrainBrush {
    pub state: BrushState,
    driver: IntervalDriver,
}

impl FromWorld for TerrainBrush {
    fn from_world(world: &mut World) -> Self {
        let period = world.resource::<EditorSettings>().stroke_interval();
        Self {
            state: BrushState::default(),
            driver: IntervalDriver::new(period),
        }
    }
}

// ---------------------------------------------------------------------------
// Mode toggling
// ---------------------------------------------------------------------------

/// R arms raising, F arms lowering; pressing the armed direction again
/// deactivates the brush and discards the overlay.
fn handle_mode_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut brush: ResMut<TerrainBrush>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<EditorSettings>,
) {
    let direction = if keyboard.just_pressed(KeyCode::KeyR) {
        BrushDirection::Raise
    } else if keyboard.just_pressed(KeyCode::KeyF) {
        BrushDirection::Lower
    } else {
        return;
    };

    let TerrainBrush { state, driver } = &mut *brush;
    let despawn = state.toggle(direction, || {
        spawn_overlay(&mut commands, &mut meshes, &mut materials, &settings)
    });
    if let Some(entity) = despawn {
        commands.entity(entity).despawn();
    }
    if !state.is_stroking() {
        driver.stop();
    }
    match state.direction() {
        Some(direction) => info!("Terrain brush armed: {direction:?}"),
        None => info!("Terrain brush off"),
    }
}

fn spawn_overlay(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    settings: &EditorSettings,
) -> Overlay {
    let patch = PatchGrid::new(settings.brush_radius, settings.cell_size());
    let entity = commands
        .spawn((
            Name::new("Brush overlay"),
            EditorEntity,
            Mesh3d(meshes.add(patch.build_mesh())),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(1.0, 1.0, 0.0),
                unlit: true,
                double_sided: true,
                cull_mode: None,
                ..default()
            })),
            Transform::default(),
            // Vertices move every frame; never let a stale bound cull this.
            NoFrustumCulling,
        ))
        .id();
    Overlay { entity, patch }
}

// ---------------------------------------------------------------------------
// Stroke start / stop
// ---------------------------------------------------------------------------

fn handle_stroke_buttons(
    mouse: Res<ButtonInput<MouseButton>>,
    mut brush: ResMut<TerrainBrush>,
    mut pan_cameras: Query<&mut PanCamera>,
) {
    if brush.state.is_inactive() {
        return;
    }

    let TerrainBrush { state, driver } = &mut *brush;
    if mouse.just_pressed(MouseButton::Left) {
        for mut pan in &mut pan_cameras {
            pan.enabled = false;
        }
        if state.begin_stroke() {
            driver.start();
        }
    }
    if mouse.just_released(MouseButton::Left) {
        if state.end_stroke() {
            driver.stop();
        }
        for mut pan in &mut pan_cameras {
            pan.enabled = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Pointer moves and interval ticks
// ---------------------------------------------------------------------------

fn handle_pointer_move(
    mut cursor_moved: MessageReader<CursorMoved>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut picker: ScenePicker,
    mut brush: ResMut<TerrainBrush>,
    mut heightfield: ResMut<Heightfield>,
    mut meshes: ResMut<Assets<Mesh>>,
    mesh_handles: Query<&Mesh3d>,
    land: Single<&Mesh3d, With<Terrain>>,
    mut overlay_transforms: Query<&mut Transform, Without<PlacedObject>>,
    mut placed: Query<(&mut Transform, &PlacedObject)>,
    settings: Res<EditorSettings>,
) {
    if brush.state.is_inactive() {
        cursor_moved.read().count();
        return;
    }
    if cursor_moved.read().count() == 0 {
        return;
    }
    let Some(hit) = picker.pick_terrain() else {
        return;
    };

    let cell = grid::world_to_cell_xz(hit.point, settings.cell_size());
    brush.state.set_cursor(cell);

    // The press may have landed before the first pointer move; promote to a
    // stroke as soon as a cursor cell exists.
    let TerrainBrush { state, driver } = &mut *brush;
    if mouse.pressed(MouseButton::Left) && !state.is_stroking() && state.begin_stroke() {
        driver.start();
    }

    if let Some(entity) = state.overlay_entity() {
        if let Ok(mut transform) = overlay_transforms.get_mut(entity) {
            let origin = heightfield.cell_origin(cell);
            // Slight lift keeps the preview from z-fighting the land.
            transform.translation = Vec3::new(origin.x, 0.01, origin.y);
        }
    }

    apply_brush_pass(
        state,
        &mut heightfield,
        &mut meshes,
        &mesh_handles,
        &land,
        &mut placed,
        settings.edit_step,
    );

    // A move during a stroke restarts the held cadence.
    if state.is_stroking() {
        driver.start();
    }
}

fn tick_stroke(
    time: Res<Time>,
    mut brush: ResMut<TerrainBrush>,
    mut heightfield: ResMut<Heightfield>,
    mut meshes: ResMut<Assets<Mesh>>,
    mesh_handles: Query<&Mesh3d>,
    land: Single<&Mesh3d, With<Terrain>>,
    mut placed: Query<(&mut Transform, &PlacedObject)>,
    settings: Res<EditorSettings>,
) {
    let TerrainBrush { state, driver } = &mut *brush;
    let firings = driver.tick(time.delta());
    for _ in 0..firings {
        apply_brush_pass(
            state,
            &mut heightfield,
            &mut meshes,
            &mesh_handles,
            &land,
            &mut placed,
            settings.edit_step,
        );
    }
}

// ---------------------------------------------------------------------------
// The area pass
// ---------------------------------------------------------------------------

/// One footprint application: mirror (and, while stroking, edit) the brush
/// area, sync the meshes, and carry riding objects along.
fn apply_brush_pass(
    state: &mut BrushState,
    heightfield: &mut Heightfield,
    meshes: &mut Assets<Mesh>,
    mesh_handles: &Query<&Mesh3d>,
    land: &Mesh3d,
    placed: &mut Query<(&mut Transform, &PlacedObject)>,
    edit_step: f32,
) {
    let (cursor, signed_step, overlay) = match state {
        BrushState::Inactive => return,
        BrushState::Armed {
            overlay,
            cursor: Some(cursor),
            ..
        } => (*cursor, None, overlay),
        BrushState::Armed { cursor: None, .. } => return,
        BrushState::Stroking {
            direction,
            overlay,
            cursor,
        } => (*cursor, Some(direction.signed_step(edit_step)), overlay),
    };

    stamp(heightfield, &mut overlay.patch, cursor, signed_step);

    if let Ok(mesh3d) = mesh_handles.get(overlay.entity) {
        if let Some(mesh) = meshes.get_mut(&mesh3d.0) {
            overlay.patch.write_heights(mesh);
        }
    }

    let Some(step) = signed_step else {
        return;
    };
    if let Some(mesh) = meshes.get_mut(&land.0) {
        heightfield.write_heights(mesh);
    }

    let center = heightfield.cell_origin(cursor);
    let radius_world = overlay.patch.radius() as f32 * heightfield.cell_size();
    for (mut transform, _) in placed.iter_mut() {
        transform.translation.y =
            carried_elevation(transform.translation, center, radius_world, step);
    }
}

/// New y for an object after one editing pass: objects strictly inside the
/// footprint ride the terrain by the signed step, everything else stays put.
pub fn carried_elevation(translation: Vec3, center: Vec2, radius_world: f32, step: f32) -> f32 {
    let pos = Vec2::new(translation.x, translation.z);
    if inside_brush(pos, center, radius_world) {
        translation.y + step
    } else {
        translation.y
    }
}

/// Write the brush footprint: read each base elevation, add the signed step
/// while editing, and mirror the result into the overlay buffer so the
/// preview always shows the land under it.
pub fn stamp(
    heightfield: &mut Heightfield,
    patch: &mut PatchGrid,
    center: IVec2,
    edit: Option<f32>,
) {
    grid::for_each_brush_cell(patch.radius(), |offset| {
        let cell = center + offset;
        let mut y = heightfield.height(cell);
        if let Some(step) = edit {
            y += step;
            heightfield.set_height(cell, y);
        }
        patch.set_height(offset, y);
    });
}

/// Strictly inside the footprint on both axes; objects sitting exactly on
/// the boundary stay put.
pub fn inside_brush(pos: Vec2, center: Vec2, radius_world: f32) -> bool {
    pos.x > center.x - radius_world
        && pos.x < center.x + radius_world
        && pos.y > center.y - radius_world
        && pos.y < center.y + radius_world
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_overlay() -> Overlay {
        Overlay {
            entity: Entity::PLACEHOLDER,
            patch: PatchGrid::new(3, 1.0),
        }
    }

    #[test]
    fn toggling_the_same_direction_twice_returns_to_inactive() {
        let mut state = BrushState::default();
        assert!(state.toggle(BrushDirection::Raise, test_overlay).is_none());
        assert_eq!(state.direction(), Some(BrushDirection::Raise));

        let despawn = state.toggle(BrushDirection::Raise, test_overlay);
        assert_eq!(despawn, Some(Entity::PLACEHOLDER));
        assert!(state.is_inactive());
        assert!(state.overlay_entity().is_none());
    }

    #[test]
    fn switching_direction_keeps_the_overlay() {
        let mut state = BrushState::default();
        state.toggle(BrushDirection::Raise, test_overlay);
        state.set_cursor(IVec2::new(4, -2));

        let despawn = state.toggle(BrushDirection::Lower, || unreachable!());
        assert!(despawn.is_none());
        assert_eq!(state.direction(), Some(BrushDirection::Lower));
        assert_eq!(state.cursor(), Some(IVec2::new(4, -2)));
    }

    #[test]
    fn stroke_needs_a_cursor_cell() {
        let mut state = BrushState::default();
        state.toggle(BrushDirection::Raise, test_overlay);
        assert!(!state.begin_stroke());
        state.set_cursor(IVec2::ZERO);
        assert!(state.begin_stroke());
        assert!(state.is_stroking());
        assert!(state.end_stroke());
        assert!(!state.is_stroking());
        assert_eq!(state.cursor(), Some(IVec2::ZERO));
    }

    #[test]
    fn preview_stamp_mirrors_base_without_editing() {
        let mut hf = Heightfield::flat(100, 100, 1.0);
        let mut patch = PatchGrid::new(3, 1.0);
        let center = IVec2::new(5, -7);
        hf.set_height(center + IVec2::new(1, 2), 0.8);
        hf.set_height(center + IVec2::new(-3, 0), -0.4);

        stamp(&mut hf, &mut patch, center, None);

        grid::for_each_brush_cell(3, |offset| {
            assert_eq!(patch.height(offset), hf.height(center + offset));
        });
        // Preview must not have touched the base.
        assert_eq!(hf.height(center + IVec2::new(1, 2)), 0.8);
    }

    #[test]
    fn five_raise_ticks_add_exactly_five_steps() {
        let mut hf = Heightfield::flat(100, 100, 1.0);
        let mut patch = PatchGrid::new(3, 1.0);
        let center = IVec2::new(10, 10);
        let step = BrushDirection::Raise.signed_step(0.02);

        for _ in 0..5 {
            stamp(&mut hf, &mut patch, center, Some(step));
        }

        assert!((hf.height(center) - 0.10).abs() < 1e-6);
        // Overlay center ends at the same absolute elevation.
        assert!((patch.height(IVec2::ZERO) - 0.10).abs() < 1e-6);
        // A cell outside the footprint is untouched.
        assert_eq!(hf.height(center + IVec2::new(4, 0)), 0.0);
    }

    #[test]
    fn lower_direction_negates_the_step() {
        let mut hf = Heightfield::flat(100, 100, 1.0);
        let mut patch = PatchGrid::new(2, 1.0);
        let step = BrushDirection::Lower.signed_step(0.02);
        stamp(&mut hf, &mut patch, IVec2::ZERO, Some(step));
        assert!((hf.height(IVec2::ZERO) + 0.02).abs() < 1e-6);
    }

    #[test]
    fn objects_inside_the_footprint_ride_by_the_signed_step() {
        let center = Vec2::new(10.0, 10.0);
        let radius_world = 3.0;
        let step = BrushDirection::Raise.signed_step(0.02);

        // Five editing passes carry an interior object up by five steps.
        let mut inside = Vec3::new(11.0, 0.5, 9.0);
        for _ in 0..5 {
            inside.y = carried_elevation(inside, center, radius_world, step);
        }
        assert!((inside.y - 0.6).abs() < 1e-6);

        // An object exactly on the boundary does not move.
        let boundary = Vec3::new(13.0, 0.5, 10.0);
        assert_eq!(
            carried_elevation(boundary, center, radius_world, step),
            0.5
        );

        // Lowering carries the object down by the same magnitude.
        let lower = BrushDirection::Lower.signed_step(0.02);
        let inside_once = carried_elevation(Vec3::new(10.0, 0.5, 10.0), center, radius_world, lower);
        assert!((inside_once - 0.48).abs() < 1e-6);
    }

    #[test]
    fn footprint_membership_is_strict() {
        let center = Vec2::new(10.0, 10.0);
        assert!(inside_brush(Vec2::new(10.5, 9.0), center, 3.0));
        assert!(!inside_brush(Vec2::new(13.0, 10.0), center, 3.0));
        assert!(!inside_brush(Vec2::new(10.0, 7.0), center, 3.0));
        assert!(inside_brush(Vec2::new(12.99, 12.99), center, 3.0));
    }
}
