//! Landshaper: an interactive terrain and object editor.
//!
//! The world is a grid-indexed heightfield mesh. A keyboard-armed brush
//! raises or lowers square patches of it under the cursor, objects can be
//! dragged across the snapped grid or rotated in place, and hovering a
//! window border glides the camera over the land.

use bevy::{camera::visibility::NoFrustumCulling, pbr::wireframe::WireframePlugin, prelude::*};
use bevy_infinite_grid::{InfiniteGrid, InfiniteGridPlugin};

pub mod brush;
pub mod camera_pan;
pub mod drag;
pub mod grid;
pub mod heightfield;
pub mod objects;
pub mod picking;
pub mod settings;
pub mod stroke;

use camera_pan::PanCamera;
use heightfield::{Heightfield, Terrain};
use settings::{EditorSettings, SETTINGS_PATH};

/// Marker for editor-owned scene entities (camera, lights, overlays) as
/// opposed to user content.
#[derive(Component)]
pub struct EditorEntity;

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        let settings = EditorSettings::load_or_default(SETTINGS_PATH);
        let heightfield = Heightfield::flat(
            settings.grid_columns,
            settings.grid_rows,
            settings.cell_size(),
        );

        app.insert_resource(settings)
            .insert_resource(heightfield)
            .add_plugins((
                InfiniteGridPlugin,
                WireframePlugin::default(),
                camera_pan::CameraPanPlugin,
                drag::DragPlugin,
                brush::BrushPlugin,
                objects::ObjectsPlugin,
            ))
            .add_systems(Startup, setup_scene);
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    heightfield: Res<Heightfield>,
    settings: Res<EditorSettings>,
) {
    commands.spawn((
        Name::new("Land"),
        Terrain,
        Mesh3d(meshes.add(heightfield.build_mesh())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0x2e, 0x46, 0x14),
            ..default()
        })),
        Transform::default(),
        // Brush edits rewrite vertices in place; the startup bounds would
        // cull an edited mesh at grazing angles.
        NoFrustumCulling,
    ));

    commands.spawn((Name::new("Reference grid"), EditorEntity, InfiniteGrid));

    commands.insert_resource(GlobalAmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        ..default()
    });
    commands.spawn((
        Name::new("Key light"),
        EditorEntity,
        SpotLight {
            intensity: 8_000_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(0.0, 20.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Name::new("Editor camera"),
        EditorEntity,
        Camera3d::default(),
        PanCamera::new(Vec3::ZERO, settings.pan_step),
        Transform::from_xyz(20.0, 20.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
