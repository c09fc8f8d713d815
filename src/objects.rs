//! Placed objects: the things that can be picked, dragged, and carried along
//! by terrain edits.
//!
//! An object is any entity carrying [`PlacedObject`]; multi-part GLTF models
//! keep the marker on the group root only, so picking a child mesh resolves
//! to the whole group.

use bevy::{asset::AssetLoadFailedEvent, gltf::GltfAssetLabel, prelude::*};

use crate::settings::EditorSettings;

pub struct ObjectsPlugin;

impl Plugin for ObjectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_initial_cube)
            .add_systems(Update, (handle_spawn_keys, log_scene_load_failures));
    }
}

/// A draggable, terrain-following object. `base_elevation` is the resting
/// height recorded at creation; vertical drag offsets are applied on top of
/// it rather than recomputed from scratch.
#[derive(Component)]
pub struct PlacedObject {
    pub base_elevation: f32,
}

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

fn spawn_initial_cube(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<EditorSettings>,
) {
    spawn_cube(&mut commands, &mut meshes, &mut materials, &settings);
}

/// C: cube, V: vehicle model, G: grass field.
fn handle_spawn_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    settings: Res<EditorSettings>,
) {
    if keyboard.just_pressed(KeyCode::KeyC) {
        spawn_cube(&mut commands, &mut meshes, &mut materials, &settings);
    }
    if keyboard.just_pressed(KeyCode::KeyV) {
        spawn_model(&mut commands, &asset_server, &settings);
    }
    if keyboard.just_pressed(KeyCode::KeyG) {
        spawn_grass_field(&mut commands, &asset_server, &settings);
    }
}

fn spawn_cube(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    settings: &EditorSettings,
) {
    let s = settings.cell_size();
    commands.spawn((
        Name::new("Cube"),
        PlacedObject {
            base_elevation: s * 0.5,
        },
        Mesh3d(meshes.add(Cuboid::from_length(s))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.0, 1.0, 0.0),
            ..default()
        })),
        Transform::from_xyz(s * 0.5, s * 0.5, s * 0.5),
    ));
}

/// A multi-part model: the group root carries the marker, the loaded scene's
/// meshes become pickable children.
fn spawn_model(commands: &mut Commands, asset_server: &AssetServer, settings: &EditorSettings) {
    let s = settings.cell_size();
    commands.spawn((
        Name::new("Model"),
        PlacedObject {
            base_elevation: 0.0,
        },
        SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset("models/vehicle/scene.gltf"))),
        Transform::from_xyz(s * 0.5, 0.0, s * 0.5),
    ));
}

/// Tile the grass model over all four quadrants at cell centers.
fn spawn_grass_field(
    commands: &mut Commands,
    asset_server: &AssetServer,
    settings: &EditorSettings,
) {
    let scene: Handle<Scene> =
        asset_server.load(GltfAssetLabel::Scene(0).from_asset("models/grass/scene.gltf"));
    let s = settings.cell_size();
    let half = (settings.grid_columns as f32 / 2.0) as i32;

    for ix in 0..half {
        for iz in 0..half {
            let x = ix as f32 * s + s * 0.5;
            let z = iz as f32 * s + s * 0.5;
            for (px, pz) in [(x, z), (-x, z), (x, -z), (-x, -z)] {
                commands.spawn((
                    Name::new("Grass"),
                    PlacedObject {
                        base_elevation: 0.0,
                    },
                    SceneRoot(scene.clone()),
                    Transform::from_xyz(px, 0.0, pz),
                ));
            }
        }
    }
    info!("Scattered grass field over {}x{} cells", half * 2, half * 2);
}

// ---------------------------------------------------------------------------
// Load failures
// ---------------------------------------------------------------------------

/// Model loading is asynchronous; a failed load is logged and skipped, no
/// editor state has been touched yet at that point.
fn log_scene_load_failures(mut failures: MessageReader<AssetLoadFailedEvent<Scene>>) {
    for failure in failures.read() {
        warn!("Failed to load model '{}': {}", failure.path, failure.error);
    }
}
