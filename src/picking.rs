//! Cursor ray picking against the land mesh and the placed objects.
//!
//! Side-effect-free: a miss (no cursor, no camera, nothing under the ray) is
//! `None`, never an error.

use bevy::{
    ecs::system::SystemParam,
    picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility},
    prelude::*,
};

use crate::{heightfield::Terrain, objects::PlacedObject};

/// Nearest intersection of the cursor ray with a candidate set.
#[derive(Debug, Clone, Copy)]
pub struct PickHit {
    pub entity: Entity,
    pub point: Vec3,
}

/// Everything a pointer handler needs to turn the cursor into a world hit.
#[derive(SystemParam)]
pub struct ScenePicker<'w, 's> {
    windows: Query<'w, 's, &'static Window>,
    cameras: Query<'w, 's, (&'static Camera, &'static GlobalTransform), With<Camera3d>>,
    terrain: Query<'w, 's, (), With<Terrain>>,
    placed: Query<'w, 's, (), With<PlacedObject>>,
    parents: Query<'w, 's, &'static ChildOf>,
    ray_cast: MeshRayCast<'w, 's>,
}

impl ScenePicker<'_, '_> {
    fn cursor_ray(&self) -> Option<Ray3d> {
        let cursor = self.windows.single().ok()?.cursor_position()?;
        let (camera, cam_tf) = self.cameras.single().ok()?;
        camera.viewport_to_world(cam_tf, cursor).ok()
    }

    /// Nearest hit on the land mesh under the cursor.
    pub fn pick_terrain(&mut self) -> Option<PickHit> {
        let ray = self.cursor_ray()?;
        let terrain = &self.terrain;
        let filter = move |entity: Entity| terrain.contains(entity);
        let settings = MeshRayCastSettings::default()
            .with_visibility(RayCastVisibility::Any)
            .with_filter(&filter);
        let (entity, hit) = self.ray_cast.cast_ray(ray, &settings).first()?;
        Some(PickHit {
            entity: *entity,
            point: hit.point,
        })
    }

    /// Nearest placed object under the cursor, resolved to its draggable
    /// root: for a multi-part group the ray hits a child mesh, but the whole
    /// group is the unit that moves together.
    pub fn pick_object(&mut self) -> Option<PickHit> {
        let ray = self.cursor_ray()?;
        let terrain = &self.terrain;
        let filter = move |entity: Entity| !terrain.contains(entity);
        let settings = MeshRayCastSettings::default()
            .with_visibility(RayCastVisibility::Any)
            .with_filter(&filter);

        // First hit that resolves to a placed object wins; overlay meshes and
        // other editor geometry resolve to nothing and are skipped.
        let hits = self.ray_cast.cast_ray(ray, &settings);
        for (hit_entity, hit) in hits {
            if let Some(root) = placed_root(*hit_entity, &self.placed, &self.parents) {
                return Some(PickHit {
                    entity: root,
                    point: hit.point,
                });
            }
        }
        None
    }
}

/// Walk up the `ChildOf` hierarchy until an entity carrying `PlacedObject`
/// is found.
fn placed_root(
    mut entity: Entity,
    placed: &Query<(), With<PlacedObject>>,
    parents: &Query<&ChildOf>,
) -> Option<Entity> {
    loop {
        if placed.contains(entity) {
            return Some(entity);
        }
        entity = parents.get(entity).ok()?.0;
    }
}
