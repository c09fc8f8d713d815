//! Edge-hover camera panning.
//!
//! Hovering the cursor inside a thin strip at a window border glides the
//! camera across the land on the held-interval cadence. The glide direction
//! is expressed in the camera's own ground-plane frame, so "up" always moves
//! away from the viewer regardless of where the camera orbits.

use bevy::prelude::*;

use crate::{settings::EditorSettings, stroke::IntervalDriver};

pub struct CameraPanPlugin;

impl Plugin for CameraPanPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EdgePanState>()
            .add_systems(Update, (detect_edge_hover, apply_edge_pan).chain());
    }
}

/// The editor camera. `focus` is the point the camera keeps looking at while
/// panning; `enabled` is cleared by drags and strokes so the view holds still
/// mid-interaction.
#[derive(Component)]
pub struct PanCamera {
    pub focus: Vec3,
    pub step: f32,
    pub enabled: bool,
}

impl PanCamera {
    pub fn new(focus: Vec3, step: f32) -> Self {
        Self {
            focus,
            step,
            enabled: true,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PanEdge {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Resource)]
pub struct EdgePanState {
    edge: Option<PanEdge>,
    driver: IntervalDriver,
}

impl FromWorld for EdgePanState {
    fn from_world(world: &mut World) -> Self {
        let period = world.resource::<EditorSettings>().stroke_interval();
        Self {
            edge: None,
            driver: IntervalDriver::new(period),
        }
    }
}

impl EdgePanState {
    /// Single transition point for the hovered edge; the driver is armed and
    /// disarmed here and nowhere else. Re-setting the same edge keeps the
    /// running interval.
    fn set_edge(&mut self, edge: Option<PanEdge>) {
        if edge == self.edge {
            return;
        }
        self.edge = edge;
        match edge {
            Some(_) => self.driver.start(),
            None => self.driver.stop(),
        }
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn detect_edge_hover(
    windows: Query<&Window>,
    cameras: Query<&PanCamera>,
    settings: Res<EditorSettings>,
    mut state: ResMut<EdgePanState>,
) {
    let enabled = cameras.iter().any(|cam| cam.enabled);
    if !enabled {
        state.set_edge(None);
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    // Polls the live cursor position instead of move messages: leaving the
    // window produces no further moves, and an exit through a border strip
    // must not leave the glide running.
    let Some(cursor) = window.cursor_position() else {
        state.set_edge(None);
        return;
    };

    let size = Vec2::new(window.width(), window.height());
    state.set_edge(edge_under_cursor(cursor, size, settings.pan_margin));
}

fn apply_edge_pan(
    time: Res<Time>,
    mut state: ResMut<EdgePanState>,
    mut cameras: Query<(&mut Transform, &mut PanCamera)>,
) {
    let firings = state.driver.tick(time.delta());
    if firings == 0 {
        return;
    }
    let Some(edge) = state.edge else {
        return;
    };

    for (mut transform, mut camera) in &mut cameras {
        if !camera.enabled {
            continue;
        }
        let offset = Vec2::new(
            transform.translation.x - camera.focus.x,
            transform.translation.z - camera.focus.z,
        );
        for _ in 0..firings {
            let delta = pan_delta(edge, offset, camera.step);
            transform.translation.x += delta.x;
            transform.translation.z += delta.y;
            camera.focus.x += delta.x;
            camera.focus.z += delta.y;
        }
        let focus = camera.focus;
        transform.look_at(focus, Vec3::Y);
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Which border strip (if any) the cursor is hovering. Corners resolve in
/// top, bottom, left, right order.
pub fn edge_under_cursor(cursor: Vec2, window_size: Vec2, margin: f32) -> Option<PanEdge> {
    if cursor.y <= margin {
        Some(PanEdge::Top)
    } else if cursor.y >= window_size.y - margin {
        Some(PanEdge::Bottom)
    } else if cursor.x <= margin {
        Some(PanEdge::Left)
    } else if cursor.x >= window_size.x - margin {
        Some(PanEdge::Right)
    } else {
        None
    }
}

/// Ground-plane translation for one pan firing. `offset` is the camera's xz
/// position relative to its focus; the view direction it encodes rotates the
/// screen-space edge into world axes, so the glide always matches what the
/// user sees.
pub fn pan_delta(edge: PanEdge, offset: Vec2, step: f32) -> Vec2 {
    let len = offset.length();
    if len < 1e-6 {
        return Vec2::ZERO;
    }
    let coef_z = offset.x / len;
    let coef_x = offset.y / len;
    match edge {
        PanEdge::Top => Vec2::new(-coef_z * step, -coef_x * step),
        PanEdge::Bottom => Vec2::new(coef_z * step, coef_x * step),
        PanEdge::Left => Vec2::new(-coef_x * step, coef_z * step),
        PanEdge::Right => Vec2::new(coef_x * step, -coef_z * step),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const SIZE: Vec2 = Vec2::new(800.0, 600.0);

    fn test_state() -> EdgePanState {
        EdgePanState {
            edge: None,
            driver: IntervalDriver::new(Duration::from_millis(16)),
        }
    }

    #[test]
    fn leaving_the_window_stops_the_interval() {
        let mut state = test_state();
        state.set_edge(Some(PanEdge::Right));
        assert!(state.driver.is_active());

        // Cursor gone (no position): the hover resolves to no edge.
        state.set_edge(None);
        assert_eq!(state.edge, None);
        assert!(!state.driver.is_active());
        assert_eq!(state.driver.tick(Duration::from_secs(1)), 0);
    }

    #[test]
    fn staying_on_the_same_edge_keeps_the_running_interval() {
        let mut state = test_state();
        state.set_edge(Some(PanEdge::Top));
        state.driver.tick(Duration::from_millis(10));
        state.set_edge(Some(PanEdge::Top));
        // Accumulated time survives; a fresh start would have reset it.
        assert_eq!(state.driver.tick(Duration::from_millis(6)), 1);
    }

    #[test]
    fn switching_edges_restarts_the_interval() {
        let mut state = test_state();
        state.set_edge(Some(PanEdge::Top));
        state.driver.tick(Duration::from_millis(10));
        state.set_edge(Some(PanEdge::Left));
        assert_eq!(state.driver.tick(Duration::from_millis(10)), 0);
        assert_eq!(state.driver.tick(Duration::from_millis(6)), 1);
    }

    #[test]
    fn interior_cursor_hovers_no_edge() {
        assert_eq!(edge_under_cursor(Vec2::new(400.0, 300.0), SIZE, 20.0), None);
    }

    #[test]
    fn each_border_strip_maps_to_its_edge() {
        assert_eq!(
            edge_under_cursor(Vec2::new(400.0, 5.0), SIZE, 20.0),
            Some(PanEdge::Top)
        );
        assert_eq!(
            edge_under_cursor(Vec2::new(400.0, 595.0), SIZE, 20.0),
            Some(PanEdge::Bottom)
        );
        assert_eq!(
            edge_under_cursor(Vec2::new(5.0, 300.0), SIZE, 20.0),
            Some(PanEdge::Left)
        );
        assert_eq!(
            edge_under_cursor(Vec2::new(795.0, 300.0), SIZE, 20.0),
            Some(PanEdge::Right)
        );
    }

    #[test]
    fn corners_resolve_vertical_edges_first() {
        assert_eq!(
            edge_under_cursor(Vec2::new(5.0, 5.0), SIZE, 20.0),
            Some(PanEdge::Top)
        );
        assert_eq!(
            edge_under_cursor(Vec2::new(795.0, 595.0), SIZE, 20.0),
            Some(PanEdge::Bottom)
        );
    }

    #[test]
    fn pan_follows_the_view_frame() {
        // Camera sits at +x+z of its focus, looking back toward -x-z. The
        // top edge must glide away from the viewer, toward -x-z.
        let offset = Vec2::new(10.0, 10.0);
        let delta = pan_delta(PanEdge::Top, offset, 0.5);
        assert!(delta.x < 0.0 && delta.y < 0.0);

        // Bottom is the exact opposite.
        let opposite = pan_delta(PanEdge::Bottom, offset, 0.5);
        assert!((delta + opposite).length() < 1e-6);
    }

    #[test]
    fn pan_step_magnitude_is_preserved() {
        let offset = Vec2::new(3.0, -4.0);
        for edge in [PanEdge::Top, PanEdge::Bottom, PanEdge::Left, PanEdge::Right] {
            let delta = pan_delta(edge, offset, 0.5);
            assert!((delta.length() - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn degenerate_offset_pans_nowhere() {
        assert_eq!(pan_delta(PanEdge::Top, Vec2::ZERO, 0.5), Vec2::ZERO);
    }
}
