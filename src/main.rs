use bevy::prelude::*;
use landshaper::EditorPlugin;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Landshaper".into(),
                    ..default()
                }),
                ..default()
            }),
            EditorPlugin,
        ))
        .run();
}
