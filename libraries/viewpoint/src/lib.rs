use bevy::prelude::*;
use solar_system::body::BodyRegistry;
use solar_system::SolarSystemSet;

pub mod components;
mod systems;

pub use components::{
    CameraMove, CameraPose, CameraTurn, SceneCamera, Ship, ShipManeuver, ViewController, ViewMode,
};

/// Ordering of the camera update relative to the rest of the frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, SystemSet)]
pub struct ViewpointSet;

pub struct ViewpointPlugin;

impl Plugin for ViewpointPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SceneCamera>()
            .register_type::<ViewController>()
            .register_type::<ViewMode>()
            .register_type::<Ship>()
            .register_type::<CameraMove>()
            .register_type::<CameraTurn>()
            .register_type::<ShipManeuver>()
            .add_systems(
                Update,
                (
                    systems::follow_reference_body.run_if(resource_added::<BodyRegistry>),
                    systems::apply_camera_pose,
                )
                    .chain()
                    .in_set(ViewpointSet)
                    .after(SolarSystemSet::Compose)
                    .run_if(any_with_component::<ViewController>),
            );
    }
}

/// Perspective used by the scene camera: 48° vertical field of view, clipping planes sized for
/// a system a few hundred million units across.
pub fn scene_projection() -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: 48f32.to_radians(),
        near: 1e4,
        far: 8e8,
        ..default()
    })
}
