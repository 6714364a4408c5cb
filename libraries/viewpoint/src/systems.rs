use bevy::prelude::*;
use solar_system::body::BodyRegistry;

use crate::components::ViewController;

pub(crate) fn follow_reference_body(
    registry: Res<BodyRegistry>,
    mut q_view: Query<&mut ViewController>,
) {
    let reference = registry.reference();
    for mut view in &mut q_view {
        view.set_reference(reference);
    }
}

pub(crate) fn apply_camera_pose(
    registry: Option<Res<BodyRegistry>>,
    mut q_camera: Query<(&mut ViewController, &mut Transform)>,
) {
    for (mut view, mut transform) in &mut q_camera {
        view.update(registry.as_deref());
        *transform = view.pose().to_transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CameraTurn, ViewMode};
    use solar_system::body::{Body, BodyId, BodyParams};

    fn registry() -> BodyRegistry {
        let params = |name: &str, orbital_radius: f64| BodyParams {
            name: name.to_string(),
            color: [1.0, 1.0, 1.0],
            orbital_radius,
            orbital_tilt: 0.0,
            orbital_period: 365.0,
            radius: 1e6,
            axis_tilt: 0.0,
            rotation_period: 1.0,
        };
        BodyRegistry::new(vec![
            Body::new(params("Sun", 0.0), None),
            Body::new(params("Earth", 1.5e8), Some(BodyId(0))),
        ])
        .unwrap()
        .with_reference(Some(BodyId(1)))
    }

    #[test]
    fn camera_follows_the_reference_body() {
        let mut app = App::new();
        app.insert_resource(registry()).add_systems(
            Update,
            (follow_reference_body, apply_camera_pose).chain(),
        );
        let camera = app
            .world_mut()
            .spawn((ViewController::default(), Transform::default()))
            .id();
        app.update();

        let mut view = app.world_mut().get_mut::<ViewController>(camera).unwrap();
        assert_eq!(view.reference(), Some(BodyId(1)));
        assert!(view.set_mode(ViewMode::Earth));
        app.update();

        let transform = app.world().get::<Transform>(camera).unwrap();
        // orbit angle 0: the camera sits on +X beyond the body, level with it
        assert!(transform.translation.x > 1.5e8);
        assert!(transform.translation.z.abs() < 1.0);
        let forward = transform.forward();
        assert!(forward.x < -0.99);
    }

    #[test]
    fn explore_camera_faces_where_it_looks() {
        let mut app = App::new();
        app.insert_resource(registry()).add_systems(
            Update,
            (follow_reference_body, apply_camera_pose).chain(),
        );
        let mut view = ViewController::default();
        assert!(view.set_mode(ViewMode::Explore));
        assert!(view.turn_camera(CameraTurn::Right));
        let camera = app.world_mut().spawn((view, Transform::default())).id();
        app.update();

        let pose = app.world().get::<ViewController>(camera).unwrap().pose();
        let expected = (pose.center - pose.eye).normalize().as_vec3();
        let transform = app.world().get::<Transform>(camera).unwrap();
        assert!(
            transform.forward().abs_diff_eq(expected, 1e-5),
            "{:?} != {expected}",
            transform.forward()
        );
        // the default explore heading points away from -Z
        assert!(transform.forward().z > -0.9);
    }
}
