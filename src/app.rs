use crate::{command, draw, input, ui};
use bevy::prelude::*;
use bevy::window::WindowResolution;
use solar_system::SolarSystemPlugin;
use starrynight::StarryNightPlugin;
use std::path::PathBuf;
use viewpoint::{SceneCamera, ViewController, ViewpointPlugin};

pub(crate) struct AppSettings {
    pub(crate) system: PathBuf,
    pub(crate) resolution: WindowResolution,
    pub(crate) with_inspector: bool,
}

pub fn get_app(settings: AppSettings) -> App {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Orrery".to_string(),
            resolution: settings.resolution,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(ClearColor(Color::BLACK));
    add_simulation(&mut app, settings.system)
        .add_plugins((
            input::InputPlugin,
            ui::UiPlugin {
                with_inspector: settings.with_inspector,
            },
        ))
        .add_observer(debug_show_named_entities);
    app
}

/// The simulation, its camera and its drawing, without any window input or UI.
fn add_simulation(app: &mut App, system: PathBuf) -> &mut App {
    app.add_plugins((
        SolarSystemPlugin { source: system },
        StarryNightPlugin,
        ViewpointPlugin,
        command::CommandPlugin,
        draw::DrawPlugin,
    ))
    .add_systems(Startup, setup)
}

fn debug_show_named_entities(trigger: Trigger<OnAdd, Name>, q: Query<&Name>) {
    if let Ok(name) = q.get(trigger.entity()) {
        debug!("{entity}: {name}", entity = trigger.entity());
    }
}

fn setup(mut commands: Commands) {
    let view = ViewController::default();
    commands.spawn((
        Name::new("Scene camera"),
        SceneCamera,
        Camera3d::default(),
        viewpoint::scene_projection(),
        view.pose().to_transform(),
        view,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::SimCommand;
    use crate::draw::DisplaySettings;
    use bevy::gizmos::GizmoPlugin;
    use bevy::render::render_resource::Shader;
    use solar_system::body::BodyRegistry;
    use solar_system::frame::FrameCache;
    use viewpoint::{CameraTurn, ViewMode};

    const BUNDLED_SYSTEM: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/assets/scenes/solar.system.yaml"
    );

    /// Commands sent from the UI set, standing in for the egui panels.
    #[derive(Default, Resource, Deref, DerefMut)]
    struct Clicks(Vec<SimCommand>);

    fn send_clicks(mut clicks: ResMut<Clicks>, mut commands: EventWriter<SimCommand>) {
        commands.send_batch(clicks.drain(..));
    }

    fn headless_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Shader>()
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .add_plugins(GizmoPlugin);
        add_simulation(&mut app, PathBuf::from(BUNDLED_SYSTEM));
        ui::configure_sets(&mut app);
        app.init_resource::<Clicks>()
            .add_systems(Update, send_clicks.in_set(ui::UiSet));
        app
    }

    #[test]
    fn simulation_runs_headless() {
        let mut app = headless_app();
        for _ in 0..5 {
            app.update();
        }
        assert_eq!(app.should_exit(), None);
        assert_eq!(app.world().resource::<BodyRegistry>().len(), 8);
        assert_eq!(app.world().resource::<FrameCache>().len(), 8);

        let mut q_view = app.world_mut().query::<&ViewController>();
        let view = q_view.single(app.world());
        assert_eq!(view.reference(), Some(solar_system::body::BodyId(3)));
    }

    #[test]
    fn ui_commands_apply_in_the_same_frame() {
        let mut app = headless_app();
        app.update();
        app.world_mut().resource_mut::<Clicks>().extend([
            SimCommand::ToggleOrbits,
            SimCommand::SetViewMode(ViewMode::Explore),
            SimCommand::TurnCamera(CameraTurn::Left),
        ]);
        app.update();

        assert!(!app.world().resource::<DisplaySettings>().orbits);
        let mut q_camera = app
            .world_mut()
            .query_filtered::<(&ViewController, &Transform), With<SceneCamera>>();
        let (view, transform) = q_camera.single(app.world());
        assert_eq!(view.mode(), ViewMode::Explore);
        let pose = view.pose();
        let expected = (pose.center - pose.eye).normalize().as_vec3();
        assert!(
            transform.forward().abs_diff_eq(expected, 1e-5),
            "{:?} != {expected}",
            transform.forward()
        );
    }
}
