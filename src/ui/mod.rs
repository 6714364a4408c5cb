use crate::command::{CommandSet, SimCommand};
use crate::draw::DisplaySettings;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{EguiContext, EguiPlugin};
use egui::panel::TopBottomSide;
use egui::{containers, Align, FontId, Ui};
use solar_system::body::BodyRegistry;
use solar_system::clock::{SimulationClock, TIME_STEP_INCREMENT};
use solar_system::frame::{label_position, FrameCache};
use solar_system::SolarSystemSet;
use starrynight::StarfieldVisible;
use viewpoint::components::MOVE_SPEED_INCREMENT;
use viewpoint::{SceneCamera, ViewController, ViewMode};

mod inspector;

#[derive(Default)]
pub struct UiPlugin {
    pub with_inspector: bool,
}

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin);
        }
        if !app.is_plugin_added::<FrameTimeDiagnosticsPlugin>() {
            app.add_plugins(FrameTimeDiagnosticsPlugin);
        }

        configure_sets(app);
        app.add_systems(Update, ui.in_set(UiSet));

        if self.with_inspector {
            app.add_plugins(inspector::Plugin);
        }
    }
}

/// The UI reads composed frames and sends [`SimCommand`]s, applied later in the same frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, SystemSet)]
pub struct UiSet;

pub(crate) fn configure_sets(app: &mut App) {
    app.configure_sets(
        Update,
        UiSet.after(SolarSystemSet::Compose).before(CommandSet),
    );
}

#[derive(SystemParam)]
struct UiSystems<'w, 's> {
    diagnostics: Res<'w, DiagnosticsStore>,
    clock: Res<'w, SimulationClock>,
    display: Res<'w, DisplaySettings>,
    starfield: Res<'w, StarfieldVisible>,
    registry: Option<Res<'w, BodyRegistry>>,
    frames: Res<'w, FrameCache>,
    q_view: Query<'w, 's, &'static ViewController>,
    q_camera_transform:
        Query<'w, 's, (&'static GlobalTransform, &'static Camera), With<SceneCamera>>,
    commands: EventWriter<'w, SimCommand>,
}

fn ui(mut this: UiSystems, mut q_egui: Query<&mut EguiContext, With<PrimaryWindow>>) {
    let Ok(mut egui) = q_egui.get_single_mut() else {
        return;
    };

    let ctx = egui.get_mut();
    this.toplevel(ctx);
}

impl UiSystems<'_, '_> {
    fn toplevel(&mut self, ctx: &egui::Context) {
        self.topbar(ctx);
        self.scene_overlay(ctx);
    }

    fn topbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::new(TopBottomSide::Top, "toolbar")
            .frame(default_frame())
            .show(ctx, |ui| {
                self.topbar_ui(ui);
            });
    }

    fn topbar_ui(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            self.view_selector(ui);
            ui.separator();
            self.current_date(ui);
            ui.separator();
            self.speed_controls(ui);
            ui.with_layout(egui::Layout::right_to_left(Align::Max), |ui| {
                self.fps_display(ui);
                ui.separator();
                self.toggles(ui);
            });
        });
    }

    fn view_mode(&self) -> Option<ViewMode> {
        self.q_view.get_single().ok().map(ViewController::mode)
    }

    fn view_selector(&mut self, ui: &mut Ui) {
        let current = self.view_mode();
        containers::ComboBox::new("view", "View")
            .selected_text(current.map(|mode| mode.label()).unwrap_or("No camera"))
            .show_ui(ui, |ui| {
                for mode in ViewMode::ALL {
                    if ui
                        .selectable_label(current == Some(mode), mode.label())
                        .clicked()
                    {
                        self.commands.send(SimCommand::SetViewMode(mode));
                    }
                }
            });
    }

    fn current_date(&mut self, ui: &mut Ui) {
        ui.label(self.clock.calendar_date().format("%Y-%m-%d").to_string());
        ui.label(format!("Day {:.1}", self.clock.date()));
    }

    fn speed_controls(&mut self, ui: &mut Ui) {
        let time_step = format!("Time step: {:.2} d", self.clock.time_step());
        if let Some(delta) = stepper(ui, &time_step, TIME_STEP_INCREMENT) {
            self.commands.send(SimCommand::AdjustTimeStep(delta));
        }

        let Some(move_speed) = self.q_view.get_single().ok().map(ViewController::move_speed) else {
            return;
        };
        let move_speed = format!("Move speed: {move_speed:.3}");
        if let Some(delta) = stepper(ui, &move_speed, MOVE_SPEED_INCREMENT) {
            self.commands.send(SimCommand::AdjustMoveSpeed(delta));
        }
    }

    fn toggles(&mut self, ui: &mut Ui) {
        for (mut value, label, command) in [
            (**self.starfield, "Stars", SimCommand::ToggleStarfield),
            (self.display.axes, "Axes", SimCommand::ToggleAxes),
            (self.display.orbits, "Orbits", SimCommand::ToggleOrbits),
            (self.display.labels, "Labels", SimCommand::ToggleLabels),
        ] {
            if ui.checkbox(&mut value, label).changed() {
                self.commands.send(command);
            }
        }
    }

    fn fps_display(&mut self, ui: &mut Ui) {
        let Some(fps) = self.diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) else {
            return;
        };
        if !fps.is_enabled {
            return;
        }
        ui.label(
            fps.average()
                .map(|v| format!("FPS: {v:2.1} Hz"))
                .unwrap_or_else(|| String::from("N/A")),
        );
    }

    /// Transparent panel over the scene: body labels and the right-click menu.
    fn scene_overlay(&mut self, ctx: &egui::Context) {
        containers::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                ui.allocate_rect(ui.clip_rect(), egui::Sense::click())
                    .context_menu(|ui| self.context_menu(ui));

                if self.display.labels {
                    self.body_labels(ui);
                }
            });
    }

    fn context_menu(&mut self, ui: &mut Ui) {
        let mut entries = ViewMode::ALL
            .iter()
            .map(|&mode| (mode.label(), SimCommand::SetViewMode(mode)))
            .collect::<Vec<_>>();
        entries.extend([
            ("Toggle labels", SimCommand::ToggleLabels),
            ("Toggle orbits", SimCommand::ToggleOrbits),
            ("Toggle stars", SimCommand::ToggleStarfield),
            ("Quit", SimCommand::Quit),
        ]);
        for (label, command) in entries {
            if matches!(command, SimCommand::ToggleLabels | SimCommand::Quit) {
                ui.separator();
            }
            if ui.button(label).clicked() {
                self.commands.send(command);
                ui.close_menu();
            }
        }
    }

    fn body_labels(&self, ui: &Ui) {
        let Some(registry) = self.registry.as_deref() else {
            return;
        };
        let Ok((cam_transform, camera)) = self.q_camera_transform.get_single() else {
            return;
        };

        let painter = ui.painter();
        for (id, body) in registry.iter() {
            let Some(frame) = self.frames.get(id) else {
                continue;
            };
            let position = frame.ring.transform_point3(label_position(body));
            let Ok(viewport) = camera.world_to_viewport(cam_transform, position.as_vec3()) else {
                continue;
            };
            let [r, g, b] = body.params().color;
            let color = egui::Rgba::from_rgb(r, g, b).into();
            painter.text(
                egui::pos2(viewport.x, viewport.y),
                egui::Align2::LEFT_BOTTOM,
                body.name(),
                FontId::proportional(12.0),
                color,
            );
        }
    }
}

/// A label between `-` and `+` buttons. Returns the signed increment when one is clicked.
fn stepper(ui: &mut Ui, label: &str, increment: f64) -> Option<f64> {
    let mut ret = None;
    ui.horizontal(|ui| {
        if ui.button("-").clicked() {
            ret = Some(-increment);
        }
        ui.label(label);
        if ui.button("+").clicked() {
            ret = Some(increment);
        }
    });
    ret
}

fn default_frame() -> egui::Frame {
    let default_frame = egui::Frame::default();
    let [r, g, b, _] = default_frame.fill.to_array();
    default_frame
        .fill(egui::Color32::from_rgba_unmultiplied(r, g, b, 128))
        .inner_margin(egui::vec2(8.0, 6.0))
}
