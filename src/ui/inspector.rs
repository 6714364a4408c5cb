use crate::draw::DisplaySettings;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContext;
use bevy_inspector_egui::bevy_inspector;
use bevy_inspector_egui::DefaultInspectorConfigPlugin;
use egui::containers;
use solar_system::body::BodyRegistry;

pub struct Plugin;

impl bevy::prelude::Plugin for Plugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<DefaultInspectorConfigPlugin>() {
            app.add_plugins(DefaultInspectorConfigPlugin);
        }
        app.add_systems(Update, inspector_ui);
    }
}

fn inspector_ui(world: &mut World) {
    let Ok(mut ctx) = world
        .query_filtered::<&mut EguiContext, With<PrimaryWindow>>()
        .get_single_mut(world)
        .map(|ctx| ctx.clone())
    else {
        return;
    };

    containers::Window::new("Bodies")
        .frame(super::default_frame())
        .default_open(false)
        .show(ctx.get_mut(), |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                if world.contains_resource::<BodyRegistry>() {
                    bevy_inspector::ui_for_resource::<BodyRegistry>(world, ui);
                } else {
                    ui.disable();
                    ui.label("No system loaded");
                }
            });
        });

    containers::Window::new("Display")
        .frame(super::default_frame())
        .default_open(false)
        .show(ctx.get_mut(), |ui| {
            bevy_inspector::ui_for_resource::<DisplaySettings>(world, ui);
        });

    containers::Window::new("Inspector")
        .frame(super::default_frame())
        .show(ctx.get_mut(), |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                bevy_inspector::ui_for_world_entities(world, ui);
            });
        });
}
