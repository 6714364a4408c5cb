use crate::command::{CommandSet, SimCommand};
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::mouse::MouseWheel;
use bevy::input::ButtonState;
use bevy::prelude::*;
use solar_system::clock::TIME_STEP_INCREMENT;
use viewpoint::components::MOVE_SPEED_INCREMENT;
use viewpoint::{CameraMove, CameraTurn, ShipManeuver};

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            get_blocked_inputs
                .pipe(send_input_commands)
                .before(CommandSet),
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Command(SimCommand),
    /// Modifiers and lock keys, dropped without a word.
    Silent,
    Unbound,
}

pub fn binding(key: &Key) -> Binding {
    use SimCommand::*;
    let command = match key {
        Key::Escape => Quit,
        Key::Space => Ship(ShipManeuver::Thrust),
        Key::ArrowLeft => TurnCamera(CameraTurn::Left),
        Key::ArrowRight => TurnCamera(CameraTurn::Right),
        Key::ArrowUp => TurnCamera(CameraTurn::Up),
        Key::ArrowDown => TurnCamera(CameraTurn::Down),
        Key::PageUp => AdjustShapeDetail(1),
        Key::PageDown => AdjustShapeDetail(-1),
        Key::Shift
        | Key::Control
        | Key::Alt
        | Key::AltGraph
        | Key::Super
        | Key::Meta
        | Key::Fn
        | Key::CapsLock
        | Key::NumLock => return Binding::Silent,
        Key::Character(c) => match c.as_str() {
            "a" => ToggleAxes,
            "-" => AdjustTimeStep(-TIME_STEP_INCREMENT),
            "+" => AdjustTimeStep(TIME_STEP_INCREMENT),
            "u" => MoveCamera(CameraMove::Up),
            "d" => MoveCamera(CameraMove::Down),
            "f" => MoveCamera(CameraMove::Forward),
            "b" => MoveCamera(CameraMove::Backward),
            "l" => MoveCamera(CameraMove::Left),
            "r" => MoveCamera(CameraMove::Right),
            " " => Ship(ShipManeuver::Thrust),
            "8" => Ship(ShipManeuver::PitchUp),
            "2" => Ship(ShipManeuver::PitchDown),
            "4" => Ship(ShipManeuver::YawLeft),
            "6" => Ship(ShipManeuver::YawRight),
            _ => return Binding::Unbound,
        },
        _ => return Binding::Unbound,
    };
    Binding::Command(command)
}

#[derive(Default)]
pub(crate) struct BlockedInputs {
    pointer: bool,
    keyboard: bool,
}

pub(crate) fn get_blocked_inputs(
    mut egui: bevy_egui::EguiContexts,
    q_window_entities: Query<Entity, With<Window>>,
) -> BlockedInputs {
    let mut ret = BlockedInputs::default();
    for window_entity in &q_window_entities {
        if let Some(ctx) = egui.try_ctx_for_entity_mut(window_entity) {
            ret.pointer |= ctx.wants_pointer_input();
            ret.keyboard |= ctx.wants_keyboard_input();
        }
    }
    ret
}

pub(crate) fn send_input_commands(
    In(blocked_inputs): In<BlockedInputs>,
    mut evr_keyboard: EventReader<KeyboardInput>,
    mut evr_scroll: EventReader<MouseWheel>,
    mut commands: EventWriter<SimCommand>,
) {
    if blocked_inputs.keyboard {
        evr_keyboard.clear();
    }
    for event in evr_keyboard.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        match binding(&event.logical_key) {
            Binding::Command(command) => {
                commands.send(command);
            }
            Binding::Silent => {}
            Binding::Unbound => warn!("NOT IMPLEMENTED: {:?}", event.logical_key),
        }
    }

    if blocked_inputs.pointer {
        evr_scroll.clear();
    }
    for event in evr_scroll.read() {
        if event.y > 0.0 {
            commands.send(SimCommand::AdjustMoveSpeed(MOVE_SPEED_INCREMENT));
        } else if event.y < 0.0 {
            commands.send(SimCommand::AdjustMoveSpeed(-MOVE_SPEED_INCREMENT));
        }
    }
}
