use crate::draw::DisplaySettings;
use bevy::prelude::*;
use solar_system::clock::SimulationClock;
use starrynight::StarfieldVisible;
use viewpoint::{CameraMove, CameraTurn, ShipManeuver, ViewController, ViewMode, ViewpointSet};

pub struct CommandPlugin;

impl Plugin for CommandPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SimCommand>().add_systems(
            Update,
            apply_commands.in_set(CommandSet).before(ViewpointSet),
        );
    }
}

/// Commands are applied in this set; anything sending them should run before it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, SystemSet)]
pub struct CommandSet;

/// Everything the user can ask of the simulation, from the keyboard, the mouse or the UI.
#[derive(Debug, Copy, Clone, PartialEq, Event)]
pub enum SimCommand {
    SetViewMode(ViewMode),
    ToggleLabels,
    ToggleOrbits,
    ToggleStarfield,
    ToggleAxes,
    AdjustTimeStep(f64),
    AdjustMoveSpeed(f64),
    MoveCamera(CameraMove),
    TurnCamera(CameraTurn),
    Ship(ShipManeuver),
    AdjustShapeDetail(i32),
    Quit,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Out of range, not available in the current view, or no camera to apply it to.
    Ignored,
    Quit,
}

impl From<bool> for Outcome {
    fn from(applied: bool) -> Self {
        if applied {
            Self::Applied
        } else {
            Self::Ignored
        }
    }
}

pub struct CommandTargets<'a> {
    pub view: Option<&'a mut ViewController>,
    pub clock: &'a mut SimulationClock,
    pub display: &'a mut DisplaySettings,
    pub starfield: &'a mut StarfieldVisible,
}

impl SimCommand {
    pub fn apply(self, targets: &mut CommandTargets) -> Outcome {
        let CommandTargets {
            view,
            clock,
            display,
            starfield,
        } = targets;
        match self {
            Self::ToggleLabels => toggle(&mut display.labels),
            Self::ToggleOrbits => toggle(&mut display.orbits),
            Self::ToggleAxes => toggle(&mut display.axes),
            Self::ToggleStarfield => {
                starfield.toggle();
                Outcome::Applied
            }
            Self::AdjustTimeStep(delta) => clock.adjust_time_step(delta).into(),
            Self::AdjustShapeDetail(delta) => display.adjust_detail(delta).into(),
            Self::Quit => Outcome::Quit,
            Self::SetViewMode(mode) => view.as_mut().is_some_and(|v| v.set_mode(mode)).into(),
            Self::AdjustMoveSpeed(delta) => view
                .as_mut()
                .is_some_and(|v| v.adjust_move_speed(delta))
                .into(),
            Self::MoveCamera(direction) => view
                .as_mut()
                .is_some_and(|v| v.move_camera(direction))
                .into(),
            Self::TurnCamera(turn) => view.as_mut().is_some_and(|v| v.turn_camera(turn)).into(),
            Self::Ship(maneuver) => view
                .as_mut()
                .is_some_and(|v| v.maneuver_ship(maneuver))
                .into(),
        }
    }
}

fn toggle(flag: &mut bool) -> Outcome {
    *flag = !*flag;
    Outcome::Applied
}

fn apply_commands(
    mut events: EventReader<SimCommand>,
    mut q_view: Query<&mut ViewController>,
    mut clock: ResMut<SimulationClock>,
    mut display: ResMut<DisplaySettings>,
    mut starfield: ResMut<StarfieldVisible>,
    mut exit: EventWriter<AppExit>,
) {
    for &command in events.read() {
        let mut view = q_view.get_single_mut().ok();
        let mut targets = CommandTargets {
            view: view.as_deref_mut(),
            clock: &mut *clock,
            display: &mut *display,
            starfield: &mut *starfield,
        };
        match command.apply(&mut targets) {
            Outcome::Applied => debug!("Applied {command:?}"),
            Outcome::Ignored => match command {
                SimCommand::SetViewMode(ViewMode::Earth) => {
                    warn!("No reference body to follow; staying in the current view")
                }
                _ => debug!("Ignored {command:?}"),
            },
            Outcome::Quit => {
                info!("Quit requested");
                exit.send(AppExit::Success);
            }
        }
    }
}
