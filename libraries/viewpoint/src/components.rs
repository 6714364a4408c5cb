use bevy::math::DVec3;
use bevy::prelude::*;
use solar_system::body::{BodyId, BodyRegistry};

/// Scale of the scene: the fixed views sit twice this far from the origin.
pub const DISTANCE: f64 = 2e8;
/// Degrees per turn command, for the camera and the ship alike.
pub const TURN_ANGLE: f64 = 4.0;

pub const DEFAULT_MOVE_SPEED: f64 = 0.01;
pub const MIN_MOVE_SPEED: f64 = 0.005;
pub const MAX_MOVE_SPEED: f64 = 0.5;
pub const MOVE_SPEED_INCREMENT: f64 = 0.005;

/// Extra distance between the reference body and the Earth-view camera, beyond the body's surface.
pub const EARTH_VIEW_OFFSET: f64 = 4e7;
/// Height of the Earth-view camera above the reference body's radius.
pub const EARTH_VIEW_ELEVATION: f64 = 2e6;

const EXPLORE_EYE: DVec3 = DVec3::new(DISTANCE, 0.25 * DISTANCE, 0.25 * DISTANCE);
const EXPLORE_LATITUDE: f64 = -16.0;
const EXPLORE_LONGITUDE: f64 = -102.0;
const SHIP_POSITION: DVec3 = DVec3::new(192763596.977131, 46818241.568945, 48563347.015047);
const SHIP_PITCH: f64 = 20.0;
const SHIP_YAW: f64 = -20.0;

/// Marks the camera the simulation is viewed through.
#[derive(Debug, Copy, Clone, Default, Reflect, Component)]
#[reflect(Component)]
pub struct SceneCamera;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Reflect)]
pub enum ViewMode {
    /// Overhead, looking down at the origin.
    #[default]
    Top,
    /// From the side, in the plane of the orbits.
    Ecliptic,
    /// Free-flying camera, with the ship.
    Explore,
    /// Trailing the reference body, looking at the origin.
    Earth,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [Self::Top, Self::Ecliptic, Self::Explore, Self::Earth];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Top => "Top view",
            Self::Ecliptic => "Ecliptic view",
            Self::Explore => "Explore mode",
            Self::Earth => "Earth view",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Reflect)]
pub enum CameraMove {
    Up,
    Down,
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Reflect)]
pub enum CameraTurn {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Reflect)]
pub enum ShipManeuver {
    Thrust,
    PitchUp,
    PitchDown,
    YawLeft,
    YawRight,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPose {
    pub eye: DVec3,
    pub center: DVec3,
    pub up: DVec3,
}

impl CameraPose {
    /// The direction is taken in double precision: in explore mode `center` is within a unit of
    /// `eye`, closer than single precision can tell apart at scene distances.
    pub fn to_transform(&self) -> Transform {
        Transform::from_translation(self.eye.as_vec3())
            .looking_to((self.center - self.eye).as_vec3(), self.up.as_vec3())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Reflect)]
pub struct Ship {
    pub position: DVec3,
    /// Degrees.
    pub pitch: f64,
    /// Degrees.
    pub yaw: f64,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            position: SHIP_POSITION,
            pitch: SHIP_PITCH,
            yaw: SHIP_YAW,
        }
    }
}

impl Ship {
    /// Direction the ship moves in on thrust. Not normalized: its length shrinks as the ship
    /// pitches.
    pub fn heading(&self) -> DVec3 {
        let yaw = (self.yaw + 180.0).to_radians();
        DVec3::new(yaw.sin(), self.pitch.to_radians().sin(), yaw.cos())
    }
}

/// Camera state for every view mode. Lives on the [`SceneCamera`] entity.
#[derive(Debug, Clone, Component, Reflect)]
#[reflect(Component)]
pub struct ViewController {
    mode: ViewMode,
    eye: DVec3,
    center: DVec3,
    up: DVec3,
    /// Explore-mode pitch of the camera, degrees.
    latitude: f64,
    /// Explore-mode heading of the camera, degrees.
    longitude: f64,
    ship: Ship,
    move_speed: f64,
    reference: Option<BodyId>,
}

impl Default for ViewController {
    fn default() -> Self {
        let mut this = Self {
            mode: ViewMode::Top,
            eye: DVec3::ZERO,
            center: DVec3::ZERO,
            up: DVec3::Y,
            latitude: 0.0,
            longitude: 0.0,
            ship: Ship::default(),
            move_speed: DEFAULT_MOVE_SPEED,
            reference: None,
        };
        this.update(None);
        this
    }
}

impl ViewController {
    #[inline]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    #[inline]
    pub fn pose(&self) -> CameraPose {
        CameraPose {
            eye: self.eye,
            center: self.center,
            up: self.up,
        }
    }

    #[inline]
    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    #[inline]
    pub fn move_speed(&self) -> f64 {
        self.move_speed
    }

    pub fn reference(&self) -> Option<BodyId> {
        self.reference
    }

    pub fn set_reference(&mut self, reference: Option<BodyId>) {
        self.reference = reference;
    }

    /// Switches to `mode`. Entering explore mode always starts from the same camera and ship.
    ///
    /// Returns `false`, leaving the mode unchanged, when asked for the Earth view without a
    /// reference body.
    pub fn set_mode(&mut self, mode: ViewMode) -> bool {
        match mode {
            ViewMode::Earth if self.reference.is_none() => return false,
            ViewMode::Explore => {
                self.eye = EXPLORE_EYE;
                self.center = DVec3::ZERO;
                self.up = DVec3::Y;
                self.latitude = EXPLORE_LATITUDE;
                self.longitude = EXPLORE_LONGITUDE;
                self.ship = Ship::default();
            }
            _ => {}
        }
        self.mode = mode;
        true
    }

    /// Recomputes eye, center and up for the current mode and body positions.
    pub fn update(&mut self, registry: Option<&BodyRegistry>) {
        match self.mode {
            ViewMode::Top => {
                self.eye = DVec3::new(0.0, 2.0 * DISTANCE, 0.0);
                self.center = DVec3::ZERO;
                self.up = DVec3::NEG_Z;
            }
            ViewMode::Ecliptic => {
                self.eye = DVec3::new(2.0 * DISTANCE, 0.0, 0.0);
                self.center = DVec3::ZERO;
                self.up = DVec3::Y;
            }
            ViewMode::Explore => {
                self.center = self.eye + look_direction(self.latitude, self.longitude);
            }
            ViewMode::Earth => {
                let Some(body) = self
                    .reference
                    .zip(registry)
                    .and_then(|(id, registry)| registry.get(id))
                else {
                    return;
                };
                let params = body.params();
                let distance = params.orbital_radius + params.radius + EARTH_VIEW_OFFSET;
                let angle = (90.0 + body.orbit()).to_radians();
                self.eye = DVec3::new(
                    distance * angle.sin(),
                    params.radius + EARTH_VIEW_ELEVATION,
                    distance * angle.cos(),
                );
                self.center = DVec3::ZERO;
                self.up = DVec3::Y;
            }
        }
    }

    fn step(&self) -> f64 {
        self.move_speed * DISTANCE
    }

    /// Moves the explore camera. Ignored in the other modes.
    pub fn move_camera(&mut self, direction: CameraMove) -> bool {
        if self.mode != ViewMode::Explore {
            return false;
        }
        let step = self.step();
        let (lat, lon) = (self.latitude.to_radians(), self.longitude);
        let sideways = |lon: f64| {
            let lon = lon.to_radians();
            DVec3::new(lon.sin(), 0.0, lon.cos())
        };
        let forward = DVec3::new(lon.to_radians().sin(), lat.sin(), lon.to_radians().cos());
        let offset = match direction {
            CameraMove::Up => DVec3::Y,
            CameraMove::Down => DVec3::NEG_Y,
            CameraMove::Forward => forward,
            CameraMove::Backward => -forward,
            CameraMove::Left => sideways(lon + 90.0),
            CameraMove::Right => sideways(lon - 90.0),
        };
        self.eye += offset * step;
        self.center += offset * step;
        true
    }

    /// Turns the explore camera. Latitude stays strictly between -90° and 90°.
    pub fn turn_camera(&mut self, turn: CameraTurn) -> bool {
        if self.mode != ViewMode::Explore {
            return false;
        }
        match turn {
            CameraTurn::Left => self.longitude += TURN_ANGLE,
            CameraTurn::Right => self.longitude -= TURN_ANGLE,
            CameraTurn::Up if self.latitude + TURN_ANGLE < 90.0 => self.latitude += TURN_ANGLE,
            CameraTurn::Down if self.latitude - TURN_ANGLE > -90.0 => self.latitude -= TURN_ANGLE,
            CameraTurn::Up | CameraTurn::Down => return false,
        }
        true
    }

    /// Flies the ship. Ignored outside explore mode.
    pub fn maneuver_ship(&mut self, maneuver: ShipManeuver) -> bool {
        if self.mode != ViewMode::Explore {
            return false;
        }
        match maneuver {
            ShipManeuver::Thrust => {
                let step = self.step();
                self.ship.position += self.ship.heading() * step;
            }
            ShipManeuver::PitchUp => self.ship.pitch += TURN_ANGLE,
            ShipManeuver::PitchDown => self.ship.pitch -= TURN_ANGLE,
            ShipManeuver::YawLeft => self.ship.yaw += TURN_ANGLE,
            ShipManeuver::YawRight => self.ship.yaw -= TURN_ANGLE,
        }
        true
    }

    /// Changes the move speed by `delta`, keeping it strictly within the allowed range.
    pub fn adjust_move_speed(&mut self, delta: f64) -> bool {
        let speed = self.move_speed + delta;
        if speed > MIN_MOVE_SPEED && speed < MAX_MOVE_SPEED {
            self.move_speed = speed;
            true
        } else {
            false
        }
    }
}

fn look_direction(latitude: f64, longitude: f64) -> DVec3 {
    let (lat, lon) = (latitude.to_radians(), longitude.to_radians());
    DVec3::new(lat.cos() * lon.sin(), lat.sin(), lat.cos() * lon.cos())
}
