//! Placement and orientation of every body, composed from its parent's frame.
//!
//! Frames follow the OpenGL convention of post-multiplication: each operation acts in the frame
//! produced by the operations before it. `+Y` is the orbital normal and rotation axis, `+X` is
//! both the tilt axis and the reference axis along which orbital radii are measured.
//!
//! A body is placed in its tilted orbital plane, the plane its orbit ring is drawn in, by
//! rotating by its orbit angle and translating by its orbital radius. That
//! rotation also turns the body itself, so a body would visually spin once more per revolution
//! than its rotation period says. [`FrameStep::RevolutionDecoupling`] rotates by the negated
//! orbit angle right after the translation and tilt to cancel it, which leaves the body's
//! orientation driven by its spin angle alone.

use crate::body::{Body, BodyId, BodyRegistry};
use bevy::math::{DAffine3, DVec3};
use bevy::prelude::*;
use std::f64::consts::TAU;

/// Segments of the polyline approximating an orbit ring.
pub const ORBIT_RING_SIDES: usize = 50;

pub struct FramePlugin;

impl Plugin for FramePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameCache>().add_systems(
            Update,
            compose_frames
                .in_set(SolarSystemSet::Compose)
                .run_if(resource_exists::<BodyRegistry>),
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, SystemSet)]
pub enum SolarSystemSet {
    /// Rebuilds the [`FrameCache`] from the current body angles.
    Compose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    /// `+X`
    Tilt,
    /// `+Y`
    OrbitalNormal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOp {
    Rotate { axis: RotationAxis, degrees: f64 },
    Translate(DVec3),
}

impl FrameOp {
    fn rotate_x(degrees: f64) -> Self {
        Self::Rotate {
            axis: RotationAxis::Tilt,
            degrees,
        }
    }

    fn rotate_y(degrees: f64) -> Self {
        Self::Rotate {
            axis: RotationAxis::OrbitalNormal,
            degrees,
        }
    }

    fn translate_x(distance: f64) -> Self {
        Self::Translate(DVec3::X * distance)
    }

    pub fn to_affine(self) -> DAffine3 {
        match self {
            Self::Rotate {
                axis: RotationAxis::Tilt,
                degrees,
            } => DAffine3::from_rotation_x(degrees.to_radians()),
            Self::Rotate {
                axis: RotationAxis::OrbitalNormal,
                degrees,
            } => DAffine3::from_rotation_y(degrees.to_radians()),
            Self::Translate(offset) => DAffine3::from_translation(offset),
        }
    }
}

/// The named steps placing a body, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStep {
    ParentOrbitalTilt,
    ParentRevolution,
    ParentOrbitalRadius,
    /// Tilts the orbital plane, so the body travels on its orbit ring.
    OrbitalPlane,
    Revolution,
    OrbitalRadius,
    OrbitalTilt,
    RevolutionDecoupling,
    AxisTilt,
    Spin,
    /// Turns the sphere primitive so its polar (`Z`) axis lines up with the rotation axis.
    PolarAlignment,
}

const POLAR_ALIGNMENT_DEGREES: f64 = 90.0;

/// Steps 1 to 3: the point a satellite of `body` orbits around.
fn satellite_ops(body: &Body) -> [(FrameStep, FrameOp); 3] {
    let params = body.params();
    [
        (
            FrameStep::ParentOrbitalTilt,
            FrameOp::rotate_x(params.orbital_tilt),
        ),
        (FrameStep::ParentRevolution, FrameOp::rotate_y(body.orbit())),
        (
            FrameStep::ParentOrbitalRadius,
            FrameOp::translate_x(params.orbital_radius),
        ),
    ]
}

/// The body's orbital plane, relative to its anchor.
fn plane_op(body: &Body) -> (FrameStep, FrameOp) {
    (
        FrameStep::OrbitalPlane,
        FrameOp::rotate_x(body.params().orbital_tilt),
    )
}

/// Steps 4 and 5: the body's centre on its orbit, within its orbital plane.
fn placement_ops(body: &Body) -> [(FrameStep, FrameOp); 2] {
    [
        (FrameStep::Revolution, FrameOp::rotate_y(body.orbit())),
        (
            FrameStep::OrbitalRadius,
            FrameOp::translate_x(body.params().orbital_radius),
        ),
    ]
}

/// Steps 6 and 7, skipped for the root.
fn decoupling_ops(body: &Body) -> [(FrameStep, FrameOp); 2] {
    [
        (
            FrameStep::OrbitalTilt,
            FrameOp::rotate_x(body.params().orbital_tilt),
        ),
        (
            FrameStep::RevolutionDecoupling,
            FrameOp::rotate_y(-body.orbit()),
        ),
    ]
}

/// Steps 8 to 10: the body's own orientation.
fn orientation_ops(body: &Body) -> [(FrameStep, FrameOp); 3] {
    [
        (
            FrameStep::AxisTilt,
            FrameOp::rotate_x(body.params().axis_tilt),
        ),
        (FrameStep::Spin, FrameOp::rotate_y(body.spin())),
        (
            FrameStep::PolarAlignment,
            FrameOp::rotate_x(POLAR_ALIGNMENT_DEGREES),
        ),
    ]
}

fn compose<'a>(ops: impl IntoIterator<Item = &'a (FrameStep, FrameOp)>) -> DAffine3 {
    ops.into_iter()
        .fold(DAffine3::IDENTITY, |frame, (_, op)| frame * op.to_affine())
}

/// Ordered operations placing `id` relative to the frame its parent is anchored in.
///
/// Steps 1 to 3 use the parent's parameters and are left out when the parent is the root, whose
/// orbital parameters are ignored. The root itself only gets its orientation steps.
pub fn sequence(registry: &BodyRegistry, id: BodyId) -> Vec<(FrameStep, FrameOp)> {
    let Some(body) = registry.get(id) else {
        return Vec::new();
    };
    let mut ops = Vec::with_capacity(11);
    if let Some(parent) = body.parent().and_then(|parent| registry.get(parent)) {
        if !parent.is_root() {
            ops.extend(satellite_ops(parent));
        }
        ops.push(plane_op(body));
        ops.extend(placement_ops(body));
        ops.extend(decoupling_ops(body));
    }
    ops.extend(orientation_ops(body));
    ops
}

/// Composed frames of one body, all in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame {
    /// Centre of the body's orbit.
    pub anchor: DAffine3,
    /// Frame the orbit ring lies in, tilted by the body's orbital tilt.
    pub ring: DAffine3,
    /// Centre of the body, before any orientation: the ring frame followed by steps 4 and 5.
    /// Identity for the root.
    pub placement: DAffine3,
    /// Frame the body primitive is drawn in.
    pub world: DAffine3,
    /// Frame the body's satellites are anchored on.
    pub satellite: DAffine3,
}

impl BodyFrame {
    fn compose(body: &Body, anchor: DAffine3) -> Self {
        if body.is_root() {
            let world = compose(&orientation_ops(body));
            return Self {
                anchor,
                ring: anchor,
                placement: anchor,
                world: anchor * world,
                satellite: anchor,
            };
        }

        let ring = anchor * plane_op(body).1.to_affine();
        let placement = ring * compose(&placement_ops(body));
        let oriented = placement * compose(&decoupling_ops(body)) * compose(&orientation_ops(body));
        Self {
            anchor,
            ring,
            placement,
            world: oriented,
            satellite: anchor * compose(&satellite_ops(body)),
        }
    }

    /// World position of the body's centre.
    #[inline]
    pub fn position(&self) -> DVec3 {
        self.placement.translation
    }
}

/// Frames of every body for the current angles, indexed like the registry.
#[derive(Debug, Clone, Default, Resource)]
pub struct FrameCache {
    frames: Vec<BodyFrame>,
}

impl FrameCache {
    /// Composes all frames in one pass. Parents precede satellites in the registry, so each
    /// parent's satellite frame is already known when its satellites are reached.
    pub fn compose(registry: &BodyRegistry) -> Self {
        let mut cache = Self::default();
        cache.recompose(registry);
        cache
    }

    pub fn recompose(&mut self, registry: &BodyRegistry) {
        self.frames.clear();
        self.frames.reserve(registry.len());
        for (_, body) in registry.iter() {
            let anchor = match body.parent() {
                Some(parent) if registry.get(parent).is_some_and(|p| !p.is_root()) => self
                    .frames
                    .get(parent.0)
                    .map(|frame| frame.satellite)
                    .unwrap_or(DAffine3::IDENTITY),
                _ => DAffine3::IDENTITY,
            };
            self.frames.push(BodyFrame::compose(body, anchor));
        }
    }

    #[inline]
    pub fn get(&self, id: BodyId) -> Option<&BodyFrame> {
        self.frames.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Vertices of a body's orbit ring, in its [`BodyFrame::ring`] frame.
pub fn orbit_ring(body: &Body, sides: usize) -> impl Iterator<Item = DVec3> + '_ {
    let radius = body.params().orbital_radius;
    (0..sides).map(move |i| {
        let angle = i as f64 * TAU / sides as f64;
        DVec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
    })
}

/// Where the body's label goes, in its [`BodyFrame::ring`] frame.
pub fn label_position(body: &Body) -> DVec3 {
    let radius = body.params().orbital_radius;
    let angle = (90.0 + body.orbit()).to_radians();
    DVec3::new(radius * angle.sin(), 0.0, radius * angle.cos())
}

fn compose_frames(registry: Res<BodyRegistry>, mut cache: ResMut<FrameCache>) {
    cache.recompose(&registry);
}
