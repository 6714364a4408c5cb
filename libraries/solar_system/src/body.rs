use bevy::prelude::*;
use std::fmt;
use thiserror::Error;

/// Upper bound on the number of bodies a registry accepts.
pub const MAX_BODIES: usize = 25;

pub struct BodyPlugin;

impl Plugin for BodyPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<BodyId>()
            .register_type::<BodyParams>()
            .register_type::<Body>()
            .register_type::<BodyRegistry>();
    }
}

/// Index of a body inside its [`BodyRegistry`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct BodyId(pub usize);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Static parameters of a body. Angles are in degrees, periods in days.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct BodyParams {
    pub name: String,
    pub color: [f32; 3],
    pub orbital_radius: f64,
    pub orbital_tilt: f64,
    pub orbital_period: f64,
    pub radius: f64,
    pub axis_tilt: f64,
    pub rotation_period: f64,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Body {
    params: BodyParams,
    parent: Option<BodyId>,
    spin: f64,
    orbit: f64,
}

impl Body {
    /// Creates a body at spin and orbit angle zero.
    ///
    /// A parent equal to the body's own index marks the root, the same as `None`.
    pub fn new(params: BodyParams, parent: Option<BodyId>) -> Self {
        Self {
            params,
            parent,
            spin: 0.0,
            orbit: 0.0,
        }
    }

    pub fn with_angles(mut self, orbit: f64, spin: f64) -> Self {
        self.orbit = orbit;
        self.spin = spin;
        self
    }

    #[inline]
    pub fn params(&self) -> &BodyParams {
        &self.params
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.params.name
    }

    #[inline]
    pub fn parent(&self) -> Option<BodyId> {
        self.parent
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Current self-rotation angle in degrees.
    #[inline]
    pub fn spin(&self) -> f64 {
        self.spin
    }

    /// Current angle along the orbit in degrees.
    #[inline]
    pub fn orbit(&self) -> f64 {
        self.orbit
    }

    pub(crate) fn set_angles(&mut self, orbit: f64, spin: f64) {
        self.orbit = orbit;
        self.spin = spin;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Orbital,
    Rotation,
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orbital => f.write_str("orbital period"),
            Self::Rotation => f.write_str("rotation period"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("The system has no bodies")]
    Empty,
    #[error("Too many bodies: {count} (maximum is {max})")]
    TooManyBodies { count: usize, max: usize },
    #[error("Body {body:?} has a non-positive {kind}: {value}")]
    NonPositivePeriod {
        body: String,
        kind: PeriodKind,
        value: f64,
    },
    #[error("Body {body:?} has an invalid {field}: {value}")]
    InvalidParameter {
        body: String,
        field: &'static str,
        value: f64,
    },
    #[error("Body {body:?} orbits {parent}, which does not exist")]
    UnknownParent { body: String, parent: BodyId },
    #[error("Body {body:?} orbits {parent}, which is defined after it")]
    ForwardParent { body: String, parent: BodyId },
    #[error("No root body; exactly one body must orbit itself")]
    NoRoot,
    #[error("Both {first:?} and {second:?} are root bodies")]
    MultipleRoots { first: String, second: String },
}

/// All bodies of the simulation, in definition order. Parents always precede their satellites.
#[derive(Debug, Clone, Resource, Reflect)]
#[reflect(Resource)]
pub struct BodyRegistry {
    bodies: Vec<Body>,
    reference: Option<BodyId>,
}

impl BodyRegistry {
    pub fn new(bodies: Vec<Body>) -> Result<Self, RegistryError> {
        use RegistryError::*;

        if bodies.is_empty() {
            return Err(Empty);
        }
        if bodies.len() > MAX_BODIES {
            return Err(TooManyBodies {
                count: bodies.len(),
                max: MAX_BODIES,
            });
        }

        let mut bodies = bodies;
        let count = bodies.len();
        let mut root: Option<usize> = None;
        for index in 0..bodies.len() {
            validate_params(&bodies[index].params)?;

            let body = &mut bodies[index];
            match body.parent {
                Some(BodyId(parent)) if parent == index => body.parent = None,
                Some(parent) if parent.0 >= count => {
                    return Err(UnknownParent {
                        body: body.params.name.clone(),
                        parent,
                    })
                }
                Some(parent) if parent.0 > index => {
                    return Err(ForwardParent {
                        body: body.params.name.clone(),
                        parent,
                    })
                }
                _ => {}
            }

            if bodies[index].parent.is_none() {
                if let Some(first) = root {
                    return Err(MultipleRoots {
                        first: bodies[first].params.name.clone(),
                        second: bodies[index].params.name.clone(),
                    });
                }
                root = Some(index);
            }
        }
        if root.is_none() {
            return Err(NoRoot);
        }

        Ok(Self {
            bodies,
            reference: None,
        })
    }

    /// Designates the body the Earth-relative view follows.
    pub fn with_reference(mut self, reference: Option<BodyId>) -> Self {
        self.reference = reference.filter(|id| id.0 < self.bodies.len());
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    #[inline]
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    /// The root is always the first body, since nothing can be defined before it.
    #[inline]
    pub fn root(&self) -> BodyId {
        BodyId(0)
    }

    pub fn reference(&self) -> Option<BodyId> {
        self.reference
    }

    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .position(|body| body.name() == name)
            .map(BodyId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(index, body)| (BodyId(index), body))
    }

    pub(crate) fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.iter_mut()
    }
}

fn validate_params(params: &BodyParams) -> Result<(), RegistryError> {
    for (kind, value) in [
        (PeriodKind::Orbital, params.orbital_period),
        (PeriodKind::Rotation, params.rotation_period),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(RegistryError::NonPositivePeriod {
                body: params.name.clone(),
                kind,
                value,
            });
        }
    }

    let lengths = [
        ("orbital radius", params.orbital_radius),
        ("radius", params.radius),
    ];
    let angles = [
        ("orbital tilt", params.orbital_tilt),
        ("axis tilt", params.axis_tilt),
    ];
    let invalid = lengths
        .into_iter()
        .find(|(_, value)| !(value.is_finite() && *value >= 0.0))
        .or_else(|| angles.into_iter().find(|(_, value)| !value.is_finite()));
    if let Some((field, value)) = invalid {
        return Err(RegistryError::InvalidParameter {
            body: params.name.clone(),
            field,
            value,
        });
    }
    Ok(())
}
