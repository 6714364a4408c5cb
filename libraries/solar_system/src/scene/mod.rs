use crate::body::{Body, BodyId, BodyParams, BodyRegistry};
use crate::clock::SimulationClock;
use bevy::prelude::*;
use rand::Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod error;
pub mod manifest;

pub use error::SceneLoadError;
pub use manifest::{BodyRef, SolarSystem};

/// Body index the Earth-relative view falls back to when the manifest names no reference body.
pub const LEGACY_REFERENCE_INDEX: usize = 3;
const LEGACY_REFERENCE_NAME: &str = "Earth";

pub struct ScenePlugin {
    pub source: PathBuf,
}

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SystemSource(self.source.clone()))
            .add_systems(Startup, load_system);
    }
}

/// Path of the manifest the simulation is loaded from.
#[derive(Debug, Clone, Resource, Deref)]
pub struct SystemSource(pub PathBuf);

pub fn load(path: impl AsRef<Path>) -> Result<SolarSystem, SceneLoadError> {
    let input = std::fs::read_to_string(path)?;
    parse(&input)
}

pub fn parse(input: &str) -> Result<SolarSystem, SceneLoadError> {
    Ok(serde_yaml::from_str(input)?)
}

impl SolarSystem {
    /// Builds the registry, magnifying radii and starting every body at a random orbit angle.
    pub fn build_registry(&self, rng: &mut impl Rng) -> Result<BodyRegistry, SceneLoadError> {
        if !(self.magnification.is_finite() && self.magnification > 0.0) {
            return Err(SceneLoadError::InvalidMagnification(self.magnification));
        }

        let mut names = HashMap::with_capacity(self.bodies.len());
        for (index, body) in self.bodies.iter().enumerate() {
            if names.insert(body.name.as_str(), BodyId(index)).is_some() {
                return Err(SceneLoadError::DuplicateName(body.name.clone()));
            }
        }
        let resolve = |reference: &BodyRef| match reference {
            BodyRef::Index(index) => Ok(BodyId(*index)),
            BodyRef::Name(name) => names
                .get(name.as_str())
                .copied()
                .ok_or_else(|| SceneLoadError::UnknownBody(name.clone())),
        };

        let bodies = self
            .bodies
            .iter()
            .enumerate()
            .map(|(index, body)| {
                let parent = match &body.orbits {
                    Some(reference) => resolve(reference)?,
                    None => BodyId(index),
                };
                let params = BodyParams {
                    name: body.name.clone(),
                    color: body.color,
                    orbital_radius: body.orbital_radius,
                    orbital_tilt: body.orbital_tilt,
                    orbital_period: body.orbital_period,
                    radius: body.radius * self.magnification,
                    axis_tilt: body.axis_tilt,
                    rotation_period: body.rotation_period,
                };
                let orbit = rng.gen_range(0.0..360.0);
                Ok(Body::new(params, Some(parent)).with_angles(orbit, 0.0))
            })
            .collect::<Result<Vec<_>, SceneLoadError>>()?;

        let reference = match &self.reference_body {
            Some(reference) => {
                let id = resolve(reference)?;
                if id.0 >= bodies.len() {
                    return Err(SceneLoadError::UnknownIndex(id.0));
                }
                Some(id)
            }
            None => names
                .get(LEGACY_REFERENCE_NAME)
                .copied()
                .or_else(|| {
                    (LEGACY_REFERENCE_INDEX < bodies.len())
                        .then_some(BodyId(LEGACY_REFERENCE_INDEX))
                }),
        };

        Ok(BodyRegistry::new(bodies)?.with_reference(reference))
    }
}

fn load_system(
    mut commands: Commands,
    source: Res<SystemSource>,
    mut clock: ResMut<SimulationClock>,
    mut exit: EventWriter<AppExit>,
) {
    let manifest = match load(&**source) {
        Ok(manifest) => manifest,
        Err(err) => {
            error!("Cannot load {}: {err}", source.display());
            exit.send(AppExit::error());
            return;
        }
    };
    let registry = match manifest.build_registry(&mut rand::thread_rng()) {
        Ok(registry) => registry,
        Err(err) => {
            error!("Invalid system in {}: {err}", source.display());
            exit.send(AppExit::error());
            return;
        }
    };

    if let Some(epoch) = manifest.epoch {
        clock.set_epoch(epoch);
    }
    info!(
        "Loaded {} bodies from {}",
        registry.len(),
        source.display()
    );
    match registry.reference().and_then(|id| registry.get(id)) {
        Some(body) => debug!("Earth view follows {}", body.name()),
        None => warn!("No reference body; the Earth view is unavailable"),
    }
    commands.insert_resource(registry);
}
