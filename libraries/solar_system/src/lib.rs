use bevy::app::PluginGroupBuilder;
use bevy::prelude::*;
use std::path::PathBuf;

pub mod body;
pub mod clock;
pub mod frame;
pub mod scene;

pub use frame::SolarSystemSet;

/// Loads the system from `source` at startup, advances it on the fixed schedule and composes
/// body frames every frame.
pub struct SolarSystemPlugin {
    pub source: PathBuf,
}

impl PluginGroup for SolarSystemPlugin {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(body::BodyPlugin)
            .add(clock::ClockPlugin)
            .add(frame::FramePlugin)
            .add(scene::ScenePlugin {
                source: self.source,
            })
    }
}
