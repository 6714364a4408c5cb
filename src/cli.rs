use crate::app;
use bevy::app::AppExit;
use bevy::window::WindowResolution;
use clap::ArgAction;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_SYSTEM: &str = "assets/scenes/solar.system.yaml";

#[derive(clap::Parser)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    command: CliCommand,
}

impl Cli {
    pub(crate) fn run(self) -> AppExit {
        self.command.run()
    }
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Opens the simulation window.
    Run {
        /// Solar system manifest to load.
        #[clap(short, long, default_value = DEFAULT_SYSTEM)]
        system: PathBuf,
        #[clap(short, long)]
        resolution: Option<Resolution>,
        #[clap(long, action = ArgAction::SetTrue)]
        inspector: bool,
    },
    /// Validates a manifest without opening a window.
    Check {
        #[clap(short, long, default_value = DEFAULT_SYSTEM)]
        system: PathBuf,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Resolution {
    width: f32,
    height: f32,
}

impl FromStr for Resolution {
    type Err = ResolutionInvalidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s.split_once('x').ok_or(ResolutionInvalidFormat)?;
        let width = w.parse::<f32>().map_err(|_| ResolutionInvalidFormat)?;
        let height = h.parse::<f32>().map_err(|_| ResolutionInvalidFormat)?;
        Ok(Self { width, height })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid format for resolution; expected <width>x<height>")]
struct ResolutionInvalidFormat;

impl CliCommand {
    fn run(self) -> AppExit {
        match self {
            Self::Run {
                system,
                resolution,
                inspector,
            } => app::get_app(app::AppSettings {
                system,
                resolution: resolution
                    .map(|r| WindowResolution::new(r.width, r.height))
                    .unwrap_or_default(),
                with_inspector: inspector,
            })
            .run(),
            Self::Check { system } => check(system),
        }
    }
}

fn check(path: PathBuf) -> AppExit {
    let registry = solar_system::scene::load(&path)
        .and_then(|manifest| manifest.build_registry(&mut rand::thread_rng()));
    match registry {
        Ok(registry) => {
            let reference = registry
                .reference()
                .and_then(|id| registry.get(id))
                .map(|body| body.name())
                .unwrap_or("none");
            println!(
                "{}: {} bodies, reference body {reference}",
                path.display(),
                registry.len()
            );
            for (id, body) in registry.iter() {
                let parent = body
                    .parent()
                    .and_then(|parent| registry.get(parent))
                    .map(|parent| parent.name())
                    .unwrap_or("-");
                println!("  {id} {} (orbits {parent})", body.name());
            }
            AppExit::Success
        }
        Err(err) => {
            eprintln!("{}: {err}", path.display());
            AppExit::error()
        }
    }
}
