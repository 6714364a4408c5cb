use bevy::app::AppExit;
use clap::Parser;

mod app;
mod cli;
mod command;
mod draw;
mod input;
mod ui;

fn main() -> AppExit {
    cli::Cli::parse().run()
}
