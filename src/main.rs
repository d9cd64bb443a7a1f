mod app;
mod config;
mod game;
mod input;
mod model;
mod pet;
mod render;
mod storage;

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();
    app::run()
}
