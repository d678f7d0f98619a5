pub mod config;
pub mod error;
pub mod feeds;
pub mod screen;
pub mod sinks;
pub mod ticker;

use config::ScreenConfig;
use feeds::{SensorFeed, SensorHub, SimulatedFeed};
use screen::{ScreenController, ScreenHandle};
use sinks::Surfaces;

/// Build a sensor hub of simulated feeds, leaving out any disabled in config.
pub fn build_simulated_hub(config: &ScreenConfig) -> SensorHub {
    let params = config.feeds.to_params();
    let gyroscope = config
        .feeds
        .gyroscope
        .then(|| Box::new(SimulatedFeed::gyroscope(params)) as Box<dyn SensorFeed>);
    let accelerometer = config
        .feeds
        .accelerometer
        .then(|| Box::new(SimulatedFeed::accelerometer(params)) as Box<dyn SensorFeed>);
    SensorHub::new(gyroscope, accelerometer)
}

/// Build a screen controller and its handle from a config.
pub fn build_screen(config: &ScreenConfig, surfaces: Surfaces) -> (ScreenController, ScreenHandle) {
    let hub = build_simulated_hub(config);
    ScreenController::new(config.physics.clone(), hub, surfaces)
}
