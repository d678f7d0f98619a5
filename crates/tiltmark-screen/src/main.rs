use tracing_subscriber::EnvFilter;

use tiltmark_screen::build_screen;
use tiltmark_screen::config::ScreenConfig;
use tiltmark_screen::sinks::{FixedGeometry, LogRenderSink, LogTextSink, Surfaces};

#[tokio::main]
async fn main() {
    let json = std::env::var("TILTMARK_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    if json {
        builder.json().init();
    } else {
        builder.init();
    }

    tracing::info!("tiltmark starting");

    let config = ScreenConfig::load();
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Refusing to start");
        std::process::exit(1);
    }

    let surfaces = Surfaces::new(
        LogRenderSink::new(config.render_log_every),
        LogTextSink::default(),
        FixedGeometry(config.geometry.to_geometry()),
    );
    let (controller, handle) = build_screen(&config, surfaces);
    let screen = tokio::spawn(controller.run());

    match config.run_for() {
        Some(limit) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
                _ = tokio::time::sleep(limit) => {
                    tracing::info!(secs = limit.as_secs(), "Run time elapsed");
                },
            }
        },
        None => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            }
        },
    }

    if let Err(e) = handle.close() {
        tracing::warn!(error = %e, "Screen already closed");
    }
    match screen.await {
        Ok(report) => tracing::info!(
            x = report.state.position_x,
            y = report.state.position_y,
            ticks = report.stats.ticks,
            gyroscope_samples = report.stats.gyroscope_samples,
            accelerometer_samples = report.stats.accelerometer_samples,
            bounces = report.stats.bounces,
            "tiltmark stopped"
        ),
        Err(e) => {
            tracing::error!(error = %e, "Screen task failed");
            std::process::exit(1);
        },
    }
}
