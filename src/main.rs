//! MapTrail - Map-Based Workout Tracker Core
//!
//! Demo entry point: loads the configuration, acquires the ambient position,
//! opens the snapshot database, reconciles, and prints the live model.

use anyhow::Context;
use maptrail::geometry::Coordinates;
use maptrail::position::{FixedPosition, PositionProvider};
use maptrail::router::EventRouter;
use maptrail::storage::{load_config, Database};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MapTrail v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config().context("failed to load configuration")?;

    // Position acquisition gates map initialization; a denial or timeout is a
    // user-facing failure.
    let provider = FixedPosition(Coordinates::new(
        config.map.default_lat,
        config.map.default_lng,
    ));
    let position = match provider.current_position() {
        Ok(coords) => coords,
        Err(err) => {
            tracing::error!("{err}");
            anyhow::bail!("{err}");
        }
    };
    tracing::info!("map centered at {} (zoom {})", position, config.map.zoom_level);

    let database = Database::open(&config.database_path())
        .context("failed to open snapshot database")?;
    let router = EventRouter::new(database).context("reconciliation failed")?;

    if !router.had_snapshot_data() {
        tracing::info!("no data yet — draw a point to record a workout");
    }

    let view = router.snapshot();
    for workout in view.workouts {
        println!(
            "{}  {}  {:.1} km in {:.0} min",
            workout.stable_id, workout.label, workout.distance_km, workout.duration_min
        );
    }
    println!(
        "{} workouts, {} drawn shapes",
        view.workouts.len(),
        view.shapes.len()
    );

    Ok(())
}
