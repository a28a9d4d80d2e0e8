use anyhow::{bail, Context, Result};
use ghost_tracker::algorithms::bearing_degrees;
use ghost_tracker::core::{now_ms, GeoPosition, HeadingSample, METERS_PER_DEGREE_LAT};
use ghost_tracker::simulation::{GhostType, SanityImpact};
use ghost_tracker::utils::ConfigurationManager;
use ghost_tracker::{InvestigationRuntime, TrackingSession};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const WALK_STEP_M: f64 = 5.0;
const WALK_STEP_MS: u64 = 1000;

struct Args {
    config_path: Option<String>,
    ghost: GhostType,
    duration_s: u64,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config_path: None,
        ghost: GhostType::Phantom,
        duration_s: 5,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config_path = Some(iter.next().context("--config needs a path")?),
            "--ghost" => {
                let name = iter.next().context("--ghost needs a name")?;
                args.ghost = serde_json::from_value(serde_json::Value::String(name.clone()))
                    .with_context(|| format!("unknown ghost type '{}'", name))?;
            }
            "--duration" => {
                args.duration_s = iter
                    .next()
                    .context("--duration needs seconds")?
                    .parse()
                    .context("--duration must be a whole number of seconds")?;
            }
            other => bail!(
                "unknown argument '{}'\nusage: ghost-tracker [--config <json>] [--ghost <type>] [--duration <s>]",
                other
            ),
        }
    }
    Ok(args)
}

/// Walk a simulated player from south of the hotspot towards the spawned ghost
fn tracking_demo(session: &mut TrackingSession, rng: &mut StdRng) -> Result<()> {
    let hotspot = GeoPosition::at(47.4979, 19.0402);
    let start = now_ms();
    let target = session.spawn_target(&hotspot, rng, start)?;
    info!(
        latitude = target.latitude,
        longitude = target.longitude,
        "ghost hidden near hotspot"
    );

    let mut player = GeoPosition::new(hotspot.latitude - 40.0 / METERS_PER_DEGREE_LAT, hotspot.longitude, 5.0, start);
    for step in 0..12u64 {
        let now = start + step * WALK_STEP_MS;
        // Noisy fix around the true position
        let noise = 2.0 / METERS_PER_DEGREE_LAT;
        let fix = GeoPosition::new(
            player.latitude + rng.gen_range(-noise..=noise),
            player.longitude + rng.gen_range(-noise..=noise),
            player.accuracy,
            now,
        );
        session.on_location(fix, now)?;

        let bearing = bearing_degrees(&player, &target);
        session.on_heading(HeadingSample::new(bearing + rng.gen_range(-20.0..=20.0), 10.0))?;

        let signals = session.signals();
        println!("{}", serde_json::to_string(&signals)?);

        if signals.distance_m.map_or(false, |d| d < WALK_STEP_M) {
            info!(step, "ghost reached");
            break;
        }

        // Step along the great-circle bearing
        let rad = bearing.to_radians();
        player.latitude += WALK_STEP_M * rad.cos() / METERS_PER_DEGREE_LAT;
        player.longitude +=
            WALK_STEP_M * rad.sin() / (METERS_PER_DEGREE_LAT * player.latitude.to_radians().cos());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ghost_tracker=info")),
        )
        .init();

    let args = parse_args()?;
    let manager = match &args.config_path {
        Some(path) => ConfigurationManager::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => ConfigurationManager::new(),
    };
    let config = manager.config().clone();

    let mut rng = match config.behavior.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = TrackingSession::new(config.tracking.clone());
    tracking_demo(&mut session, &mut rng)?;

    let handle = InvestigationRuntime::spawn(config.behavior.clone())?;
    handle.set_ghost_type(args.ghost)?;
    handle.apply_sanity_impact(SanityImpact::Ambient)?;
    let photo = handle.take_photo().await?;
    info!(photo, ghost = %args.ghost, "investigation running");

    tokio::time::sleep(Duration::from_secs(args.duration_s)).await;

    let snapshot = handle.snapshot().await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    handle.shutdown().await?;
    Ok(())
}
