//! Demo binary that sweeps a camera focus across the globe, zooming in and
//! out, and drives a tile layer into an in-memory scene.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p quadtile-demo -- --sample-x 4 --skirts true` to override.

mod layer;

use std::path::Path;

use clap::Parser;
use glam::DVec2;
use quadtile_config::{CliArgs, Config, ConfigError, default_config_dir};
use quadtile_geom::TileGeomError;
use quadtile_scene::{Scene, SceneError};
use tracing::{error, info, warn};

use crate::layer::DemoLayer;

/// Number of zoom-in/zoom-out passes.
const SWEEPS: u32 = 3;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Geometry(#[from] TileGeomError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(|| {
        default_config_dir().expect("Failed to resolve config directory")
    });

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    quadtile_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(err) = run(&config, &config_dir) {
        error!(%err, "Demo failed");
        std::process::exit(1);
    }
}

fn run(config: &Config, config_dir: &Path) -> Result<(), DemoError> {
    config.validate()?;
    info!(
        samples = %format!("{}x{}", config.geometry.sample_x, config.geometry.sample_y),
        levels = %format!("{}..={}", config.tree.min_level, config.tree.max_level),
        coord_system = ?config.tree.coord_system,
        display = ?config.tree.display,
        skirts = config.manager.build_skirts,
        "Starting tile sweep"
    );

    let mut layer = DemoLayer::from_config(config)?;
    let mut scene = Scene::new();
    let (min_level, max_level) = (config.tree.min_level, config.tree.max_level);

    for sweep in 0..SWEEPS {
        let focus = focus_for(sweep);
        let zoom = (min_level..=max_level).chain((min_level..max_level).rev());
        for level in zoom {
            let target = layer.visible_nodes(focus, level);
            let mut changes = scene.change_set();
            let result = layer.view(&target, &mut changes)?;
            let requests = changes.len();
            scene.apply(changes)?;
            info!(
                sweep,
                level,
                added = result.added_tiles.len(),
                enabled = result.enabled_tiles.len(),
                disabled = result.disabled_tiles.len(),
                removed = result.removed_tiles.len(),
                requests,
                drawables = scene.len(),
                visible = scene.enabled_count(),
                "View updated"
            );
        }
    }

    let mut changes = scene.change_set();
    let result = layer.view(&Default::default(), &mut changes)?;
    scene.apply(changes)?;
    info!(removed = result.removed_tiles.len(), "Layer torn down");
    if !scene.is_empty() {
        warn!(leaked = scene.len(), "Scene still holds drawables");
    }

    match config.reload(config_dir) {
        Ok(Some(_)) => info!("Config on disk differs from the running config"),
        Ok(None) => {}
        Err(err) => warn!(%err, "Could not re-read config"),
    }
    Ok(())
}

/// Camera focus for one sweep, in the layer's local units.
fn focus_for(sweep: u32) -> DVec2 {
    let t = f64::from(sweep);
    DVec2::new(-2.5 + 1.7 * t, 0.6 * (1.3 * t).sin())
}
