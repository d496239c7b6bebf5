use engine::{resolve_app_paths, AppPaths, InitError, InitStage, LoopConfig, Scene};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay;
use super::tuning::{load_tuning, resolve_tuning_path};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) paths: AppPaths,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, InitError> {
    init_tracing();
    info!("=== Scrollfire Startup ===");

    let paths = resolve_app_paths().map_err(|error| InitError::new(InitStage::Paths, error))?;
    wire_app(paths)
}

/// Loads tuning from `paths` and hands the same paths on to the engine loop.
fn wire_app(paths: AppPaths) -> Result<AppWiring, InitError> {
    let tuning_path = resolve_tuning_path(&paths.asset_dir);
    let tuning =
        load_tuning(&tuning_path).map_err(|error| InitError::new(InitStage::Config, error))?;
    info!(
        path = %tuning_path.display(),
        player_speed = tuning.player_speed,
        wave_base_count = tuning.wave_base_count,
        rng_seed = tuning.rng_seed,
        "tuning_loaded"
    );

    let config = LoopConfig {
        window_width: gameplay::SCREEN_WIDTH,
        window_height: gameplay::SCREEN_HEIGHT,
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        paths,
        scene: gameplay::build_playing_scene(tuning),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn paths_in(dir: &TempDir) -> AppPaths {
        let asset_dir = dir.path().join("assets");
        fs::create_dir_all(&asset_dir).expect("asset dir");
        AppPaths {
            root: dir.path().to_path_buf(),
            asset_dir,
        }
    }

    #[test]
    fn wiring_carries_resolved_paths_to_the_loop() {
        let dir = TempDir::new().expect("temp dir");
        let paths = paths_in(&dir);

        let wiring = wire_app(paths.clone()).expect("wiring");
        assert_eq!(wiring.paths.root, paths.root);
        assert_eq!(wiring.paths.asset_dir, paths.asset_dir);
        assert_eq!(wiring.config.window_width, gameplay::SCREEN_WIDTH);
        assert_eq!(wiring.config.window_height, gameplay::SCREEN_HEIGHT);
    }

    #[test]
    fn invalid_tuning_fails_at_config_stage() {
        let dir = TempDir::new().expect("temp dir");
        let paths = paths_in(&dir);
        fs::write(paths.asset_dir.join("tuning.json"), "{ \"player_hearts\": \"five\" }")
            .expect("write tuning");

        match wire_app(paths) {
            Err(error) => assert_eq!(error.stage, InitStage::Config),
            Ok(_) => panic!("bad tuning must not wire"),
        }
    }
}
