use std::env;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod assets;

pub use app::{
    run_app, AppError, Clock, InputEvent, KeyCode, KeyPhase, LoopConfig, LoopMetricsSnapshot,
    PixelsRenderer, Point, Rect, RenderError, Renderer, Rgba, Scene, Surface, SystemClock,
    TextureId,
};
pub use assets::{AssetError, AssetKeyError};

pub const ROOT_ENV_VAR: &str = "SCROLLFIRE_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub asset_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "SCROLLFIRE_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/scrollfire\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

/// Which part of startup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    Paths,
    EventLoop,
    Window,
    Renderer,
    Config,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Paths => "paths",
            Self::EventLoop => "event_loop",
            Self::Window => "window",
            Self::Renderer => "renderer",
            Self::Config => "config",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
#[error("initialization failed at stage {stage}: {cause}")]
pub struct InitError {
    pub stage: InitStage,
    #[source]
    pub cause: Box<dyn StdError + Send + Sync + 'static>,
}

impl InitError {
    pub fn new(stage: InitStage, cause: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let asset_dir = root.join("assets");
    Ok(AppPaths { root, asset_dir })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            exe_dir
                .ancestors()
                .find(|candidate| is_repo_marker(candidate))
                .map(normalize_path)
                .ok_or_else(|| StartupError::RootNotFound {
                    start_dir: normalize_path(&exe_dir),
                    env_var: ROOT_ENV_VAR,
                })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
