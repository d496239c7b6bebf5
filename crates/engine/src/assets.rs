use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;

use crate::app::Surface;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetKeyError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key must not start with '/'")]
    LeadingSlash,
    #[error("asset key must not contain '..'")]
    ParentTraversal,
    #[error("asset key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid asset key {key:?}: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: AssetKeyError,
    },
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub(crate) fn validate_asset_key(key: &str) -> Result<(), AssetKeyError> {
    if key.is_empty() {
        return Err(AssetKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(AssetKeyError::LeadingSlash);
    }
    if key.contains("..") {
        return Err(AssetKeyError::ParentTraversal);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(AssetKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}

/// `sprites/player` resolves to `<assets>/sprites/player.png`.
pub fn resolve_sprite_path(asset_root: &Path, key: &str) -> Result<PathBuf, AssetError> {
    validate_asset_key(key).map_err(|source| AssetError::InvalidKey {
        key: key.to_string(),
        source,
    })?;
    Ok(asset_root.join(format!("{key}.png")))
}

pub fn load_sprite_surface(path: &Path) -> Result<Surface, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    let (width, height) = (image.width(), image.height());
    Ok(Surface {
        width,
        height,
        rgba: image.into_raw(),
    })
}
