use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub(crate) const TUNING_ENV_VAR: &str = "SCROLLFIRE_TUNING";
const TUNING_FILE_NAME: &str = "tuning.json";

/// Gameplay numbers that can be overridden from `assets/tuning.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameTuning {
    pub(crate) player_hearts: u32,
    pub(crate) player_speed: f32,
    pub(crate) player_speed_decay: f32,
    pub(crate) sprint_bonus: f32,
    pub(crate) damage_cooldown_ms: u64,
    pub(crate) bullet_speed: f32,
    pub(crate) bullet_range: f32,
    pub(crate) small_enemy_speed: f32,
    pub(crate) fast_enemy_speed: f32,
    pub(crate) fast_enemy_share: f64,
    pub(crate) wave_base_count: u32,
    pub(crate) wave_growth: u32,
    pub(crate) wave_delay_ms: u64,
    pub(crate) shield_chance: f64,
    pub(crate) shield_hits: u32,
    pub(crate) haste_chance: f64,
    pub(crate) fallback_world_width: u32,
    pub(crate) fallback_world_height: u32,
    pub(crate) rng_seed: u64,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            player_hearts: 5,
            player_speed: 4.0,
            player_speed_decay: 30.0,
            sprint_bonus: 2.0,
            damage_cooldown_ms: 1000,
            bullet_speed: 12.0,
            bullet_range: 700.0,
            small_enemy_speed: 1.5,
            fast_enemy_speed: 3.0,
            fast_enemy_share: 0.3,
            wave_base_count: 4,
            wave_growth: 2,
            wave_delay_ms: 2000,
            shield_chance: 0.2,
            shield_hits: 2,
            haste_chance: 0.1,
            fallback_world_width: 2560,
            fallback_world_height: 1440,
            rng_seed: 0x5eed_f17e,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid tuning file {path} at `{field_path}`: {source}")]
    Parse {
        path: PathBuf,
        field_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid tuning value `{field}` in {path}: {reason}")]
    Invalid {
        path: PathBuf,
        field: &'static str,
        reason: &'static str,
    },
}

pub(crate) fn resolve_tuning_path(asset_dir: &Path) -> PathBuf {
    match std::env::var_os(TUNING_ENV_VAR) {
        Some(raw) if !raw.is_empty() => PathBuf::from(raw),
        _ => asset_dir.join(TUNING_FILE_NAME),
    }
}

/// Loads tuning from `path`; a missing file yields the defaults.
pub(crate) fn load_tuning(path: &Path) -> Result<GameTuning, TuningError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            return Ok(GameTuning::default());
        }
        Err(source) => {
            return Err(TuningError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_tuning(&raw, path)
}

pub(crate) fn parse_tuning(raw: &str, path: &Path) -> Result<GameTuning, TuningError> {
    let mut de = serde_json::Deserializer::from_str(raw);
    let tuning = match serde_path_to_error::deserialize::<_, GameTuning>(&mut de) {
        Ok(tuning) => tuning,
        Err(error) => {
            let field_path = error.path().to_string();
            let source = error.into_inner();
            return Err(TuningError::Parse {
                path: path.to_path_buf(),
                field_path,
                source,
            });
        }
    };
    validate_tuning(&tuning, path)?;
    Ok(tuning)
}

fn validate_tuning(tuning: &GameTuning, path: &Path) -> Result<(), TuningError> {
    let invalid = |field: &'static str, reason: &'static str| TuningError::Invalid {
        path: path.to_path_buf(),
        field,
        reason,
    };

    for (field, value) in [
        ("player_speed", tuning.player_speed),
        ("sprint_bonus", tuning.sprint_bonus),
        ("bullet_speed", tuning.bullet_speed),
        ("bullet_range", tuning.bullet_range),
        ("small_enemy_speed", tuning.small_enemy_speed),
        ("fast_enemy_speed", tuning.fast_enemy_speed),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(field, "must be a finite, non-negative number"));
        }
    }
    for (field, value) in [
        ("fast_enemy_share", tuning.fast_enemy_share),
        ("shield_chance", tuning.shield_chance),
        ("haste_chance", tuning.haste_chance),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid(field, "must be a probability in [0, 1]"));
        }
    }
    if tuning.shield_chance + tuning.haste_chance > 1.0 {
        return Err(invalid(
            "haste_chance",
            "shield_chance + haste_chance must not exceed 1",
        ));
    }
    if tuning.player_hearts == 0 {
        return Err(invalid("player_hearts", "must be at least 1"));
    }
    if tuning.fallback_world_width == 0 || tuning.fallback_world_height == 0 {
        return Err(invalid("fallback_world_width", "world must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn fake_path() -> PathBuf {
        PathBuf::from("assets/tuning.json")
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let tuning = load_tuning(&dir.path().join("tuning.json")).expect("defaults");
        assert_eq!(tuning, GameTuning::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let tuning =
            parse_tuning(r#"{ "player_speed": 6.5, "wave_base_count": 9 }"#, &fake_path())
                .expect("parse");
        assert_eq!(tuning.player_speed, 6.5);
        assert_eq!(tuning.wave_base_count, 9);
        assert_eq!(tuning.player_hearts, 5);
    }

    #[test]
    fn type_error_names_failing_field() {
        let error = parse_tuning(r#"{ "player_hearts": "five" }"#, &fake_path())
            .expect_err("should fail");
        match error {
            TuningError::Parse { field_path, .. } => assert_eq!(field_path, "player_hearts"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let error =
            parse_tuning(r#"{ "player_sped": 1.0 }"#, &fake_path()).expect_err("should fail");
        assert!(matches!(error, TuningError::Parse { .. }));
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let error =
            parse_tuning(r#"{ "shield_chance": 1.5 }"#, &fake_path()).expect_err("should fail");
        match error {
            TuningError::Invalid { field, .. } => assert_eq!(field, "shield_chance"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decoration_odds_must_fit_one_roll() {
        let error = parse_tuning(
            r#"{ "shield_chance": 0.7, "haste_chance": 0.4 }"#,
            &fake_path(),
        )
        .expect_err("should fail");
        match error {
            TuningError::Invalid { field, .. } => assert_eq!(field, "haste_chance"),
            other => panic!("unexpected error: {other}"),
        }

        let tuning = parse_tuning(
            r#"{ "shield_chance": 0.6, "haste_chance": 0.4 }"#,
            &fake_path(),
        )
        .expect("odds summing to one are fine");
        assert_eq!(tuning.haste_chance, 0.4);
    }

    #[test]
    fn file_on_disk_is_parsed() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("tuning.json");
        fs::write(&path, r#"{ "player_hearts": 3 }"#).expect("write tuning");

        let tuning = load_tuning(&path).expect("load");
        assert_eq!(tuning.player_hearts, 3);
    }

    #[test]
    fn default_player_numbers() {
        let tuning = GameTuning::default();
        assert_eq!(tuning.player_hearts, 5);
        assert_eq!(tuning.player_speed, 4.0);
        assert_eq!(tuning.player_speed_decay, 30.0);
    }
}
