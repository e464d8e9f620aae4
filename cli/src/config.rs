use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the database location.
pub const DB_ENV: &str = "VIBEFOOD_DB";

const DB_FILE: &str = "vibefood.db";

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    /// `--db` wins over `VIBEFOOD_DB`, which wins over the platform data dir.
    pub fn load(db_flag: Option<PathBuf>) -> Result<Self> {
        let env_path = std::env::var_os(DB_ENV).map(PathBuf::from);
        if let Some(db_path) = explicit_db_path(db_flag, env_path) {
            let data_dir = db_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            ensure_dir(&data_dir)?;
            return Ok(Config { db_path, data_dir });
        }

        let proj_dirs =
            ProjectDirs::from("", "", "vibefood").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        ensure_dir(&data_dir)?;

        let db_path = data_dir.join(DB_FILE);

        Ok(Config { db_path, data_dir })
    }
}

fn explicit_db_path(flag: Option<PathBuf>, env: Option<PathBuf>) -> Option<PathBuf> {
    flag.or(env).filter(|p| !p.as_os_str().is_empty())
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_beats_env() {
        let path = explicit_db_path(
            Some(PathBuf::from("/tmp/a.db")),
            Some(PathBuf::from("/tmp/b.db")),
        );
        assert_eq!(path, Some(PathBuf::from("/tmp/a.db")));
    }

    #[test]
    fn test_env_used_without_flag() {
        let path = explicit_db_path(None, Some(PathBuf::from("/tmp/b.db")));
        assert_eq!(path, Some(PathBuf::from("/tmp/b.db")));
    }

    #[test]
    fn test_empty_override_ignored() {
        assert_eq!(explicit_db_path(None, Some(PathBuf::new())), None);
        assert_eq!(explicit_db_path(None, None), None);
    }

    #[test]
    fn test_load_with_flag_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("food.db");
        let config = Config::load(Some(db_path.clone())).unwrap();
        assert_eq!(config.db_path, db_path);
        assert!(config.data_dir.is_dir());
    }
}
