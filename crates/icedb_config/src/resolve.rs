//! Locating, opening and checking a chip database against the configuration.

use crate::error::ConfigError;
use crate::types::IcedbConfig;
use icedb::{ChipDb, Package};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the configured snapshot path.
pub const CHIPDB_ENV: &str = "ICEDB_CHIPDB";

/// Resolves the chip database snapshot path from environment or configuration.
///
/// Checks in order:
/// 1. The `ICEDB_CHIPDB` environment variable
/// 2. `device.chipdb` from `icedb.toml`
///
/// Returns `None` if neither is set or the path doesn't exist.
pub fn resolve_chipdb_path(config: &IcedbConfig) -> Option<PathBuf> {
    let env_path = std::env::var_os(CHIPDB_ENV).map(PathBuf::from);
    resolve_from(env_path, config.device.chipdb.as_deref())
}

fn resolve_from(env_path: Option<PathBuf>, config_path: Option<&str>) -> Option<PathBuf> {
    if let Some(p) = env_path {
        if p.exists() {
            return Some(p);
        }
        warn!(path = %p.display(), "{CHIPDB_ENV} does not name an existing file");
    }

    if let Some(cp) = config_path {
        let p = PathBuf::from(cp);
        if p.exists() {
            return Some(p);
        }
    }

    None
}

/// Reads and decodes a chip database snapshot.
///
/// Files with a `.json` extension are decoded as JSON snapshots; anything
/// else is treated as a binary snapshot.
pub fn open_chipdb(path: &Path) -> Result<ChipDb, ConfigError> {
    let db = if path.extension().is_some_and(|ext| ext == "json") {
        ChipDb::from_json(&std::fs::read_to_string(path)?)?
    } else {
        ChipDb::from_bytes(&std::fs::read(path)?)?
    };
    info!(
        path = %path.display(),
        device = db.device(),
        width = db.width(),
        height = db.height(),
        nets = db.n_nets(),
        "loaded chip database"
    );
    Ok(db)
}

/// Resolves the snapshot path for `config` and opens it.
pub fn load_chipdb(config: &IcedbConfig) -> Result<ChipDb, ConfigError> {
    let path = resolve_chipdb_path(config).ok_or(ConfigError::NoChipDb)?;
    open_chipdb(&path)
}

/// Checks the configured device against `db` and returns the configured package.
pub fn select_package<'a>(
    config: &IcedbConfig,
    db: &'a ChipDb,
) -> Result<&'a Package, ConfigError> {
    if config.device.name != db.device() {
        return Err(ConfigError::DeviceMismatch {
            configured: config.device.name.clone(),
            found: db.device().to_string(),
        });
    }
    db.package(&config.device.package)
        .ok_or_else(|| ConfigError::UnknownPackage {
            device: db.device().to_string(),
            package: config.device.package.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;
    use icedb::ids::{NetId, TileId};
    use icedb::{ChipDbBuilder, Location};
    use std::fs;

    fn small_db() -> ChipDb {
        let mut b = ChipDbBuilder::new();
        b.set_device("1k", 2, 1, 1).unwrap();
        b.add_net_name(TileId::from_raw(0), "glb_netwk_0", NetId::from_raw(0))
            .unwrap();
        let mut pkg = Package::new("tq144");
        pkg.add_pin("7", Location::new(TileId::from_raw(1), 0))
            .unwrap();
        b.add_package(pkg).unwrap();
        b.finish().unwrap()
    }

    fn config(name: &str, package: &str) -> IcedbConfig {
        load_config_from_str(&format!(
            "[device]\nname = \"{name}\"\npackage = \"{package}\"\n"
        ))
        .unwrap()
    }

    #[test]
    fn env_path_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let env = dir.path().join("env.json");
        let cfg = dir.path().join("cfg.json");
        fs::write(&env, "{}").unwrap();
        fs::write(&cfg, "{}").unwrap();
        let resolved = resolve_from(Some(env.clone()), cfg.to_str());
        assert_eq!(resolved, Some(env));
    }

    #[test]
    fn missing_env_path_falls_back_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("cfg.json");
        fs::write(&cfg, "{}").unwrap();
        let resolved = resolve_from(Some(dir.path().join("absent.json")), cfg.to_str());
        assert_eq!(resolved, Some(cfg));
    }

    #[test]
    fn nothing_resolves_to_none() {
        assert_eq!(resolve_from(None, None), None);
        assert_eq!(resolve_from(None, Some("/nonexistent/chipdb.json")), None);
    }

    #[test]
    fn open_snapshot_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chipdb-1k.json");
        fs::write(&path, small_db().to_json().unwrap()).unwrap();
        let db = open_chipdb(&path).unwrap();
        assert_eq!(db.device(), "1k");
        assert_eq!(db.n_tiles(), 2);
    }

    #[test]
    fn open_binary_snapshot_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chipdb-1k.bin");
        fs::write(&path, small_db().to_bytes().unwrap()).unwrap();
        let db = open_chipdb(&path).unwrap();
        assert!(db.package("tq144").is_some());
    }

    #[test]
    fn open_corrupt_snapshot_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(open_chipdb(&path), Err(ConfigError::ChipDb(_))));
        assert!(matches!(
            open_chipdb(&dir.path().join("absent.json")),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn unresolvable_config_has_no_chipdb() {
        if std::env::var_os(CHIPDB_ENV).is_none() {
            let mut cfg = config("1k", "tq144");
            cfg.device.chipdb = Some("/nonexistent/chipdb.json".to_string());
            assert!(matches!(load_chipdb(&cfg), Err(ConfigError::NoChipDb)));
        }
    }

    #[test]
    fn package_selection() {
        let db = small_db();
        let pkg = select_package(&config("1k", "tq144"), &db).unwrap();
        assert_eq!(pkg.pin_location("7"), Some(Location::new(TileId::from_raw(1), 0)));

        assert!(matches!(
            select_package(&config("1k", "vq100"), &db),
            Err(ConfigError::UnknownPackage { .. })
        ));
        assert!(matches!(
            select_package(&config("8k", "tq144"), &db),
            Err(ConfigError::DeviceMismatch { .. })
        ));
    }
}
