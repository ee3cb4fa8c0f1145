// src/infra/paths.rs — Default filesystem locations

use std::path::PathBuf;

/// Default base working directory: the OS cache dir, falling back to the
/// temp dir on platforms without one. Repository checkouts live underneath.
pub fn default_base_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("depkeeper")
}

/// Config file names probed in the working directory when `--config` is not
/// given, in priority order.
pub fn default_config_candidates() -> [PathBuf; 2] {
    [
        PathBuf::from("depkeeper.toml"),
        PathBuf::from("depkeeper.json"),
    ]
}
