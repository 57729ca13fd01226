//! Locations of fixtures and the workspace `config/` tree.

use std::path::{Path, PathBuf};

/// Environment variable naming an extra directory of downloaded `.idx` files.
pub const TEST_DATA_DIR_ENV: &str = "TEST_DATA_DIR";

/// Workspace root: the nearest ancestor of this crate holding `config/`.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .find(|dir| dir.join("config").is_dir() && dir.join("Cargo.toml").is_file())
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// What `CONFIG_DIR` points at in deployments.
pub fn config_dir() -> PathBuf {
    workspace_root().join("config")
}

/// Checked-in `.idx` fixtures.
pub fn testdata_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Cut-down reference tables for every bucket, matching the `.idx` fixtures.
pub fn fixture_inventories_dir() -> PathBuf {
    testdata_dir().join("inventories")
}

/// First existing `name` under `$TEST_DATA_DIR`, the checked-in fixtures,
/// or `{workspace}/testdata`.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    std::env::var_os(TEST_DATA_DIR_ENV)
        .map(PathBuf::from)
        .into_iter()
        .chain([testdata_dir(), workspace_root().join("testdata")])
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}
