//! Runtime configuration
//!
//! Everything comes from environment variables; logging levels are handled
//! separately through `RUST_LOG`.

use std::path::{Path, PathBuf};

/// Overrides the SQLite file location
pub const DATABASE_PATH_VAR: &str = "NUTRISCORE_DATABASE_PATH";

/// User that tool calls act as when they don't name one
pub const USER_ID_VAR: &str = "NUTRISCORE_USER_ID";

const DEFAULT_USER_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    pub default_user_id: i64,
}

impl Config {
    /// Build the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(DATABASE_PATH_VAR)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let default_user_id = match lookup(USER_ID_VAR) {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(id) => id,
                Err(_) => {
                    tracing::warn!("Ignoring invalid {}: {:?}", USER_ID_VAR, raw);
                    DEFAULT_USER_ID
                }
            },
            None => DEFAULT_USER_ID,
        };

        Self {
            database_path,
            default_user_id,
        }
    }
}

/// `<project root>/data/nutriscore.db`, where the project root sits above
/// `target/{debug,release}` when running from a cargo build
fn default_database_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    let mut path = project_root(&exe_dir);
    path.push("data");
    path.push("nutriscore.db");
    path
}

fn project_root(exe_dir: &Path) -> PathBuf {
    if exe_dir.ends_with("release") || exe_dir.ends_with("debug") {
        if let Some(root) = exe_dir.parent().and_then(Path::parent) {
            return root.to_path_buf();
        }
    }
    exe_dir.to_path_buf()
}
