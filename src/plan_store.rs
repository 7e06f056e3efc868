use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::UserConfig;

const STORE_VERSION: u32 = 1;
const STORE_DIR: &str = "h2h_terminal";
const STORE_FILE: &str = "user.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    user: UserConfig,
}

/// Load the persisted user config, or defaults when the file is missing,
/// unreadable, or from another store version.
pub fn load_user() -> UserConfig {
    let Some(path) = store_path() else {
        return UserConfig::default();
    };
    load_user_from(&path)
}

pub fn save_user(user: &UserConfig) -> Result<()> {
    let Some(path) = store_path() else {
        return Ok(());
    };
    save_user_to(&path, user)
}

fn load_user_from(path: &Path) -> UserConfig {
    let Ok(raw) = fs::read_to_string(path) else {
        return UserConfig::default();
    };
    let Ok(store) = serde_json::from_str::<StoreFile>(&raw) else {
        return UserConfig::default();
    };
    if store.version != STORE_VERSION {
        return UserConfig::default();
    }
    store.user
}

fn save_user_to(path: &Path, user: &UserConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("create store dir")?;
    }
    let store = StoreFile {
        version: STORE_VERSION,
        user: user.clone(),
    };
    let json = serde_json::to_string(&store).context("serialize user store")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write user store")?;
    fs::rename(&tmp, path).context("swap user store")?;
    Ok(())
}

fn store_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_DATA_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(STORE_DIR).join(STORE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(STORE_DIR)
            .join(STORE_FILE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Plan;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("h2h_terminal_test_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = scratch_path("round_trip.json");
        let mut user = UserConfig {
            team_id: "123456".to_string(),
            team_name: "Paper FC".to_string(),
            manager_name: "Alex Doe".to_string(),
            setup_complete: true,
            ..UserConfig::default()
        };
        user.plans.push(Plan::empty("p1", "Run-in", 9, "Mini League", 24, 30));
        user.active_plan_id = Some("p1".to_string());

        save_user_to(&path, &user).expect("save should succeed");
        let loaded = load_user_from(&path);
        assert_eq!(loaded, user);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let loaded = load_user_from(Path::new("/nonexistent/h2h/user.json"));
        assert_eq!(loaded, UserConfig::default());
    }

    #[test]
    fn version_mismatch_loads_defaults() {
        let path = scratch_path("version_mismatch.json");
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).expect("create scratch dir");
        }
        fs::write(&path, r#"{"version":999,"user":{"team_id":"1"}}"#).expect("write scratch");
        let loaded = load_user_from(&path);
        assert_eq!(loaded, UserConfig::default());
        let _ = fs::remove_file(&path);
    }
}
