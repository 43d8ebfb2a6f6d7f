use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File names inside the data directory
// ---------------------------------------------------------------------------

pub const DB_FILE: &str = "harvest.db";
pub const CONFIG_FILE: &str = "harvest.yaml";
pub const CHECKLIST_FILE: &str = "checklist.json";
pub const API_KEY_FILE: &str = "OPENAI_API_KEY.txt";

/// Persistent disk mount used by the hosting platform.
pub const HOSTED_DATA_DIR: &str = "/opt/render/project/src/data";

pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE)
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

pub fn checklist_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CHECKLIST_FILE)
}

pub fn api_key_path(data_dir: &Path) -> PathBuf {
    data_dir.join(API_KEY_FILE)
}
