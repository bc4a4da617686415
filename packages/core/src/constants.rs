use std::env;
use std::path::PathBuf;

/// Current version of the local fallback store file format
pub const STORE_VERSION: &str = "1.0.0";

/// Prefix shared by every key this system writes to the durable key-value
/// store; eviction under storage pressure only ever touches these keys
pub const KEY_PREFIX: &str = "ascent_";

/// Get the path to the Ascent directory (~/.ascent)
pub fn ascent_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".ascent")
    } else {
        // Fall back to dirs crate for normal usage
        dirs::home_dir()
            .expect("Unable to get home directory")
            .join(".ascent")
    }
}

/// Get the path to the fallback store file (~/.ascent/fallback_store.json)
pub fn fallback_store_file() -> PathBuf {
    ascent_dir().join("fallback_store.json")
}

/// Key under which a user's collection is stored in the fallback store
pub fn collection_key(uid: &str, collection: &str) -> String {
    format!("{}{}_{}", KEY_PREFIX, uid, collection)
}
