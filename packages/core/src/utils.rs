use std::path::Path;

use chrono::Utc;
use tokio::fs;

/// Generate an id for a record created in the local fallback store: a
/// millisecond timestamp followed by an 8-character random suffix. The
/// timestamp keeps ids roughly monotonic; the suffix makes collisions within
/// a user's namespace vanishingly unlikely.
pub fn generate_local_id() -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), random_suffix(8))
}

/// Generate an id for a roadmap step. Steps are embedded in their roadmap
/// record rather than server-keyed, so ids are always minted client-side.
pub fn generate_step_id(order: u32) -> String {
    format!("step-{}-{}", order, random_suffix(6))
}

fn random_suffix(len: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Checks if a path exists
pub async fn path_exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_local_id() {
        let id1 = generate_local_id();
        let id2 = generate_local_id();

        assert_ne!(id1, id2);

        // timestamp-dash-suffix shape
        let (stamp, suffix) = id1.split_once('-').unwrap();
        assert!(stamp.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_step_id_embeds_order() {
        let id = generate_step_id(3);
        assert!(id.starts_with("step-3-"));
    }

    #[tokio::test]
    async fn test_path_exists() {
        assert!(!path_exists("/nonexistent/path").await);
        assert!(path_exists("/tmp").await);
    }
}
