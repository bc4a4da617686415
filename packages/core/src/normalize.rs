use chrono::Utc;
use serde_json::{Map, Value};

use crate::record::Record;

/// Converts a raw backend collection (a map keyed by generated id, as the
/// remote backend stores it) into a typed, ordered vec.
///
/// Each record gets its `id` set from the map key, missing or null
/// `createdAt`/`updatedAt` fields default to now, and a missing `targetDate`
/// stays absent. Output is sorted newest-created first. Records that fail to
/// deserialize are dropped rather than failing the whole collection.
pub fn normalize<T: Record>(raw: Map<String, Value>) -> Vec<T> {
    let mut items: Vec<T> = raw
        .into_iter()
        .filter_map(|(id, value)| from_raw(id, value))
        .collect();
    items.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    items
}

fn from_raw<T: Record>(id: String, value: Value) -> Option<T> {
    let Value::Object(mut fields) = value else {
        return None;
    };

    fields.insert("id".to_string(), Value::String(id));

    for key in ["createdAt", "updatedAt"] {
        let missing = matches!(fields.get(key), None | Some(Value::Null));
        if missing {
            fields.insert(key.to_string(), Value::String(Utc::now().to_rfc3339()));
        }
    }

    serde_json::from_value(Value::Object(fields)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Goal;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw_goal(title: &str, created_at: &str) -> Value {
        json!({
            "title": title,
            "description": "desc",
            "completed": false,
            "createdAt": created_at,
            "updatedAt": created_at,
        })
    }

    #[test]
    fn sets_id_from_map_key_and_sorts_newest_first() {
        let mut raw = Map::new();
        raw.insert("a1".into(), raw_goal("older", "2025-01-01T00:00:00Z"));
        raw.insert("b2".into(), raw_goal("newer", "2025-06-01T00:00:00Z"));

        let goals: Vec<Goal> = normalize(raw);

        assert_eq!(goals.len(), 2);
        assert_eq!(goals[0].id, "b2");
        assert_eq!(goals[0].title, "newer");
        assert_eq!(goals[1].id, "a1");
        assert!(goals.iter().all(|g| !g.id.is_empty()));
    }

    #[test]
    fn defaults_missing_timestamps_to_now() {
        let mut raw = Map::new();
        raw.insert(
            "g1".into(),
            json!({ "title": "t", "description": "d", "completed": false }),
        );

        let before = Utc::now();
        let goals: Vec<Goal> = normalize(raw);
        let after = Utc::now();

        assert_eq!(goals.len(), 1);
        assert!(goals[0].created_at >= before && goals[0].created_at <= after);
        assert!(goals[0].updated_at >= before && goals[0].updated_at <= after);
    }

    #[test]
    fn missing_target_date_stays_absent() {
        let mut raw = Map::new();
        raw.insert("g1".into(), raw_goal("t", "2025-01-01T00:00:00Z"));

        let goals: Vec<Goal> = normalize(raw);
        assert_eq!(goals[0].target_date, None);
    }

    #[test]
    fn parses_target_date_from_iso_string() {
        let mut raw = Map::new();
        let mut value = raw_goal("t", "2025-01-01T00:00:00Z");
        value["targetDate"] = json!("2025-03-15T12:30:00Z");
        raw.insert("g1".into(), value);

        let goals: Vec<Goal> = normalize(raw);
        let expected: DateTime<Utc> = "2025-03-15T12:30:00Z".parse().unwrap();
        assert_eq!(goals[0].target_date, Some(expected));
    }

    #[test]
    fn drops_records_that_are_not_objects() {
        let mut raw = Map::new();
        raw.insert("bad".into(), json!("not a record"));
        raw.insert("good".into(), raw_goal("t", "2025-01-01T00:00:00Z"));

        let goals: Vec<Goal> = normalize(raw);
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].id, "good");
    }
}
