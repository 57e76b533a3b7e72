//! Tolerant decoding of the suitable-roles list embedded in a resume's
//! parsed payload.
//!
//! The payload schema has evolved: older rows carry bare role strings, newer
//! rows carry `{role, score}` objects, and field casing has drifted between
//! agent builds. Display code must never fail on any of it, so decoding is
//! total — every malformed shape degrades to an empty list.

use serde_json::Value;

use crate::models::resume::SuitableRole;

/// Decodes the role suggestions out of a serialized parsed-resume payload.
///
/// Accepted shapes, per entry: a bare string (legacy, scored 0) or an object
/// with `role`/`Role` and `score`/`Score` fields, lower-snake taking
/// priority. A missing role label yields `"Unknown"`, a missing score yields
/// 0. Output is stably sorted by score descending. Never errors.
pub fn decode_suitable_roles(payload: Option<&str>) -> Vec<SuitableRole> {
    let raw = match payload {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Vec::new(),
    };

    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let entries = match value
        .get("suitable_roles")
        .or_else(|| value.get("SuitableRoles"))
        .and_then(Value::as_array)
    {
        Some(list) => list,
        None => return Vec::new(),
    };

    let mut roles: Vec<SuitableRole> = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Value::String(role) => roles.push(SuitableRole {
                role: role.clone(),
                score: 0,
            }),
            Value::Object(obj) => {
                let role = obj
                    .get("role")
                    .or_else(|| obj.get("Role"))
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown")
                    .to_string();
                let score = obj
                    .get("score")
                    .or_else(|| obj.get("Score"))
                    .and_then(as_score)
                    .unwrap_or(0);
                roles.push(SuitableRole { role, score });
            }
            // Entries that are neither shape are dropped, not fatal.
            _ => {}
        }
    }

    // Vec::sort_by is stable: equal scores keep their original order.
    roles.sort_by(|a, b| b.score.cmp(&a.score));
    roles
}

fn as_score(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}
