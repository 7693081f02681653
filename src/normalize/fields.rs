//! Field parsers.
//!
//! Each parser accepts a field that may be absent, already structured, or
//! string-encoded, and returns one normalized value. None of them fail: any
//! decode problem yields the field's empty representation and a `warn!` that
//! names the field.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::models::{ActivityHours, OutsideCampusLocation, Schedule};

/// String values meaning "no location" for `outside_campus_location`.
const NULL_SENTINELS: [&str; 3] = ["", "null", "undefined"];

/// How a list field treats a plain (non-JSON-array) string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFallback {
    /// `"a, b,,c"` becomes `["a", "b", "c"]`.
    SplitOnComma,
    /// `"a, b"` becomes `["a, b"]`.
    WholeString,
}

/// `activity_hours`: structured or JSON-encoded object, `{}` otherwise.
pub fn parse_activity_hours(raw: Option<&Value>) -> ActivityHours {
    let value = match raw {
        None | Some(Value::Null) => return ActivityHours::default(),
        Some(Value::String(s)) if s.trim().is_empty() => return ActivityHours::default(),
        Some(Value::String(s)) => match decode_json_string(s) {
            Ok(value) => value,
            Err(e) => {
                warn!(field = "activity_hours", error = %e, "Unparseable activity hours, using empty object");
                return ActivityHours::default();
            }
        },
        Some(other) => other.clone(),
    };

    if value.is_null() {
        return ActivityHours::default();
    }
    if !value.is_object() {
        warn!(field = "activity_hours", value = %value, "Activity hours is not an object, using empty object");
        return ActivityHours::default();
    }

    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!(field = "activity_hours", error = %e, "Malformed activity hours, using empty object");
        ActivityHours::default()
    })
}

/// `schedule`: structured or JSON-encoded object, `None` otherwise.
pub fn parse_schedule(raw: Option<&Value>) -> Option<Schedule> {
    let value = match raw? {
        Value::Null => return None,
        Value::String(s) if s.trim().is_empty() => return None,
        Value::String(s) => match decode_json_string(s) {
            Ok(value) => value,
            Err(e) => {
                warn!(field = "schedule", error = %e, "Unparseable schedule, using null");
                return None;
            }
        },
        other => other.clone(),
    };

    if value.is_null() {
        return None;
    }
    if !value.is_object() {
        warn!(field = "schedule", value = %value, "Schedule is not an object, using null");
        return None;
    }

    match serde_json::from_value(value) {
        Ok(schedule) => Some(schedule),
        Err(e) => {
            warn!(field = "schedule", error = %e, "Malformed schedule, using null");
            None
        }
    }
}

/// `outside_campus_location`: sentinel strings and JSON null are `None`,
/// other strings are decoded, objects pass through.
pub fn parse_outside_campus_location(raw: Option<&Value>) -> Option<OutsideCampusLocation> {
    let value = match raw? {
        Value::Null => return None,
        Value::String(s) if NULL_SENTINELS.contains(&s.trim()) => return None,
        Value::String(s) => match decode_json_string(s) {
            Ok(value) => value,
            Err(e) => {
                warn!(field = "outside_campus_location", error = %e, "Unparseable location, using null");
                return None;
            }
        },
        other => other.clone(),
    };

    match value {
        Value::Null => None,
        Value::Object(_) => match serde_json::from_value(value) {
            Ok(location) => Some(location),
            Err(e) => {
                warn!(field = "outside_campus_location", error = %e, "Malformed location, using null");
                None
            }
        },
        other => {
            warn!(field = "outside_campus_location", value = %other, "Location is not an object, using null");
            None
        }
    }
}

pub fn parse_activity_format(raw: Option<&Value>) -> Vec<String> {
    parse_string_list("activity_format", raw, ListFallback::SplitOnComma)
}

pub fn parse_expected_outcome(raw: Option<&Value>) -> Vec<String> {
    parse_string_list("expected_project_outcome", raw, ListFallback::WholeString)
}

pub fn parse_project_objectives(raw: Option<&Value>) -> Vec<String> {
    parse_string_list("project_objectives", raw, ListFallback::SplitOnComma)
}

/// Lists of strings. Arrays pass through, JSON-array strings are decoded,
/// other strings follow `fallback`; absent or blank input is `[]`.
pub fn parse_string_list(field: &str, raw: Option<&Value>, fallback: ListFallback) -> Vec<String> {
    match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => array_to_strings(field, items),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            if let Ok(Value::Array(items)) = decode_json_string(trimmed) {
                return array_to_strings(field, &items);
            }
            match fallback {
                ListFallback::SplitOnComma => trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|piece| !piece.is_empty())
                    .map(str::to_string)
                    .collect(),
                ListFallback::WholeString => vec![trimmed.to_string()],
            }
        }
        Some(other) => {
            warn!(field, value = %other, "Expected a list or string, using empty list");
            Vec::new()
        }
    }
}

/// Timestamps as either store renders them. Unrecognized text is `None`.
pub fn parse_timestamp(field: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
    let text = raw?.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    // Postgres `timestamptz` text form, e.g. 2024-05-01 09:00:00+07
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    warn!(field, value = text, "Unrecognized timestamp, using null");
    None
}

/// Serde adapter for list fields nested inside structured values.
pub fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(parse_string_list("schedule.each_day.time", value.as_ref(), ListFallback::SplitOnComma))
}

/// Decode JSON text, unwrapping one extra layer when the payload was encoded twice.
fn decode_json_string(text: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str::<Value>(text)? {
        Value::String(inner) => Ok(serde_json::from_str(&inner).unwrap_or(Value::String(inner))),
        value => Ok(value),
    }
}

fn array_to_strings(field: &str, items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => None,
            other => {
                warn!(field, value = %other, "Dropping non-scalar list entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(text: &str) -> Value {
        Value::String(text.to_string())
    }

    #[test]
    fn activity_hours_from_json_string() {
        let raw = s(r#"{"social_activities": 6, "university_activities": "3",
            "competency_development_activities": {"health": 1.5, "virtue": 2}}"#);
        let hours = parse_activity_hours(Some(&raw));
        assert_eq!(hours.social_activities, Some(6.0));
        assert_eq!(hours.university_activities, Some(3.0));
        let competency = hours.competency_development_activities.unwrap();
        assert_eq!(competency.health, Some(1.5));
        assert_eq!(competency.virtue, Some(2.0));
        assert_eq!(competency.thinking_and_learning, None);
    }

    #[test]
    fn activity_hours_malformed_is_empty_object() {
        for raw in [s("{not json"), s(""), s("[1,2]"), s("null"), json!(17), Value::Null] {
            let hours = parse_activity_hours(Some(&raw));
            assert!(hours.is_empty(), "expected empty for {}", raw);
            assert_eq!(serde_json::to_value(&hours).unwrap(), json!({}));
        }
        assert!(parse_activity_hours(None).is_empty());
    }

    #[test]
    fn activity_hours_structured_passes_through_with_unknown_keys() {
        let raw = json!({"social_activities": 4, "bonus": "x"});
        let hours = parse_activity_hours(Some(&raw));
        assert_eq!(hours.social_activities, Some(4.0));
        assert_eq!(serde_json::to_value(&hours).unwrap(), json!({"social_activities": 4.0, "bonus": "x"}));
    }

    #[test]
    fn schedule_from_json_string() {
        let schedule = parse_schedule(Some(&s(r#"{"each_day":[],"location":"Hall"}"#))).unwrap();
        assert!(schedule.each_day.is_empty());
        assert_eq!(schedule.location, "Hall");
        assert_eq!(serde_json::to_value(&schedule).unwrap(), json!({"each_day": [], "location": "Hall"}));
    }

    #[test]
    fn schedule_days_normalize_time_ranges() {
        let raw = json!({
            "each_day": [
                {"date": "2024-06-01", "time": ["09:00-12:00"], "description": "Opening"},
                {"date": "2024-06-02", "time": "09:00-12:00, 13:00-16:00"}
            ],
            "location": "Hall"
        });
        let schedule = parse_schedule(Some(&raw)).unwrap();
        assert_eq!(schedule.each_day[0].time, vec!["09:00-12:00"]);
        assert_eq!(schedule.each_day[1].time, vec!["09:00-12:00", "13:00-16:00"]);
        assert_eq!(schedule.each_day[1].description, "");
    }

    #[test]
    fn schedule_malformed_is_null() {
        assert!(parse_schedule(Some(&s("{oops"))).is_none());
        assert!(parse_schedule(Some(&s(""))).is_none());
        assert!(parse_schedule(Some(&json!([1, 2]))).is_none());
        assert!(parse_schedule(Some(&Value::Null)).is_none());
        assert!(parse_schedule(None).is_none());
    }

    #[test]
    fn double_encoded_schedule_is_unwrapped() {
        let inner = r#"{"each_day":[],"location":"Gym"}"#;
        let twice = serde_json::to_string(inner).unwrap();
        let schedule = parse_schedule(Some(&s(&twice))).unwrap();
        assert_eq!(schedule.location, "Gym");
    }

    #[test]
    fn outside_location_sentinels_are_null() {
        for raw in [s(""), s("null"), s("undefined"), s(" null "), Value::Null] {
            assert!(parse_outside_campus_location(Some(&raw)).is_none(), "expected null for {}", raw);
        }
        assert!(parse_outside_campus_location(None).is_none());
    }

    #[test]
    fn outside_location_decodes_string_and_passes_objects() {
        let from_string =
            parse_outside_campus_location(Some(&s(r#"{"district":"Mueang","province":"Nan"}"#))).unwrap();
        assert_eq!(from_string.district.as_deref(), Some("Mueang"));
        assert_eq!(from_string.province.as_deref(), Some("Nan"));

        let from_object = parse_outside_campus_location(Some(&json!({"province": "Krabi"}))).unwrap();
        assert_eq!(from_object.province.as_deref(), Some("Krabi"));
        assert!(from_object.district.is_none());
    }

    #[test]
    fn outside_location_malformed_is_null() {
        assert!(parse_outside_campus_location(Some(&s("{broken"))).is_none());
        assert!(parse_outside_campus_location(Some(&s("42"))).is_none());
        assert!(parse_outside_campus_location(Some(&json!(["a"]))).is_none());
    }

    #[test]
    fn activity_format_splits_plain_strings() {
        assert_eq!(parse_activity_format(Some(&s("Workshop, Seminar"))), vec!["Workshop", "Seminar"]);
        assert_eq!(parse_activity_format(Some(&s("Workshop,, ,Seminar"))), vec!["Workshop", "Seminar"]);
        assert_eq!(parse_activity_format(Some(&s(r#"["Camp","Talk"]"#))), vec!["Camp", "Talk"]);
        assert_eq!(parse_activity_format(Some(&json!(["Camp"]))), vec!["Camp"]);
    }

    #[test]
    fn expected_outcome_keeps_whole_sentence() {
        assert_eq!(
            parse_expected_outcome(Some(&s("Students learn teamwork, leadership"))),
            vec!["Students learn teamwork, leadership"]
        );
        assert_eq!(parse_expected_outcome(Some(&s(r#"["a","b"]"#))), vec!["a", "b"]);
    }

    #[test]
    fn objectives_drop_empty_pieces() {
        assert_eq!(parse_project_objectives(Some(&s(" one , ,two,"))), vec!["one", "two"]);
        // JSON that is not an array falls back to the plain-string policy
        assert_eq!(parse_project_objectives(Some(&s("42"))), vec!["42"]);
    }

    #[test]
    fn empty_list_inputs_are_empty() {
        for parse in [parse_activity_format, parse_expected_outcome, parse_project_objectives] {
            assert!(parse(None).is_empty());
            assert!(parse(Some(&Value::Null)).is_empty());
            assert!(parse(Some(&json!([]))).is_empty());
            assert!(parse(Some(&s(""))).is_empty());
            assert!(parse(Some(&s("   "))).is_empty());
            assert!(parse(Some(&s("[]"))).is_empty());
            assert!(parse(Some(&json!({"a": 1}))).is_empty());
        }
    }

    #[test]
    fn list_entries_are_stringified() {
        assert_eq!(
            parse_activity_format(Some(&json!(["a", 2, null, true, {"x": 1}]))),
            vec!["a", "2", "true"]
        );
    }

    #[test]
    fn timestamps_in_store_formats() {
        let expected = "2024-05-01T02:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(parse_timestamp("t", Some("2024-05-01T02:00:00.000Z")), Some(expected));
        assert_eq!(parse_timestamp("t", Some("2024-05-01T09:00:00+07:00")), Some(expected));
        assert_eq!(parse_timestamp("t", Some("2024-05-01 09:00:00+07")), Some(expected));
        assert_eq!(parse_timestamp("t", Some("2024-05-01T02:00:00")), Some(expected));
        assert_eq!(
            parse_timestamp("t", Some("2024-05-01")),
            Some("2024-05-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
        assert_eq!(parse_timestamp("t", Some("next tuesday")), None);
        assert_eq!(parse_timestamp("t", Some("")), None);
        assert_eq!(parse_timestamp("t", None), None);
    }
}
