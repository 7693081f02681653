//! Record shapes as the backing stores deliver them.
//!
//! One struct per entity covers every spelling either source uses: the SAKU
//! upstream nests organization data under `Organization`, the relational store
//! joins it into flat `org_*`/`campus_name` columns, and already-normalized
//! records use the canonical names. Every field is optional and decoded
//! leniently, so any JSON object decodes; choosing between spellings is the
//! normalizer's job.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProject {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub date_start_the_project: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_start: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_end_the_project: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_end: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub project_location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub project_name_en: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name_en: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub project_name_th: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name_th: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub organization_orgid: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub organization_id: Option<String>,

    // Denormalized organization columns (relational store, or already normalized)
    #[serde(default, deserialize_with = "lenient_string")]
    pub org_name_en: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub org_name_th: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub org_nickname: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub campus_name: Option<String>,

    // Nested organization (upstream); either capitalization, `Organization` first
    #[serde(default, rename = "Organization", deserialize_with = "lenient")]
    pub organization: Option<RawProjectOrganization>,
    #[serde(default, rename = "organization", deserialize_with = "lenient")]
    pub organization_lowercase: Option<RawProjectOrganization>,

    // Structured fields, string-encoded or not
    #[serde(default)]
    pub activity_hours: Option<Value>,
    #[serde(default)]
    pub activity_format: Option<Value>,
    #[serde(default)]
    pub expected_project_outcome: Option<Value>,
    #[serde(default)]
    pub schedule: Option<Value>,
    #[serde(default)]
    pub project_objectives: Option<Value>,
    #[serde(default)]
    pub outside_kaset: Option<Value>,
    #[serde(default)]
    pub outside_campus_location: Option<Value>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub principles_and_reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProjectOrganization {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub orgnameen: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub orgnameth: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub org_nickname: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub campus: Option<RawNamed>,
}

/// `{ "name": ... }` sub-objects (campus, org type) as both sources send them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNamed {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrganization {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub orgnameen: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub orgnameth: Option<String>,
    #[serde(default, rename = "organizationMark", deserialize_with = "lenient_string")]
    pub organization_mark: Option<String>,
    #[serde(default, rename = "organization_mark", deserialize_with = "lenient_string")]
    pub organization_mark_snake: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub org_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub instagram: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub facebook: Option<String>,
    #[serde(default)]
    pub views: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub org_nickname: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub org_type_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub org_type: Option<RawNamed>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub campus_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub campus: Option<RawNamed>,
}

impl RawProject {
    /// Decode one entry of a source payload; `None` when the entry is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        decode_entry(value, "project")
    }

    pub fn nested_organization(&self) -> Option<&RawProjectOrganization> {
        self.organization.as_ref().or(self.organization_lowercase.as_ref())
    }
}

impl RawOrganization {
    pub fn from_value(value: Value) -> Option<Self> {
        decode_entry(value, "organization")
    }
}

fn decode_entry<T: DeserializeOwned>(value: Value, entity: &str) -> Option<T> {
    if !value.is_object() {
        tracing::warn!("Skipping {} entry that is not an object: {}", entity, value);
        return None;
    }
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!("Skipping undecodable {} entry: {}", entity, e);
            None
        }
    }
}

/// Any scalar as text. Strings pass through, numbers and booleans are
/// rendered, everything else (null, arrays, objects) reads as absent.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// JSON numbers or numeric strings; anything else reads as absent.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    })
}

/// Decode a nested object, reading it as absent when it has the wrong shape.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
