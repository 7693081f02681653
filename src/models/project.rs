use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::raw::{lenient, lenient_f64, lenient_string};
use crate::normalize::fields::lenient_string_list;

/// Canonical project record, the only project shape handlers ever serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub name_en: Option<String>,
    pub name_th: Option<String>,
    pub activity_hours: ActivityHours,
    pub activity_format: Vec<String>,
    pub expected_project_outcome: Vec<String>,
    pub schedule: Option<Schedule>,
    pub organization_id: String,
    pub outside_campus_location: Option<OutsideCampusLocation>,
    pub principles_and_reasoning: Option<String>,
    pub project_objectives: Vec<String>,
    pub org_name_en: Option<String>,
    pub org_name_th: Option<String>,
    pub org_nickname: Option<String>,
    pub campus_name: Option<String>,
}

/// Activity hours credited by a project. Serializes to `{}` when nothing is known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityHours {
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub social_activities: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub university_activities: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub competency_development_activities: Option<CompetencyHours>,
    /// Keys the upstream sends that have no dedicated field, passed through untouched.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ActivityHours {
    pub fn is_empty(&self) -> bool {
        self.social_activities.is_none()
            && self.university_activities.is_none()
            && self.competency_development_activities.is_none()
            && self.other.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetencyHours {
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub health: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub virtue: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub thinking_and_learning: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub interpersonal_relationships_and_communication: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub each_day: Vec<ScheduleDay>,
    #[serde(default, deserialize_with = "lenient_string_or_empty")]
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    #[serde(default, deserialize_with = "lenient_string_or_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub time: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_or_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutsideCampusLocation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub district: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub province: Option<String>,
}

fn lenient_string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}
