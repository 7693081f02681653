use serde_json::Value;

use super::fields::{
    parse_activity_format, parse_activity_hours, parse_expected_outcome, parse_outside_campus_location,
    parse_project_objectives, parse_schedule, parse_timestamp,
};
use super::{first_non_blank, first_present};
use crate::models::{Project, RawProject};

/// Map a raw project from either store to the canonical shape.
///
/// Scalar fields take the first present spelling in a fixed precedence:
/// the store column name, then the canonical name, then the nested
/// `Organization` object. Structured fields then go through their parser.
/// Never fails; a broken sub-field falls back to its empty representation.
pub fn normalize_project(raw: &RawProject) -> Project {
    let org = raw.nested_organization();

    let date_start = first_present([raw.date_start_the_project.as_deref(), raw.date_start.as_deref()]);
    let date_end = first_present([raw.date_end_the_project.as_deref(), raw.date_end.as_deref()]);
    let outside = first_present([raw.outside_kaset.as_ref(), raw.outside_campus_location.as_ref()])
        .filter(|v| !v.is_null());

    Project {
        id: raw.id.clone().unwrap_or_default(),
        date_start: parse_timestamp("date_start", date_start),
        date_end: parse_timestamp("date_end", date_end),
        location: first_present([raw.project_location.clone(), raw.location.clone()]),
        name_en: first_present([raw.project_name_en.clone(), raw.name_en.clone()]),
        name_th: first_present([raw.project_name_th.clone(), raw.name_th.clone()]),
        activity_hours: parse_activity_hours(raw.activity_hours.as_ref()),
        activity_format: parse_activity_format(raw.activity_format.as_ref()),
        expected_project_outcome: parse_expected_outcome(raw.expected_project_outcome.as_ref()),
        schedule: parse_schedule(raw.schedule.as_ref()),
        organization_id: first_present([
            raw.organization_orgid.clone(),
            raw.organization_id.clone(),
            org.and_then(|o| o.id.clone()),
        ])
        .unwrap_or_default(),
        outside_campus_location: parse_outside_campus_location(outside),
        principles_and_reasoning: raw.principles_and_reasoning.clone(),
        project_objectives: parse_project_objectives(raw.project_objectives.as_ref()),
        org_name_en: first_non_blank([raw.org_name_en.clone(), org.and_then(|o| o.orgnameen.clone())]),
        org_name_th: first_non_blank([raw.org_name_th.clone(), org.and_then(|o| o.orgnameth.clone())]),
        org_nickname: first_non_blank([raw.org_nickname.clone(), org.and_then(|o| o.org_nickname.clone())]),
        campus_name: first_non_blank([
            raw.campus_name.clone(),
            org.and_then(|o| o.campus.as_ref()).and_then(|c| c.name.clone()),
        ]),
    }
}

/// Normalize a raw JSON record directly; `None` when it is not an object.
pub fn normalize_project_value(value: Value) -> Option<Project> {
    RawProject::from_value(value).map(|raw| normalize_project(&raw))
}
