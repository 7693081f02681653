use serde_json::Value;
use tracing::warn;

use super::first_non_blank;
use crate::models::{Organization, RawOrganization};

/// Map a raw organization to the canonical shape. Type and campus names come
/// from joined columns when present, otherwise from the nested `{name}` objects.
pub fn normalize_organization(raw: &RawOrganization) -> Organization {
    Organization {
        id: raw.id.clone().unwrap_or_default(),
        orgnameen: raw.orgnameen.clone(),
        orgnameth: raw.orgnameth.clone(),
        organization_mark: first_non_blank([raw.organization_mark.clone(), raw.organization_mark_snake.clone()]),
        org_image: raw.org_image.clone(),
        description: raw.description.clone(),
        instagram: raw.instagram.clone(),
        facebook: raw.facebook.clone(),
        views: parse_views(raw.views.as_ref()),
        org_nickname: raw.org_nickname.clone(),
        org_type_name: first_non_blank([
            raw.org_type_name.clone(),
            raw.org_type.as_ref().and_then(|t| t.name.clone()),
        ]),
        campus_name: first_non_blank([
            raw.campus_name.clone(),
            raw.campus.as_ref().and_then(|c| c.name.clone()),
        ]),
    }
}

/// View counters arrive as integers, floats or numeric strings. Anything else counts as 0.
pub fn parse_views(raw: Option<&Value>) -> i64 {
    let views = match raw {
        None | Some(Value::Null) => return 0,
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    match views {
        Some(views) if views >= 0 => views,
        _ => {
            warn!(field = "views", value = ?raw, "Unusable view counter, using 0");
            0
        }
    }
}
