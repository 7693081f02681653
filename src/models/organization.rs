use serde::{Deserialize, Serialize};

/// Canonical organization record. Field names are the public wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub orgnameen: Option<String>,
    pub orgnameth: Option<String>,
    #[serde(rename = "organizationMark")]
    pub organization_mark: Option<String>,
    pub org_image: Option<String>,
    pub description: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub views: i64,
    pub org_nickname: Option<String>,
    pub org_type_name: Option<String>,
    pub campus_name: Option<String>,
}
