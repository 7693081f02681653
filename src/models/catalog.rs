use serde::{Deserialize, Serialize};

/// Campuses known to the university, in display order.
pub const KNOWN_CAMPUSES: [&str; 6] = [
    "วิทยาเขตบางเขน",
    "วิทยาเขตกำแพงแสน",
    "วิทยาเขตเฉลิมพระเกียรติ จังหวัดสกลนคร",
    "วิทยาเขตศรีราชา",
    "โครงการจัดตั้ง วิทยาเขตสุพรรณบุรี",
    "สถาบันสมทบ",
];

/// Organization categories known to the university, in display order.
pub const KNOWN_ORGANIZATION_TYPES: [&str; 7] = [
    "องค์การนิสิต",
    "ชมรมด้านศิลปวัฒนธรรม",
    "ชมรมด้านบำเพ็ญประโยชน์",
    "ชมรมด้านวิชาการ",
    "ชมรมด้านกีฬา",
    "กลุ่มกิจกรรมนิสิต",
    "สโมสรนิสิต",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campus {
    /// Absent when the source only exposes names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}
