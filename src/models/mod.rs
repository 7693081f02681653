pub mod catalog;
pub mod organization;
pub mod project;
pub mod raw;

pub use catalog::{Campus, OrganizationType, KNOWN_CAMPUSES, KNOWN_ORGANIZATION_TYPES};
pub use organization::Organization;
pub use project::{
    ActivityHours, CompetencyHours, OutsideCampusLocation, Project, Schedule, ScheduleDay,
};
pub use raw::{RawNamed, RawOrganization, RawProject, RawProjectOrganization};
