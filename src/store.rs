mod admin;
mod resource;
mod stats;
mod student;
mod teacher;

pub use admin::{AdminState, AdminStore};
pub use resource::{LoadingFlags, RefreshReport, ResourceKind};
pub use stats::{StatCard, Stats};
pub use student::{StudentResource, StudentState, StudentStore};
pub use teacher::{TeacherResource, TeacherState, TeacherStats, TeacherStore};
