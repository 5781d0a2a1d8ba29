//! Teacher and student dashboards. Both are thin views over their stores
//! with the same toast-then-refetch mutation shape as the admin sections.

pub mod student;
pub mod teacher;

pub use student::{submission_label, StudentPortal};
pub use teacher::{ClassStudent, RosterEntry, TeacherClassFilters, TeacherDashboard};
