//! Modal forms. Each one validates locally, calls the gateway, and leaves
//! refetching to the section that opened it.

pub mod add_teacher;
pub mod assign_student;
pub mod assignment;
pub mod payment;
pub mod schedule_class;
pub mod state;

pub use add_teacher::{AddTeacherModal, CredentialsPanel, TeacherForm};
pub use assign_student::AssignStudentModal;
pub use assignment::{AssignmentForm, CreateAssignmentModal, GradeForm, GradeSubmissionModal};
pub use payment::{PaymentForm, PaymentModal};
pub use schedule_class::{ClassForm, ScheduleClassModal};
pub use state::{FormError, ModalForm, ModalState, SubmitError};
