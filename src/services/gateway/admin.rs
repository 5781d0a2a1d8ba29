use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use super::{GatewayError, HttpGateway};
use crate::schemas::admin::{AdminActionPage, AdminStats};
use crate::schemas::class::{Class, ClassCreate, ClassQuery, ClassUpdate};
use crate::schemas::fee::{ConfirmPayment, FeeStatistics, RejectPayment, StudentFees};
use crate::schemas::session::{JoinedCall, StartSession, VideoSession};
use crate::schemas::student::{BulkAssignResult, Student, StudentAssignment, StudentCreate};
use crate::schemas::teacher::{CreateTeacherResponse, Teacher, TeacherCreate, TeacherCreated};

/// Admin dashboard operations.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_teachers(&self) -> Result<Vec<Teacher>, GatewayError>;
    async fn available_teachers(&self) -> Result<Vec<Teacher>, GatewayError>;
    async fn create_teacher(&self, teacher: &TeacherCreate) -> Result<TeacherCreated, GatewayError>;
    async fn remove_teacher(&self, teacher_id: &str) -> Result<(), GatewayError>;

    async fn list_students(&self) -> Result<Vec<Student>, GatewayError>;
    async fn add_student(&self, student: &StudentCreate) -> Result<(), GatewayError>;
    async fn remove_student(&self, student_id: &str) -> Result<(), GatewayError>;
    async fn unassigned_students(&self) -> Result<Vec<Student>, GatewayError>;
    async fn students_by_teacher(&self, teacher_id: &str) -> Result<Vec<Student>, GatewayError>;
    async fn assign_student(&self, student_id: &str, teacher_id: &str) -> Result<(), GatewayError>;
    async fn unassign_student(&self, student_id: &str) -> Result<(), GatewayError>;
    async fn bulk_assign(
        &self,
        assignments: &[StudentAssignment],
    ) -> Result<BulkAssignResult, GatewayError>;

    async fn list_classes(&self, query: &ClassQuery) -> Result<Vec<Class>, GatewayError>;
    async fn schedule_class(&self, class: &ClassCreate) -> Result<(), GatewayError>;
    async fn update_class(&self, class_id: &str, update: &ClassUpdate) -> Result<(), GatewayError>;
    async fn delete_class(&self, class_id: &str) -> Result<(), GatewayError>;

    async fn list_video_sessions(&self) -> Result<Vec<VideoSession>, GatewayError>;
    async fn start_video_session(&self, start: &StartSession) -> Result<VideoSession, GatewayError>;
    async fn join_video_call(&self, meeting_id: &str) -> Result<JoinedCall, GatewayError>;
    async fn remove_from_video_call(
        &self,
        meeting_id: &str,
        participant_id: &str,
    ) -> Result<(), GatewayError>;

    async fn fee_students(&self) -> Result<Vec<StudentFees>, GatewayError>;
    async fn fee_statistics(&self) -> Result<FeeStatistics, GatewayError>;
    async fn confirm_payment(&self, payment_id: &str, method: &str) -> Result<(), GatewayError>;
    async fn reject_payment(&self, payment_id: &str, reason: &str) -> Result<(), GatewayError>;

    async fn admin_stats(&self) -> Result<AdminStats, GatewayError>;
    async fn admin_actions(&self, page: u32, limit: u32) -> Result<AdminActionPage, GatewayError>;
}

#[async_trait]
impl AdminApi for HttpGateway {
    async fn list_teachers(&self) -> Result<Vec<Teacher>, GatewayError> {
        self.get("/api/admin/teachers").await
    }

    async fn available_teachers(&self) -> Result<Vec<Teacher>, GatewayError> {
        self.get("/api/admin/teachers/available").await
    }

    async fn create_teacher(&self, teacher: &TeacherCreate) -> Result<TeacherCreated, GatewayError> {
        let response: CreateTeacherResponse =
            self.send(Method::POST, "/api/admin/teachers", teacher).await?;

        let CreateTeacherResponse { success, teacher, credentials, error } = response;
        match (error.filter(|_| !success), teacher, credentials) {
            (Some(message), _, _) => {
                tracing::error!(error = %message, "Teacher creation rejected");
                Err(GatewayError::server(200, message))
            }
            (None, Some(teacher), Some(credentials)) => Ok(TeacherCreated { teacher, credentials }),
            _ => Err(GatewayError::MalformedResponse(
                "Teacher creation response is missing the teacher or credentials".to_string(),
            )),
        }
    }

    async fn remove_teacher(&self, teacher_id: &str) -> Result<(), GatewayError> {
        self.send_ack::<()>(Method::DELETE, &format!("/api/admin/teachers/{teacher_id}"), None)
            .await
    }

    async fn list_students(&self) -> Result<Vec<Student>, GatewayError> {
        self.get("/api/admin/students").await
    }

    async fn add_student(&self, student: &StudentCreate) -> Result<(), GatewayError> {
        self.send_ack(Method::POST, "/api/admin/students", Some(student)).await
    }

    async fn remove_student(&self, student_id: &str) -> Result<(), GatewayError> {
        self.send_ack::<()>(Method::DELETE, &format!("/api/admin/students/{student_id}"), None)
            .await
    }

    async fn unassigned_students(&self) -> Result<Vec<Student>, GatewayError> {
        self.get("/api/admin/students/unassigned").await
    }

    async fn students_by_teacher(&self, teacher_id: &str) -> Result<Vec<Student>, GatewayError> {
        self.get(&format!("/api/admin/students/teacher/{teacher_id}")).await
    }

    async fn assign_student(&self, student_id: &str, teacher_id: &str) -> Result<(), GatewayError> {
        let body = json!({ "teacher_id": teacher_id });
        self.send_ack(Method::POST, &format!("/api/admin/students/{student_id}/assign"), Some(&body))
            .await
    }

    async fn unassign_student(&self, student_id: &str) -> Result<(), GatewayError> {
        self.send_ack::<()>(
            Method::POST,
            &format!("/api/admin/students/{student_id}/unassign"),
            None,
        )
        .await
    }

    async fn bulk_assign(
        &self,
        assignments: &[StudentAssignment],
    ) -> Result<BulkAssignResult, GatewayError> {
        let body = json!({ "assignments": assignments });
        self.send(Method::POST, "/api/admin/students/bulk-assign", &body).await
    }

    async fn list_classes(&self, query: &ClassQuery) -> Result<Vec<Class>, GatewayError> {
        self.get_query("/api/admin/classes", &query.to_pairs()).await
    }

    async fn schedule_class(&self, class: &ClassCreate) -> Result<(), GatewayError> {
        self.send_ack(Method::POST, "/api/admin/classes", Some(class)).await
    }

    async fn update_class(&self, class_id: &str, update: &ClassUpdate) -> Result<(), GatewayError> {
        self.send_ack(Method::PUT, &format!("/classes/{class_id}"), Some(update)).await
    }

    async fn delete_class(&self, class_id: &str) -> Result<(), GatewayError> {
        self.send_ack::<()>(Method::DELETE, &format!("/classes/{class_id}"), None).await
    }

    async fn list_video_sessions(&self) -> Result<Vec<VideoSession>, GatewayError> {
        self.get("/api/admin/video-sessions").await
    }

    async fn start_video_session(&self, start: &StartSession) -> Result<VideoSession, GatewayError> {
        self.send(Method::POST, "/api/admin/video-sessions", start).await
    }

    async fn join_video_call(&self, meeting_id: &str) -> Result<JoinedCall, GatewayError> {
        let body = json!({ "meetingId": meeting_id });
        self.send(Method::POST, "/api/admin/join-video-call", &body).await
    }

    async fn remove_from_video_call(
        &self,
        meeting_id: &str,
        participant_id: &str,
    ) -> Result<(), GatewayError> {
        let body = json!({ "meetingId": meeting_id, "participantId": participant_id });
        self.send_ack(Method::POST, "/api/admin/remove-from-video-call", Some(&body)).await
    }

    async fn fee_students(&self) -> Result<Vec<StudentFees>, GatewayError> {
        self.get("/api/admin/fees/students").await
    }

    async fn fee_statistics(&self) -> Result<FeeStatistics, GatewayError> {
        self.get("/api/admin/fees/statistics").await
    }

    async fn confirm_payment(&self, payment_id: &str, method: &str) -> Result<(), GatewayError> {
        let body = ConfirmPayment { payment_id, payment_method: method };
        self.send_ack(Method::POST, "/api/admin/fees/confirm-payment", Some(&body)).await
    }

    async fn reject_payment(&self, payment_id: &str, reason: &str) -> Result<(), GatewayError> {
        let body = RejectPayment { payment_id, reason };
        self.send_ack(Method::POST, "/api/admin/fees/reject-payment", Some(&body)).await
    }

    async fn admin_stats(&self) -> Result<AdminStats, GatewayError> {
        self.get("/api/admin/stats").await
    }

    async fn admin_actions(&self, page: u32, limit: u32) -> Result<AdminActionPage, GatewayError> {
        let query = [("page", page.to_string()), ("limit", limit.to_string())];
        self.get_query("/api/admin/actions", &query).await
    }
}
