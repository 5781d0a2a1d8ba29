use async_trait::async_trait;
use reqwest::Method;

use super::{GatewayError, HttpGateway};
use crate::schemas::assignment::{
    Assignment, AssignmentCreate, AssignmentListBody, AssignmentQuery, GradeRequest,
};
use crate::schemas::class::Class;
use crate::schemas::session::VideoSession;
use crate::schemas::student::Student;

/// Teacher dashboard operations. The session is looked up again on every
/// call, so a refreshed token is used as soon as it is available.
#[async_trait]
pub trait TeacherApi: Send + Sync {
    async fn my_classes(&self) -> Result<Vec<Class>, GatewayError>;
    async fn my_students(&self) -> Result<Vec<Student>, GatewayError>;
    async fn assignments(&self, query: &AssignmentQuery) -> Result<Vec<Assignment>, GatewayError>;
    async fn create_assignment(&self, assignment: &AssignmentCreate) -> Result<(), GatewayError>;
    async fn grade_submission(
        &self,
        submission_id: &str,
        grade: &GradeRequest,
    ) -> Result<(), GatewayError>;
    async fn start_class_session(&self, class_id: &str) -> Result<VideoSession, GatewayError>;
}

#[async_trait]
impl TeacherApi for HttpGateway {
    async fn my_classes(&self) -> Result<Vec<Class>, GatewayError> {
        self.get("/api/teacher/classes").await
    }

    async fn my_students(&self) -> Result<Vec<Student>, GatewayError> {
        self.get("/api/teacher/students").await
    }

    async fn assignments(&self, query: &AssignmentQuery) -> Result<Vec<Assignment>, GatewayError> {
        let body: AssignmentListBody =
            self.get_query("/api/teacher/assignments", &query.to_pairs()).await?;
        Ok(body.into_items())
    }

    async fn create_assignment(&self, assignment: &AssignmentCreate) -> Result<(), GatewayError> {
        self.send_ack(Method::POST, "/api/teacher/assignments", Some(assignment)).await
    }

    async fn grade_submission(
        &self,
        submission_id: &str,
        grade: &GradeRequest,
    ) -> Result<(), GatewayError> {
        self.send_ack(
            Method::PUT,
            &format!("/api/teacher/assignments/{submission_id}/grade"),
            Some(grade),
        )
        .await
    }

    async fn start_class_session(&self, class_id: &str) -> Result<VideoSession, GatewayError> {
        self.send(
            Method::POST,
            &format!("/api/teacher/classes/{class_id}/video-session"),
            &serde_json::json!({}),
        )
        .await
    }
}
