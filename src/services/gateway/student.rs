use async_trait::async_trait;
use reqwest::Method;

use super::{GatewayError, HttpGateway};
use crate::schemas::assignment::{Assignment, SubmissionCreate};
use crate::schemas::student::StudentDashboard;

#[async_trait]
pub trait StudentApi: Send + Sync {
    async fn dashboard(&self) -> Result<StudentDashboard, GatewayError>;
    async fn my_assignments(&self) -> Result<Vec<Assignment>, GatewayError>;
    async fn submit_assignment(
        &self,
        assignment_id: &str,
        submission: &SubmissionCreate,
    ) -> Result<(), GatewayError>;
}

#[async_trait]
impl StudentApi for HttpGateway {
    async fn dashboard(&self) -> Result<StudentDashboard, GatewayError> {
        self.get("/api/student/dashboard").await
    }

    async fn my_assignments(&self) -> Result<Vec<Assignment>, GatewayError> {
        self.get("/api/student/assignments").await
    }

    async fn submit_assignment(
        &self,
        assignment_id: &str,
        submission: &SubmissionCreate,
    ) -> Result<(), GatewayError> {
        self.send_ack(
            Method::POST,
            &format!("/api/student/assignments/{assignment_id}/submissions"),
            Some(submission),
        )
        .await
    }
}
