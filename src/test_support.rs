use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::schemas::admin::{AdminActionPage, AdminStats};
use crate::schemas::assignment::{
    Assignment, AssignmentCreate, AssignmentQuery, GradeRequest, SubmissionCreate,
};
use crate::schemas::class::{Class, ClassCreate, ClassQuery, ClassUpdate};
use crate::schemas::fee::{FeeStatistics, StudentFees};
use crate::schemas::session::{JoinedCall, StartSession, VideoSession};
use crate::schemas::student::{
    BulkAssignResult, Student, StudentAssignment, StudentCreate, StudentDashboard,
};
use crate::schemas::teacher::{Credentials, Teacher, TeacherCreate, TeacherCreated};
use crate::schemas::types::{PaymentStatus, SubmissionStatus, TeacherStatus};
use crate::sections::{Clipboard, ClipboardError, Confirmer};
use crate::services::gateway::{AdminApi, GatewayError, StudentApi, TeacherApi};

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<AsyncMutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(AsyncMutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("ACADEMY_ENV", "test");
    std::env::set_var("SUPABASE_URL", "https://identity.test");
    std::env::set_var("SUPABASE_ANON_KEY", "anon");
    for key in [
        "ACADEMY_STRICT_CONFIG",
        "API_BASE_URL",
        "SEARCH_DEBOUNCE_MS",
        "ACCESS_TOKEN",
        "ACCESS_TOKEN_EXPIRES_AT",
        "VIDEO_CALL_PATH",
        "SESSION_CHECK_INTERVAL_SECONDS",
        "SESSION_EXPIRY_WARNING_MINUTES",
        "ENVIRONMENT",
    ] {
        std::env::remove_var(key);
    }
}

/// Backend data the fake serves. Tests seed it directly.
#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub(crate) teachers: Vec<Teacher>,
    pub(crate) students: Vec<Student>,
    pub(crate) classes: Vec<Class>,
    pub(crate) sessions: Vec<VideoSession>,
    pub(crate) fees: Vec<StudentFees>,
    pub(crate) fee_stats: FeeStatistics,
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) teacher_students: Vec<Student>,
    pub(crate) dashboard: Option<StudentDashboard>,
    /// Students the bulk endpoint silently skips.
    pub(crate) bulk_rejects: BTreeSet<String>,
}

#[derive(Default)]
struct Journal {
    state: FakeState,
    failures: HashMap<String, GatewayError>,
    calls: Vec<String>,
    scheduled: Vec<ClassCreate>,
    started: Vec<StartSession>,
    joined: Vec<String>,
    payment_method: Option<String>,
    next_id: u32,
}

impl Journal {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// In-memory stand-in for every dashboard API. Each call is journaled
/// before an injected failure is checked, so failed calls still count.
#[derive(Default)]
pub(crate) struct FakeGateway {
    inner: Mutex<Journal>,
}

impl FakeGateway {
    pub(crate) fn seed(&self, seed: impl FnOnce(&mut FakeState)) {
        seed(&mut self.lock().state);
    }

    pub(crate) fn fail(&self, operation: &str, err: GatewayError) {
        self.lock().failures.insert(operation.to_string(), err);
    }

    pub(crate) fn clear_failure(&self, operation: &str) {
        self.lock().failures.remove(operation);
    }

    pub(crate) fn call_count(&self, operation: &str) -> usize {
        self.lock().calls.iter().filter(|call| call.as_str() == operation).count()
    }

    pub(crate) fn scheduled_classes(&self) -> Vec<ClassCreate> {
        self.lock().scheduled.clone()
    }

    pub(crate) fn started_sessions(&self) -> Vec<StartSession> {
        self.lock().started.clone()
    }

    pub(crate) fn joined_meetings(&self) -> Vec<String> {
        self.lock().joined.clone()
    }

    pub(crate) fn last_payment_method(&self) -> Option<String> {
        self.lock().payment_method.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Journal> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enter(&self, operation: &str) -> Result<MutexGuard<'_, Journal>, GatewayError> {
        let mut journal = self.lock();
        journal.calls.push(operation.to_string());
        if let Some(err) = journal.failures.get(operation).cloned() {
            return Err(err);
        }
        Ok(journal)
    }
}

fn not_found(what: &str) -> GatewayError {
    GatewayError::server(404, format!("{what} not found"))
}

fn started_session(class_id: &str) -> VideoSession {
    serde_json::from_value(json!({
        "id": format!("session-{class_id}"),
        "meeting_id": format!("meet-{class_id}"),
        "class_id": class_id,
        "status": "active",
    }))
    .expect("session")
}

fn set_payment_status(fees: &mut [StudentFees], payment_id: &str, status: PaymentStatus) -> bool {
    fees.iter_mut()
        .flat_map(|student| student.fee_payments.iter_mut())
        .find(|payment| payment.id == payment_id)
        .map(|payment| payment.status = status)
        .is_some()
}

#[async_trait]
impl AdminApi for FakeGateway {
    async fn list_teachers(&self) -> Result<Vec<Teacher>, GatewayError> {
        Ok(self.enter("list_teachers")?.state.teachers.clone())
    }

    async fn available_teachers(&self) -> Result<Vec<Teacher>, GatewayError> {
        let journal = self.enter("available_teachers")?;
        Ok(journal
            .state
            .teachers
            .iter()
            .filter(|teacher| teacher.status == TeacherStatus::Active)
            .cloned()
            .collect())
    }

    async fn create_teacher(&self, teacher: &TeacherCreate) -> Result<TeacherCreated, GatewayError> {
        let mut journal = self.enter("create_teacher")?;
        if journal.state.teachers.iter().any(|existing| existing.email == teacher.email) {
            return Err(GatewayError::server(400, "User already exists"));
        }
        let id = journal.next_id("teacher");
        let created = Teacher {
            id: id.clone(),
            name: teacher.name.clone(),
            email: teacher.email.clone(),
            subject: Some(teacher.subject.clone()),
            status: TeacherStatus::Active,
        };
        journal.state.teachers.push(created.clone());
        Ok(TeacherCreated {
            teacher: created,
            credentials: Credentials {
                email: teacher.email.clone(),
                password: format!("pw-{id}"),
                login_url: "/teacher-login".to_string(),
            },
        })
    }

    async fn remove_teacher(&self, teacher_id: &str) -> Result<(), GatewayError> {
        let mut journal = self.enter("remove_teacher")?;
        journal.state.teachers.retain(|teacher| teacher.id != teacher_id);
        Ok(())
    }

    async fn list_students(&self) -> Result<Vec<Student>, GatewayError> {
        Ok(self.enter("list_students")?.state.students.clone())
    }

    async fn add_student(&self, student: &StudentCreate) -> Result<(), GatewayError> {
        let mut journal = self.enter("add_student")?;
        let id = journal.next_id("student");
        journal.state.students.push(Student {
            id,
            name: student.name.clone(),
            email: student.email.clone(),
            course: student.course.clone(),
            teacher_id: None,
            teacher_name: None,
            assigned_at: None,
            teacher: None,
        });
        Ok(())
    }

    async fn remove_student(&self, student_id: &str) -> Result<(), GatewayError> {
        let mut journal = self.enter("remove_student")?;
        journal.state.students.retain(|student| student.id != student_id);
        Ok(())
    }

    async fn unassigned_students(&self) -> Result<Vec<Student>, GatewayError> {
        let journal = self.enter("unassigned_students")?;
        Ok(journal.state.students.iter().filter(|student| !student.is_assigned()).cloned().collect())
    }

    async fn students_by_teacher(&self, teacher_id: &str) -> Result<Vec<Student>, GatewayError> {
        let journal = self.enter("students_by_teacher")?;
        Ok(journal
            .state
            .students
            .iter()
            .filter(|student| student.teacher_id.as_deref() == Some(teacher_id))
            .cloned()
            .collect())
    }

    async fn assign_student(&self, student_id: &str, teacher_id: &str) -> Result<(), GatewayError> {
        let mut journal = self.enter("assign_student")?;
        let student = journal
            .state
            .students
            .iter_mut()
            .find(|student| student.id == student_id)
            .ok_or_else(|| not_found("Student"))?;
        student.teacher_id = Some(teacher_id.to_string());
        Ok(())
    }

    async fn unassign_student(&self, student_id: &str) -> Result<(), GatewayError> {
        let mut journal = self.enter("unassign_student")?;
        let student = journal
            .state
            .students
            .iter_mut()
            .find(|student| student.id == student_id)
            .ok_or_else(|| not_found("Student"))?;
        student.teacher_id = None;
        Ok(())
    }

    async fn bulk_assign(
        &self,
        assignments: &[StudentAssignment],
    ) -> Result<BulkAssignResult, GatewayError> {
        let mut journal = self.enter("bulk_assign")?;
        let state = &mut journal.state;
        let mut assigned = 0;
        for row in assignments {
            if state.bulk_rejects.contains(&row.student_id) {
                continue;
            }
            if let Some(student) = state.students.iter_mut().find(|student| student.id == row.student_id) {
                student.teacher_id = Some(row.teacher_id.clone());
                assigned += 1;
            }
        }
        Ok(BulkAssignResult { assigned })
    }

    async fn list_classes(&self, query: &ClassQuery) -> Result<Vec<Class>, GatewayError> {
        let journal = self.enter("list_classes")?;
        Ok(journal
            .state
            .classes
            .iter()
            .filter(|class| query.status.map_or(true, |status| class.status == Some(status)))
            .filter(|class| {
                query.teacher_id.as_deref().map_or(true, |id| class.teacher_id.as_deref() == Some(id))
            })
            .cloned()
            .collect())
    }

    async fn schedule_class(&self, class: &ClassCreate) -> Result<(), GatewayError> {
        let mut journal = self.enter("schedule_class")?;
        let id = journal.next_id("class");
        let created: Class = serde_json::from_value(json!({
            "id": id,
            "title": class.title,
            "teacher_id": class.teacher_id,
            "scheduled_date": class.scheduled_date,
            "duration": class.duration,
            "status": class.status,
            "is_exam": class.is_exam,
        }))
        .expect("scheduled class");
        journal.state.classes.push(created);
        journal.scheduled.push(class.clone());
        Ok(())
    }

    async fn update_class(&self, class_id: &str, update: &ClassUpdate) -> Result<(), GatewayError> {
        let mut journal = self.enter("update_class")?;
        let class = journal
            .state
            .classes
            .iter_mut()
            .find(|class| class.id == class_id)
            .ok_or_else(|| not_found("Class"))?;
        if let Some(title) = &update.title {
            class.title = Some(title.clone());
        }
        if let Some(duration) = update.duration {
            class.duration = Some(duration);
        }
        if let Some(status) = update.status {
            class.status = Some(status);
        }
        Ok(())
    }

    async fn delete_class(&self, class_id: &str) -> Result<(), GatewayError> {
        let mut journal = self.enter("delete_class")?;
        journal.state.classes.retain(|class| class.id != class_id);
        Ok(())
    }

    async fn list_video_sessions(&self) -> Result<Vec<VideoSession>, GatewayError> {
        Ok(self.enter("list_video_sessions")?.state.sessions.clone())
    }

    async fn start_video_session(&self, start: &StartSession) -> Result<VideoSession, GatewayError> {
        let mut journal = self.enter("start_video_session")?;
        let session = started_session(&start.class_id);
        journal.started.push(start.clone());
        journal.state.sessions.push(session.clone());
        Ok(session)
    }

    async fn join_video_call(&self, meeting_id: &str) -> Result<JoinedCall, GatewayError> {
        let mut journal = self.enter("join_video_call")?;
        journal.joined.push(meeting_id.to_string());
        Ok(JoinedCall { meeting_id: Some(meeting_id.to_string()), join_url: None })
    }

    async fn remove_from_video_call(
        &self,
        meeting_id: &str,
        participant_id: &str,
    ) -> Result<(), GatewayError> {
        let mut journal = self.enter("remove_from_video_call")?;
        if let Some(session) =
            journal.state.sessions.iter_mut().find(|session| session.meeting_key() == meeting_id)
        {
            session.participants.retain(|participant| participant.id.as_deref() != Some(participant_id));
        }
        Ok(())
    }

    async fn fee_students(&self) -> Result<Vec<StudentFees>, GatewayError> {
        Ok(self.enter("fee_students")?.state.fees.clone())
    }

    async fn fee_statistics(&self) -> Result<FeeStatistics, GatewayError> {
        Ok(self.enter("fee_statistics")?.state.fee_stats.clone())
    }

    async fn confirm_payment(&self, payment_id: &str, method: &str) -> Result<(), GatewayError> {
        let mut journal = self.enter("confirm_payment")?;
        if !set_payment_status(&mut journal.state.fees, payment_id, PaymentStatus::Confirmed) {
            return Err(not_found("Payment"));
        }
        journal.payment_method = Some(method.to_string());
        Ok(())
    }

    async fn reject_payment(&self, payment_id: &str, _reason: &str) -> Result<(), GatewayError> {
        let mut journal = self.enter("reject_payment")?;
        if !set_payment_status(&mut journal.state.fees, payment_id, PaymentStatus::Rejected) {
            return Err(not_found("Payment"));
        }
        Ok(())
    }

    async fn admin_stats(&self) -> Result<AdminStats, GatewayError> {
        let journal = self.enter("admin_stats")?;
        let state = &journal.state;
        Ok(AdminStats {
            total_teachers: state.teachers.len() as u64,
            total_students: state.students.len() as u64,
            active_classes: state.classes.len() as u64,
            live_sessions: state.sessions.len() as u64,
        })
    }

    async fn admin_actions(&self, page: u32, limit: u32) -> Result<AdminActionPage, GatewayError> {
        let _journal = self.enter("admin_actions")?;
        Ok(AdminActionPage { actions: Vec::new(), total: Some(0), page: Some(page), limit: Some(limit) })
    }
}

#[async_trait]
impl TeacherApi for FakeGateway {
    async fn my_classes(&self) -> Result<Vec<Class>, GatewayError> {
        Ok(self.enter("my_classes")?.state.classes.clone())
    }

    async fn my_students(&self) -> Result<Vec<Student>, GatewayError> {
        Ok(self.enter("my_students")?.state.teacher_students.clone())
    }

    async fn assignments(&self, _query: &AssignmentQuery) -> Result<Vec<Assignment>, GatewayError> {
        Ok(self.enter("assignments")?.state.assignments.clone())
    }

    async fn create_assignment(&self, assignment: &AssignmentCreate) -> Result<(), GatewayError> {
        let mut journal = self.enter("create_assignment")?;
        let id = journal.next_id("assignment");
        let created: Assignment = serde_json::from_value(json!({
            "id": id,
            "title": assignment.title,
            "description": assignment.description,
            "max_score": assignment.max_score,
            "class_id": assignment.class_id,
        }))
        .expect("assignment");
        journal.state.assignments.push(created);
        Ok(())
    }

    async fn grade_submission(
        &self,
        submission_id: &str,
        grade: &GradeRequest,
    ) -> Result<(), GatewayError> {
        let mut journal = self.enter("grade_submission")?;
        let submission = journal
            .state
            .assignments
            .iter_mut()
            .flat_map(|assignment| assignment.submissions.iter_mut())
            .find(|submission| submission.id == submission_id)
            .ok_or_else(|| not_found("Submission"))?;
        submission.score = Some(grade.score);
        submission.feedback = Some(grade.feedback.clone());
        submission.status = Some(SubmissionStatus::Graded);
        Ok(())
    }

    async fn start_class_session(&self, class_id: &str) -> Result<VideoSession, GatewayError> {
        let mut journal = self.enter("start_class_session")?;
        let session = started_session(class_id);
        journal.state.sessions.push(session.clone());
        Ok(session)
    }
}

#[async_trait]
impl StudentApi for FakeGateway {
    async fn dashboard(&self) -> Result<StudentDashboard, GatewayError> {
        let journal = self.enter("dashboard")?;
        journal.state.dashboard.clone().ok_or_else(|| GatewayError::server(404, "Student not found"))
    }

    async fn my_assignments(&self) -> Result<Vec<Assignment>, GatewayError> {
        Ok(self.enter("my_assignments")?.state.assignments.clone())
    }

    async fn submit_assignment(
        &self,
        assignment_id: &str,
        _submission: &SubmissionCreate,
    ) -> Result<(), GatewayError> {
        let journal = self.enter("submit_assignment")?;
        if journal.state.assignments.iter().any(|assignment| assignment.id == assignment_id) {
            Ok(())
        } else {
            Err(not_found("Assignment"))
        }
    }
}

pub(crate) fn teacher_fixture(id: &str, name: &str, email: &str, subject: &str) -> Teacher {
    serde_json::from_value(json!({ "id": id, "name": name, "email": email, "subject": subject }))
        .expect("teacher fixture")
}

pub(crate) fn student_fixture(id: &str, name: &str, teacher_id: Option<&str>) -> Student {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "email": format!("{}@academy.test", name.to_lowercase()),
        "teacher_id": teacher_id,
    }))
    .expect("student fixture")
}

pub(crate) fn class_fixture(id: &str, title: &str, teacher_id: &str) -> Class {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "teacher_id": teacher_id,
        "status": "scheduled",
    }))
    .expect("class fixture")
}

/// An assignment with one submission per student; a score marks it graded.
pub(crate) fn assignment_fixture(id: &str, submissions: &[(&str, Option<f64>)]) -> Assignment {
    let submissions: Vec<Value> = submissions
        .iter()
        .map(|(student_id, score)| {
            json!({
                "id": format!("sub-{student_id}"),
                "student_id": student_id,
                "score": score,
                "status": if score.is_some() { "graded" } else { "submitted" },
            })
        })
        .collect();
    serde_json::from_value(json!({
        "id": id,
        "title": format!("Assignment {id}"),
        "max_score": 100,
        "submissions": submissions,
    }))
    .expect("assignment fixture")
}

pub(crate) fn fee_fixture(id: &str, name: &str, payments: &[(&str, f64, &str)]) -> StudentFees {
    let payments: Vec<Value> = payments
        .iter()
        .map(|(payment_id, amount, status)| json!({ "id": payment_id, "amount": amount, "status": status }))
        .collect();
    serde_json::from_value(json!({ "id": id, "name": name, "fee_payments": payments }))
        .expect("fee fixture")
}

pub(crate) fn session_fixture(id: &str, meeting_id: Option<&str>) -> VideoSession {
    serde_json::from_value(json!({
        "id": id,
        "meeting_id": meeting_id,
        "title": format!("Session {id}"),
        "status": "active",
    }))
    .expect("session fixture")
}

/// Confirmer that gives a fixed answer and remembers every prompt.
#[derive(Debug, Default)]
pub(crate) struct ScriptedConfirmer {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmer {
    pub(crate) fn answering(answer: bool) -> Self {
        Self { answer, prompts: Mutex::default() }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|prompts| prompts.clone()).unwrap_or_default()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.answer
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryClipboard {
    unavailable: bool,
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub(crate) fn unavailable() -> Self {
        Self { unavailable: true, contents: Mutex::default() }
    }

    pub(crate) fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|contents| contents.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        if self.unavailable {
            return Err(ClipboardError::Unavailable("no clipboard in this session".to_string()));
        }
        if let Ok(mut contents) = self.contents.lock() {
            *contents = Some(text.to_string());
        }
        Ok(())
    }
}

/// One canned reply of the mock backend, matched on method and path.
pub(crate) struct MockRoute {
    method: Method,
    path: String,
    status: StatusCode,
    body: String,
}

impl MockRoute {
    pub(crate) fn get(path: &str, status: StatusCode, body: Value) -> Self {
        Self::raw(Method::GET, path, status, &body.to_string())
    }

    pub(crate) fn post(path: &str, status: StatusCode, body: Value) -> Self {
        Self::raw(Method::POST, path, status, &body.to_string())
    }

    pub(crate) fn raw(method: Method, path: &str, status: StatusCode, body: &str) -> Self {
        Self { method, path: path.to_string(), status, body: body.to_string() }
    }
}

#[derive(Default)]
struct LastRequest {
    authorization: Option<String>,
    body: Option<Value>,
    path: Option<String>,
    query: Option<String>,
}

struct MockState {
    routes: Vec<MockRoute>,
    last: Mutex<LastRequest>,
}

/// A real HTTP server on a loopback port answering with [`MockRoute`]s.
pub(crate) struct MockBackend {
    pub(crate) base_url: String,
    state: Arc<MockState>,
    server: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    pub(crate) fn last_authorization(&self) -> Option<String> {
        self.last().authorization.clone()
    }

    pub(crate) fn last_body(&self) -> Option<Value> {
        self.last().body.clone()
    }

    pub(crate) fn last_path(&self) -> Option<String> {
        self.last().path.clone()
    }

    pub(crate) fn last_query(&self) -> Option<String> {
        self.last().query.clone()
    }

    fn last(&self) -> MutexGuard<'_, LastRequest> {
        self.state.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

pub(crate) async fn mock_backend(routes: Vec<MockRoute>) -> MockBackend {
    let state = Arc::new(MockState { routes, last: Mutex::default() });
    let app = Router::new().fallback(respond).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend addr");
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });

    MockBackend { base_url: format!("http://{addr}"), state, server }
}

async fn respond(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.expect("mock request body");

    {
        let mut last = state.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        last.authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        last.body = serde_json::from_slice(&bytes).ok();
        last.path = Some(parts.uri.path().to_string());
        last.query = parts.uri.query().map(str::to_string);
    }

    match state
        .routes
        .iter()
        .find(|route| route.method == parts.method && route.path == parts.uri.path())
    {
        Some(route) => (
            route.status,
            [(header::CONTENT_TYPE, "application/json")],
            Body::from(route.body.clone()),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, Body::from(r#"{"error":"No mock route"}"#)).into_response(),
    }
}
