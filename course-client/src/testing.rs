//! Test doubles for code built on the course client.
//!
//! [`StubCourseService`] is an in-process course service served over a real
//! local socket. It records every request it receives and can be told to
//! fail or to answer late. [`RecordingReporter`] keeps the outcomes reported
//! by a [`CourseClient`](crate::CourseClient) in memory.
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tonic::{Code, Request, Response, Status};
use tracing::debug;

use crate::{
    course::{Course, CourseId},
    error::Error,
    proto::{
        self,
        course_service_server::{self, CourseServiceServer},
        CreateCourseRequest, CreateCourseResponse, GetCourseRequest, GetCourseResponse,
    },
    reporter::Reporter,
};

/// An in-memory course service.
///
/// Created courses get the identifiers `C1`, `C2`, ... unless a fixed
/// identifier is set with [`assign_course_id`](Self::assign_course_id).
/// Clones share the same state, so a test can keep a handle for inspection
/// after [`serve`](Self::serve) has taken the service.
#[derive(Clone, Default)]
pub struct StubCourseService {
    state: Arc<Mutex<StubState>>,
}

#[derive(Default)]
struct StubState {
    courses: HashMap<CourseId, Course>,
    next_id: u64,
    fixed_id: Option<CourseId>,
    create_failure: Option<(Code, String)>,
    get_failure: Option<(Code, String)>,
    delay: Option<Duration>,
    create_requests: Vec<CreateCourseRequest>,
    get_requests: Vec<GetCourseRequest>,
    deadlines: Vec<Option<String>>,
}

impl StubCourseService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a course that `GetCourse` can return.
    pub fn with_course(self, course: Course) -> Self {
        self.state().courses.insert(course.course_id.clone(), course);
        self
    }

    /// Makes every `CreateCourse` call return `course_id`.
    pub fn assign_course_id(self, course_id: impl Into<CourseId>) -> Self {
        self.state().fixed_id = Some(course_id.into());
        self
    }

    /// Makes every `CreateCourse` call fail with the given status.
    pub fn fail_create(self, code: Code, message: &str) -> Self {
        self.state().create_failure = Some((code, message.to_string()));
        self
    }

    /// Makes every `GetCourse` call fail with the given status.
    pub fn fail_get(self, code: Code, message: &str) -> Self {
        self.state().get_failure = Some((code, message.to_string()));
        self
    }

    /// Holds every response back for `delay`.
    pub fn delay_responses(self, delay: Duration) -> Self {
        self.state().delay = Some(delay);
        self
    }

    pub fn create_requests(&self) -> Vec<CreateCourseRequest> {
        self.state().create_requests.clone()
    }

    pub fn get_requests(&self) -> Vec<GetCourseRequest> {
        self.state().get_requests.clone()
    }

    /// The `grpc-timeout` header of every call received, in arrival order.
    pub fn received_deadlines(&self) -> Vec<Option<String>> {
        self.state().deadlines.clone()
    }

    /// Serves the stub on an ephemeral port of the loopback interface.
    ///
    /// The server stops when the returned [`StubServer`] is dropped.
    pub async fn serve(self) -> std::io::Result<StubServer> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let incoming = async_stream::stream! {
            loop {
                yield listener.accept().await.map(|(stream, _)| stream);
            }
        };
        let (shutdown, signal) = oneshot::channel::<()>();

        let handle = tokio::spawn(
            tonic::transport::Server::builder()
                .add_service(CourseServiceServer::new(self))
                .serve_with_incoming_shutdown(incoming, async move {
                    signal.await.ok();
                }),
        );
        debug!(%address, "stub course service listening");

        Ok(StubServer {
            address,
            shutdown: Some(shutdown),
            handle,
        })
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        // A poisoned lock only means another test thread panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_deadline<T>(&self, request: &Request<T>) {
        let deadline = request
            .metadata()
            .get("grpc-timeout")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.state().deadlines.push(deadline);
    }

    async fn hold_back(&self) {
        let delay = self.state().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[tonic::async_trait]
impl course_service_server::CourseService for StubCourseService {
    async fn create_course(
        &self,
        request: Request<CreateCourseRequest>,
    ) -> Result<Response<CreateCourseResponse>, Status> {
        self.record_deadline(&request);
        let request = request.into_inner();
        let outcome = {
            let mut state = self.state();
            state.create_requests.push(request.clone());
            match state.create_failure.clone() {
                Some((code, message)) => Err(Status::new(code, message)),
                None => {
                    let course_id = match state.fixed_id.clone() {
                        Some(course_id) => course_id,
                        None => {
                            state.next_id += 1;
                            format!("C{}", state.next_id)
                        }
                    };
                    state.courses.insert(
                        course_id.clone(),
                        Course {
                            course_id: course_id.clone(),
                            name: request.name,
                            description: request.description,
                            semester: request.semester,
                        },
                    );
                    Ok(course_id)
                }
            }
        };
        self.hold_back().await;

        outcome.map(|course_id| Response::new(CreateCourseResponse { course_id }))
    }

    async fn get_course(
        &self,
        request: Request<GetCourseRequest>,
    ) -> Result<Response<GetCourseResponse>, Status> {
        self.record_deadline(&request);
        let request = request.into_inner();
        let outcome = {
            let mut state = self.state();
            state.get_requests.push(request.clone());
            match state.get_failure.clone() {
                Some((code, message)) => Err(Status::new(code, message)),
                None => state
                    .courses
                    .get(&request.course_id)
                    .cloned()
                    .ok_or(Status::not_found("course not found")),
            }
        };
        self.hold_back().await;

        outcome.map(|course| Response::new(proto::GetCourseResponse::from(course)))
    }
}

/// A running [`StubCourseService`].
pub struct StubServer {
    address: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), tonic::transport::Error>>,
}

impl StubServer {
    /// The `host:port` the stub listens on.
    pub fn address(&self) -> String {
        self.address.to_string()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
        self.handle.abort();
    }
}

/// An outcome seen by a [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    CourseCreated(CourseId),
    CreateFailed(Failure),
    CourseRetrieved(Course),
    GetFailed(Failure),
}

/// A reported call failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub code: Code,
    pub timeout: bool,
    pub message: String,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        Failure {
            code: err.code(),
            timeout: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

/// Keeps every reported outcome, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, report: Report) {
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(report);
    }
}

impl Reporter for RecordingReporter {
    fn course_created(&self, course_id: &CourseId) {
        self.record(Report::CourseCreated(course_id.clone()));
    }

    fn create_failed(&self, error: &Error) {
        self.record(Report::CreateFailed(error.into()));
    }

    fn course_retrieved(&self, course: &Course) {
        self.record(Report::CourseRetrieved(course.clone()));
    }

    fn get_failed(&self, error: &Error) {
        self.record(Report::GetFailed(error.into()));
    }
}
