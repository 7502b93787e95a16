//! The course client.
//!
//! A [`CourseClient`] wraps a [`CourseService`] with a per-call deadline and
//! hands the outcome of every call to a [`Reporter`].
use std::{
    future::Future,
    time::{Duration, Instant},
};

use tonic::{
    transport::{Channel, Endpoint},
    Request,
};
use tracing::{debug, instrument};

use crate::{
    config::{ClientConfig, DEFAULT_CALL_TIMEOUT},
    course::{Course, CourseId, NewCourse},
    error::Error,
    proto::{course_service_client::CourseServiceClient, GetCourseRequest},
    reporter::{Reporter, TracingReporter},
    service::CourseService,
};

pub struct CourseClient<S, R = TracingReporter> {
    service: S,
    reporter: R,
    timeout: Duration,
}

impl CourseClient<CourseServiceClient<Channel>> {
    /// Connects to the course service at the configured address.
    ///
    /// The channel is established eagerly, over plaintext HTTP/2. It is closed
    /// when the returned client is dropped.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidAddress`] if the address does not form a valid URI.
    /// * [`Error::Connect`] if the service cannot be reached within the connect timeout.
    #[instrument(skip_all, fields(address = %config.address))]
    pub async fn connect(config: &ClientConfig) -> Result<Self, Error> {
        let uri = if config.address.contains("://") {
            config.address.clone()
        } else {
            format!("http://{}", config.address)
        };
        let endpoint = Endpoint::from_shared(uri)
            .map_err(|source| Error::InvalidAddress {
                address: config.address.clone(),
                source,
            })?
            .connect_timeout(config.connect_timeout);

        let channel = endpoint.connect().await.map_err(|source| Error::Connect {
            address: config.address.clone(),
            source,
        })?;
        debug!("connected to course service");

        Ok(Self::new(CourseServiceClient::new(channel)).with_timeout(config.call_timeout))
    }
}

impl<S> CourseClient<S>
where
    S: CourseService,
{
    /// Creates a client over an already connected service, reporting through `tracing`.
    pub fn new(service: S) -> Self {
        Self {
            service,
            reporter: TracingReporter,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl<S, R> CourseClient<S, R>
where
    S: CourseService,
    R: Reporter,
{
    /// Replaces the reporter receiving call outcomes.
    pub fn with_reporter<R2: Reporter>(self, reporter: R2) -> CourseClient<S, R2> {
        CourseClient {
            service: self.service,
            reporter,
            timeout: self.timeout,
        }
    }

    /// Sets the deadline applied to each remote call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates a course and returns the identifier assigned by the service.
    #[instrument(skip_all, fields(name = %course.name, semester = %course.semester))]
    pub async fn try_create_course(&self, course: NewCourse) -> Result<CourseId, Error> {
        let response = self
            .with_deadline(|| self.service.create_course(self.request(course.into())))
            .await?;
        Ok(response.course_id)
    }

    /// Retrieves the course identified by `course_id`.
    #[instrument(skip(self))]
    pub async fn try_get_course(&self, course_id: &str) -> Result<Course, Error> {
        let request = GetCourseRequest {
            course_id: course_id.to_string(),
        };
        let response = self
            .with_deadline(|| self.service.get_course(self.request(request)))
            .await?;
        Ok(response.into())
    }

    /// Creates a course and reports the outcome.
    ///
    /// Failures, timeouts included, are reported and swallowed: the returned
    /// value is `None` and the caller carries on.
    pub async fn create_course(&self, course: NewCourse) -> Option<CourseId> {
        match self.try_create_course(course).await {
            Ok(course_id) => {
                self.reporter.course_created(&course_id);
                Some(course_id)
            }
            Err(err) => {
                self.reporter.create_failed(&err);
                None
            }
        }
    }

    /// Retrieves a course and reports the outcome.
    ///
    /// Same contract as [`create_course`](Self::create_course).
    pub async fn get_course(&self, course_id: &str) -> Option<Course> {
        match self.try_get_course(course_id).await {
            Ok(course) => {
                self.reporter.course_retrieved(&course);
                Some(course)
            }
            Err(err) => {
                self.reporter.get_failed(&err);
                None
            }
        }
    }

    /// Wraps `message` in a request carrying the call deadline as `grpc-timeout`.
    fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        request.set_timeout(self.timeout);
        request
    }

    /// Bounds `call` locally as well, in case the remote side ignores the deadline.
    async fn with_deadline<T, F, Fut>(&self, call: F) -> Result<T, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, tonic::Status>>,
    {
        let started = Instant::now();
        match tokio::time::timeout(self.timeout, call()).await {
            // A server enforcing the deadline answers with its own status once it expires.
            Ok(Err(status))
                if started.elapsed() >= self.timeout
                    && matches!(
                        status.code(),
                        tonic::Code::DeadlineExceeded | tonic::Code::Cancelled
                    ) =>
            {
                Err(Error::Timeout(self.timeout))
            }
            Ok(result) => Ok(result?),
            Err(_) => Err(Error::Timeout(self.timeout)),
        }
    }
}
