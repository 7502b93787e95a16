//! Reporting of remote call outcomes.
use tracing::{error, info};

#[cfg(test)]
use mockall::automock;

use crate::{
    course::{Course, CourseId},
    error::Error,
};

/// Receives the outcome of every call issued by a [`CourseClient`](crate::CourseClient).
///
/// The client never propagates call failures; a reporter is the only place
/// where they become observable.
#[cfg_attr(test, automock)]
pub trait Reporter: Send + Sync {
    fn course_created(&self, course_id: &CourseId);
    fn create_failed(&self, error: &Error);
    fn course_retrieved(&self, course: &Course);
    fn get_failed(&self, error: &Error);
}

/// Reports outcomes as structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn course_created(&self, course_id: &CourseId) {
        info!(course_id = %course_id, "created course");
    }

    fn create_failed(&self, error: &Error) {
        error!(error = %error, code = ?error.code(), "failed to create course");
    }

    fn course_retrieved(&self, course: &Course) {
        info!(
            course_id = %course.course_id,
            name = %course.name,
            semester = %course.semester,
            "retrieved course"
        );
    }

    fn get_failed(&self, error: &Error) {
        error!(error = %error, code = ?error.code(), "failed to get course");
    }
}
