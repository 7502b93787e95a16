//! Client configuration.
//!
//! Every option has a default, so an empty environment yields a working
//! configuration pointing at a local course service.
use std::{env, time::Duration};

use crate::{
    course::{CourseId, NewCourse},
    error::Error,
};

pub const DEFAULT_ADDRESS: &str = "localhost:50052";
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_LOOKUP_COURSE_ID: &str = "C1";

const ADDRESS_VAR: &str = "COURSE_SERVICE_ADDRESS";
const CALL_TIMEOUT_VAR: &str = "COURSE_CALL_TIMEOUT_MS";
const CONNECT_TIMEOUT_VAR: &str = "COURSE_CONNECT_TIMEOUT_MS";
const NAME_VAR: &str = "COURSE_NAME";
const DESCRIPTION_VAR: &str = "COURSE_DESCRIPTION";
const SEMESTER_VAR: &str = "COURSE_SEMESTER";
const LOOKUP_ID_VAR: &str = "COURSE_LOOKUP_ID";

/// Options recognized by the course client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host:port` of the course service.
    pub address: String,
    /// Deadline applied to every remote call.
    pub call_timeout: Duration,
    /// Upper bound for establishing the channel.
    pub connect_timeout: Duration,
    /// The course sent by `CreateCourse`.
    pub course: NewCourse,
    /// The identifier looked up by `GetCourse`.
    pub lookup_course_id: CourseId,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            course: NewCourse::default(),
            lookup_course_id: DEFAULT_LOOKUP_COURSE_ID.to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads the configuration from the process environment.
    ///
    /// A `.env` file in the working directory, when present, is read first.
    /// Unset variables keep their default value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a timeout is not a whole number of milliseconds.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            address: lookup(ADDRESS_VAR).unwrap_or(defaults.address),
            call_timeout: millis(&lookup, CALL_TIMEOUT_VAR)?.unwrap_or(defaults.call_timeout),
            connect_timeout: millis(&lookup, CONNECT_TIMEOUT_VAR)?
                .unwrap_or(defaults.connect_timeout),
            course: NewCourse {
                name: lookup(NAME_VAR).unwrap_or(defaults.course.name),
                description: lookup(DESCRIPTION_VAR).unwrap_or(defaults.course.description),
                semester: lookup(SEMESTER_VAR).unwrap_or(defaults.course.semester),
            },
            lookup_course_id: lookup(LOOKUP_ID_VAR).unwrap_or(defaults.lookup_course_id),
        })
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_course(mut self, course: NewCourse) -> Self {
        self.course = course;
        self
    }

    pub fn with_lookup_course_id(mut self, course_id: impl Into<CourseId>) -> Self {
        self.lookup_course_id = course_id.into();
        self
    }
}

fn millis<F>(lookup: &F, key: &'static str) -> Result<Option<Duration>, Error>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| Error::Config {
                    key,
                    reason: format!("{value:?} is not a number of milliseconds: {e}"),
                })
        })
        .transpose()
}
