#![doc = include_str!("../README.md")]

mod client;
mod config;
mod course;
mod error;
mod reporter;
mod runner;
mod service;
pub mod testing;

#[doc(inline)]
pub use crate::client::CourseClient;
#[doc(inline)]
pub use crate::config::{
    ClientConfig, DEFAULT_ADDRESS, DEFAULT_CALL_TIMEOUT, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_LOOKUP_COURSE_ID,
};
#[doc(inline)]
pub use crate::course::{Course, CourseId, NewCourse};
#[doc(inline)]
pub use crate::error::Error;
#[doc(inline)]
pub use crate::reporter::{Reporter, TracingReporter};
#[doc(inline)]
pub use crate::runner::run;
#[doc(inline)]
pub use crate::service::CourseService;

pub mod proto {
    //! Messages and stubs generated from `proto/course.proto`.
    tonic::include_proto!("course");
}
