//! The remote operations consumed by the client.
//!
//! [`CourseService`] is implemented by the generated tonic client, and by
//! test doubles that stand in for the remote side.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tonic::{transport::Channel, Request};

use crate::proto::{
    course_service_client::CourseServiceClient, CreateCourseRequest, CreateCourseResponse,
    GetCourseRequest, GetCourseResponse,
};

/// A course service reachable through remote calls.
///
/// Requests are passed as [`tonic::Request`] so that call metadata, the
/// `grpc-timeout` deadline in particular, reaches the remote side.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CourseService: Send + Sync {
    /// Creates a course and returns the identifier assigned to it.
    async fn create_course(
        &self,
        request: Request<CreateCourseRequest>,
    ) -> Result<CreateCourseResponse, tonic::Status>;

    /// Retrieves a course by its identifier.
    async fn get_course(
        &self,
        request: Request<GetCourseRequest>,
    ) -> Result<GetCourseResponse, tonic::Status>;
}

#[async_trait]
impl CourseService for CourseServiceClient<Channel> {
    async fn create_course(
        &self,
        request: Request<CreateCourseRequest>,
    ) -> Result<CreateCourseResponse, tonic::Status> {
        // Clones share the underlying channel.
        let mut client = self.clone();
        CourseServiceClient::create_course(&mut client, request)
            .await
            .map(tonic::Response::into_inner)
    }

    async fn get_course(
        &self,
        request: Request<GetCourseRequest>,
    ) -> Result<GetCourseResponse, tonic::Status> {
        let mut client = self.clone();
        CourseServiceClient::get_course(&mut client, request)
            .await
            .map(tonic::Response::into_inner)
    }
}
