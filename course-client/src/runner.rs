use tracing::instrument;

use crate::{
    client::CourseClient, config::ClientConfig, reporter::Reporter, service::CourseService,
};

/// Issues the configured `CreateCourse` call, then the configured `GetCourse` call.
///
/// The calls run one after the other. The lookup uses
/// [`ClientConfig::lookup_course_id`], never the identifier returned by the
/// creation. Call failures are reported by the client and do not stop the run.
#[instrument(skip_all)]
pub async fn run<S, R>(client: &CourseClient<S, R>, config: &ClientConfig)
where
    S: CourseService,
    R: Reporter,
{
    client.create_course(config.course.clone()).await;
    client.get_course(&config.lookup_course_id).await;
}
