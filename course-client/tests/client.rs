use std::{
    process::Command,
    time::{Duration, Instant},
};

use assert2::{check, let_assert};
use course_client::{
    proto::{CreateCourseRequest, GetCourseRequest},
    run,
    testing::{RecordingReporter, Report, StubCourseService},
    ClientConfig, Course, CourseClient, Error, NewCourse,
};
use tonic::Code;

fn course_c1() -> Course {
    Course {
        course_id: "C1".to_string(),
        name: "Data Structures".to_string(),
        description: "Trees and heaps".to_string(),
        semester: "Winter-2025".to_string(),
    }
}

async fn unused_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().to_string()
}

#[tokio::test]
async fn it_should_create_a_course_with_the_literal_fields() {
    let stub = StubCourseService::new().assign_course_id("C17");
    let server = stub.clone().serve().await.unwrap();
    let reporter = RecordingReporter::new();
    let config = ClientConfig::default().with_address(server.address());
    let client = CourseClient::connect(&config)
        .await
        .unwrap()
        .with_reporter(reporter.clone());

    let course_id = client.create_course(NewCourse::default()).await;

    check!(course_id == Some("C17".to_string()));
    check!(
        stub.create_requests()
            == vec![CreateCourseRequest {
                name: "Algorithms-1".to_string(),
                description: "Learn about algorithms".to_string(),
                semester: "Spring-2025".to_string(),
            }]
    );
    check!(reporter.reports() == vec![Report::CourseCreated("C17".to_string())]);
}

#[tokio::test]
async fn it_should_get_the_course_with_the_lookup_id() {
    let stub = StubCourseService::new().with_course(course_c1());
    let server = stub.clone().serve().await.unwrap();
    let reporter = RecordingReporter::new();
    let config = ClientConfig::default().with_address(server.address());
    let client = CourseClient::connect(&config)
        .await
        .unwrap()
        .with_reporter(reporter.clone());

    let course = client.get_course(&config.lookup_course_id).await;

    check!(course == Some(course_c1()));
    check!(
        stub.get_requests()
            == vec![GetCourseRequest {
                course_id: "C1".to_string()
            }]
    );
    let reports = reporter.reports();
    let_assert!([Report::CourseRetrieved(reported)] = reports.as_slice());
    check!(reported.name == "Data Structures");
    check!(reported.semester == "Winter-2025");
}

#[tokio::test]
async fn it_should_give_up_on_a_slow_service_after_the_deadline() {
    let stub = StubCourseService::new().delay_responses(Duration::from_secs(5));
    let server = stub.clone().serve().await.unwrap();
    let reporter = RecordingReporter::new();
    let config = ClientConfig::default().with_address(server.address());
    let client = CourseClient::connect(&config)
        .await
        .unwrap()
        .with_reporter(reporter.clone());

    let started = Instant::now();
    let course_id = client.create_course(NewCourse::default()).await;
    let elapsed = started.elapsed();

    check!(course_id == None);
    check!(elapsed >= Duration::from_secs(1));
    check!(elapsed < Duration::from_secs(3));
    let reports = reporter.reports();
    let_assert!([Report::CreateFailed(failure)] = reports.as_slice());
    check!(failure.timeout);
    check!(failure.code == Code::DeadlineExceeded);
    check!(stub.create_requests().len() == 1);
}

#[tokio::test]
async fn it_should_time_out_both_calls_of_a_run_and_carry_on() {
    let stub = StubCourseService::new()
        .with_course(course_c1())
        .delay_responses(Duration::from_secs(5));
    let server = stub.clone().serve().await.unwrap();
    let reporter = RecordingReporter::new();
    let config = ClientConfig::default().with_address(server.address());
    let client = CourseClient::connect(&config)
        .await
        .unwrap()
        .with_reporter(reporter.clone());

    let started = Instant::now();
    run(&client, &config).await;
    let elapsed = started.elapsed();

    check!(elapsed >= Duration::from_secs(2));
    check!(elapsed < Duration::from_secs(4));
    let reports = reporter.reports();
    let_assert!([Report::CreateFailed(create), Report::GetFailed(get)] = reports.as_slice());
    check!(create.timeout);
    check!(get.timeout);
    check!(get.code == Code::DeadlineExceeded);
    check!(
        stub.get_requests()
            == vec![GetCourseRequest {
                course_id: "C1".to_string()
            }]
    );
}

#[tokio::test]
async fn it_should_return_nothing_when_get_course_times_out() {
    let stub = StubCourseService::new()
        .with_course(course_c1())
        .delay_responses(Duration::from_secs(5));
    let server = stub.clone().serve().await.unwrap();
    let reporter = RecordingReporter::new();
    let config = ClientConfig::default()
        .with_address(server.address())
        .with_call_timeout(Duration::from_millis(200));
    let client = CourseClient::connect(&config)
        .await
        .unwrap()
        .with_reporter(reporter.clone());

    let started = Instant::now();
    let course = client.get_course("C1").await;

    check!(course == None);
    check!(started.elapsed() < Duration::from_secs(2));
    let reports = reporter.reports();
    let_assert!([Report::GetFailed(failure)] = reports.as_slice());
    check!(failure.timeout);
}

#[tokio::test]
async fn it_should_send_the_call_deadline_to_the_service() {
    let stub = StubCourseService::new().with_course(course_c1());
    let server = stub.clone().serve().await.unwrap();
    let config = ClientConfig::default().with_address(server.address());
    let client = CourseClient::connect(&config).await.unwrap();

    run(&client, &config).await;

    let deadlines = stub.received_deadlines();
    check!(deadlines.len() == 2);
    check!(deadlines.iter().all(Option::is_some));
}

#[tokio::test]
async fn it_should_report_remote_errors_and_carry_on() {
    let stub = StubCourseService::new()
        .fail_create(Code::Internal, "database unavailable")
        .fail_get(Code::NotFound, "course not found");
    let server = stub.clone().serve().await.unwrap();
    let reporter = RecordingReporter::new();
    let config = ClientConfig::default().with_address(server.address());
    let client = CourseClient::connect(&config)
        .await
        .unwrap()
        .with_reporter(reporter.clone());

    run(&client, &config).await;

    let reports = reporter.reports();
    let_assert!([Report::CreateFailed(create), Report::GetFailed(get)] = reports.as_slice());
    check!(create.code == Code::Internal);
    check!(create.message.contains("database unavailable"));
    check!(!create.timeout);
    check!(get.code == Code::NotFound);
    check!(stub.create_requests().len() == 1);
    check!(stub.get_requests().len() == 1);
}

#[tokio::test]
async fn it_should_not_feed_the_created_id_into_the_lookup() {
    let stub = StubCourseService::new()
        .assign_course_id("C-NEW")
        .with_course(course_c1());
    let server = stub.clone().serve().await.unwrap();
    let reporter = RecordingReporter::new();
    let config = ClientConfig::default().with_address(server.address());
    let client = CourseClient::connect(&config)
        .await
        .unwrap()
        .with_reporter(reporter.clone());

    run(&client, &config).await;

    check!(
        stub.get_requests()
            == vec![GetCourseRequest {
                course_id: "C1".to_string()
            }]
    );
    check!(
        reporter.reports()
            == vec![
                Report::CourseCreated("C-NEW".to_string()),
                Report::CourseRetrieved(course_c1()),
            ]
    );
}

#[tokio::test]
async fn it_should_fail_to_connect_to_an_unreachable_address() {
    let config = ClientConfig::default()
        .with_address(unused_address().await)
        .with_connect_timeout(Duration::from_millis(500));

    let_assert!(Err(err) = CourseClient::connect(&config).await);
    let_assert!(Error::Connect { address, .. } = &err);
    check!(address == &config.address);
    check!(err.code() == Code::Unavailable);
}

#[tokio::test]
async fn it_should_reject_an_address_that_is_not_a_uri() {
    let config = ClientConfig::default().with_address("not an address");

    let_assert!(Err(Error::InvalidAddress { .. }) = CourseClient::connect(&config).await);
}

#[tokio::test(flavor = "multi_thread")]
async fn it_should_exit_with_failure_when_the_service_is_unreachable() {
    let address = unused_address().await;

    let output = tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_course-client"))
            .env("COURSE_SERVICE_ADDRESS", address)
            .env("COURSE_CONNECT_TIMEOUT_MS", "500")
            .output()
    })
    .await
    .unwrap()
    .unwrap();

    check!(!output.status.success());
    let printed = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    check!(printed.matches("failed to connect to course service").count() == 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn it_should_exit_successfully_even_when_calls_fail() {
    let stub = StubCourseService::new()
        .fail_create(Code::Internal, "boom")
        .fail_get(Code::NotFound, "course not found");
    let server = stub.clone().serve().await.unwrap();
    let address = server.address();

    let status = tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_course-client"))
            .env("COURSE_SERVICE_ADDRESS", address)
            .status()
    })
    .await
    .unwrap()
    .unwrap();

    check!(status.success());
    check!(stub.create_requests().len() == 1);
    check!(
        stub.get_requests()
            == vec![GetCourseRequest {
                course_id: "C1".to_string()
            }]
    );
}
