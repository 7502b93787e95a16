use crate::proto;

pub type CourseId = String;

/// The fields of a course to be created.
///
/// The identifier is assigned by the course service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub name: String,
    pub description: String,
    pub semester: String,
}

impl NewCourse {
    pub fn new(name: &str, description: &str, semester: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            semester: semester.into(),
        }
    }
}

impl Default for NewCourse {
    fn default() -> Self {
        Self::new("Algorithms-1", "Learn about algorithms", "Spring-2025")
    }
}

impl From<NewCourse> for proto::CreateCourseRequest {
    fn from(course: NewCourse) -> Self {
        proto::CreateCourseRequest {
            name: course.name,
            description: course.description,
            semester: course.semester,
        }
    }
}

/// A course as returned by the course service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Course {
    pub course_id: CourseId,
    pub name: String,
    pub description: String,
    pub semester: String,
}

impl From<proto::GetCourseResponse> for Course {
    fn from(response: proto::GetCourseResponse) -> Self {
        Course {
            course_id: response.course_id,
            name: response.name,
            description: response.description,
            semester: response.semester,
        }
    }
}

impl From<Course> for proto::GetCourseResponse {
    fn from(course: Course) -> Self {
        proto::GetCourseResponse {
            course_id: course.course_id,
            name: course.name,
            description: course.description,
            semester: course.semester,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn it_should_default_to_the_algorithms_course() {
        let request = proto::CreateCourseRequest::from(NewCourse::default());

        check!(request.name == "Algorithms-1");
        check!(request.description == "Learn about algorithms");
        check!(request.semester == "Spring-2025");
    }
}
