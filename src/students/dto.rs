use serde::{Deserialize, Serialize};

use super::repo_types::Student;

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub id: String,
    pub name: String,
    pub course: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStudentRequest {
    pub name: String,
    pub course: String,
}

/// Bare status string for operations with no payload.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
}

impl StatusResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StudentResponse {
    pub student: Student,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct StudentListResponse {
    pub students: Vec<Student>,
    pub text: String,
}
