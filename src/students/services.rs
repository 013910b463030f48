use tracing::{info, warn};

use super::repo_types::Student;
use crate::{db::StoreError, error::ApiError, state::AppState};

pub const INSERTED: &str = "Record inserted successfully.";
pub const UPDATED: &str = "Record updated successfully.";
pub const DELETED: &str = "Record deleted successfully.";

const MAX_ID_LEN: usize = 50;
const MAX_TEXT_LEN: usize = 100;

fn required<'a>(field: &str, value: &'a str, max: usize) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{} is required.", field)));
    }
    if value.chars().count() > max {
        return Err(ApiError::Validation(format!(
            "{} must be at most {} characters.",
            field, max
        )));
    }
    Ok(value)
}

pub async fn insert_student(
    st: &AppState,
    id: &str,
    name: &str,
    course: &str,
) -> Result<Student, ApiError> {
    let student = Student {
        id: required("Student ID", id, MAX_ID_LEN)?.to_owned(),
        name: required("Name", name, MAX_TEXT_LEN)?.to_owned(),
        course: required("Course", course, MAX_TEXT_LEN)?.to_owned(),
    };

    match st.students.insert(&student).await {
        Ok(()) => {
            info!(student_id = %student.id, "student inserted");
            Ok(student)
        }
        Err(StoreError::UniqueViolation { .. }) => {
            warn!(student_id = %student.id, "duplicate student id");
            Err(ApiError::Conflict(format!(
                "A student with ID {} already exists.",
                student.id
            )))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn select_student(st: &AppState, id: &str) -> Result<Student, ApiError> {
    let id = required("Student ID", id, MAX_ID_LEN)?;
    st.students
        .find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No student found with ID {}", id)))
}

pub async fn update_student(
    st: &AppState,
    id: &str,
    name: &str,
    course: &str,
) -> Result<(), ApiError> {
    let id = required("Student ID", id, MAX_ID_LEN)?;
    let name = required("Name", name, MAX_TEXT_LEN)?;
    let course = required("Course", course, MAX_TEXT_LEN)?;

    if st.students.update(id, name, course).await? == 0 {
        warn!(student_id = %id, "update matched no rows");
        return Err(ApiError::NotFound(format!(
            "Update failed: no student found with ID {}",
            id
        )));
    }
    info!(student_id = %id, "student updated");
    Ok(())
}

pub async fn delete_student(st: &AppState, id: &str) -> Result<(), ApiError> {
    let id = required("Student ID", id, MAX_ID_LEN)?;

    if st.students.delete(id).await? == 0 {
        warn!(student_id = %id, "delete matched no rows");
        return Err(ApiError::NotFound(format!(
            "Delete failed: no student found with ID {}",
            id
        )));
    }
    info!(student_id = %id, "student deleted");
    Ok(())
}

pub async fn list_students(st: &AppState) -> Result<Vec<Student>, ApiError> {
    Ok(st.students.list().await?)
}
