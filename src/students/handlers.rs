use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{
        CreateStudentRequest, StatusResponse, StudentListResponse, StudentResponse,
        UpdateStudentRequest,
    },
    repo_types::listing_text,
    services::{self, DELETED, INSERTED, UPDATED},
};
use crate::{error::ApiError, extract::ApiJson, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students))
        .route("/students/:id", get(get_student))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/students", post(create_student))
        .route("/students/:id", put(update_student).delete(delete_student))
}

#[instrument(skip(state, payload), fields(student_id = %payload.id))]
pub async fn create_student(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateStudentRequest>,
) -> Result<(StatusCode, HeaderMap, Json<StatusResponse>), ApiError> {
    let student =
        services::insert_student(&state, &payload.id, &payload.name, &payload.course).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/students/{}", student.id)) {
        headers.insert(header::LOCATION, location);
    }

    Ok((StatusCode::CREATED, headers, Json(StatusResponse::new(INSERTED))))
}

#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudentResponse>, ApiError> {
    let student = services::select_student(&state, &id).await?;
    let text = student.record_text();
    Ok(Json(StudentResponse { student, text }))
}

#[instrument(skip(state, payload))]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateStudentRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    services::update_student(&state, &id, &payload.name, &payload.course).await?;
    Ok(Json(StatusResponse::new(UPDATED)))
}

#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    services::delete_student(&state, &id).await?;
    Ok(Json(StatusResponse::new(DELETED)))
}

#[instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<StudentListResponse>, ApiError> {
    let students = services::list_students(&state).await?;
    let text = listing_text(&students);
    Ok(Json(StudentListResponse { students, text }))
}
