//! Record routes — guarded CRUD over patients and the medicine catalog.
//!
//! Handlers translate between HTTP and the record store; the guard has
//! already attached `CurrentUser` by the time any of these run.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::guard::CurrentUser;
use crate::services::records::{
    Medicine, MedicineAssignment, MedicineForm, Note, Patient, PatientForm, RecordError,
};
use crate::state::AppState;

impl IntoResponse for RecordError {
    fn into_response(self) -> Response {
        (StatusCode::NOT_FOUND, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// =============================================================================
// PATIENTS
// =============================================================================

/// `GET /api/patients`
pub async fn list_patients(State(state): State<AppState>) -> Json<Vec<Patient>> {
    Json(state.records.list_patients().await)
}

/// `POST /api/patients`
pub async fn create_patient(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<PatientForm>,
) -> impl IntoResponse {
    let patient = state.records.create_patient(form).await;
    info!(user = %user.username, patient_id = patient.id, "patient created");
    (StatusCode::CREATED, Json(patient))
}

/// `GET /api/patients/{id}`
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, RecordError> {
    Ok(Json(state.records.get_patient(id).await?))
}

/// `PUT /api/patients/{id}`
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<PatientForm>,
) -> Result<Json<Patient>, RecordError> {
    Ok(Json(state.records.update_patient(id, form).await?))
}

/// `DELETE /api/patients/{id}`
pub async fn delete_patient(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, RecordError> {
    state.records.delete_patient(id).await?;
    info!(user = %user.username, patient_id = id, "patient deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// MEDICINES
// =============================================================================

/// `GET /api/medicines`
pub async fn list_medicines(State(state): State<AppState>) -> Json<Vec<Medicine>> {
    Json(state.records.list_medicines().await)
}

/// `POST /api/medicines`
pub async fn create_medicine(
    State(state): State<AppState>,
    Json(form): Json<MedicineForm>,
) -> impl IntoResponse {
    (StatusCode::CREATED, Json(state.records.create_medicine(form).await))
}

/// `DELETE /api/medicines/{id}`
pub async fn delete_medicine(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, RecordError> {
    state.records.delete_medicine(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// ASSIGNMENTS
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentForm {
    pub medicine_id: i64,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub timing: String,
}

/// `POST /api/patients/{id}/medicines`
pub async fn assign_medicine(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<AssignmentForm>,
) -> Result<(StatusCode, Json<MedicineAssignment>), RecordError> {
    let assignment = state
        .records
        .assign_medicine(id, form.medicine_id, form.dosage, form.timing)
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// `DELETE /api/patients/{id}/medicines/{assignment_id}`
pub async fn remove_assignment(
    State(state): State<AppState>,
    Path((id, assignment_id)): Path<(i64, i64)>,
) -> Result<StatusCode, RecordError> {
    state.records.remove_assignment(id, assignment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// NOTES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct NoteForm {
    pub content: String,
}

/// `POST /api/patients/{id}/notes`
pub async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<NoteForm>,
) -> Result<(StatusCode, Json<Note>), RecordError> {
    let note = state.records.add_note(id, form.content).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// `PATCH /api/patients/{id}/notes/{note_id}`
pub async fn update_note(
    State(state): State<AppState>,
    Path((id, note_id)): Path<(i64, i64)>,
    Json(form): Json<NoteForm>,
) -> Result<Json<Note>, RecordError> {
    Ok(Json(state.records.update_note(id, note_id, form.content).await?))
}

/// `DELETE /api/patients/{id}/notes/{note_id}`
pub async fn delete_note(
    State(state): State<AppState>,
    Path((id, note_id)): Path<(i64, i64)>,
) -> Result<StatusCode, RecordError> {
    state.records.delete_note(id, note_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// HANDWRITTEN ANNOTATION
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct HandwrittenNotesForm {
    /// The encoded annotation, or `null` to clear it. Carried opaquely.
    #[serde(default)]
    pub image: Option<String>,
}

/// `PUT /api/patients/{id}/handwritten-notes`
pub async fn set_handwritten_notes(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(form): Json<HandwrittenNotesForm>,
) -> Result<Json<Patient>, RecordError> {
    let patient = state.records.set_handwritten_notes(id, form.image).await?;
    info!(user = %user.username, patient_id = id, "handwritten notes updated");
    Ok(Json(patient))
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
