//! Patient and medicine records: the plain-data collaborator behind the
//! guarded CRUD routes.
//!
//! DESIGN
//! ======
//! Records are kept in one `RwLock`-guarded table shared across handlers.
//! A patient carries both note variants: a list of timestamped free-text
//! notes and a single handwritten annotation. The annotation is an opaque
//! encoded string produced by the drawing surface — this store attaches
//! and returns it but never interprets its contents.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::RwLock;

/// A catalog medicine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    pub default_dosage: String,
}

/// A medicine assigned to a patient, denormalized with the medicine name
/// so the record stays readable after catalog edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineAssignment {
    pub id: i64,
    pub medicine_id: i64,
    pub medicine_name: String,
    pub dosage: String,
    pub timing: String,
    pub assigned_date: String,
}

/// A timestamped free-text note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A patient record as stored and served.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub age: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub assigned_medicines: Vec<MedicineAssignment>,
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Opaque encoded annotation from the drawing surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handwritten_notes: Option<String>,
    pub created_at: String,
}

/// Fields accepted when creating or updating a patient.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientForm {
    pub name: String,
    pub age: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
}

/// Fields accepted when adding a catalog medicine.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineForm {
    pub name: String,
    pub default_dosage: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("patient not found")]
    PatientNotFound,
    #[error("medicine not found")]
    MedicineNotFound,
    #[error("note not found")]
    NoteNotFound,
    #[error("assignment not found")]
    AssignmentNotFound,
}

struct RecordsInner {
    patients: HashMap<i64, Patient>,
    medicines: HashMap<i64, Medicine>,
    next_id: i64,
}

impl RecordsInner {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Shared record table. Clone is cheap; clones share the same data.
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<RwLock<RecordsInner>>,
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

impl RecordStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RecordsInner {
                patients: HashMap::new(),
                medicines: HashMap::new(),
                next_id: 1,
            })),
        }
    }

    /// A store seeded with the stock medicine catalog.
    #[must_use]
    pub fn with_default_medicines() -> Self {
        let mut inner = RecordsInner { patients: HashMap::new(), medicines: HashMap::new(), next_id: 1 };
        for (name, dosage) in [
            ("Paracetamol", "500mg"),
            ("Aspirin", "75mg"),
            ("Ibuprofen", "400mg"),
            ("Amoxicillin", "250mg"),
            ("Metformin", "500mg"),
            ("Lisinopril", "10mg"),
            ("Atorvastatin", "20mg"),
            ("Omeprazole", "20mg"),
        ] {
            let id = inner.allocate_id();
            inner
                .medicines
                .insert(id, Medicine { id, name: name.into(), default_dosage: dosage.into() });
        }
        Self { inner: Arc::new(RwLock::new(inner)) }
    }

    // --- Patients ---

    pub async fn list_patients(&self) -> Vec<Patient> {
        let inner = self.inner.read().await;
        let mut patients: Vec<Patient> = inner.patients.values().cloned().collect();
        patients.sort_by_key(|p| p.id);
        patients
    }

    pub async fn create_patient(&self, form: PatientForm) -> Patient {
        let mut inner = self.inner.write().await;
        let id = inner.allocate_id();
        let patient = Patient {
            id,
            name: form.name,
            age: form.age,
            phone: form.phone,
            address: form.address,
            medical_history: form.medical_history,
            assigned_medicines: Vec::new(),
            notes: Vec::new(),
            handwritten_notes: None,
            created_at: now_rfc3339(),
        };
        inner.patients.insert(id, patient.clone());
        patient
    }

    /// # Errors
    ///
    /// `PatientNotFound` for an unknown id.
    pub async fn get_patient(&self, id: i64) -> Result<Patient, RecordError> {
        let inner = self.inner.read().await;
        inner.patients.get(&id).cloned().ok_or(RecordError::PatientNotFound)
    }

    /// Replace a patient's base fields; assignments, notes, and the
    /// handwritten annotation are untouched.
    ///
    /// # Errors
    ///
    /// `PatientNotFound` for an unknown id.
    pub async fn update_patient(&self, id: i64, form: PatientForm) -> Result<Patient, RecordError> {
        let mut inner = self.inner.write().await;
        let patient = inner.patients.get_mut(&id).ok_or(RecordError::PatientNotFound)?;
        patient.name = form.name;
        patient.age = form.age;
        patient.phone = form.phone;
        patient.address = form.address;
        patient.medical_history = form.medical_history;
        Ok(patient.clone())
    }

    /// # Errors
    ///
    /// `PatientNotFound` for an unknown id.
    pub async fn delete_patient(&self, id: i64) -> Result<(), RecordError> {
        let mut inner = self.inner.write().await;
        inner.patients.remove(&id).map(|_| ()).ok_or(RecordError::PatientNotFound)
    }

    // --- Medicines ---

    pub async fn list_medicines(&self) -> Vec<Medicine> {
        let inner = self.inner.read().await;
        let mut medicines: Vec<Medicine> = inner.medicines.values().cloned().collect();
        medicines.sort_by_key(|m| m.id);
        medicines
    }

    pub async fn create_medicine(&self, form: MedicineForm) -> Medicine {
        let mut inner = self.inner.write().await;
        let id = inner.allocate_id();
        let medicine = Medicine { id, name: form.name, default_dosage: form.default_dosage };
        inner.medicines.insert(id, medicine.clone());
        medicine
    }

    /// # Errors
    ///
    /// `MedicineNotFound` for an unknown id.
    pub async fn delete_medicine(&self, id: i64) -> Result<(), RecordError> {
        let mut inner = self.inner.write().await;
        inner.medicines.remove(&id).map(|_| ()).ok_or(RecordError::MedicineNotFound)
    }

    // --- Assignments ---

    /// Assign a catalog medicine to a patient. An empty dosage falls back
    /// to the medicine's default.
    ///
    /// # Errors
    ///
    /// `PatientNotFound` / `MedicineNotFound` for unknown ids.
    pub async fn assign_medicine(
        &self,
        patient_id: i64,
        medicine_id: i64,
        dosage: String,
        timing: String,
    ) -> Result<MedicineAssignment, RecordError> {
        let mut inner = self.inner.write().await;
        let medicine = inner
            .medicines
            .get(&medicine_id)
            .cloned()
            .ok_or(RecordError::MedicineNotFound)?;
        if !inner.patients.contains_key(&patient_id) {
            return Err(RecordError::PatientNotFound);
        }
        let id = inner.allocate_id();
        let assignment = MedicineAssignment {
            id,
            medicine_id,
            medicine_name: medicine.name,
            dosage: if dosage.is_empty() { medicine.default_dosage } else { dosage },
            timing,
            assigned_date: now_rfc3339(),
        };
        let patient = inner
            .patients
            .get_mut(&patient_id)
            .ok_or(RecordError::PatientNotFound)?;
        patient.assigned_medicines.push(assignment.clone());
        Ok(assignment)
    }

    /// # Errors
    ///
    /// `PatientNotFound` / `AssignmentNotFound` for unknown ids.
    pub async fn remove_assignment(&self, patient_id: i64, assignment_id: i64) -> Result<(), RecordError> {
        let mut inner = self.inner.write().await;
        let patient = inner
            .patients
            .get_mut(&patient_id)
            .ok_or(RecordError::PatientNotFound)?;
        let before = patient.assigned_medicines.len();
        patient.assigned_medicines.retain(|a| a.id != assignment_id);
        if patient.assigned_medicines.len() == before {
            return Err(RecordError::AssignmentNotFound);
        }
        Ok(())
    }

    // --- Free-text notes ---

    /// # Errors
    ///
    /// `PatientNotFound` for an unknown id.
    pub async fn add_note(&self, patient_id: i64, content: String) -> Result<Note, RecordError> {
        let mut inner = self.inner.write().await;
        if !inner.patients.contains_key(&patient_id) {
            return Err(RecordError::PatientNotFound);
        }
        let id = inner.allocate_id();
        let stamp = now_rfc3339();
        let note = Note { id, content, created_at: stamp.clone(), updated_at: stamp };
        let patient = inner
            .patients
            .get_mut(&patient_id)
            .ok_or(RecordError::PatientNotFound)?;
        patient.notes.push(note.clone());
        Ok(note)
    }

    /// # Errors
    ///
    /// `PatientNotFound` / `NoteNotFound` for unknown ids.
    pub async fn update_note(&self, patient_id: i64, note_id: i64, content: String) -> Result<Note, RecordError> {
        let mut inner = self.inner.write().await;
        let patient = inner
            .patients
            .get_mut(&patient_id)
            .ok_or(RecordError::PatientNotFound)?;
        let note = patient
            .notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or(RecordError::NoteNotFound)?;
        note.content = content;
        note.updated_at = now_rfc3339();
        Ok(note.clone())
    }

    /// # Errors
    ///
    /// `PatientNotFound` / `NoteNotFound` for unknown ids.
    pub async fn delete_note(&self, patient_id: i64, note_id: i64) -> Result<(), RecordError> {
        let mut inner = self.inner.write().await;
        let patient = inner
            .patients
            .get_mut(&patient_id)
            .ok_or(RecordError::PatientNotFound)?;
        let before = patient.notes.len();
        patient.notes.retain(|n| n.id != note_id);
        if patient.notes.len() == before {
            return Err(RecordError::NoteNotFound);
        }
        Ok(())
    }

    // --- Handwritten annotation ---

    /// Attach or clear the handwritten annotation. The payload supersedes
    /// whatever was stored; it is carried opaquely and never inspected.
    ///
    /// # Errors
    ///
    /// `PatientNotFound` for an unknown id.
    pub async fn set_handwritten_notes(
        &self,
        patient_id: i64,
        encoded: Option<String>,
    ) -> Result<Patient, RecordError> {
        let mut inner = self.inner.write().await;
        let patient = inner
            .patients
            .get_mut(&patient_id)
            .ok_or(RecordError::PatientNotFound)?;
        patient.handwritten_notes = encoded;
        Ok(patient.clone())
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
