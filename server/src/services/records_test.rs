use super::*;

fn patient_form(name: &str) -> PatientForm {
    PatientForm {
        name: name.into(),
        age: "42".into(),
        phone: Some("555-0100".into()),
        address: None,
        medical_history: None,
    }
}

// =============================================================================
// Medicine catalog
// =============================================================================

#[tokio::test]
async fn default_catalog_has_eight_medicines() {
    let store = RecordStore::with_default_medicines();
    let medicines = store.list_medicines().await;
    assert_eq!(medicines.len(), 8);
    assert_eq!(medicines[0].name, "Paracetamol");
    assert_eq!(medicines[0].default_dosage, "500mg");
}

#[tokio::test]
async fn create_medicine_allocates_a_fresh_id() {
    let store = RecordStore::with_default_medicines();
    let medicine = store
        .create_medicine(MedicineForm { name: "Cetirizine".into(), default_dosage: "10mg".into() })
        .await;
    assert!(medicine.id > 8);
    assert_eq!(store.list_medicines().await.len(), 9);
}

#[tokio::test]
async fn delete_medicine_removes_it_from_the_catalog() {
    let store = RecordStore::with_default_medicines();
    store.delete_medicine(1).await.unwrap();
    assert_eq!(store.list_medicines().await.len(), 7);
    assert_eq!(store.delete_medicine(1).await.unwrap_err(), RecordError::MedicineNotFound);
}

// =============================================================================
// Patients
// =============================================================================

#[tokio::test]
async fn create_and_get_patient() {
    let store = RecordStore::new();
    let created = store.create_patient(patient_form("Ada")).await;
    let fetched = store.get_patient(created.id).await.unwrap();
    assert_eq!(fetched.name, "Ada");
    assert_eq!(fetched.age, "42");
    assert!(fetched.assigned_medicines.is_empty());
    assert!(fetched.notes.is_empty());
    assert!(fetched.handwritten_notes.is_none());
    assert!(!fetched.created_at.is_empty());
}

#[tokio::test]
async fn list_patients_is_sorted_by_id() {
    let store = RecordStore::new();
    let a = store.create_patient(patient_form("Ada")).await;
    let b = store.create_patient(patient_form("Grace")).await;
    let listed = store.list_patients().await;
    assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![a.id, b.id]);
}

#[tokio::test]
async fn get_unknown_patient_fails() {
    let store = RecordStore::new();
    assert_eq!(store.get_patient(99).await.unwrap_err(), RecordError::PatientNotFound);
}

#[tokio::test]
async fn update_patient_keeps_attachments() {
    let store = RecordStore::with_default_medicines();
    let patient = store.create_patient(patient_form("Ada")).await;
    store.assign_medicine(patient.id, 1, String::new(), "morning".into()).await.unwrap();
    store.add_note(patient.id, "stable".into()).await.unwrap();
    store
        .set_handwritten_notes(patient.id, Some("data:image/png;base64,AAAA".into()))
        .await
        .unwrap();

    let updated = store
        .update_patient(patient.id, PatientForm {
            name: "Ada L.".into(),
            age: "43".into(),
            phone: None,
            address: None,
            medical_history: Some("allergy: penicillin".into()),
        })
        .await
        .unwrap();

    assert_eq!(updated.name, "Ada L.");
    assert_eq!(updated.assigned_medicines.len(), 1);
    assert_eq!(updated.notes.len(), 1);
    assert!(updated.handwritten_notes.is_some());
}

#[tokio::test]
async fn delete_patient_removes_the_record() {
    let store = RecordStore::new();
    let patient = store.create_patient(patient_form("Ada")).await;
    store.delete_patient(patient.id).await.unwrap();
    assert_eq!(store.delete_patient(patient.id).await.unwrap_err(), RecordError::PatientNotFound);
}

// =============================================================================
// Assignments
// =============================================================================

#[tokio::test]
async fn assign_medicine_denormalizes_the_name() {
    let store = RecordStore::with_default_medicines();
    let patient = store.create_patient(patient_form("Ada")).await;
    let assignment = store
        .assign_medicine(patient.id, 3, "200mg".into(), "evening".into())
        .await
        .unwrap();
    assert_eq!(assignment.medicine_name, "Ibuprofen");
    assert_eq!(assignment.dosage, "200mg");
    assert_eq!(assignment.timing, "evening");

    let fetched = store.get_patient(patient.id).await.unwrap();
    assert_eq!(fetched.assigned_medicines.len(), 1);
}

#[tokio::test]
async fn empty_dosage_falls_back_to_the_default() {
    let store = RecordStore::with_default_medicines();
    let patient = store.create_patient(patient_form("Ada")).await;
    let assignment = store
        .assign_medicine(patient.id, 1, String::new(), "morning".into())
        .await
        .unwrap();
    assert_eq!(assignment.dosage, "500mg");
}

#[tokio::test]
async fn assign_rejects_unknown_ids() {
    let store = RecordStore::with_default_medicines();
    let patient = store.create_patient(patient_form("Ada")).await;
    assert_eq!(
        store.assign_medicine(patient.id, 999, String::new(), String::new()).await.unwrap_err(),
        RecordError::MedicineNotFound
    );
    assert_eq!(
        store.assign_medicine(999, 1, String::new(), String::new()).await.unwrap_err(),
        RecordError::PatientNotFound
    );
}

#[tokio::test]
async fn remove_assignment_round_trip() {
    let store = RecordStore::with_default_medicines();
    let patient = store.create_patient(patient_form("Ada")).await;
    let assignment = store
        .assign_medicine(patient.id, 1, String::new(), String::new())
        .await
        .unwrap();
    store.remove_assignment(patient.id, assignment.id).await.unwrap();
    assert_eq!(
        store.remove_assignment(patient.id, assignment.id).await.unwrap_err(),
        RecordError::AssignmentNotFound
    );
}

// =============================================================================
// Free-text notes
// =============================================================================

#[tokio::test]
async fn note_lifecycle() {
    let store = RecordStore::new();
    let patient = store.create_patient(patient_form("Ada")).await;

    let note = store.add_note(patient.id, "first visit".into()).await.unwrap();
    assert_eq!(note.content, "first visit");
    assert!(!note.created_at.is_empty());

    let updated = store.update_note(patient.id, note.id, "follow-up booked".into()).await.unwrap();
    assert_eq!(updated.id, note.id);
    assert_eq!(updated.content, "follow-up booked");

    store.delete_note(patient.id, note.id).await.unwrap();
    assert_eq!(
        store.delete_note(patient.id, note.id).await.unwrap_err(),
        RecordError::NoteNotFound
    );
}

#[tokio::test]
async fn note_operations_reject_unknown_patient() {
    let store = RecordStore::new();
    assert_eq!(store.add_note(1, "x".into()).await.unwrap_err(), RecordError::PatientNotFound);
    assert_eq!(
        store.update_note(1, 1, "x".into()).await.unwrap_err(),
        RecordError::PatientNotFound
    );
}

// =============================================================================
// Handwritten annotation
// =============================================================================

#[tokio::test]
async fn handwritten_notes_are_stored_verbatim_and_cleared() {
    let store = RecordStore::new();
    let patient = store.create_patient(patient_form("Ada")).await;

    // The store never inspects the payload; any string passes through.
    let payload = "data:image/png;base64,iVBORw0KGgo=";
    let updated = store
        .set_handwritten_notes(patient.id, Some(payload.into()))
        .await
        .unwrap();
    assert_eq!(updated.handwritten_notes.as_deref(), Some(payload));

    let cleared = store.set_handwritten_notes(patient.id, None).await.unwrap();
    assert!(cleared.handwritten_notes.is_none());
}

#[tokio::test]
async fn handwritten_notes_supersede_the_previous_payload() {
    let store = RecordStore::new();
    let patient = store.create_patient(patient_form("Ada")).await;
    store.set_handwritten_notes(patient.id, Some("first".into())).await.unwrap();
    let updated = store.set_handwritten_notes(patient.id, Some("second".into())).await.unwrap();
    assert_eq!(updated.handwritten_notes.as_deref(), Some("second"));
}

// =============================================================================
// Sharing
// =============================================================================

#[tokio::test]
async fn clones_share_the_same_table() {
    let store = RecordStore::new();
    let clone = store.clone();
    store.create_patient(patient_form("Ada")).await;
    assert_eq!(clone.list_patients().await.len(), 1);
}
