use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medical_record_cell::models::{CreateMedicalRecordRequest, MedicalRecordError};
use medical_record_cell::services::MedicalRecordService;
use shared_utils::test_utils::{MockClinicRows, TestConfig};

const TOKEN: &str = "test-token";

async fn mock_existing(server: &MockServer, table: &str, id: Uuid) {
    Mock::given(method("GET"))
        .and(path(format!("/rest/v1/{}", table)))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": id }])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn a_note_is_appended_with_a_server_assigned_timestamp() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    mock_existing(&server, "doctors", doctor_id).await;
    mock_existing(&server, "patients", patient_id).await;

    let created = MockClinicRows::medical_record_row(
        &Uuid::new_v4().to_string(),
        &doctor_id.to_string(),
        &patient_id.to_string(),
        "Follow-up in two weeks.",
        "2025-03-10T12:00:00Z",
    );
    Mock::given(method("POST"))
        .and(path("/rest/v1/medical_records"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([created])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = MedicalRecordService::new(&config);

    let record = service
        .create_record(
            CreateMedicalRecordRequest {
                doctor_id,
                patient_id,
                description: "Follow-up in two weeks.".to_string(),
            },
            TOKEN,
        )
        .await
        .unwrap();

    assert_eq!(record.doctor_id, doctor_id);
    assert_eq!(record.patient_id, patient_id);
}

#[tokio::test]
async fn an_unknown_patient_reference_blocks_the_note() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    mock_existing(&server, "doctors", doctor_id).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/medical_records"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = MedicalRecordService::new(&config);

    let err = service
        .create_record(
            CreateMedicalRecordRequest {
                doctor_id,
                patient_id: Uuid::new_v4(),
                description: "note".to_string(),
            },
            TOKEN,
        )
        .await
        .unwrap_err();

    assert_matches!(err, MedicalRecordError::PatientNotFound);
}

#[tokio::test]
async fn patient_history_is_requested_newest_first() {
    let server = MockServer::start().await;
    let patient_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4().to_string();

    let newer = MockClinicRows::medical_record_row(
        &Uuid::new_v4().to_string(),
        &doctor_id,
        &patient_id.to_string(),
        "second visit",
        "2025-03-11T09:00:00Z",
    );
    let older = MockClinicRows::medical_record_row(
        &Uuid::new_v4().to_string(),
        &doctor_id,
        &patient_id.to_string(),
        "first visit",
        "2025-03-01T09:00:00Z",
    );

    Mock::given(method("GET"))
        .and(path("/rest/v1/medical_records"))
        .and(query_param("patient_id", format!("eq.{}", patient_id)))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([newer, older])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = MedicalRecordService::new(&config);

    let records = service.list_for_patient(patient_id, TOKEN).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].created_at > records[1].created_at);
}
