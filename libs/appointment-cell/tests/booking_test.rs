use assert_matches::assert_matches;
use chrono::{Days, NaiveTime, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{AppointmentError, AppointmentStatus, BookAppointmentRequest};
use appointment_cell::services::AppointmentBookingService;
use shared_utils::test_utils::{MockClinicRows, TestConfig};

const TOKEN: &str = "test-token";

struct Ids {
    doctor_id: Uuid,
    patient_id: Uuid,
}

fn ids() -> Ids {
    Ids {
        doctor_id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
    }
}

fn booking_request(ids: &Ids) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id: ids.doctor_id,
        patient_id: ids.patient_id,
        date: Utc::now().date_naive().checked_add_days(Days::new(7)).unwrap(),
        time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
    }
}

async fn mock_participants(server: &MockServer, ids: &Ids, doctor_active: bool, patient_active: bool) {
    let doctor_user = Uuid::new_v4().to_string();
    let patient_user = Uuid::new_v4().to_string();

    let doctor_row = if doctor_active {
        MockClinicRows::doctor_row(&ids.doctor_id.to_string(), &doctor_user, "Dr. Test")
    } else {
        MockClinicRows::inactive_doctor_row(&ids.doctor_id.to_string(), &doctor_user, "Dr. Test")
    };
    let patient_row = if patient_active {
        MockClinicRows::patient_row(&ids.patient_id.to_string(), &patient_user, "Test Patient")
    } else {
        MockClinicRows::inactive_patient_row(&ids.patient_id.to_string(), &patient_user, "Test Patient")
    };

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", ids.doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_row])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", ids.patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([patient_row])))
        .mount(server)
        .await;
}

async fn mock_no_conflicts(server: &MockServer, ids: &Ids) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", ids.doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn booking_a_free_slot_creates_a_pending_appointment() {
    let server = MockServer::start().await;
    let ids = ids();
    let request = booking_request(&ids);

    mock_participants(&server, &ids, true, true).await;
    mock_no_conflicts(&server, &ids).await;

    let created_row = MockClinicRows::appointment_row(
        &Uuid::new_v4().to_string(),
        &ids.doctor_id.to_string(),
        &ids.patient_id.to_string(),
        &request.date.format("%Y-%m-%d").to_string(),
        "10:30:00",
        "pending",
    );
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([created_row])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = AppointmentBookingService::new(&config);

    let appointment = service.book_appointment(request, TOKEN).await.unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.doctor_id, ids.doctor_id);
    assert_eq!(appointment.patient_id, ids.patient_id);
}

#[tokio::test]
async fn an_existing_appointment_for_the_pair_and_slot_is_a_conflict() {
    let server = MockServer::start().await;
    let ids = ids();
    let request = booking_request(&ids);

    mock_participants(&server, &ids, true, true).await;

    let existing = MockClinicRows::appointment_row(
        &Uuid::new_v4().to_string(),
        &ids.doctor_id.to_string(),
        &ids.patient_id.to_string(),
        &request.date.format("%Y-%m-%d").to_string(),
        "10:30:00",
        "confirmed",
    );
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", ids.doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([existing])))
        .mount(&server)
        .await;

    // The insert must never be attempted.
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = AppointmentBookingService::new(&config);

    let err = service.book_appointment(request, TOKEN).await.unwrap_err();
    assert_matches!(err, AppointmentError::ConflictDetected);
}

#[tokio::test]
async fn a_storage_level_unique_violation_is_reported_as_a_conflict() {
    // Two racing requests can both pass the pre-check; the loser of the
    // insert race must still see a conflict, not a generic database error.
    let server = MockServer::start().await;
    let ids = ids();
    let request = booking_request(&ids);

    mock_participants(&server, &ids, true, true).await;
    mock_no_conflicts(&server, &ids).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"appointments_slot_key\""
        })))
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = AppointmentBookingService::new(&config);

    let err = service.book_appointment(request, TOKEN).await.unwrap_err();
    assert_matches!(err, AppointmentError::ConflictDetected);
}

#[tokio::test]
async fn a_past_date_is_rejected_before_any_write() {
    let server = MockServer::start().await;
    let ids = ids();
    let mut request = booking_request(&ids);
    request.date = Utc::now().date_naive().checked_sub_days(Days::new(1)).unwrap();

    mock_participants(&server, &ids, true, true).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = AppointmentBookingService::new(&config);

    let err = service.book_appointment(request, TOKEN).await.unwrap_err();
    assert_matches!(err, AppointmentError::DateInPast);
}

#[tokio::test]
async fn an_inactive_doctor_identity_blocks_booking() {
    let server = MockServer::start().await;
    let ids = ids();
    let request = booking_request(&ids);

    mock_participants(&server, &ids, false, true).await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = AppointmentBookingService::new(&config);

    let err = service.book_appointment(request, TOKEN).await.unwrap_err();
    assert_matches!(err, AppointmentError::ParticipantInactive);
}

#[tokio::test]
async fn an_inactive_patient_identity_blocks_booking() {
    let server = MockServer::start().await;
    let ids = ids();
    let request = booking_request(&ids);

    mock_participants(&server, &ids, true, false).await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = AppointmentBookingService::new(&config);

    let err = service.book_appointment(request, TOKEN).await.unwrap_err();
    assert_matches!(err, AppointmentError::ParticipantInactive);
}

#[tokio::test]
async fn an_unknown_doctor_reference_fails() {
    let server = MockServer::start().await;
    let ids = ids();
    let request = booking_request(&ids);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = AppointmentBookingService::new(&config);

    let err = service.book_appointment(request, TOKEN).await.unwrap_err();
    assert_matches!(err, AppointmentError::DoctorNotFound);
}
