use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::models::DoctorError;
use doctor_cell::services::DoctorDirectoryService;
use shared_utils::test_utils::{MockClinicRows, TestConfig};

#[tokio::test]
async fn the_directory_lists_active_doctors_by_name() {
    let server = MockServer::start().await;

    let rows = json!([
        MockClinicRows::doctor_row(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string(), "Dr. Adams"),
        MockClinicRows::doctor_row(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string(), "Dr. Brown"),
    ]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("is_active", "eq.true"))
        .and(query_param("order", "name.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = DoctorDirectoryService::new(&config);

    let doctors = service.list_doctors().await.unwrap();
    assert_eq!(doctors.len(), 2);
    assert_eq!(doctors[0].name, "Dr. Adams");
}

#[tokio::test]
async fn an_unknown_doctor_id_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = DoctorDirectoryService::new(&config);

    let err = service.get_doctor(Uuid::new_v4(), "token").await.unwrap_err();
    assert_matches!(err, DoctorError::NotFound);
}

#[tokio::test]
async fn reference_data_lookups_return_named_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specializations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4(), "name": "Cardiology" },
            { "id": Uuid::new_v4(), "name": "Dermatology" },
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/qualifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4(), "name": "MBBS" },
        ])))
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = DoctorDirectoryService::new(&config);

    let specializations = service.list_specializations().await.unwrap();
    assert_eq!(specializations[0].name, "Cardiology");

    let qualifications = service.list_qualifications().await.unwrap();
    assert_eq!(qualifications.len(), 1);
}
