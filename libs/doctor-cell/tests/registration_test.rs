use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::models::AccountCredentials;
use doctor_cell::models::{RegisterDoctorRequest, RegistrationError};
use doctor_cell::services::DoctorRegistrationService;
use shared_utils::test_utils::{MockClinicRows, TestConfig};

const TOKEN: &str = "test-token";

fn request() -> RegisterDoctorRequest {
    RegisterDoctorRequest {
        user: AccountCredentials {
            username: "drgrey".to_string(),
            email: "grey@clinic.example".to_string(),
            password: "correct-horse".to_string(),
            first_name: "Meredith".to_string(),
            last_name: "Grey".to_string(),
        },
        name: "Dr. Meredith Grey".to_string(),
        email: "grey@clinic.example".to_string(),
        office_number: "101".to_string(),
        specialization: "General Surgery".to_string(),
        qualifications: vec!["MBBS".to_string(), "FRCS".to_string()],
        years_of_experience: 9,
        image_path: None,
    }
}

async fn mock_no_existing_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn registration_without_an_image_succeeds() {
    let server = MockServer::start().await;
    let account_id = Uuid::new_v4();

    mock_no_existing_profile(&server).await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicRows::admin_user_row(&account_id.to_string(), "grey@clinic.example"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let created = MockClinicRows::doctor_row(
        &Uuid::new_v4().to_string(),
        &account_id.to_string(),
        "Dr. Meredith Grey",
    );
    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([created])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = DoctorRegistrationService::new(&config);

    let doctor = service.register(request(), TOKEN).await.unwrap();
    assert_eq!(doctor.user_id, account_id);
    assert!(doctor.image_path.is_none());
}

#[tokio::test]
async fn invalid_profile_fields_fail_before_any_identity_is_created() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = DoctorRegistrationService::new(&config);

    let mut req = request();
    req.email = "nope".to_string();

    let err = service.register(req, TOKEN).await.unwrap_err();
    assert_matches!(err, RegistrationError::Validation(errors) => {
        assert!(errors.contains("email"));
    });
}

#[tokio::test]
async fn a_failed_profile_insert_rolls_the_identity_back() {
    let server = MockServer::start().await;
    let account_id = Uuid::new_v4();

    mock_no_existing_profile(&server).await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicRows::admin_user_row(&account_id.to_string(), "grey@clinic.example"),
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "insert failed"
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("/auth/v1/admin/users/{}", account_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = DoctorRegistrationService::new(&config);

    let err = service.register(request(), TOKEN).await.unwrap_err();
    assert_matches!(err, RegistrationError::Database(_));
}

#[tokio::test]
async fn an_existing_profile_email_short_circuits_registration() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4() }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = DoctorRegistrationService::new(&config);

    let err = service.register(request(), TOKEN).await.unwrap_err();
    assert_matches!(err, RegistrationError::ProfileExists(_));
}
