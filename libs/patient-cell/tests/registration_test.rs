use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::models::AccountCredentials;
use patient_cell::models::{Gender, RegisterPatientRequest, RegistrationError};
use patient_cell::services::PatientRegistrationService;
use shared_utils::test_utils::{MockClinicRows, TestConfig};

const TOKEN: &str = "test-token";

fn request() -> RegisterPatientRequest {
    RegisterPatientRequest {
        user: AccountCredentials {
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password: "correct-horse".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        },
        name: "Jane Doe".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
        gender: Gender::Female,
        phone_number: "0851234567".to_string(),
        email: Some("jdoe@example.com".to_string()),
        age: 35,
        blood_group: "O+".to_string(),
    }
}

#[tokio::test]
async fn registration_creates_the_identity_and_then_the_profile() {
    let server = MockServer::start().await;
    let account_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicRows::admin_user_row(&account_id.to_string(), "jdoe@example.com"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let created = MockClinicRows::patient_row(
        &Uuid::new_v4().to_string(),
        &account_id.to_string(),
        "Jane Doe",
    );
    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([created])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = PatientRegistrationService::new(&config);

    let patient = service.register(request(), TOKEN).await.unwrap();
    assert_eq!(patient.user_id, account_id);
    assert!(patient.is_active);
}

#[tokio::test]
async fn an_invalid_phone_number_fails_before_any_identity_is_created() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = PatientRegistrationService::new(&config);

    let mut req = request();
    req.phone_number = "not-a-phone".to_string();

    let err = service.register(req, TOKEN).await.unwrap_err();
    assert_matches!(err, RegistrationError::Validation(errors) => {
        assert!(errors.contains("phone_number"));
    });
}

#[tokio::test]
async fn a_failed_profile_insert_rolls_the_identity_back() {
    let server = MockServer::start().await;
    let account_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicRows::admin_user_row(&account_id.to_string(), "jdoe@example.com"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "insert failed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Rollback: the freshly created identity must be deleted again.
    Mock::given(method("DELETE"))
        .and(path(format!("/auth/v1/admin/users/{}", account_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = PatientRegistrationService::new(&config);

    let err = service.register(request(), TOKEN).await.unwrap_err();
    assert_matches!(err, RegistrationError::Database(_));
}

#[tokio::test]
async fn a_duplicate_account_email_is_reported_as_a_field_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": 422,
            "msg": "A user with this email address has already been registered"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/rest/v1/patients$"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_base_url(&server.uri()).to_app_config();
    let service = PatientRegistrationService::new(&config);

    let err = service.register(request(), TOKEN).await.unwrap_err();
    assert_matches!(err, RegistrationError::Validation(errors) => {
        assert!(errors.contains("user.email"));
    });
}
