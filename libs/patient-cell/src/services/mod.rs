pub mod registration;

pub use registration::PatientRegistrationService;
