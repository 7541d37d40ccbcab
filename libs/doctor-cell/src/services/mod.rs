pub mod directory;
pub mod registration;

pub use directory::DoctorDirectoryService;
pub use registration::DoctorRegistrationService;
