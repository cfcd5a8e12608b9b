//! Push Notification Registration
//!
//! Permission, worker installation, subscription and backend reminder setup,
//! run as one sequential pipeline by [`PushRegistrar`].

mod platform;
mod registrar;

pub use platform::{Permission, PlatformError, PushPlatform, WorkerRegistration};
pub use registrar::{
    decode_application_server_key, PushRegistrar, RegistrationReport, StepOutcome,
};
