//! Backend Gateway
//!
//! Abstracted access to the diet planner backend through a common trait.
//!
//! # Usage
//!
//! ```ignore
//! use planner_core::gateway::{BackendGateway, HttpGateway};
//!
//! let gateway = HttpGateway::from_config(&config);
//! let foods = gateway.list_available_foods(session.id).await?;
//! ```

mod http;
mod traits;
pub mod types;

pub use http::HttpGateway;
pub use traits::{BackendGateway, GatewayError, Operation};
pub use types::{
    Ack, CheckRemindersResponse, DoctorReminderRequest, DoctorReminderResponse, LoginRequest,
    LoginResponse, MarkConsumedResponse, PushSubscription, RegisterRequest, RegisterResponse,
    ReminderSetup, SubscriptionKeys, TriggerAllResponse,
};
