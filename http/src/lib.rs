#[macro_use]
extern crate tracing;

pub mod error;
pub mod health;
pub mod router;
pub mod trigger;

pub use error::AppError;
pub use router::{
    create_router,
    AppState,
    Site,
};
pub use trigger::{
    TriggerResponse,
    TriggerStatus,
};
