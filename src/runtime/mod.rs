//! Runtime adapters and the request-model surface.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_engine;

pub use api::{health, BookingForm, Health, LotForm, LotUpdateForm, RegistrationForm};
#[cfg(feature = "tokio-runtime")]
pub use tokio_engine::AsyncParkingEngine;
