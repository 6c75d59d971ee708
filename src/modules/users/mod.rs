//! Users: persistence, profile and onboarding, and the admin listing.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
pub mod store;
