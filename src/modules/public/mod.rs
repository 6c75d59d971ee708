//! The unauthenticated event surface under `/api/public`: listings, event
//! pages by slug, and participant self-registration.

pub mod controller;
pub mod router;
pub mod service;
