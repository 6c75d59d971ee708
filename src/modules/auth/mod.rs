//! Credential verification and the session lifecycle under `/api/auth`.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
