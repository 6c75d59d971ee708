//! Events and everything hanging off them: categories, races, participants,
//! results, and the organizer dashboard statistics.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
pub mod store;
