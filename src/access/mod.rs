//! Access control for every inbound request.
//!
//! - [`policy`]: the Podium path tables as data
//! - [`paths`]: segment-aware path matching and callback URL handling
//! - [`decision`]: the ordered, pure decision function
//!
//! The HTTP side (reading the token, logging, turning a [`Decision`] into a
//! response) lives in [`crate::middleware::gate`].

pub mod decision;
pub mod paths;
pub mod policy;

pub use decision::{Decision, Evaluation, Outcome, RejectionBody, evaluate};
pub use policy::{AccessPolicy, PODIUM_POLICY, RoleRestriction};
