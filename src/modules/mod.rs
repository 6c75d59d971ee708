pub mod auth;
pub mod events;
pub mod public;
pub mod users;

pub use self::auth::model::LoginRequest;
pub use self::users::model::User;
