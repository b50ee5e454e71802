pub mod auth;
pub mod donations;
pub mod food;
pub mod notifications;
pub mod pickups;
pub mod users;
