pub mod dev;
pub mod health;
pub mod messages;
