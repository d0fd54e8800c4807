pub mod analytics;
pub mod health;
pub mod tickets;
pub mod users;
