pub mod request;
pub mod ticket;
pub mod user;
