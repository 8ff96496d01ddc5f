pub mod health;
pub mod nugget;
pub mod token;
