pub mod availability;
pub mod courses;
pub mod health;
pub mod matches;
pub mod sessions;
pub mod users;
