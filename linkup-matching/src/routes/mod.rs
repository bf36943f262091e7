pub mod actions;
pub mod feed;
pub mod health;
pub mod likes;
pub mod matches;
