pub mod feed_service;
pub mod match_service;
pub mod profiles;
