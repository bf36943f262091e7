pub mod chat_service;
pub mod profile_client;
