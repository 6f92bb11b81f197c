pub mod contact_service;
pub mod post_service;
