pub mod analytics_service;
pub mod detection_service;
pub mod export;
pub mod normalizer;
pub mod validator;
