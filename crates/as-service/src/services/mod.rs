pub mod authorize_service;
pub mod claims_service;
pub mod redirect_service;
pub mod seeding_service;
