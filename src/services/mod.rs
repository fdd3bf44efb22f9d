pub mod analytics;
pub mod mood_image;
pub mod users;
