pub mod collection;
pub mod draft;
pub mod entry;
pub mod mood;
pub mod user;
