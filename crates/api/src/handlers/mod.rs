pub mod about_section;
pub mod content;
pub mod storage;
pub mod users;
