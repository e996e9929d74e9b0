pub mod about_section_repo;
pub mod content_repo;
pub mod user_repo;

pub use about_section_repo::AboutSectionRepo;
pub use content_repo::ContentRepo;
pub use user_repo::UserRepo;
