pub mod about_section;
pub mod activity;
pub mod announcement;
pub mod article;
pub mod article_category;
pub mod content;
pub mod facility;
pub mod faq;
pub mod gallery;
pub mod hero_slide;
pub mod org_member;
pub mod partner;
pub mod program;
pub mod testimonial;
pub mod user;
