pub mod about_section;
pub mod content;
pub mod health;
pub mod storage;
pub mod users;

use axum::Router;
use pura_db::models::activity::Activity;
use pura_db::models::announcement::Announcement;
use pura_db::models::article::Article;
use pura_db::models::article_category::ArticleCategory;
use pura_db::models::content::ContentEntity;
use pura_db::models::facility::Facility;
use pura_db::models::faq::Faq;
use pura_db::models::gallery::Gallery;
use pura_db::models::hero_slide::HeroSlide;
use pura_db::models::org_member::OrgMember;
use pura_db::models::partner::Partner;
use pura_db::models::program::Program;
use pura_db::models::testimonial::Testimonial;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users/_login                          login
/// /users/_current                        current user, update
/// /users/_logout                         logout (POST or DELETE)
///
/// /{resource}                            admin list, create
/// /{resource}/{id}                       admin get, update, delete
/// /public/{resource}                     active-only list
/// /public/{resource}/{id}                active-only get
///
/// /storage/upload                        image upload (multipart)
/// /storage                               delete uploaded objects
/// ```
///
/// Resources: hero-slides, galleries, article-categories, articles,
/// testimonials, org-members, activities, facilities, programs, faqs,
/// partners, announcements, about-sections.
///
/// Rate limiters are built from `state` here, so the state must be the one
/// later passed to `with_state`.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .nest("/users", users::router(state))
        .nest("/storage", storage::router(state))
        .nest("/about-sections", about_section::admin_router(state))
        .nest("/public/about-sections", about_section::public_router(state));

    let router = mount::<HeroSlide>(router, "hero-slides", state);
    let router = mount::<Gallery>(router, "galleries", state);
    let router = mount::<ArticleCategory>(router, "article-categories", state);
    let router = mount::<Article>(router, "articles", state);
    let router = mount::<Testimonial>(router, "testimonials", state);
    let router = mount::<OrgMember>(router, "org-members", state);
    let router = mount::<Activity>(router, "activities", state);
    let router = mount::<Facility>(router, "facilities", state);
    let router = mount::<Program>(router, "programs", state);
    let router = mount::<Faq>(router, "faqs", state);
    let router = mount::<Partner>(router, "partners", state);
    mount::<Announcement>(router, "announcements", state)
}

/// Nest the admin and public routers for `E` under `resource`.
fn mount<E: ContentEntity>(
    router: Router<AppState>,
    resource: &str,
    state: &AppState,
) -> Router<AppState> {
    router
        .nest(&format!("/{resource}"), content::admin_router::<E>(state))
        .nest(
            &format!("/public/{resource}"),
            content::public_router::<E>(state),
        )
}
