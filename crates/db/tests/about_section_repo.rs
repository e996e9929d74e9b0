//! Integration tests for about sections and their replaceable values.

use pura_core::entity_scope::EntityType;
use pura_db::models::about_section::{AboutSectionInput, AboutValueInput};
use pura_db::repositories::AboutSectionRepo;
use sqlx::PgPool;

fn value(title: &str, order_index: i32) -> AboutValueInput {
    AboutValueInput {
        title: title.to_string(),
        description: None,
        icon: None,
        order_index,
    }
}

fn section(values: Vec<AboutValueInput>) -> AboutSectionInput {
    AboutSectionInput {
        entity_type: EntityType::Yayasan,
        title: "Tentang Yayasan".to_string(),
        description: "Yayasan pendidikan dan keagamaan".to_string(),
        image_url: None,
        vision: Some("Menjadi teladan".to_string()),
        mission: None,
        order_index: 0,
        is_active: true,
        values,
    }
}

async fn value_exists(pool: &PgPool, id: i64) -> bool {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM about_values WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn create_returns_values_in_display_order(pool: PgPool) {
    let created = AboutSectionRepo::create(&pool, &section(vec![value("Dua", 2), value("Satu", 1)]))
        .await
        .unwrap();

    let orders: Vec<_> = created.values.iter().map(|v| v.order_index).collect();
    assert_eq!(orders, [1, 2]);

    let loaded = AboutSectionRepo::find_by_id(&pool, created.section.id, false)
        .await
        .unwrap()
        .expect("section exists");
    let titles: Vec<_> = loaded.values.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(titles, ["Satu", "Dua"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_replaces_every_value(pool: PgPool) {
    let created = AboutSectionRepo::create(&pool, &section(vec![value("A", 1), value("B", 2)]))
        .await
        .unwrap();
    let old_ids: Vec<_> = created.values.iter().map(|v| v.id).collect();

    let updated = AboutSectionRepo::update(&pool, created.section.id, &section(vec![value("C", 0)]))
        .await
        .unwrap()
        .expect("section exists");
    assert_eq!(updated.values.len(), 1);
    assert_eq!(updated.values[0].title, "C");

    for id in old_ids {
        assert!(!value_exists(&pool, id).await);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn update_of_missing_section_changes_nothing(pool: PgPool) {
    let result = AboutSectionRepo::update(&pool, 424_242, &section(vec![value("X", 0)]))
        .await
        .unwrap();
    assert!(result.is_none());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM about_values")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_cascades_to_values(pool: PgPool) {
    let created = AboutSectionRepo::create(&pool, &section(vec![value("A", 0)]))
        .await
        .unwrap();
    let value_id = created.values[0].id;

    assert!(AboutSectionRepo::delete(&pool, created.section.id).await.unwrap());
    assert!(!value_exists(&pool, value_id).await);
}

#[sqlx::test(migrations = "./migrations")]
async fn list_attaches_values_per_section(pool: PgPool) {
    AboutSectionRepo::create(&pool, &section(vec![value("A", 0), value("B", 1)]))
        .await
        .unwrap();
    let mut hidden = section(vec![value("C", 0)]);
    hidden.is_active = false;
    AboutSectionRepo::create(&pool, &hidden).await.unwrap();

    let all = AboutSectionRepo::list(&pool, None, None, false).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].values.len(), 2);
    assert_eq!(all[1].values.len(), 1);

    let public = AboutSectionRepo::list(&pool, Some(EntityType::Yayasan), None, true)
        .await
        .unwrap();
    assert_eq!(public.len(), 1);
}
