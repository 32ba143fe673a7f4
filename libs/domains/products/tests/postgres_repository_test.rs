//! PgProductRepository against a real PostgreSQL container

use chrono::{Duration, Utc};
use domain_products::*;
use test_utils::TestDatabase;
use test_utils::assertions::assert_descending;
use uuid::Uuid;

async fn setup() -> (TestDatabase, PgProductRepository, ProductOwner) {
    let db = TestDatabase::new().await;
    let user_id = db.create_test_user(Uuid::now_v7()).await;
    let repo = PgProductRepository::new(db.connection());
    let owner = ProductOwner {
        id: user_id,
        name: "Test User".into(),
        email: format!("test-{user_id}@example.com"),
    };
    (db, repo, owner)
}

fn new_product(name: &str, description: Option<&str>, owner: &ProductOwner) -> NewProduct {
    NewProduct::new(
        CreateProduct {
            name: name.into(),
            price: 19.99,
            description: description.map(Into::into),
            images: vec!["https://example.com/a.jpg".into()],
        },
        owner.clone(),
    )
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insert_joins_owner() {
    let (_db, repo, owner) = setup().await;

    let product = repo
        .insert(new_product("Lamp", None, &owner))
        .await
        .unwrap();

    assert_eq!(product.user, owner);
    assert_eq!(product.price, 19.99);
    assert_eq!(product.images, vec!["https://example.com/a.jpg".to_string()]);

    let found = repo.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(found.id, product.id);
    assert_eq!(found.user.email, owner.email);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_query_pages_newest_first() {
    let (_db, repo, owner) = setup().await;

    for i in 0..12 {
        let mut product = new_product(&format!("Item {i}"), None, &owner);
        product.created_at = Utc::now() - Duration::seconds(100 - i);
        repo.insert(product).await.unwrap();
    }

    let (page, total) = repo.query(10, 10, None).await.unwrap();
    assert_eq!(total, 12);
    assert_eq!(page.len(), 2);

    let (first, _) = repo.query(0, 10, None).await.unwrap();
    let created: Vec<_> = first.iter().map(|p| p.created_at).collect();
    assert_descending(&created, "created_at");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_query_search_is_literal_and_case_insensitive() {
    let (_db, repo, owner) = setup().await;

    repo.insert(new_product("Vase", Some("Hand-blown GLASS"), &owner))
        .await
        .unwrap();
    repo.insert(new_product("100% cotton shirt", None, &owner))
        .await
        .unwrap();
    repo.insert(new_product("Chair", None, &owner)).await.unwrap();

    let (items, total) = repo.query(0, 10, Some("glass".into())).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].name, "Vase");

    let (items, _) = repo.query(0, 10, Some("%".into())).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "100% cotton shirt");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_fields_and_delete() {
    let (_db, repo, owner) = setup().await;
    let product = repo
        .insert(new_product("Lamp", Some("desc"), &owner))
        .await
        .unwrap();

    let updated = repo
        .update_fields(
            product.id,
            ProductChanges {
                price: Some(5.5),
                images: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated);

    let stored = repo.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(stored.price, 5.5);
    assert!(stored.images.is_empty());
    assert_eq!(stored.description.as_deref(), Some("desc"));
    assert!(stored.updated_at >= product.updated_at);

    assert!(repo.delete_by_id(product.id).await.unwrap());
    assert!(!repo.delete_by_id(product.id).await.unwrap());
    assert!(repo.find_by_id(product.id).await.unwrap().is_none());
}
