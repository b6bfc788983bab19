//! Integration tests for opening the store and seeding it.

#![allow(clippy::unwrap_used)]

use parlour_catalog::{
    CartRepository, CatalogConfig, CatalogRepository, FlavorFilter, Menu, SeedError, Store, seed,
};
use parlour_integration_tests::{TestContext, name, price};

#[tokio::test]
async fn test_data_survives_reopen() {
    let ctx = TestContext::new().await;
    ctx.allergen("Milk").await;
    ctx.flavor("Mint Chip", false, "4.50", &["Milk"]).await;
    ctx.cart().add_to_cart(&name("Mint Chip"), 2).await.unwrap();

    let path = ctx.database_path();
    ctx.store.clone().close().await;

    let store = Store::open(&path).await.unwrap();
    let reopened = CartRepository::new(store.pool());
    assert_eq!(reopened.cart_total().await.unwrap(), price("9.00"));

    let flavor = CatalogRepository::new(store.pool())
        .get_flavor(&name("Mint Chip"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(flavor.allergens, vec![name("Milk")]);
    store.close().await;
}

#[tokio::test]
async fn test_reopen_does_not_reapply_migrations() {
    let ctx = TestContext::new().await;
    let config = CatalogConfig::default().with_database_path(ctx.database_path());

    let again = Store::from_config(&config).await.unwrap();
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(again.pool())
        .await
        .unwrap();

    assert_eq!(applied, 1);
    again.close().await;
}

#[tokio::test]
async fn test_seed_demo_menu_twice() {
    let ctx = TestContext::new().await;
    let menu = Menu::demo().unwrap();

    let first = seed::seed(ctx.pool(), &menu).await.unwrap();
    assert_eq!(first.inserted, menu.len());
    assert_eq!(first.skipped, 0);

    let second = seed::seed(ctx.pool(), &menu).await.unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, menu.len());

    assert_eq!(ctx.count("flavors").await, 5);
    let seasonal = ctx
        .search()
        .search(&FlavorFilter::all().seasonal(true))
        .await
        .unwrap();
    assert_eq!(seasonal.len(), 3);
}

#[tokio::test]
async fn test_seed_keeps_existing_records() {
    let ctx = TestContext::new().await;
    ctx.allergen("Milk").await;
    ctx.flavor("Mint Chip", false, "9.99", &[]).await;

    let report = seed::seed(ctx.pool(), &Menu::demo().unwrap()).await.unwrap();
    assert_eq!(report.skipped, 2);

    let mint = ctx
        .catalog()
        .get_flavor(&name("Mint Chip"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(mint.price, price("9.99"));
}

#[tokio::test]
async fn test_seed_flavor_with_unknown_allergen_fails() {
    let ctx = TestContext::new().await;
    let menu = Menu::parse(
        r#"
flavors:
  - name: Rocky Road
    price: "4.75"
    allergens: [Marshmallow]
"#,
    )
    .unwrap();

    let result = seed::seed(ctx.pool(), &menu).await;

    assert!(matches!(result, Err(SeedError::Repository(_))));
    assert_eq!(ctx.count("flavors").await, 0);
}

#[tokio::test]
async fn test_menu_load_from_file() {
    let ctx = TestContext::new().await;
    let path = ctx.database_path().with_file_name("menu.yaml");
    tokio::fs::write(&path, "allergens: [Peanuts, Sesame]\n")
        .await
        .unwrap();

    let menu = Menu::load(&path).await.unwrap();
    let report = seed::seed(ctx.pool(), &menu).await.unwrap();

    assert_eq!(report.inserted, 2);
    assert_eq!(ctx.catalog().list_allergens().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unique_index_rejects_case_variant_names() {
    let ctx = TestContext::new().await;
    ctx.allergen("Peanuts").await;

    let err = sqlx::query("INSERT INTO allergens (name) VALUES ('peanuts')")
        .execute(ctx.pool())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation()
    ));
    assert_eq!(ctx.count("allergens").await, 1);
}
