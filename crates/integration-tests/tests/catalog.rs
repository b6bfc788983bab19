//! Integration tests for flavor, ingredient and allergen management.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use parlour_catalog::{
    EntityKind, FlavorFilter, FlavorUpdate, NewFlavor, NewIngredient, RepositoryError,
};
use parlour_core::Price;
use parlour_integration_tests::{TestContext, name, price};

// =============================================================================
// Flavors
// =============================================================================

#[tokio::test]
async fn test_add_flavor_returns_id_and_round_trips() {
    let ctx = TestContext::new().await;
    ctx.allergen("Milk").await;

    let input = NewFlavor::new(name("Summer Strawberry"), true, price("4.99"))
        .with_description("Fresh strawberry delight")
        .with_allergen(name("Milk"));
    let id = ctx.catalog().add_flavor(&input).await.unwrap();

    let flavor = ctx
        .catalog()
        .get_flavor(&name("Summer Strawberry"))
        .await
        .unwrap()
        .expect("flavor exists");

    assert_eq!(flavor.id, id);
    assert_eq!(flavor.description, "Fresh strawberry delight");
    assert!(flavor.is_seasonal);
    assert_eq!(flavor.price.cents(), 499);
    assert_eq!(flavor.allergens, vec![name("Milk")]);
}

#[tokio::test]
async fn test_add_flavor_duplicate_name_leaves_table_unchanged() {
    let ctx = TestContext::new().await;
    ctx.flavor("Mint Chip", false, "4.50", &[]).await;

    for duplicate in ["Mint Chip", "mint chip", "  MINT CHIP "] {
        let input = NewFlavor::new(name(duplicate), true, price("9.99"));
        let err = ctx.catalog().add_flavor(&input).await.unwrap_err();
        assert!(
            matches!(
                err,
                RepositoryError::DuplicateName {
                    kind: EntityKind::Flavor,
                    ..
                }
            ),
            "unexpected error for {duplicate:?}: {err}"
        );
    }

    assert_eq!(ctx.count("flavors").await, 1);
    let flavor = ctx
        .catalog()
        .get_flavor(&name("Mint Chip"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(flavor.price, price("4.50"));
    assert!(!flavor.is_seasonal);
}

#[tokio::test]
async fn test_add_flavor_unknown_allergen_rolls_back() {
    let ctx = TestContext::new().await;
    ctx.allergen("Milk").await;

    let input = NewFlavor::new(name("Rocky Road"), false, price("4.75"))
        .with_allergen(name("Milk"))
        .with_allergen(name("Marshmallow"));
    let err = ctx.catalog().add_flavor(&input).await.unwrap_err();

    assert!(matches!(
        err,
        RepositoryError::NotFound {
            kind: EntityKind::Allergen,
            ref name,
        } if name == "Marshmallow"
    ));
    assert_eq!(ctx.count("flavors").await, 0);
    assert_eq!(ctx.count("flavor_allergens").await, 0);
}

#[test]
fn test_negative_price_is_invalid_value() {
    let err: RepositoryError = Price::parse("-4.50").unwrap_err().into();
    assert!(matches!(err, RepositoryError::InvalidValue(_)));
}

#[tokio::test]
async fn test_zero_price_allowed() {
    let ctx = TestContext::new().await;
    ctx.flavor("Free Sample", false, "0", &[]).await;

    let flavor = ctx
        .catalog()
        .get_flavor(&name("Free Sample"))
        .await
        .unwrap()
        .unwrap();
    assert!(flavor.price.is_zero());
}

#[tokio::test]
async fn test_update_flavor_edits_only_given_fields() {
    let ctx = TestContext::new().await;
    ctx.flavor("Mint Chip", false, "4.50", &[]).await;

    let update = FlavorUpdate {
        price: Some(price("4.75")),
        ..FlavorUpdate::default()
    };
    let flavor = ctx
        .catalog()
        .update_flavor(&name("mint chip"), &update)
        .await
        .unwrap();

    assert_eq!(flavor.name, name("Mint Chip"));
    assert_eq!(flavor.price, price("4.75"));
    assert!(!flavor.is_seasonal);

    let update = FlavorUpdate {
        is_seasonal: Some(true),
        description: Some("Now with extra chips".to_owned()),
        ..FlavorUpdate::default()
    };
    let flavor = ctx
        .catalog()
        .update_flavor(&name("Mint Chip"), &update)
        .await
        .unwrap();

    assert_eq!(flavor.price, price("4.75"));
    assert!(flavor.is_seasonal);
    assert_eq!(flavor.description, "Now with extra chips");
}

#[tokio::test]
async fn test_update_missing_flavor_not_found() {
    let ctx = TestContext::new().await;

    let err = ctx
        .catalog()
        .update_flavor(&name("Ghost"), &FlavorUpdate::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RepositoryError::NotFound {
            kind: EntityKind::Flavor,
            ..
        }
    ));
}

#[tokio::test]
async fn test_remove_flavor() {
    let ctx = TestContext::new().await;
    ctx.allergen("Milk").await;
    ctx.flavor("Mint Chip", false, "4.50", &["Milk"]).await;

    ctx.catalog().remove_flavor(&name("Mint Chip")).await.unwrap();

    assert!(
        ctx.catalog()
            .get_flavor(&name("Mint Chip"))
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(ctx.count("flavor_allergens").await, 0);
    assert_eq!(ctx.count("allergens").await, 1);

    let err = ctx
        .catalog()
        .remove_flavor(&name("Mint Chip"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

// =============================================================================
// Allergens
// =============================================================================

#[tokio::test]
async fn test_add_allergen_twice_fails_with_duplicate() {
    let ctx = TestContext::new().await;

    ctx.catalog().add_allergen(&name("Peanuts")).await.unwrap();
    let err = ctx
        .catalog()
        .add_allergen(&name("Peanuts"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RepositoryError::DuplicateName {
            kind: EntityKind::Allergen,
            ..
        }
    ));

    let allergens = ctx.catalog().list_allergens().await.unwrap();
    assert_eq!(allergens.len(), 1);
    assert_eq!(allergens[0].name, name("Peanuts"));
}

#[tokio::test]
async fn test_remove_allergen_cascades_to_tags() {
    let ctx = TestContext::new().await;
    ctx.allergen("Nuts").await;
    ctx.allergen("Milk").await;
    ctx.flavor("Pistachio", false, "5.25", &["Nuts", "Milk"]).await;
    ctx.flavor("Butter Pecan", false, "4.75", &["Nuts"]).await;

    let untagged = ctx.catalog().remove_allergen(&name("Nuts")).await.unwrap();
    assert_eq!(untagged, 2);

    let pistachio = ctx
        .catalog()
        .get_flavor(&name("Pistachio"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pistachio.allergens, vec![name("Milk")]);

    let tagged = ctx
        .search()
        .search(&FlavorFilter::all().containing_allergen(name("Nuts")))
        .await
        .unwrap();
    assert!(tagged.is_empty());
    assert_eq!(ctx.count("flavors").await, 2);
}

#[tokio::test]
async fn test_remove_missing_allergen_not_found() {
    let ctx = TestContext::new().await;

    let err = ctx
        .catalog()
        .remove_allergen(&name("Gluten"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RepositoryError::NotFound {
            kind: EntityKind::Allergen,
            ..
        }
    ));
}

#[tokio::test]
async fn test_tag_and_untag_allergen() {
    let ctx = TestContext::new().await;
    ctx.allergen("Soy").await;
    ctx.flavor("Mint Chip", false, "4.50", &[]).await;

    assert!(
        ctx.catalog()
            .tag_allergen(&name("Mint Chip"), &name("Soy"))
            .await
            .unwrap()
    );
    assert!(
        !ctx.catalog()
            .tag_allergen(&name("Mint Chip"), &name("soy"))
            .await
            .unwrap()
    );
    assert_eq!(ctx.count("flavor_allergens").await, 1);

    ctx.catalog()
        .untag_allergen(&name("Mint Chip"), &name("Soy"))
        .await
        .unwrap();
    let err = ctx
        .catalog()
        .untag_allergen(&name("Mint Chip"), &name("Soy"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::NotFound {
            kind: EntityKind::AllergenTag,
            ..
        }
    ));

    let err = ctx
        .catalog()
        .tag_allergen(&name("Mint Chip"), &name("Gluten"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::NotFound {
            kind: EntityKind::Allergen,
            ..
        }
    ));
}

// =============================================================================
// Ingredients
// =============================================================================

#[tokio::test]
async fn test_add_ingredient_and_duplicate() {
    let ctx = TestContext::new().await;

    let input = NewIngredient::new(name("Vanilla Beans"), 100);
    ctx.catalog().add_ingredient(&input).await.unwrap();

    let err = ctx.catalog().add_ingredient(&input).await.unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::DuplicateName {
            kind: EntityKind::Ingredient,
            ..
        }
    ));

    let ingredients = ctx.catalog().list_ingredients().await.unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0].quantity, 100);
    assert_eq!(ingredients[0].unit, "grams");
}

#[tokio::test]
async fn test_add_ingredient_negative_quantity_invalid() {
    let ctx = TestContext::new().await;

    let input = NewIngredient::new(name("Cream"), -1);
    let err = ctx.catalog().add_ingredient(&input).await.unwrap_err();

    assert!(matches!(err, RepositoryError::InvalidValue(_)));
    assert_eq!(ctx.count("ingredients").await, 0);
}

#[tokio::test]
async fn test_add_ingredient_with_unit() {
    let ctx = TestContext::new().await;

    let input = NewIngredient::new(name("Heavy Cream"), 4000).with_unit("millilitres");
    ctx.catalog().add_ingredient(&input).await.unwrap();

    let cream = ctx
        .catalog()
        .get_ingredient(&name("heavy cream"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cream.unit, "millilitres");
}

#[tokio::test]
async fn test_update_quantity_applies_delta() {
    let ctx = TestContext::new().await;
    ctx.catalog()
        .add_ingredient(&NewIngredient::new(name("Fresh Strawberries"), 500))
        .await
        .unwrap();

    let mut expected = 500;
    for delta in [250, -700, 0, -50] {
        let ingredient = ctx
            .catalog()
            .update_ingredient_quantity(&name("Fresh Strawberries"), delta)
            .await
            .unwrap();
        expected += delta;
        assert_eq!(ingredient.quantity, expected);
    }
    assert_eq!(expected, 0);
}

#[tokio::test]
async fn test_update_quantity_below_zero_fails_unchanged() {
    let ctx = TestContext::new().await;
    ctx.catalog()
        .add_ingredient(&NewIngredient::new(name("Vanilla Beans"), 100))
        .await
        .unwrap();

    let err = ctx
        .catalog()
        .update_ingredient_quantity(&name("Vanilla Beans"), -101)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidValue(_)));

    let err = ctx
        .catalog()
        .update_ingredient_quantity(&name("Vanilla Beans"), i64::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidValue(_)));

    let beans = ctx
        .catalog()
        .get_ingredient(&name("Vanilla Beans"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(beans.quantity, 100);
}

#[tokio::test]
async fn test_update_quantity_unknown_ingredient() {
    let ctx = TestContext::new().await;

    let err = ctx
        .catalog()
        .update_ingredient_quantity(&name("Saffron"), 5)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RepositoryError::NotFound {
            kind: EntityKind::Ingredient,
            ..
        }
    ));
}

#[tokio::test]
async fn test_remove_ingredient() {
    let ctx = TestContext::new().await;
    ctx.catalog()
        .add_ingredient(&NewIngredient::new(name("Cocoa"), 20))
        .await
        .unwrap();

    ctx.catalog().remove_ingredient(&name("COCOA")).await.unwrap();
    assert_eq!(ctx.count("ingredients").await, 0);

    let err = ctx
        .catalog()
        .remove_ingredient(&name("Cocoa"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}
