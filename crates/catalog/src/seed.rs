//! Demo catalog: a two-level category forest with a few products per leaf.

use common::Money;
use rust_decimal::Decimal;

use crate::model::{Category, Product};
use crate::store::InMemoryCatalog;

const FOREST: &[(&str, Option<&str>, &[(&str, &[&str])])] = &[
    (
        "Fruit and vegetables",
        None,
        &[
            ("Mushrooms", &["Honey mushrooms", "Canned champignons"]),
            ("Fruit", &["Apples", "Bananas"]),
            ("Pickles", &["Sauerkraut", "Pickled cucumbers"]),
        ],
    ),
    (
        "Grocery",
        None,
        &[
            ("Pasta", &["Fusilli", "Spaghetti"]),
            ("Grains", &["Buckwheat", "Millet"]),
            ("Oils", &["Sunflower oil", "Olive oil"]),
        ],
    ),
    (
        "Frozen food",
        None,
        &[("Ready meals", &["Meat pancakes", "Nuggets"])],
    ),
    (
        "Drinks",
        Some("Water, lemonades, juices"),
        &[("Lemonades", &["Pear lemonade", "Sparkling water"])],
    ),
];

/// Loads the demo data unless the catalog already holds products or
/// categories. Returns the number of products inserted.
pub async fn seed_demo(catalog: &InMemoryCatalog) -> usize {
    if catalog.product_count().await > 0 || catalog.category_count().await > 0 {
        tracing::info!("catalog already populated, skipping demo seed");
        return 0;
    }

    let mut inserted = 0;
    for (root_name, description, children) in FOREST {
        let mut root = Category::root(*root_name);
        if let Some(description) = description {
            root = root.with_description(*description);
        }
        let root_id = root.id;
        catalog.insert_category(root).await;

        for (child_name, products) in children.iter() {
            let child = Category::child_of(root_id, *child_name);
            let child_id = child.id;
            catalog.insert_category(child).await;

            for name in products.iter() {
                catalog
                    .insert_product(demo_product(name, inserted).in_category(child_id))
                    .await;
                inserted += 1;
            }
        }
    }

    tracing::info!(products = inserted, "demo catalog seeded");
    inserted
}

/// Spreads prices and stock over plausible ranges without randomness.
fn demo_product(name: &str, index: usize) -> Product {
    let n = i64::try_from(index).unwrap_or(0);
    let price = Money::from_units(50 + (n * 37) % 450);
    let stock = 20 + u32::try_from((n * 13) % 80).unwrap_or(0);
    Product::new(name, price, stock).with_nutrition(
        Decimal::from(100 + (n * 71) % 900),
        Decimal::from(20 + (n * 29) % 380),
        Decimal::from(5 + (n * 7) % 25),
        Decimal::from(5 + (n * 11) % 25),
        Decimal::from(5 + (n * 3) % 25),
    )
}
