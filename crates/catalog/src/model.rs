use common::{CategoryId, Money, ProductId};
use ordering::{Field, FieldTable, SortValue};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable product.
///
/// `stock_amount` is only ever changed by the stock ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub description: Option<String>,
    pub compound: Option<String>,
    pub stock_amount: u32,
    pub weight: Decimal,
    pub calories: Decimal,
    pub proteins: Decimal,
    pub fats: Decimal,
    pub carbohydrates: Decimal,
    pub category_id: Option<CategoryId>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: Money, stock_amount: u32) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            price,
            description: None,
            compound: None,
            stock_amount,
            weight: Decimal::ZERO,
            calories: Decimal::ZERO,
            proteins: Decimal::ZERO,
            fats: Decimal::ZERO,
            carbohydrates: Decimal::ZERO,
            category_id: None,
        }
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = id;
        self
    }

    pub fn in_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets weight (grams) and per-100g nutrition values.
    pub fn with_nutrition(
        mut self,
        weight: Decimal,
        calories: Decimal,
        proteins: Decimal,
        fats: Decimal,
        carbohydrates: Decimal,
    ) -> Self {
        self.weight = weight;
        self.calories = calories;
        self.proteins = proteins;
        self.fats = fats;
        self.carbohydrates = carbohydrates;
        self
    }

    /// Case-insensitive substring match on the trimmed filter.
    pub fn name_matches(&self, name_like: Option<&str>) -> bool {
        match name_like {
            None => true,
            Some(filter) => self
                .name
                .to_lowercase()
                .contains(&filter.trim().to_lowercase()),
        }
    }
}

/// Sortable product fields.
pub static PRODUCT_FIELDS: FieldTable<Product> = FieldTable::new(
    "Product",
    &[
        Field::new("id", |p: &Product| SortValue::from(p.id.as_uuid())),
        Field::new("name", |p: &Product| SortValue::from(p.name.as_str())),
        Field::new("price", |p: &Product| SortValue::from(p.price.cents())),
        Field::new("description", |p: &Product| {
            SortValue::opt_text(p.description.as_deref())
        }),
        Field::new("compound", |p: &Product| {
            SortValue::opt_text(p.compound.as_deref())
        }),
        Field::new("storageamount", |p: &Product| {
            SortValue::from(p.stock_amount)
        }),
        Field::new("weight", |p: &Product| SortValue::from(p.weight)),
        Field::new("calories", |p: &Product| SortValue::from(p.calories)),
        Field::new("proteins", |p: &Product| SortValue::from(p.proteins)),
        Field::new("fats", |p: &Product| SortValue::from(p.fats)),
        Field::new("carbohydrates", |p: &Product| {
            SortValue::from(p.carbohydrates)
        }),
    ],
    |a: &Product, b: &Product| a.id.cmp(&b.id),
);

/// A category record as stored: parent link only, no children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
}

impl Category {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            description: None,
            parent_id: None,
        }
    }

    pub fn child_of(parent: CategoryId, name: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent),
            ..Self::root(name)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A resolved category with its sub-categories attached.
///
/// `sub_categories` is empty unless descendants were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub sub_categories: Vec<CategoryNode>,
}

impl CategoryNode {
    pub(crate) fn new(category: &Category, sub_categories: Vec<CategoryNode>) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
            parent_id: category.parent_id,
            sub_categories,
        }
    }

    /// This node's id followed by every nested id, breadth first.
    pub fn flatten_ids(&self) -> Vec<CategoryId> {
        let mut ids = vec![self.id];
        let mut queue: std::collections::VecDeque<&CategoryNode> =
            self.sub_categories.iter().collect();
        while let Some(node) = queue.pop_front() {
            ids.push(node.id);
            queue.extend(node.sub_categories.iter());
        }
        ids
    }
}
