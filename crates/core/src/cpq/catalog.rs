use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::domain::product::{Category, Product, ProductId};
use crate::errors::DomainError;

/// Read-only product catalog, grouped by category in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
    index: HashMap<ProductId, (usize, usize)>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>) -> Result<Self, DomainError> {
        let mut index = HashMap::new();

        for (category_pos, category) in categories.iter().enumerate() {
            for (product_pos, product) in category.products.iter().enumerate() {
                if index.insert(product.id.clone(), (category_pos, product_pos)).is_some() {
                    return Err(DomainError::malformed(format!(
                        "duplicate sku `{}` in category `{}`",
                        product.id, category.name
                    )));
                }
            }
        }

        Ok(Self { categories, index })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DomainError> {
        let document: Value = serde_json::from_str(raw)
            .map_err(|error| DomainError::malformed(format!("invalid JSON: {error}")))?;
        Self::load(&document)
    }

    /// Parses the `{ "categories": [ { "category", "items": [ { "sku", "name", "price" } ] } ] }`
    /// document. A missing or null `categories` field yields an empty catalog.
    pub fn load(document: &Value) -> Result<Self, DomainError> {
        let root = document
            .as_object()
            .ok_or_else(|| DomainError::malformed("catalog document must be a JSON object"))?;

        let raw_categories = match root.get("categories") {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Array(categories)) => categories,
            Some(_) => return Err(DomainError::malformed("`categories` must be an array")),
        };

        let categories = raw_categories
            .iter()
            .enumerate()
            .map(|(position, raw)| parse_category(position, raw))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(categories)
    }

    pub fn lookup(&self, product_id: &ProductId) -> Option<&Product> {
        let (category_pos, product_pos) = self.index.get(product_id)?;
        self.categories.get(*category_pos)?.products.get(*product_pos)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.categories.iter().flat_map(|category| category.products.iter())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn parse_category(position: usize, raw: &Value) -> Result<Category, DomainError> {
    let object = raw
        .as_object()
        .ok_or_else(|| DomainError::malformed(format!("category #{position} must be an object")))?;

    let name = object
        .get("category")
        .and_then(Value::as_str)
        .ok_or_else(|| DomainError::malformed(format!("category #{position} is missing a name")))?
        .to_owned();

    let products = match object.get("items") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(item_pos, item)| parse_product(&name, item_pos, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(DomainError::malformed(format!(
                "`items` of category `{name}` must be an array"
            )))
        }
    };

    Ok(Category { name, products })
}

fn parse_product(category: &str, position: usize, raw: &Value) -> Result<Product, DomainError> {
    let item = raw.as_object().ok_or_else(|| {
        DomainError::malformed(format!("item #{position} of `{category}` must be an object"))
    })?;

    let sku = required_str(item, "sku", category, position)?;
    if sku.trim().is_empty() {
        return Err(DomainError::malformed(format!(
            "item #{position} of `{category}` has an empty sku"
        )));
    }
    let name = required_str(item, "name", category, position)?;
    let unit_price = parse_price(item.get("price")).ok_or_else(|| {
        DomainError::malformed(format!(
            "item `{sku}` of `{category}` needs a non-negative numeric price"
        ))
    })?;

    Ok(Product { id: ProductId::from(sku.trim()), name: name.to_owned(), unit_price })
}

fn required_str<'a>(
    item: &'a Map<String, Value>,
    field: &str,
    category: &str,
    position: usize,
) -> Result<&'a str, DomainError> {
    item.get(field).and_then(Value::as_str).ok_or_else(|| {
        DomainError::malformed(format!("item #{position} of `{category}` is missing `{field}`"))
    })
}

fn parse_price(raw: Option<&Value>) -> Option<Decimal> {
    let text = match raw? {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_owned(),
        _ => return None,
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
        .filter(|price| !price.is_sign_negative())
}
