//! # Product
//!
//! Catalog rows managed by the product and merchandise managers and browsed
//! read-only on the storefront.
//!
//! ## Price Entry Flow
//! ```text
//! cost 100.00 ──┐
//!               ├──► set_prices() ──► profitPercentage 20.00
//! selling 120 ──┘                            │
//!                                            ▼
//!                         validate(): selling > cost, stock ≥ 0, ...
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use ts_rs::TS;

use super::{active_label, lookup_name, lookup_str, normalize_key, unknown};
use crate::calc::{profit_percentage, round2, stock_severity, StockSeverity};
use crate::error::CoreError;
use crate::money::Money;
use crate::numbering;
use crate::query::{Listable, SortValue};
use crate::schema::EntitySchema;
use crate::types::{Named, Ref, Screen};
use crate::validation::Violations;

// =============================================================================
// Record
// =============================================================================

/// A catalog product as returned by `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub product_no: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cost_price: Money,
    pub selling_price: Money,
    #[serde(default)]
    pub quantity_in_stock: i64,
    #[serde(default)]
    pub reorder_level: Option<i64>,
    #[serde(default)]
    pub profit_percentage: Option<f64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub category: Option<Named>,
    #[serde(default)]
    pub supplier: Option<Named>,
}

fn default_active() -> bool {
    true
}

impl Product {
    /// Reorder urgency, or `None` when the product has no reorder level.
    pub fn severity(&self) -> Option<StockSeverity> {
        self.reorder_level
            .map(|level| stock_severity(self.quantity_in_stock, level))
    }

    /// Whether the storefront can sell it right now.
    pub fn is_available(&self) -> bool {
        self.is_active && self.quantity_in_stock > 0
    }
}

// =============================================================================
// Listing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductFacet {
    Category,
    Supplier,
    Status,
}

impl FromStr for ProductFacet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "category" => Ok(ProductFacet::Category),
            "supplier" => Ok(ProductFacet::Supplier),
            "status" => Ok(ProductFacet::Status),
            _ => Err(unknown("product filter", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Name,
    ProductNo,
    Category,
    CostPrice,
    SellingPrice,
    Stock,
    Profit,
}

impl FromStr for ProductSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "name" => Ok(ProductSort::Name),
            "product-no" | "number" => Ok(ProductSort::ProductNo),
            "category" => Ok(ProductSort::Category),
            "cost" | "cost-price" => Ok(ProductSort::CostPrice),
            "price" | "selling-price" => Ok(ProductSort::SellingPrice),
            "stock" | "quantity" => Ok(ProductSort::Stock),
            "profit" => Ok(ProductSort::Profit),
            _ => Err(unknown("product sort key", s)),
        }
    }
}

impl Listable for Product {
    type Facet = ProductFacet;
    type SortKey = ProductSort;

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.name.as_str()),
            self.description.as_deref(),
            Some(self.product_no.as_str()),
        ]
    }

    fn facet_value(&self, facet: ProductFacet) -> Option<Cow<'_, str>> {
        match facet {
            ProductFacet::Category => lookup_name(&self.category),
            ProductFacet::Supplier => lookup_name(&self.supplier),
            ProductFacet::Status => Some(active_label(self.is_active)),
        }
    }

    fn sort_value(&self, key: ProductSort) -> SortValue {
        match key {
            ProductSort::Name => SortValue::text(Some(self.name.as_str())),
            ProductSort::ProductNo => SortValue::text(Some(self.product_no.as_str())),
            ProductSort::Category => SortValue::text(lookup_str(&self.category)),
            ProductSort::CostPrice => SortValue::number(Some(self.cost_price.as_major())),
            ProductSort::SellingPrice => SortValue::number(Some(self.selling_price.as_major())),
            ProductSort::Stock => SortValue::number(Some(self.quantity_in_stock as f64)),
            ProductSort::Profit => SortValue::number(self.profit_percentage),
        }
    }
}

// =============================================================================
// Form
// =============================================================================

/// Create/update body for `/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub product_no: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cost_price: Money,
    pub selling_price: Money,
    pub quantity_in_stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reorder_level: Option<i64>,
    pub profit_percentage: Option<f64>,
    pub is_active: bool,
    pub category: Option<Ref>,
    pub supplier: Option<Ref>,
}

impl Default for ProductForm {
    fn default() -> Self {
        ProductForm {
            product_no: String::new(),
            name: String::new(),
            description: None,
            cost_price: Money::zero(),
            selling_price: Money::zero(),
            quantity_in_stock: 0,
            reorder_level: None,
            profit_percentage: None,
            is_active: true,
            category: None,
            supplier: None,
        }
    }
}

impl ProductForm {
    /// Sets both prices and refreshes the profit percentage.
    pub fn set_prices(&mut self, cost_price: Money, selling_price: Money) {
        self.cost_price = cost_price;
        self.selling_price = selling_price;
        self.refresh_profit();
    }

    pub fn set_cost_price(&mut self, cost_price: Money) {
        self.set_prices(cost_price, self.selling_price);
    }

    pub fn set_selling_price(&mut self, selling_price: Money) {
        self.set_prices(self.cost_price, selling_price);
    }

    fn refresh_profit(&mut self) {
        self.profit_percentage = profit_percentage(self.cost_price, self.selling_price).map(round2);
    }

    pub fn validate(&self) -> Violations {
        let mut v = Violations::new();
        v.required("Product number", &self.product_no);
        v.required("Product name", &self.name);
        v.selected("Category", &self.category);
        v.selected("Supplier", &self.supplier);
        v.positive_amount("Cost price", self.cost_price);
        v.exceeds("Selling price", self.selling_price, "cost price", self.cost_price);
        v.non_negative("Quantity in stock", self.quantity_in_stock);
        if let Some(level) = self.reorder_level {
            v.non_negative("Reorder level", level);
        }
        v
    }
}

impl From<&Product> for ProductForm {
    fn from(p: &Product) -> Self {
        let mut form = ProductForm {
            product_no: p.product_no.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
            cost_price: p.cost_price,
            selling_price: p.selling_price,
            quantity_in_stock: p.quantity_in_stock,
            reorder_level: p.reorder_level,
            profit_percentage: p.profit_percentage,
            is_active: p.is_active,
            category: p.category.as_ref().map(Named::reference),
            supplier: p.supplier.as_ref().map(Named::reference),
        };
        form.refresh_profit();
        form
    }
}

// =============================================================================
// Schema
// =============================================================================

pub struct ProductSchema;

impl EntitySchema for ProductSchema {
    const RESOURCE: &'static str = "products";
    const LABEL: &'static str = "products";
    const SEARCH_FIELD: &'static str = "name";
    const SCREEN: Screen = Screen::Products;

    type Record = Product;
    type Form = ProductForm;

    fn record_id(record: &Product) -> i64 {
        record.id
    }

    fn new_form() -> ProductForm {
        ProductForm {
            product_no: numbering::next_number(numbering::PRODUCT),
            ..ProductForm::default()
        }
    }

    fn edit_form(record: &Product) -> ProductForm {
        ProductForm::from(record)
    }

    fn prepare(form: &mut ProductForm) {
        form.product_no = numbering::ensure_number(&form.product_no, numbering::PRODUCT);
        form.refresh_profit();
    }

    fn validate(form: &ProductForm) -> Violations {
        form.validate()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{apply, ListQuery, Sort};

    fn filled_form() -> ProductForm {
        ProductForm {
            name: "Linen Shirt".to_string(),
            category: Some(Ref::new(1)),
            supplier: Some(Ref::new(2)),
            quantity_in_stock: 12,
            ..ProductSchema::new_form()
        }
    }

    #[test]
    fn test_new_form_has_generated_number() {
        let form = ProductSchema::new_form();
        assert!(form.product_no.starts_with("PRD"));
        assert!(form.is_active);
    }

    #[test]
    fn test_profit_autofill_and_price_rule() {
        let mut form = filled_form();
        form.set_prices(Money::from_major(100.0), Money::from_major(120.0));
        assert_eq!(form.profit_percentage, Some(20.0));
        assert!(ProductSchema::validate(&form).is_empty());

        form.set_selling_price(Money::from_major(90.0));
        assert_eq!(form.profit_percentage, Some(-10.0));
        assert_eq!(
            ProductSchema::validate(&form).joined(),
            "Selling price must exceed cost price"
        );
    }

    #[test]
    fn test_zero_cost_has_no_profit() {
        let mut form = filled_form();
        form.set_prices(Money::zero(), Money::from_major(50.0));
        assert_eq!(form.profit_percentage, None);
        assert_eq!(ProductSchema::validate(&form).joined(), "Cost price must be positive");
    }

    #[test]
    fn test_blank_form_lists_every_problem() {
        let form = ProductForm::default();
        let messages = ProductSchema::validate(&form).messages();
        assert_eq!(
            messages,
            vec![
                "Product number is required",
                "Product name is required",
                "Category is required",
                "Supplier is required",
                "Cost price must be positive",
                "Selling price must exceed cost price",
            ]
        );
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{
            "id": 7,
            "productNo": "PRD1",
            "name": "Denim Jacket",
            "costPrice": 3000,
            "sellingPrice": 4500.5,
            "quantityInStock": 4,
            "reorderLevel": 10,
            "category": { "id": 3, "categoryName": "Outerwear" }
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.selling_price.cents(), 450_050);
        assert!(product.is_active);
        assert_eq!(product.severity(), Some(StockSeverity::Low));

        let form = ProductSchema::edit_form(&product);
        let body = serde_json::to_value(&form).unwrap();
        assert_eq!(body["category"], serde_json::json!({ "id": 3 }));
        assert_eq!(body["sellingPrice"], serde_json::json!(4500.5));
        assert_eq!(body["profitPercentage"], serde_json::json!(50.02));
    }

    #[test]
    fn test_listing_by_category_and_price() {
        let products = vec![
            Product {
                id: 1,
                name: "Chinos".into(),
                selling_price: Money::from_major(40.0),
                category: Some(Named::new(1, "Bottoms")),
                is_active: true,
                ..Product::default()
            },
            Product {
                id: 2,
                name: "Linen Shirt".into(),
                description: Some("breathable summer shirt".into()),
                selling_price: Money::from_major(25.0),
                category: Some(Named::new(2, "Tops")),
                is_active: true,
                ..Product::default()
            },
            Product {
                id: 3,
                name: "Oxford".into(),
                description: Some("Button-down SHIRT".into()),
                selling_price: Money::from_major(30.0),
                category: Some(Named::new(2, "tops")),
                is_active: false,
                ..Product::default()
            },
        ];

        let q = ListQuery::<Product>::new()
            .facet("category".parse().unwrap(), "TOPS")
            .search("shirt")
            .sort_by(Sort::descending("price".parse().unwrap()));
        let ids: Vec<i64> = apply(&products, &q).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2]);

        let q = ListQuery::<Product>::new().facet(ProductFacet::Status, "inactive");
        assert_eq!(apply(&products, &q).len(), 1);
    }
}
