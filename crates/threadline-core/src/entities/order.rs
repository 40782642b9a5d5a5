//! # Order
//!
//! One order is a single product line: `totalPrice = unitPrice × quantity`,
//! always computed on the client before the body is sent.
//!
//! Storefront checkout builds orders with [`OrderForm::draft`]; the dispatch
//! officer and CEO edit them through the CRUD screens.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use ts_rs::TS;

use super::{lookup_name, lookup_str, normalize_key, unknown, ORDER_STATUS_PENDING};
use crate::calc::line_total;
use crate::error::CoreError;
use crate::money::Money;
use crate::numbering;
use crate::query::{Listable, SortValue};
use crate::schema::EntitySchema;
use crate::types::{Named, Ref, Screen};
use crate::validation::Violations;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub order_no: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub order_date: Option<NaiveDate>,
    #[serde(default)]
    pub customer: Option<Named>,
    #[serde(default)]
    pub employee: Option<Named>,
    #[serde(default)]
    pub order_status: Option<Named>,
    #[serde(default)]
    pub payment: Option<Named>,
    #[serde(default)]
    pub product: Option<Named>,
}

impl Order {
    /// Whether the order belongs to the given customer row.
    pub fn is_for_customer(&self, customer_id: i64) -> bool {
        self.customer.as_ref().is_some_and(|c| c.id == customer_id)
    }
}

// =============================================================================
// Listing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFacet {
    Status,
    Customer,
    Product,
}

impl FromStr for OrderFacet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "status" | "order-status" => Ok(OrderFacet::Status),
            "customer" => Ok(OrderFacet::Customer),
            "product" => Ok(OrderFacet::Product),
            _ => Err(unknown("order filter", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSort {
    OrderNo,
    Date,
    Total,
    Quantity,
    Status,
}

impl FromStr for OrderSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "order-no" | "number" => Ok(OrderSort::OrderNo),
            "date" | "order-date" => Ok(OrderSort::Date),
            "total" | "total-price" => Ok(OrderSort::Total),
            "quantity" => Ok(OrderSort::Quantity),
            "status" => Ok(OrderSort::Status),
            _ => Err(unknown("order sort key", s)),
        }
    }
}

impl Listable for Order {
    type Facet = OrderFacet;
    type SortKey = OrderSort;

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.order_no.as_str()),
            Some(self.shipping_address.as_str()),
            lookup_str(&self.customer),
            lookup_str(&self.product),
        ]
    }

    fn facet_value(&self, facet: OrderFacet) -> Option<Cow<'_, str>> {
        match facet {
            OrderFacet::Status => lookup_name(&self.order_status),
            OrderFacet::Customer => lookup_name(&self.customer),
            OrderFacet::Product => lookup_name(&self.product),
        }
    }

    fn sort_value(&self, key: OrderSort) -> SortValue {
        match key {
            OrderSort::OrderNo => SortValue::text(Some(self.order_no.as_str())),
            OrderSort::Date => SortValue::text(self.order_date.map(|d| d.to_string()).as_deref()),
            OrderSort::Total => SortValue::number(Some(self.total_price.as_major())),
            OrderSort::Quantity => SortValue::number(Some(self.quantity as f64)),
            OrderSort::Status => SortValue::text(lookup_str(&self.order_status)),
        }
    }
}

// =============================================================================
// Form
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderForm {
    pub order_no: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub shipping_address: String,
    #[ts(type = "string | null")]
    pub order_date: Option<NaiveDate>,
    pub customer: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<Ref>,
    pub order_status: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Ref>,
    pub product: Option<Ref>,
}

impl OrderForm {
    /// A pending storefront order for one cart line.
    pub fn draft(
        customer_id: i64,
        product_id: i64,
        unit_price: Money,
        quantity: i64,
        shipping_address: &str,
        order_date: NaiveDate,
    ) -> Self {
        let mut form = OrderForm {
            order_no: numbering::next_number(numbering::ORDER),
            quantity,
            unit_price,
            total_price: Money::zero(),
            shipping_address: shipping_address.trim().to_string(),
            order_date: Some(order_date),
            customer: Some(Ref::new(customer_id)),
            employee: None,
            order_status: Some(Ref::new(ORDER_STATUS_PENDING)),
            payment: None,
            product: Some(Ref::new(product_id)),
        };
        form.set_line(unit_price, quantity);
        form
    }

    /// Sets price and quantity and recomputes the total.
    pub fn set_line(&mut self, unit_price: Money, quantity: i64) {
        self.unit_price = unit_price;
        self.quantity = quantity;
        self.total_price = line_total(unit_price, quantity);
    }

    pub fn validate(&self) -> Violations {
        let mut v = Violations::new();
        v.required("Order number", &self.order_no);
        v.positive_quantity("Quantity", self.quantity);
        v.positive_amount("Unit price", self.unit_price);
        v.line_total("Total price", self.unit_price, self.quantity);
        v.required("Shipping address", &self.shipping_address);
        v.selected("Order date", &self.order_date);
        v.selected("Customer", &self.customer);
        v.selected("Product", &self.product);
        v.selected("Order status", &self.order_status);
        v
    }
}

impl From<&Order> for OrderForm {
    fn from(o: &Order) -> Self {
        OrderForm {
            order_no: o.order_no.clone(),
            quantity: o.quantity,
            unit_price: o.unit_price,
            total_price: o.total_price,
            shipping_address: o.shipping_address.clone(),
            order_date: o.order_date,
            customer: o.customer.as_ref().map(Named::reference),
            employee: o.employee.as_ref().map(Named::reference),
            order_status: o.order_status.as_ref().map(Named::reference),
            payment: o.payment.as_ref().map(Named::reference),
            product: o.product.as_ref().map(Named::reference),
        }
    }
}

// =============================================================================
// Schema
// =============================================================================

pub struct OrderSchema;

impl EntitySchema for OrderSchema {
    const RESOURCE: &'static str = "orders";
    const LABEL: &'static str = "orders";
    const SEARCH_FIELD: &'static str = "orderNo";
    const SCREEN: Screen = Screen::Orders;

    type Record = Order;
    type Form = OrderForm;

    fn record_id(record: &Order) -> i64 {
        record.id
    }

    fn new_form() -> OrderForm {
        OrderForm {
            order_no: numbering::next_number(numbering::ORDER),
            quantity: 1,
            order_status: Some(Ref::new(ORDER_STATUS_PENDING)),
            ..OrderForm::default()
        }
    }

    fn edit_form(record: &Order) -> OrderForm {
        OrderForm::from(record)
    }

    fn prepare(form: &mut OrderForm) {
        form.order_no = numbering::ensure_number(&form.order_no, numbering::ORDER);
        form.set_line(form.unit_price, form.quantity);
    }

    fn validate(form: &OrderForm) -> Violations {
        form.validate()
    }
}
