//! Plain-text tables and JSON output.

use anyhow::Result;
use serde::Serialize;

use threadline_client::StockAlert;
use threadline_core::cart::Cart;
use threadline_core::entities::{
    Customer, Delivery, DeliveryProvider, Employee, Order, Product, Supplier, SupplierPayment,
};
use threadline_core::{Money, Named};

/// A record that can be shown as one table row.
pub trait Row {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints rows as JSON or as an aligned table.
pub fn print_rows<T: Row + Serialize>(rows: &[&T], json: bool) -> Result<()> {
    if json {
        return print_json(rows);
    }
    let cells: Vec<Vec<String>> = rows.iter().map(|r| r.cells()).collect();
    print_table(T::HEADERS, &cells);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    print_line(headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    print_line(&rule.iter().map(String::as_str).collect::<Vec<_>>(), &widths);
    for row in rows {
        print_line(&row.iter().map(String::as_str).collect::<Vec<_>>(), &widths);
    }
    if rows.is_empty() {
        println!("(no records)");
    }
}

fn print_line(cells: &[&str], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect();
    println!("{}", padded.join("  ").trim_end());
}

fn name(value: &Option<Named>) -> String {
    value.as_ref().map(|n| n.name.clone()).unwrap_or_default()
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(T::to_string).unwrap_or_default()
}

fn active(is_active: bool) -> String {
    if is_active { "active" } else { "inactive" }.to_string()
}

// =============================================================================
// Entity rows
// =============================================================================

impl Row for Product {
    const HEADERS: &'static [&'static str] = &[
        "ID", "NO", "NAME", "CATEGORY", "COST", "PRICE", "PROFIT %", "STOCK", "STATUS",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.product_no.clone(),
            self.name.clone(),
            name(&self.category),
            self.cost_price.to_string(),
            self.selling_price.to_string(),
            self.profit_percentage
                .map(|p| format!("{p:.2}"))
                .unwrap_or_default(),
            self.quantity_in_stock.to_string(),
            active(self.is_active),
        ]
    }
}

impl Row for Employee {
    const HEADERS: &'static [&'static str] = &["ID", "NO", "NAME", "ROLE", "MOBILE", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.employee_no.clone(),
            self.full_name(),
            self.role.to_string(),
            self.mobile_number.clone(),
            self.status
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_else(|| active(self.is_active)),
        ]
    }
}

impl Row for Customer {
    const HEADERS: &'static [&'static str] =
        &["ID", "NO", "NAME", "EMAIL", "MOBILE", "PROVINCE", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.customer_no.clone(),
            self.full_name.clone(),
            self.email.clone(),
            self.mobile_number.clone(),
            name(&self.province),
            name(&self.status),
        ]
    }
}

impl Row for Order {
    const HEADERS: &'static [&'static str] = &[
        "ID", "NO", "DATE", "CUSTOMER", "PRODUCT", "QTY", "TOTAL", "STATUS",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.order_no.clone(),
            opt(&self.order_date),
            name(&self.customer),
            name(&self.product),
            self.quantity.to_string(),
            self.total_price.to_string(),
            name(&self.order_status),
        ]
    }
}

impl Row for Supplier {
    const HEADERS: &'static [&'static str] = &["ID", "NO", "NAME", "COUNTRY", "CONTACT", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.supplier_no.clone(),
            self.supplier_name.clone(),
            self.country.clone(),
            self.contact_no.clone(),
            active(self.is_active),
        ]
    }
}

impl Row for SupplierPayment {
    const HEADERS: &'static [&'static str] =
        &["ID", "NO", "DATE", "SUPPLIER", "AMOUNT", "REFERENCE", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.payment_no.clone(),
            opt(&self.payment_date),
            name(&self.supplier),
            self.amount.to_string(),
            self.reference.clone().unwrap_or_default(),
            name(&self.status),
        ]
    }
}

impl Row for DeliveryProvider {
    const HEADERS: &'static [&'static str] = &["ID", "NO", "NAME", "CONTACT", "EMAIL", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.provider_no.clone(),
            self.name.clone(),
            self.contact_no.clone(),
            self.email.clone().unwrap_or_default(),
            active(self.is_active),
        ]
    }
}

impl Row for Delivery {
    const HEADERS: &'static [&'static str] =
        &["ID", "TRACKING", "ORDER", "PROVIDER", "SHIPPED", "EXPECTED", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.tracking_no.clone(),
            self.order.map(|o| o.id.to_string()).unwrap_or_default(),
            name(&self.delivery_provider),
            opt(&self.shipped_date),
            opt(&self.expected_delivery_date),
            name(&self.status),
        ]
    }
}

impl Row for Named {
    const HEADERS: &'static [&'static str] = &["ID", "NAME"];

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone()]
    }
}

impl Row for StockAlert {
    const HEADERS: &'static [&'static str] = &["SEVERITY", "NO", "NAME", "STOCK", "REORDER AT"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.severity.to_string(),
            self.product_no.clone(),
            self.name.clone(),
            self.quantity_in_stock.to_string(),
            self.reorder_level.to_string(),
        ]
    }
}

pub fn print_cart(cart: &Cart, json: bool) -> Result<()> {
    if json {
        return print_json(cart);
    }
    let rows: Vec<Vec<String>> = cart
        .items
        .iter()
        .map(|item| {
            vec![
                item.product_id.to_string(),
                item.name.clone(),
                item.unit_price.to_string(),
                item.quantity.to_string(),
                item.line_total().to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "PRODUCT", "PRICE", "QTY", "LINE TOTAL"], &rows);
    println!();
    println!("Items: {}   Total: {}", cart.total_quantity(), cart.total());
    Ok(())
}

pub fn money_pair(label: &str, amount: Money) {
    println!("{label:<10}{amount}");
}
