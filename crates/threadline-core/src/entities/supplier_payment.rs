//! # Supplier Payment
//!
//! Payments the merchandise manager records against a supplier.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use ts_rs::TS;

use super::{lookup_name, lookup_str, normalize_key, unknown};
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
pub struct SupplierPayment {
    pub id: i64,
    #[serde(default)]
    pub payment_no: String,
    pub amount: Money,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub supplier: Option<Named>,
    #[serde(default)]
    pub status: Option<Named>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentFacet {
    Supplier,
    Status,
}

impl FromStr for PaymentFacet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "supplier" => Ok(PaymentFacet::Supplier),
            "status" => Ok(PaymentFacet::Status),
            _ => Err(unknown("payment filter", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentSort {
    PaymentNo,
    Date,
    Amount,
    Supplier,
}

impl FromStr for PaymentSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "payment-no" | "number" => Ok(PaymentSort::PaymentNo),
            "date" | "payment-date" => Ok(PaymentSort::Date),
            "amount" => Ok(PaymentSort::Amount),
            "supplier" => Ok(PaymentSort::Supplier),
            _ => Err(unknown("payment sort key", s)),
        }
    }
}

impl Listable for SupplierPayment {
    type Facet = PaymentFacet;
    type SortKey = PaymentSort;

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.payment_no.as_str()),
            self.reference.as_deref(),
            lookup_str(&self.supplier),
        ]
    }

    fn facet_value(&self, facet: PaymentFacet) -> Option<Cow<'_, str>> {
        match facet {
            PaymentFacet::Supplier => lookup_name(&self.supplier),
            PaymentFacet::Status => lookup_name(&self.status),
        }
    }

    fn sort_value(&self, key: PaymentSort) -> SortValue {
        match key {
            PaymentSort::PaymentNo => SortValue::text(Some(self.payment_no.as_str())),
            PaymentSort::Date => {
                SortValue::text(self.payment_date.map(|d| d.to_string()).as_deref())
            }
            PaymentSort::Amount => SortValue::number(Some(self.amount.as_major())),
            PaymentSort::Supplier => SortValue::text(lookup_str(&self.supplier)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPaymentForm {
    pub payment_no: String,
    pub amount: Money,
    #[ts(type = "string | null")]
    pub payment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub supplier: Option<Ref>,
    pub status: Option<Ref>,
}

impl From<&SupplierPayment> for SupplierPaymentForm {
    fn from(p: &SupplierPayment) -> Self {
        SupplierPaymentForm {
            payment_no: p.payment_no.clone(),
            amount: p.amount,
            payment_date: p.payment_date,
            reference: p.reference.clone(),
            supplier: p.supplier.as_ref().map(Named::reference),
            status: p.status.as_ref().map(Named::reference),
        }
    }
}

pub struct SupplierPaymentSchema;

impl EntitySchema for SupplierPaymentSchema {
    const RESOURCE: &'static str = "supplier-payments";
    const LABEL: &'static str = "supplier payments";
    const SEARCH_FIELD: &'static str = "paymentNo";
    const SCREEN: Screen = Screen::SupplierPayments;

    type Record = SupplierPayment;
    type Form = SupplierPaymentForm;

    fn record_id(record: &SupplierPayment) -> i64 {
        record.id
    }

    fn new_form() -> SupplierPaymentForm {
        SupplierPaymentForm {
            payment_no: numbering::next_number(numbering::SUPPLIER_PAYMENT),
            ..SupplierPaymentForm::default()
        }
    }

    fn edit_form(record: &SupplierPayment) -> SupplierPaymentForm {
        SupplierPaymentForm::from(record)
    }

    fn prepare(form: &mut SupplierPaymentForm) {
        form.payment_no = numbering::ensure_number(&form.payment_no, numbering::SUPPLIER_PAYMENT);
    }

    fn validate(form: &SupplierPaymentForm) -> Violations {
        let mut v = Violations::new();
        v.required("Payment number", &form.payment_no);
        v.positive_amount("Amount", form.amount);
        v.selected("Payment date", &form.payment_date);
        v.selected("Supplier", &form.supplier);
        v.selected("Status", &form.status);
        v
    }
}
