//! # Deliveries and Delivery Providers
//!
//! Managed by the dispatch officer.
//!
//! ```text
//! Order ──► Delivery (TRK…) ──► DeliveryProvider (DLP…)
//!              │
//!              └── shipped ≤ expected delivery date
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use ts_rs::TS;

use super::{active_label, lookup_name, lookup_str, normalize_key, unknown};
use crate::error::CoreError;
use crate::numbering;
use crate::query::{Listable, SortValue};
use crate::schema::EntitySchema;
use crate::types::{Named, Ref, Screen};
use crate::validation::Violations;

// =============================================================================
// Delivery Provider
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryProvider {
    pub id: i64,
    #[serde(default)]
    pub provider_no: String,
    #[serde(alias = "providerName")]
    pub name: String,
    #[serde(default)]
    pub contact_no: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFacet {
    Status,
}

impl FromStr for ProviderFacet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "status" => Ok(ProviderFacet::Status),
            _ => Err(unknown("provider filter", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSort {
    Name,
    ProviderNo,
}

impl FromStr for ProviderSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "name" => Ok(ProviderSort::Name),
            "provider-no" | "number" => Ok(ProviderSort::ProviderNo),
            _ => Err(unknown("provider sort key", s)),
        }
    }
}

impl Listable for DeliveryProvider {
    type Facet = ProviderFacet;
    type SortKey = ProviderSort;

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.name.as_str()),
            Some(self.provider_no.as_str()),
            Some(self.contact_no.as_str()),
            self.email.as_deref(),
        ]
    }

    fn facet_value(&self, facet: ProviderFacet) -> Option<Cow<'_, str>> {
        match facet {
            ProviderFacet::Status => Some(active_label(self.is_active)),
        }
    }

    fn sort_value(&self, key: ProviderSort) -> SortValue {
        match key {
            ProviderSort::Name => SortValue::text(Some(self.name.as_str())),
            ProviderSort::ProviderNo => SortValue::text(Some(self.provider_no.as_str())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryProviderForm {
    pub provider_no: String,
    pub name: String,
    pub contact_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub is_active: bool,
}

impl Default for DeliveryProviderForm {
    fn default() -> Self {
        DeliveryProviderForm {
            provider_no: String::new(),
            name: String::new(),
            contact_no: String::new(),
            email: None,
            is_active: true,
        }
    }
}

pub struct DeliveryProviderSchema;

impl EntitySchema for DeliveryProviderSchema {
    const RESOURCE: &'static str = "delivery-providers";
    const LABEL: &'static str = "delivery providers";
    const SEARCH_FIELD: &'static str = "name";
    const SCREEN: Screen = Screen::DeliveryProviders;

    type Record = DeliveryProvider;
    type Form = DeliveryProviderForm;

    fn record_id(record: &DeliveryProvider) -> i64 {
        record.id
    }

    fn new_form() -> DeliveryProviderForm {
        DeliveryProviderForm {
            provider_no: numbering::next_number(numbering::DELIVERY_PROVIDER),
            ..DeliveryProviderForm::default()
        }
    }

    fn edit_form(p: &DeliveryProvider) -> DeliveryProviderForm {
        DeliveryProviderForm {
            provider_no: p.provider_no.clone(),
            name: p.name.clone(),
            contact_no: p.contact_no.clone(),
            email: p.email.clone(),
            is_active: p.is_active,
        }
    }

    fn prepare(form: &mut DeliveryProviderForm) {
        form.provider_no =
            numbering::ensure_number(&form.provider_no, numbering::DELIVERY_PROVIDER);
    }

    fn validate(form: &DeliveryProviderForm) -> Violations {
        let mut v = Violations::new();
        v.required("Provider number", &form.provider_no);
        v.required("Provider name", &form.name);
        v.mobile_number("Contact number", &form.contact_no);
        v.optional_email("Email", form.email.as_deref());
        v
    }
}

// =============================================================================
// Delivery
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: i64,
    #[serde(default)]
    pub tracking_no: String,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub shipped_date: Option<NaiveDate>,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<Named>,
    /// Only the id of the nested order is used.
    #[serde(default)]
    pub order: Option<Ref>,
    #[serde(default)]
    pub delivery_provider: Option<Named>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFacet {
    Status,
    Provider,
}

impl FromStr for DeliveryFacet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "status" => Ok(DeliveryFacet::Status),
            "provider" | "delivery-provider" => Ok(DeliveryFacet::Provider),
            _ => Err(unknown("delivery filter", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliverySort {
    TrackingNo,
    ShippedDate,
    ExpectedDate,
    Status,
}

impl FromStr for DeliverySort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "tracking-no" | "number" => Ok(DeliverySort::TrackingNo),
            "shipped" | "shipped-date" => Ok(DeliverySort::ShippedDate),
            "expected" | "expected-delivery-date" => Ok(DeliverySort::ExpectedDate),
            "status" => Ok(DeliverySort::Status),
            _ => Err(unknown("delivery sort key", s)),
        }
    }
}

impl Listable for Delivery {
    type Facet = DeliveryFacet;
    type SortKey = DeliverySort;

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.tracking_no.as_str()),
            lookup_str(&self.delivery_provider),
            lookup_str(&self.status),
        ]
    }

    fn facet_value(&self, facet: DeliveryFacet) -> Option<Cow<'_, str>> {
        match facet {
            DeliveryFacet::Status => lookup_name(&self.status),
            DeliveryFacet::Provider => lookup_name(&self.delivery_provider),
        }
    }

    fn sort_value(&self, key: DeliverySort) -> SortValue {
        let date = |d: Option<NaiveDate>| SortValue::text(d.map(|d| d.to_string()).as_deref());
        match key {
            DeliverySort::TrackingNo => SortValue::text(Some(self.tracking_no.as_str())),
            DeliverySort::ShippedDate => date(self.shipped_date),
            DeliverySort::ExpectedDate => date(self.expected_delivery_date),
            DeliverySort::Status => SortValue::text(lookup_str(&self.status)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryForm {
    pub tracking_no: String,
    #[ts(type = "string | null")]
    pub shipped_date: Option<NaiveDate>,
    #[ts(type = "string | null")]
    pub expected_delivery_date: Option<NaiveDate>,
    pub status: Option<Ref>,
    pub order: Option<Ref>,
    pub delivery_provider: Option<Ref>,
}

pub struct DeliverySchema;

impl EntitySchema for DeliverySchema {
    const RESOURCE: &'static str = "deliveries";
    const LABEL: &'static str = "deliveries";
    const SEARCH_FIELD: &'static str = "trackingNo";
    const SCREEN: Screen = Screen::Deliveries;

    type Record = Delivery;
    type Form = DeliveryForm;

    fn record_id(record: &Delivery) -> i64 {
        record.id
    }

    fn new_form() -> DeliveryForm {
        DeliveryForm {
            tracking_no: numbering::next_number(numbering::TRACKING),
            ..DeliveryForm::default()
        }
    }

    fn edit_form(d: &Delivery) -> DeliveryForm {
        DeliveryForm {
            tracking_no: d.tracking_no.clone(),
            shipped_date: d.shipped_date,
            expected_delivery_date: d.expected_delivery_date,
            status: d.status.as_ref().map(Named::reference),
            order: d.order,
            delivery_provider: d.delivery_provider.as_ref().map(Named::reference),
        }
    }

    /// A blank tracking number is generated rather than reported.
    fn prepare(form: &mut DeliveryForm) {
        form.tracking_no = numbering::ensure_number(&form.tracking_no, numbering::TRACKING);
    }

    fn validate(form: &DeliveryForm) -> Violations {
        let mut v = Violations::new();
        v.selected("Order", &form.order);
        v.selected("Delivery provider", &form.delivery_provider);
        v.selected("Status", &form.status);
        v.selected("Shipped date", &form.shipped_date);
        v.not_before(
            "Expected delivery date",
            form.expected_delivery_date,
            "shipped date",
            form.shipped_date,
        );
        v
    }
}
