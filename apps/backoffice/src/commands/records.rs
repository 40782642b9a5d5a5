//! Generic list/show/create/update/delete over any entity collection.
//!
//! Every command resolves to one `EntitySchema`, then runs the same code
//! through `CrudController`, so all screens share one behavior.

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::debug;

use threadline_client::RemoteCollection;
use threadline_core::entities::{
    CustomerSchema, DeliveryProviderSchema, DeliverySchema, EmployeeSchema, LookupKind,
    OrderSchema, ProductSchema, SupplierPaymentSchema, SupplierSchema,
};
use threadline_core::{EntitySchema, ListQuery, Listable, Sort};

use crate::cli::{
    CreateArgs, DeleteArgs, Entity, FieldsArgs, ListArgs, LookupArgs, SearchArgs, ShowArgs,
    UpdateArgs,
};
use crate::context::AppContext;
use crate::render::{print_json, print_rows, Row};

/// Calls `$run::<S>(..)` with `S` the schema of `$entity`.
macro_rules! with_schema {
    ($entity:expr, $run:ident ( $($arg:expr),* )) => {
        match $entity {
            Entity::Products => $run::<ProductSchema>($($arg),*).await,
            Entity::Employees => $run::<EmployeeSchema>($($arg),*).await,
            Entity::Customers => $run::<CustomerSchema>($($arg),*).await,
            Entity::Orders => $run::<OrderSchema>($($arg),*).await,
            Entity::Suppliers => $run::<SupplierSchema>($($arg),*).await,
            Entity::SupplierPayments => $run::<SupplierPaymentSchema>($($arg),*).await,
            Entity::DeliveryProviders => $run::<DeliveryProviderSchema>($($arg),*).await,
            Entity::Deliveries => $run::<DeliverySchema>($($arg),*).await,
        }
    };
}

pub async fn list(ctx: &AppContext, args: ListArgs) -> Result<()> {
    with_schema!(args.entity, list_records(ctx, &args))
}

pub async fn show(ctx: &AppContext, args: ShowArgs) -> Result<()> {
    with_schema!(args.entity, show_record(ctx, args.id))
}

pub async fn search(ctx: &AppContext, args: SearchArgs) -> Result<()> {
    with_schema!(args.entity, search_records(ctx, &args.term))
}

pub async fn create(ctx: &AppContext, args: CreateArgs) -> Result<()> {
    let patch = read_fields(&args.fields)?;
    with_schema!(args.entity, create_record(ctx, patch))
}

pub async fn update(ctx: &AppContext, args: UpdateArgs) -> Result<()> {
    let patch = read_fields(&args.fields)?;
    with_schema!(args.entity, update_record(ctx, args.id, patch))
}

pub async fn delete(ctx: &AppContext, args: DeleteArgs) -> Result<()> {
    with_schema!(args.entity, delete_record(ctx, args.id, args.yes))
}

pub async fn lookup(ctx: &AppContext, args: LookupArgs) -> Result<()> {
    let kind: LookupKind = args.kind.parse()?;
    ctx.session().require_user().await?;
    let rows = ctx.api().lookup(kind).await?;
    print_rows(&rows.iter().collect::<Vec<_>>(), ctx.json)
}

// =============================================================================
// Generic implementations
// =============================================================================

async fn list_records<S>(ctx: &AppContext, args: &ListArgs) -> Result<()>
where
    S: EntitySchema,
    S::Record: Row,
{
    ctx.session().require_view(S::SCREEN).await?;
    let query = build_query::<S::Record>(args)?;

    let mut controller = ctx.controller::<S>();
    controller.load().await?;
    let visible = controller.visible(&query);
    debug!(
        resource = S::RESOURCE,
        total = controller.records().len(),
        shown = visible.len(),
        "Listing"
    );
    print_rows(&visible, ctx.json)
}

async fn show_record<S>(ctx: &AppContext, id: i64) -> Result<()>
where
    S: EntitySchema,
    S::Record: Row,
{
    ctx.session().require_view(S::SCREEN).await?;
    let record = ctx.resource::<S>().get(id).await?;
    if ctx.json {
        print_json(&record)
    } else {
        print_rows(&[&record], false)
    }
}

async fn search_records<S>(ctx: &AppContext, term: &str) -> Result<()>
where
    S: EntitySchema,
    S::Record: Row,
{
    ctx.session().require_view(S::SCREEN).await?;
    let records = ctx.resource::<S>().search(term).await?;
    print_rows(&records.iter().collect::<Vec<_>>(), ctx.json)
}

async fn create_record<S: EntitySchema>(ctx: &AppContext, patch: Value) -> Result<()> {
    ctx.session().require_manage(S::SCREEN).await?;
    let mut controller = ctx.controller::<S>();
    let form = controller.open_create();
    *form = merge_into(form, patch)?;
    controller.submit().await?;
    println!("Created {} record", S::RESOURCE);
    Ok(())
}

async fn update_record<S: EntitySchema>(ctx: &AppContext, id: i64, patch: Value) -> Result<()> {
    ctx.session().require_manage(S::SCREEN).await?;
    let mut controller = ctx.controller::<S>();
    let record = controller.remote().get(id).await?;
    let form = controller.open_edit(record);
    *form = merge_into(form, patch)?;
    controller.submit().await?;
    println!("Updated {} {}", S::RESOURCE, id);
    Ok(())
}

async fn delete_record<S: EntitySchema>(ctx: &AppContext, id: i64, yes: bool) -> Result<()> {
    ctx.session().require_manage(S::SCREEN).await?;
    let mut controller = ctx.controller::<S>();
    let pending = controller.request_remove(id);

    if yes || confirm(&format!("Delete {} {}?", S::RESOURCE, id))? {
        controller.confirm_remove(pending).await?;
        println!("Deleted {} {}", S::RESOURCE, id);
    } else {
        controller.cancel_remove(pending);
        println!("Cancelled");
    }
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn build_query<T: Listable>(args: &ListArgs) -> Result<ListQuery<T>> {
    let mut query = ListQuery::<T>::new();
    if let Some(term) = &args.search {
        query = query.search(term.as_str());
    }
    for filter in &args.filters {
        let (facet, value) = filter
            .split_once('=')
            .ok_or_else(|| anyhow!("Filter must look like facet=value, got '{filter}'"))?;
        query = query.facet(facet.parse::<T::Facet>()?, value);
    }
    if let Some(key) = &args.sort {
        let key = key.parse::<T::SortKey>()?;
        query = query.sort_by(if args.desc {
            Sort::descending(key)
        } else {
            Sort::ascending(key)
        });
    }
    Ok(query)
}

fn read_fields(fields: &FieldsArgs) -> Result<Value> {
    let raw = match (&fields.data, &fields.file) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) => read_file(path)?,
        (None, None) => bail!("Provide --data or --file"),
    };
    let value: Value = serde_json::from_str(&raw).context("Field values must be JSON")?;
    if !value.is_object() {
        bail!("Field values must be a JSON object");
    }
    Ok(value)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Overlays the given fields onto `form`. Nested objects merge key by key.
fn merge_into<F>(form: &F, patch: Value) -> Result<F>
where
    F: serde::Serialize + serde::de::DeserializeOwned,
{
    let mut base = serde_json::to_value(form)?;
    merge(&mut base, patch);
    serde_json::from_value(base).context("Field values do not fit the form")
}

fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}
