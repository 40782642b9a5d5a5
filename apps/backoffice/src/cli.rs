//! Command-line surface of the `threadline` binary.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use threadline_core::Screen;

#[derive(Debug, Parser)]
#[command(
    name = "threadline",
    about = "Threadline back office and storefront client",
    version
)]
pub struct Cli {
    /// Configuration file (defaults to threadline.toml in the config dir).
    #[arg(long, global = true, env = "THREADLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print records as pretty JSON instead of tables.
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session.
    Login(LoginArgs),
    /// Forget the stored session.
    Logout,
    /// Create a customer account.
    Register(RegisterArgs),
    /// Change the signed-in user's password.
    Password(PasswordArgs),
    /// Show the signed-in user and their dashboard.
    Whoami,

    /// List records with optional search, filters and ordering.
    List(ListArgs),
    /// Fetch one record.
    Show(ShowArgs),
    /// Server-side partial-match search.
    Search(SearchArgs),
    /// Create a record from JSON field values.
    Create(CreateArgs),
    /// Update a record with JSON field values.
    Update(UpdateArgs),
    /// Delete a record after confirmation.
    Delete(DeleteArgs),
    /// Print a read-only lookup table.
    Lookup(LookupArgs),

    /// Products below their reorder level.
    Alerts(AlertsArgs),

    /// Storefront catalogue.
    Shop,
    /// Storefront cart.
    #[command(subcommand)]
    Cart(CartCommand),
    /// Place one order per cart line.
    Checkout(CheckoutArgs),
    /// Orders placed by the signed-in customer.
    MyOrders,

    /// Profit percentage for a cost/selling pair.
    Profit(ProfitArgs),
    /// Inspect or write the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long, env = "THREADLINE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub full_name: String,
    /// Birth date as YYYY-MM-DD.
    #[arg(long)]
    pub date_of_birth: Option<chrono::NaiveDate>,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub nic: String,
    #[arg(long)]
    pub mobile: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub zip_code: String,
    /// Province id from `threadline lookup provinces`.
    #[arg(long)]
    pub province: Option<i64>,
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub confirm_password: String,
}

#[derive(Debug, Args)]
pub struct PasswordArgs {
    #[arg(long)]
    pub current: String,
    #[arg(long)]
    pub new: String,
    #[arg(long)]
    pub confirm: String,
}

// =============================================================================
// Records
// =============================================================================

/// Entity collections managed through the dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Entity {
    Products,
    Employees,
    Customers,
    Orders,
    Suppliers,
    SupplierPayments,
    DeliveryProviders,
    Deliveries,
}

impl Entity {
    pub fn screen(&self) -> Screen {
        match self {
            Entity::Products => Screen::Products,
            Entity::Employees => Screen::Employees,
            Entity::Customers => Screen::Customers,
            Entity::Orders => Screen::Orders,
            Entity::Suppliers => Screen::Suppliers,
            Entity::SupplierPayments => Screen::SupplierPayments,
            Entity::DeliveryProviders => Screen::DeliveryProviders,
            Entity::Deliveries => Screen::Deliveries,
        }
    }
}

#[derive(Debug, Args)]
pub struct ListArgs {
    pub entity: Entity,
    /// Case-insensitive substring match over the searchable columns.
    #[arg(long, short)]
    pub search: Option<String>,
    /// Facet filter as `facet=value`, repeatable (e.g. `category=Tops`).
    #[arg(long = "filter", short = 'f', value_name = "FACET=VALUE")]
    pub filters: Vec<String>,
    /// Sort key (e.g. `name`, `price`, `stock`).
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending.
    #[arg(long, action = ArgAction::SetTrue)]
    pub desc: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub entity: Entity,
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub entity: Entity,
    pub term: String,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    pub entity: Entity,
    #[command(flatten)]
    pub fields: FieldsArgs,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub entity: Entity,
    pub id: i64,
    #[command(flatten)]
    pub fields: FieldsArgs,
}

/// Field values as a JSON object, inline or from a file.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct FieldsArgs {
    /// e.g. `'{"name":"Linen Shirt","costPrice":100,"sellingPrice":120}'`
    #[arg(long)]
    pub data: Option<String>,
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub entity: Entity,
    pub id: i64,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y', action = ArgAction::SetTrue)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// categories, provinces, statuses or order-statuses
    pub kind: String,
}

// =============================================================================
// Alerts, storefront, tools
// =============================================================================

#[derive(Debug, Args)]
pub struct AlertsArgs {
    /// Keep polling and print every change until interrupted.
    #[arg(long, action = ArgAction::SetTrue)]
    pub watch: bool,
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    Show,
    Add {
        product_id: i64,
        #[arg(default_value_t = 1)]
        quantity: i64,
    },
    Set {
        product_id: i64,
        quantity: i64,
    },
    Remove {
        product_id: i64,
    },
    Clear,
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub address: String,
}

#[derive(Debug, Args)]
pub struct ProfitArgs {
    #[arg(long)]
    pub cost: threadline_core::Money,
    #[arg(long)]
    pub selling: threadline_core::Money,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Write the effective configuration to the config file.
    Init,
}
