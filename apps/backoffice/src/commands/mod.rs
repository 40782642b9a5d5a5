//! Command handlers, one module per dashboard area.
//!
//! ```text
//! account     login logout register password whoami
//! records     list show search create update delete lookup
//! alerts      alerts [--watch]
//! storefront  shop cart checkout my-orders
//! tools       profit config
//! ```

pub mod account;
pub mod alerts;
pub mod records;
pub mod storefront;
pub mod tools;
