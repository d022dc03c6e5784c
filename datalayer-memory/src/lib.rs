//! In-memory storefront collaborators for the `datalayer` engine
//!
//! Every collaborator trait of the engine gets a thread-safe in-memory
//! implementation here, useful for tests, demos and development where no
//! real storefront is available. [`Storefront`] bundles them with fixture
//! helpers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod config;
mod orders;
mod session;
mod storefront;
mod taxes;

pub use catalog::InMemoryCatalog;
pub use config::InMemoryConfig;
pub use orders::InMemoryOrders;
pub use session::InMemorySession;
pub use storefront::{ProductFixture, Storefront, VariantFixture};
pub use taxes::InMemoryTaxes;
