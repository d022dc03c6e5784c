//! `datalayer` - storefront analytics payload engine
//!
//! Builds the tag-manager dataLayer events of an e-commerce storefront from
//! catalog, cart, order and session data. The host owns every store; the
//! engine reads them through the traits in [`store`] and returns
//! serializable payloads the host embeds in its pages or JSON responses.
//!
//! The main entry points are [`DataLayerRenderer::head_events`] for page
//! renders, [`ViewStaging`] for recording what a request showed, and
//! [`ItemEndpoints`] for the two item fetch endpoints.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod category;
pub mod config;
pub mod endpoints;
pub mod errors;
pub mod escape;
pub mod events;
pub mod item;
pub mod model;
pub mod page;
pub mod pricing;
pub mod render;
pub mod session;
pub mod staging;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

pub use config::{EngineOptions, TagManagerSettings};
pub use endpoints::ItemEndpoints;
pub use errors::{DataLayerError, DataLayerResult, EntityKind};
pub use events::{DataLayerEvent, EventAggregator};
pub use item::{CatalogItem, ItemNormalizer, ItemOptions};
pub use page::{PageRequest, PageType, View};
pub use render::DataLayerRenderer;
pub use session::{Session, SessionContext};
pub use staging::{AuthAction, ViewStaging};
pub use store::{CatalogStore, ConfigStore, OrderStore, SessionStore, Stores, TaxEngine};
