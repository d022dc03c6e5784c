//! Page head orchestration.
//!
//! On every full page render the host asks [`DataLayerRenderer`] for the
//! events to push before the tag-manager loader. The renderer decides which
//! aggregators run for the view, consumes staged signals, and keeps the
//! emission order stable.

use tracing::{debug, info, instrument};

use crate::config::{EngineOptions, TagManagerSettings};
use crate::errors::DataLayerResult;
use crate::events::{DataLayerEvent, EventAggregator};
use crate::page::{PageRequest, View};
use crate::session::{Session, SessionContext};
use crate::staging::ViewStaging;
use crate::store::Stores;

/// Assembles the dataLayer events of a page head.
pub struct DataLayerRenderer<'a> {
    stores: Stores<'a>,
    options: EngineOptions,
}

impl<'a> DataLayerRenderer<'a> {
    /// Creates a renderer over the host stores.
    pub const fn new(stores: Stores<'a>, options: EngineOptions) -> Self {
        Self { stores, options }
    }

    /// Staging bound to the visitor's session, for recording views and
    /// authentication outcomes.
    pub fn staging(&self) -> ViewStaging<'a> {
        ViewStaging::new(Session::new(self.stores.session))
    }

    /// Events to push for `request`, in emission order:
    ///
    /// 1. `thelia_page_view`
    /// 2. `view_item_list` on listing views with a staged listing
    /// 3. `view_item` on product views with a staged product; any other view
    ///    drops a staged product so it cannot surface on a later product page
    /// 4. `thelia_auth_success` when an authentication is staged
    /// 5. `view_cart` and `begin_checkout` on the delivery step
    /// 6. `purchase`, `add_payment_info` and `add_shipping_info` on the
    ///    order confirmation
    ///
    /// Nothing is emitted, and nothing staged is consumed, while no
    /// container id is configured.
    #[instrument(skip(self, request), fields(view = %request.view))]
    pub async fn head_events(&self, request: &PageRequest) -> DataLayerResult<Vec<DataLayerEvent>> {
        let settings = TagManagerSettings::new(self.stores.config);
        if settings.container_id().await?.is_none() {
            debug!("no container id configured");
            return Ok(Vec::new());
        }

        let store_name = settings.store_name().await?;
        let session =
            SessionContext::resolve(Session::new(self.stores.session), self.stores.catalog).await?;
        let staging = self.staging();
        let aggregator = EventAggregator::new(self.stores, &session, &store_name, &self.options);
        let view = &request.view;

        let mut events = vec![aggregator.page_view(request).await?];

        match view {
            View::Category | View::Brand | View::Search => {
                events.extend(aggregator.view_item_list(&staging, view).await?);
                staging.discard_item().await?;
            }
            View::Product => events.extend(aggregator.view_item(&staging).await?),
            View::Index
            | View::Content
            | View::Folder
            | View::Cart
            | View::OrderDelivery
            | View::OrderPlaced
            | View::Account
            | View::AccountOrders
            | View::AccountUpdate
            | View::AccountAddress
            | View::Other(_) => staging.discard_item().await?,
        }
        events.extend(aggregator.auth_success(&staging).await?);

        match view {
            View::OrderDelivery => {
                let country = self.stores.taxes.delivery_country().await?;
                events.extend(aggregator.view_cart(&country).await?);
                events.extend(aggregator.begin_checkout(&country).await?);
            }
            View::OrderPlaced => {
                if let Some(order_id) = request.order_id {
                    events.extend(aggregator.purchase(order_id).await?);
                    events.extend(aggregator.add_payment_info(order_id).await?);
                    events.extend(aggregator.add_shipping_info(order_id).await?);
                }
            }
            View::Index
            | View::Product
            | View::Category
            | View::Brand
            | View::Content
            | View::Folder
            | View::Search
            | View::Cart
            | View::Account
            | View::AccountOrders
            | View::AccountUpdate
            | View::AccountAddress
            | View::Other(_) => {}
        }

        info!(count = events.len(), "dataLayer events assembled");
        Ok(events)
    }
}
