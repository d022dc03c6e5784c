use tracing::{debug, instrument};

use super::{
    DataLayerEvent, EventAggregator, PaymentEcommerce, PurchaseAddress, PurchaseEcommerce,
    ShippingEcommerce, UserPurchase,
};
use crate::errors::DataLayerResult;
use crate::escape::escape_html;
use crate::item::CatalogItem;
use crate::model::Order;
use crate::types::OrderId;

impl EventAggregator<'_> {
    /// `add_payment_info` for a placed order. `None` when the order does not
    /// exist.
    #[instrument(skip(self))]
    pub async fn add_payment_info(&self, order_id: OrderId) -> DataLayerResult<Option<DataLayerEvent>> {
        let Some(order) = self.find_order(order_id).await? else {
            return Ok(None);
        };
        let items = self.order_items(&order).await?;
        Ok(Some(DataLayerEvent::AddPaymentInfo {
            ecommerce: PaymentEcommerce {
                currency: self.currency().clone(),
                value: order.total_amount,
                coupon: escape_html(&self.session.coupon_string()),
                payment_type: escape_html(&order.payment_module),
                items,
            },
        }))
    }

    /// `add_shipping_info` for a placed order. `None` when the order does not
    /// exist.
    #[instrument(skip(self))]
    pub async fn add_shipping_info(&self, order_id: OrderId) -> DataLayerResult<Option<DataLayerEvent>> {
        let Some(order) = self.find_order(order_id).await? else {
            return Ok(None);
        };
        let items = self.order_items(&order).await?;
        Ok(Some(DataLayerEvent::AddShippingInfo {
            ecommerce: ShippingEcommerce {
                currency: self.currency().clone(),
                value: order.total_amount,
                coupon: escape_html(&self.session.coupon_string()),
                shipping_tier: escape_html(&order.delivery_module),
                items,
            },
        }))
    }

    /// `purchase` for a placed order, with the buyer's invoice identity.
    /// `None` when the order does not exist.
    #[instrument(skip(self))]
    pub async fn purchase(&self, order_id: OrderId) -> DataLayerResult<Option<DataLayerEvent>> {
        let Some(order) = self.find_order(order_id).await? else {
            return Ok(None);
        };
        let items = self.order_items(&order).await?;
        let invoice = &order.invoice_address;

        Ok(Some(DataLayerEvent::Purchase {
            ecommerce: PurchaseEcommerce {
                transaction_id: escape_html(&order.reference),
                value: order.total_amount,
                tax: order.total_tax,
                shipping: order.postage,
                currency: self.currency().clone(),
                affiliation: self.affiliation.clone(),
                items,
            },
            user_purchase: UserPurchase {
                email: escape_html(&order.customer_email),
                address: PurchaseAddress {
                    first_name: escape_html(&invoice.first_name),
                    last_name: escape_html(&invoice.last_name),
                    address: escape_html(&invoice.street()),
                    city: escape_html(&invoice.city),
                    postal_code: escape_html(&invoice.zip_code),
                    country: invoice.country.iso_alpha2.clone(),
                },
            },
        }))
    }

    async fn find_order(&self, order_id: OrderId) -> DataLayerResult<Option<Order>> {
        let order = self.stores.orders.order(order_id).await?;
        if order.is_none() {
            debug!(order = %order_id, "order not found");
        }
        Ok(order)
    }

    /// Order lines as items taxed for the invoice country, using the tax
    /// recorded on each line.
    async fn order_items(&self, order: &Order) -> DataLayerResult<Vec<CatalogItem>> {
        let country = &order.invoice_address.country;
        let mut items = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            items.push(
                self.items
                    .from_order_line(
                        line,
                        &self.session.lang,
                        self.currency(),
                        line.quantity,
                        Some(country),
                    )
                    .await?,
            );
        }
        Ok(items)
    }
}
