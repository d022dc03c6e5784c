use datalayer::model::{Order, OrderLine, OrderLineAttribute};
use datalayer::types::OrderId;
use datalayer::DataLayerResult;
use datalayer_memory::{ProductFixture, Storefront, VariantFixture};
use rust_decimal_macros::dec;

/// Cart of the demo visitor.
pub const DEMO_CART: u64 = 1;

/// Placed order of the demo visitor.
pub const DEMO_ORDER: u64 = 1;

/// A small clothing store with one logged-in visitor holding a cart.
///
/// Catalog: `Clothing > Men > Shirts`, an `Oxford Shirt` in two sizes and a
/// mug without brand. Shirts carry 20% tax, the mug none.
pub fn demo_storefront() -> DataLayerResult<Storefront> {
    let shop = Storefront::new();

    let _ = shop.add_category(1, None, "Clothing");
    let _ = shop.add_category(2, Some(1), "Men");
    let _ = shop.add_category(3, Some(2), "Shirts");
    let _ = shop.add_brand(1, "Acme & Sons");

    let _ = shop.add_product(
        ProductFixture::new(10, "SHIRT-10", "Oxford Shirt")
            .brand(1)
            .category(3),
    );
    let _ = shop.add_product(
        ProductFixture::new(11, "MUG-11", "Coffee <Mug>")
            .category(1)
            .tax_rule(2),
    );
    let _ = shop.add_variant(
        VariantFixture::new(100, 10, dec!(29.90))
            .stock(12)
            .default_variant()
            .attribute("Size", "M"),
    );
    let _ = shop.add_variant(
        VariantFixture::new(101, 10, dec!(29.90))
            .promo(dec!(24.90))
            .stock(3)
            .attribute("Size", "L"),
    );
    let _ = shop.add_variant(
        VariantFixture::new(110, 11, dec!(9.50))
            .stock(40)
            .default_variant(),
    );
    shop.set_tax_rate(1, dec!(0.2));
    shop.set_tax_rate(2, dec!(0));

    let cart = shop.add_cart(DEMO_CART, &[(100, 2), (110, 1)]);
    shop.orders.insert_order(Order {
        id: OrderId::new(DEMO_ORDER),
        reference: "ORD-1".to_string(),
        customer_email: "ada@example.com".to_string(),
        total_amount: dec!(39.38),
        total_tax: dec!(4.98),
        postage: dec!(4.90),
        payment_module: "Cheque".to_string(),
        delivery_module: "Colissimo".to_string(),
        invoice_address: shop.address(),
        lines: vec![
            OrderLine {
                product_ref: "SHIRT-10".to_string(),
                title: "Oxford Shirt".to_string(),
                quantity: 1,
                price: dec!(29.90),
                promo_price: dec!(24.90),
                was_in_promo: true,
                tax_amount: Some(dec!(4.98)),
                attributes: vec![OrderLineAttribute {
                    attribute_title: "Size".to_string(),
                    value_title: "L".to_string(),
                }],
            },
            OrderLine {
                product_ref: "MUG-11".to_string(),
                title: "Coffee <Mug>".to_string(),
                quantity: 1,
                price: dec!(9.50),
                promo_price: dec!(9.50),
                was_in_promo: false,
                tax_amount: None,
                attributes: Vec::new(),
            },
        ],
    });

    shop.select_locale()?;
    shop.log_in("CUS-1", "ada@example.com")?;
    shop.use_cart(cart.id)?;
    shop.consume_coupons(&["WELCOME"])?;
    Ok(shop)
}
