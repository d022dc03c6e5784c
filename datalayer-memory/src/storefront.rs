//! A ready-made in-memory storefront for tests and demos.

use std::collections::BTreeMap;

use datalayer::config::{CONTAINER_ID_KEY, STORE_NAME_KEY};
use datalayer::errors::DataLayerResult;
use datalayer::model::{
    AttributeCombination, Brand, Cart, CartLine, Category, Country, Currency, Customer, Lang,
    OrderAddress, Product, Translations, Variant, VariantPrice,
};
use datalayer::session::{CART_ID, CONSUMED_COUPONS, CURRENT_CURRENCY, CURRENT_LANG, CUSTOMER_USER};
use datalayer::store::Stores;
use datalayer::types::{
    BrandId, CartId, CategoryId, CurrencyCode, Locale, ProductId, TaxRuleId, VariantId,
};
use rust_decimal::Decimal;

use crate::{InMemoryCatalog, InMemoryConfig, InMemoryOrders, InMemorySession, InMemoryTaxes};

/// Product to add to a [`Storefront`].
#[derive(Debug, Clone)]
pub struct ProductFixture {
    id: u64,
    reference: String,
    title: String,
    brand: Option<u64>,
    category: Option<u64>,
    tax_rule: u64,
}

impl ProductFixture {
    /// A product without brand or category, under tax rule 1.
    pub fn new(id: u64, reference: &str, title: &str) -> Self {
        Self {
            id,
            reference: reference.to_string(),
            title: title.to_string(),
            brand: None,
            category: None,
            tax_rule: 1,
        }
    }

    /// Sets the brand.
    #[must_use]
    pub fn brand(mut self, id: u64) -> Self {
        self.brand = Some(id);
        self
    }

    /// Sets the default category.
    #[must_use]
    pub fn category(mut self, id: u64) -> Self {
        self.category = Some(id);
        self
    }

    /// Sets the tax rule.
    #[must_use]
    pub fn tax_rule(mut self, id: u64) -> Self {
        self.tax_rule = id;
        self
    }
}

/// Variant to add to a [`Storefront`], priced in the store currency.
#[derive(Debug, Clone)]
pub struct VariantFixture {
    id: u64,
    product: u64,
    price: Decimal,
    promo_price: Option<Decimal>,
    stock: u32,
    is_default: bool,
    attributes: Vec<(String, String)>,
}

impl VariantFixture {
    /// A non-default variant of `product`, out of stock, without promotion.
    pub fn new(id: u64, product: u64, price: Decimal) -> Self {
        Self {
            id,
            product,
            price,
            promo_price: None,
            stock: 0,
            is_default: false,
            attributes: Vec::new(),
        }
    }

    /// Puts the variant on promotion at `price`.
    #[must_use]
    pub fn promo(mut self, price: Decimal) -> Self {
        self.promo_price = Some(price);
        self
    }

    /// Sets the units in stock.
    #[must_use]
    pub fn stock(mut self, units: u32) -> Self {
        self.stock = units;
        self
    }

    /// Makes this the product's default variant.
    #[must_use]
    pub fn default_variant(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Adds an attribute combination such as `Size: M`.
    #[must_use]
    pub fn attribute(mut self, attribute: &str, value: &str) -> Self {
        self.attributes
            .push((attribute.to_string(), value.to_string()));
        self
    }
}

/// Every in-memory collaborator wired together, with one visitor session.
///
/// Titles are registered in the storefront locale and prices in its
/// currency. The store is called `Demo Store`, has container id `GTM-DEMO1`
/// and delivers to France.
#[derive(Clone)]
pub struct Storefront {
    /// Catalog
    pub catalog: InMemoryCatalog,
    /// Carts and orders
    pub orders: InMemoryOrders,
    /// Tax engine
    pub taxes: InMemoryTaxes,
    /// Configuration table
    pub config: InMemoryConfig,
    /// The visitor's session
    pub session: InMemorySession,
    lang: Lang,
    currency: Currency,
    country: Country,
}

impl Default for Storefront {
    fn default() -> Self {
        Self::new()
    }
}

impl Storefront {
    /// An English storefront selling in euros.
    pub fn new() -> Self {
        let locale = Locale::try_new("en_US").expect("fixture locale should always be valid");
        let code = CurrencyCode::try_new("EUR").expect("fixture currency should always be valid");
        let country = Country {
            id: 64,
            iso_alpha2: "FR".to_string(),
        };
        Self::with_defaults(Lang { locale }, Currency { code }, country)
    }

    /// A storefront with the given defaults.
    pub fn with_defaults(lang: Lang, currency: Currency, country: Country) -> Self {
        let catalog = InMemoryCatalog::new();
        catalog.set_default_lang(lang.clone());
        catalog.set_default_currency(currency.clone());
        let taxes = InMemoryTaxes::new();
        taxes.set_delivery_country(country.clone());
        let config = InMemoryConfig::new();
        config.insert(STORE_NAME_KEY, "Demo Store");
        config.insert(CONTAINER_ID_KEY, "GTM-DEMO1");

        Self {
            orders: InMemoryOrders::new(catalog.clone(), taxes.clone()),
            catalog,
            taxes,
            config,
            session: InMemorySession::new(),
            lang,
            currency,
            country,
        }
    }

    /// The collaborators as the engine consumes them.
    pub fn stores(&self) -> Stores<'_> {
        Stores {
            catalog: &self.catalog,
            orders: &self.orders,
            taxes: &self.taxes,
            config: &self.config,
            session: &self.session,
        }
    }

    /// Storefront locale.
    pub const fn locale(&self) -> &Locale {
        &self.lang.locale
    }

    /// Storefront currency.
    pub const fn currency(&self) -> &CurrencyCode {
        &self.currency.code
    }

    /// Delivery country.
    pub const fn country(&self) -> &Country {
        &self.country
    }

    fn titles(&self, title: &str) -> Translations {
        Translations::new().with(self.lang.locale.clone(), title)
    }

    /// Adds a category under `parent`.
    pub fn add_category(&self, id: u64, parent: Option<u64>, title: &str) -> Category {
        let category = Category {
            id: CategoryId::new(id),
            parent: parent.map(CategoryId::new),
            titles: self.titles(title),
        };
        self.catalog.insert_category(category.clone());
        category
    }

    /// Adds a brand.
    pub fn add_brand(&self, id: u64, title: &str) -> Brand {
        let brand = Brand {
            id: BrandId::new(id),
            titles: self.titles(title),
        };
        self.catalog.insert_brand(brand.clone());
        brand
    }

    /// Adds a product and maps `<reference>.html` to it.
    pub fn add_product(&self, fixture: ProductFixture) -> Product {
        let product = Product {
            id: ProductId::new(fixture.id),
            titles: self.titles(&fixture.title),
            brand_id: fixture.brand.map(BrandId::new),
            default_category_id: fixture.category.map(CategoryId::new),
            tax_rule_id: TaxRuleId::new(fixture.tax_rule),
            reference: fixture.reference,
        };
        let url = format!("{}.html", product.reference.to_lowercase());
        self.catalog
            .insert_rewritten_url("product", &url, fixture.id);
        self.catalog.insert_product(product.clone());
        product
    }

    /// Adds a variant priced in the storefront currency.
    pub fn add_variant(&self, fixture: VariantFixture) -> Variant {
        let prices = BTreeMap::from([(
            self.currency.code.to_string(),
            VariantPrice {
                price: fixture.price,
                promo_price: fixture.promo_price.unwrap_or(fixture.price),
            },
        )]);
        let combinations = fixture
            .attributes
            .iter()
            .map(|(attribute, value)| AttributeCombination {
                attribute: self.titles(attribute),
                value: self.titles(value),
            })
            .collect();
        let variant = Variant {
            id: VariantId::new(fixture.id),
            product_id: ProductId::new(fixture.product),
            is_default: fixture.is_default,
            promo: fixture.promo_price.is_some(),
            quantity: fixture.stock,
            prices,
            combinations,
        };
        self.catalog.insert_variant(variant.clone());
        variant
    }

    /// Adds a cart in the storefront currency with `(variant, quantity)`
    /// lines.
    pub fn add_cart(&self, id: u64, lines: &[(u64, u32)]) -> Cart {
        let cart = Cart {
            id: CartId::new(id),
            currency: Some(self.currency.code.clone()),
            lines: lines
                .iter()
                .map(|&(variant, quantity)| CartLine {
                    variant_id: VariantId::new(variant),
                    quantity,
                })
                .collect(),
        };
        self.orders.insert_cart(cart.clone());
        cart
    }

    /// Sets the rate of `rule` for the delivery country.
    pub fn set_tax_rate(&self, rule: u64, rate: Decimal) {
        self.taxes
            .set_rate(TaxRuleId::new(rule), &self.country, rate);
    }

    /// An invoice address in the delivery country.
    pub fn address(&self) -> OrderAddress {
        OrderAddress {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address1: "12 rue des Lilas".to_string(),
            address2: String::new(),
            address3: String::new(),
            zip_code: "75011".to_string(),
            city: "Paris".to_string(),
            country: self.country.clone(),
        }
    }

    /// Sets the configured store name.
    pub fn set_store_name(&self, name: &str) {
        self.config.insert(STORE_NAME_KEY, name);
    }

    /// Stores a raw container id, blank to disable the integration.
    pub fn set_container_id(&self, raw: &str) {
        self.config.insert(CONTAINER_ID_KEY, raw);
    }

    /// Puts the visitor's language and currency in the session.
    pub fn select_locale(&self) -> DataLayerResult<()> {
        self.session.put(&CURRENT_LANG, &self.lang)?;
        self.session.put(&CURRENT_CURRENCY, &self.currency)
    }

    /// Makes `cart` the visitor's cart.
    pub fn use_cart(&self, cart: CartId) -> DataLayerResult<()> {
        self.session.put(&CART_ID, &cart)
    }

    /// Logs a customer in.
    pub fn log_in(&self, reference: &str, email: &str) -> DataLayerResult<()> {
        let customer = Customer {
            reference: reference.to_string(),
            email: email.to_string(),
        };
        self.session.put(&CUSTOMER_USER, &customer)
    }

    /// Records coupon codes applied to the cart.
    pub fn consume_coupons(&self, codes: &[&str]) -> DataLayerResult<()> {
        let codes: Vec<String> = codes.iter().map(ToString::to_string).collect();
        self.session.put(&CONSUMED_COUPONS, &codes)
    }
}

#[cfg(test)]
mod tests {
    use datalayer::session::{Session, SessionContext};
    use datalayer::store::{CatalogStore, OrderStore};
    use rust_decimal_macros::dec;

    use super::*;

    #[tokio::test]
    async fn products_are_reachable_by_rewritten_url() {
        let shop = Storefront::new();
        let _ = shop.add_product(ProductFixture::new(7, "SHIRT-7", "Shirt"));

        let key = shop
            .catalog
            .resolve_rewritten_url("product", "shirt-7.html")
            .await
            .unwrap();

        assert_eq!(key, Some(7));
    }

    #[tokio::test]
    async fn cart_total_sums_taxed_lines() {
        let shop = Storefront::new();
        let _ = shop.add_product(ProductFixture::new(1, "A", "A"));
        let _ = shop.add_product(ProductFixture::new(2, "B", "B").tax_rule(2));
        let _ = shop.add_variant(VariantFixture::new(10, 1, dec!(10.00)).default_variant());
        let _ = shop.add_variant(VariantFixture::new(20, 2, dec!(5.00)).promo(dec!(4.00)));
        shop.set_tax_rate(2, dec!(0.2));
        let cart = shop.add_cart(1, &[(10, 2), (20, 1)]);

        let total = shop
            .orders
            .cart_taxed_total(&cart, shop.country())
            .await
            .unwrap();

        assert_eq!(total, dec!(24.80));
    }

    #[tokio::test]
    async fn empty_session_falls_back_to_store_defaults() {
        let shop = Storefront::new();

        let context = SessionContext::resolve(Session::new(&shop.session), &shop.catalog)
            .await
            .unwrap();

        assert_eq!(context.lang.locale.as_ref(), "en_US");
        assert_eq!(context.currency.code.as_ref(), "EUR");
        assert_eq!(context.customer, None);
        assert_eq!(context.cart_id, None);
        assert_eq!(context.coupon_string(), "");
    }

    #[tokio::test]
    async fn session_helpers_populate_the_context() {
        let shop = Storefront::new();
        shop.log_in("CUS-1", "ada@example.com").unwrap();
        shop.use_cart(CartId::new(3)).unwrap();
        shop.consume_coupons(&["WELCOME", "SPRING"]).unwrap();

        let context = SessionContext::resolve(Session::new(&shop.session), &shop.catalog)
            .await
            .unwrap();

        assert_eq!(
            context.customer.as_ref().map(|c| c.reference.clone()),
            Some("CUS-1".to_string())
        );
        assert_eq!(context.cart_id, Some(CartId::new(3)));
        assert_eq!(context.coupon_string(), "WELCOME,SPRING");
    }
}
