//! Item normalization.
//!
//! Every ecommerce event carries a list of items in one canonical shape,
//! whether the item comes from the live catalog (listings, detail pages,
//! carts) or from a historical order line (payment, shipping, purchase).

use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::instrument;

use crate::category::CategoryPathResolver;
use crate::errors::{DataLayerError, DataLayerResult, EntityKind};
use crate::escape::escape_html;
use crate::model::{Country, Lang, OrderLine, Product, Variant};
use crate::page::View;
use crate::pricing::{round_price, PriceResolver, TaxContext};
use crate::store::{CatalogStore, TaxEngine};
use crate::types::{BrandId, CurrencyCode, Locale, MaxCategoryDepth};

/// Category titles of an item, root first.
///
/// Serializes as `item_category`, `item_category2`, `item_category3`, ...
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPath(Vec<String>);

impl CategoryPath {
    /// Wraps already escaped titles, root first.
    pub fn new(titles: Vec<String>) -> Self {
        Self(titles)
    }

    /// Titles, root first.
    pub fn titles(&self) -> &[String] {
        &self.0
    }

    /// Payload field name of the title at `index`.
    pub fn field_name(index: usize) -> String {
        if index == 0 {
            "item_category".to_string()
        } else {
            format!("item_category{}", index + 1)
        }
    }
}

impl Serialize for CategoryPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (index, title) in self.0.iter().enumerate() {
            map.serialize_entry(&Self::field_name(index), title)?;
        }
        map.end()
    }
}

/// Listing an item was shown in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListContext {
    /// Listing identifier
    pub item_list_id: String,
    /// Listing name
    pub item_list_name: String,
}

impl ListContext {
    /// Listing context named after the view rendering it.
    pub fn for_view(view: &View) -> Self {
        Self {
            item_list_id: view.as_str().to_string(),
            item_list_name: view.as_str().to_string(),
        }
    }
}

/// Canonical analytics item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    /// Catalog product key
    pub item_id: u64,
    /// Escaped product title
    pub item_name: String,
    /// Escaped brand title, or the store name
    pub item_brand: String,
    /// Escaped store name
    pub affiliation: String,
    /// Unit price, rounded to two places
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Currency of `price`
    pub currency: CurrencyCode,
    /// Units
    pub quantity: u32,
    /// Listing the item was shown in
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub list: Option<ListContext>,
    /// Category path
    #[serde(flatten)]
    pub categories: CategoryPath,
    /// Escaped `Attribute: Value` pairs joined with `, `
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_variant: Option<String>,
    /// Whether the default variant was used because none was given
    #[serde(skip)]
    pub is_default_variant: bool,
}

/// Optional inputs of [`ItemNormalizer::from_catalog`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemOptions<'a> {
    /// Explicit variant; the product's default variant otherwise
    pub variant: Option<&'a Variant>,
    /// Units; the variant's stock otherwise
    pub quantity: Option<u32>,
    /// Listing the item is shown in
    pub list: Option<&'a View>,
    /// Country to tax the price for; untaxed otherwise
    pub taxed_for: Option<&'a Country>,
}

/// Builds [`CatalogItem`]s from catalog products and order lines.
pub struct ItemNormalizer<'a> {
    catalog: &'a dyn CatalogStore,
    prices: PriceResolver<'a>,
    categories: CategoryPathResolver<'a>,
    affiliation: String,
}

impl<'a> ItemNormalizer<'a> {
    /// Creates a normalizer. `store_name` is the raw configured store name.
    pub fn new(
        catalog: &'a dyn CatalogStore,
        taxes: &'a dyn TaxEngine,
        store_name: &str,
        max_depth: MaxCategoryDepth,
    ) -> Self {
        Self {
            catalog,
            prices: PriceResolver::new(taxes),
            categories: CategoryPathResolver::new(catalog, max_depth),
            affiliation: escape_html(store_name),
        }
    }

    /// Item for a live catalog product.
    ///
    /// Without an explicit variant the product's default variant is used and
    /// the item never carries `item_variant`.
    #[instrument(skip(self, product, lang, options), fields(product = %product.id))]
    pub async fn from_catalog(
        &self,
        product: &Product,
        lang: &Lang,
        currency: &CurrencyCode,
        options: ItemOptions<'_>,
    ) -> DataLayerResult<CatalogItem> {
        let locale = &lang.locale;
        let categories = match product.default_category_id {
            Some(id) => self.categories.resolve_id(id, locale).await?,
            None => Vec::new(),
        };

        let default_variant;
        let (variant, is_default_variant) = match options.variant {
            Some(variant) => (variant, false),
            None => {
                default_variant = self
                    .catalog
                    .default_variant(product.id)
                    .await?
                    .ok_or_else(|| DataLayerError::not_found(EntityKind::Variant, product.id))?;
                (&default_variant, true)
            }
        };

        let tax = options.taxed_for.map(|country| TaxContext {
            country,
            rule: product.tax_rule_id,
        });
        let price = self.prices.unit_price(variant, currency, tax).await?;

        let item_variant = if is_default_variant {
            None
        } else {
            join_variant(variant.combinations.iter().map(|combination| {
                (
                    combination.attribute.title(locale),
                    combination.value.title(locale),
                )
            }))
        };

        Ok(CatalogItem {
            item_id: product.id.get(),
            item_name: escape_html(product.titles.title(locale)),
            item_brand: self.brand_title(product.brand_id, locale).await?,
            affiliation: self.affiliation.clone(),
            price,
            currency: currency.clone(),
            quantity: options.quantity.unwrap_or(variant.quantity),
            list: options.list.map(ListContext::for_view),
            categories: CategoryPath::new(categories),
            item_variant,
            is_default_variant,
        })
    }

    /// Item for a historical order line.
    ///
    /// The line's snapshotted title and price are authoritative; the catalog
    /// product is only looked up again for its key, brand and categories and
    /// may no longer exist. Taxation adds the tax amount recorded on the line
    /// instead of recomputing it.
    #[instrument(skip(self, line, lang), fields(product_ref = %line.product_ref))]
    pub async fn from_order_line(
        &self,
        line: &OrderLine,
        lang: &Lang,
        currency: &CurrencyCode,
        quantity: u32,
        taxed_for: Option<&Country>,
    ) -> DataLayerResult<CatalogItem> {
        let locale = &lang.locale;
        let product = self.catalog.product_by_ref(&line.product_ref).await?;

        let mut price = if line.was_in_promo {
            line.promo_price
        } else {
            line.price
        };
        if taxed_for.is_some() {
            price += line.tax_amount.unwrap_or_default();
        }

        let leaf = match product.as_ref().and_then(|p| p.default_category_id) {
            Some(id) => self.catalog.category(id).await?,
            None => None,
        };
        let categories = match leaf {
            Some(leaf) => self.categories.resolve(&leaf, locale).await?,
            None => Vec::new(),
        };

        let item_brand = self
            .brand_title(product.as_ref().and_then(|p| p.brand_id), locale)
            .await?;

        Ok(CatalogItem {
            item_id: product
                .as_ref()
                .map_or_else(|| leading_integer(&line.product_ref), |p| p.id.get()),
            item_name: escape_html(&line.title),
            item_brand,
            affiliation: self.affiliation.clone(),
            price: round_price(price),
            currency: currency.clone(),
            quantity,
            list: None,
            categories: CategoryPath::new(categories),
            item_variant: join_variant(
                line.attributes
                    .iter()
                    .map(|a| (a.attribute_title.as_str(), a.value_title.as_str())),
            ),
            is_default_variant: false,
        })
    }

    async fn brand_title(&self, brand_id: Option<BrandId>, locale: &Locale) -> DataLayerResult<String> {
        let brand = match brand_id {
            Some(id) => self.catalog.brand(id).await?,
            None => None,
        };
        Ok(brand.map_or_else(
            || self.affiliation.clone(),
            |brand| escape_html(brand.titles.title(locale)),
        ))
    }
}

fn join_variant<'s>(pairs: impl Iterator<Item = (&'s str, &'s str)>) -> Option<String> {
    let joined = pairs
        .map(|(attribute, value)| escape_html(&format!("{attribute}: {value}")))
        .collect::<Vec<_>>()
        .join(", ");
    (!joined.is_empty()).then_some(joined)
}

/// Integer prefix of a reference string, `0` when there is none.
fn leading_integer(reference: &str) -> u64 {
    let trimmed = reference.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .map_or(unsigned, |end| &unsigned[..end]);
    digits.parse().unwrap_or(0)
}
