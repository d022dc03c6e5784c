//! Property test generators for catalog data.
//!
//! Available under `cfg(test)` and with the `testing` feature.

use proptest::collection::SizeRange;
use proptest::prelude::*;

use crate::model::{AttributeCombination, Category, Translations};
use crate::types::{CategoryId, CurrencyCode, Locale};

/// Generates valid locales such as `fr` or `en_US`.
pub fn arb_locale() -> impl Strategy<Value = Locale> {
    "[a-z]{2}(_[A-Z]{2})?".prop_filter_map("Invalid Locale", |s| Locale::try_new(s).ok())
}

/// Generates valid currency codes.
pub fn arb_currency_code() -> impl Strategy<Value = CurrencyCode> {
    "[A-Z]{3}".prop_filter_map("Invalid CurrencyCode", |s| CurrencyCode::try_new(s).ok())
}

/// Generates titles mixing text with markup characters and references.
pub fn arb_title() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-zA-Z0-9 éà]{1,8}",
            Just("&".to_string()),
            Just("<".to_string()),
            Just(">".to_string()),
            Just("\"".to_string()),
            Just("'".to_string()),
            Just("&amp;".to_string()),
            Just("&#039;".to_string()),
        ],
        0..8,
    )
    .prop_map(|parts| parts.concat())
}

/// Generates a category chain of `1..=max_len` categories, root first, each
/// one the parent of the next. Ids start at `first_id`.
pub fn arb_category_chain(
    locale: Locale,
    first_id: u64,
    max_len: usize,
) -> impl Strategy<Value = Vec<Category>> {
    prop::collection::vec(arb_title(), 1..=max_len).prop_map(move |titles| {
        let mut parent = None;
        titles
            .into_iter()
            .zip(first_id..)
            .map(|(title, id)| {
                let id = CategoryId::new(id);
                let category = Category {
                    id,
                    parent,
                    titles: Translations::new().with(locale.clone(), title),
                };
                parent = Some(id);
                category
            })
            .collect()
    })
}

/// Generates `size` attribute combinations with titles in `locale`.
pub fn arb_combinations(
    locale: Locale,
    size: impl Into<SizeRange>,
) -> impl Strategy<Value = Vec<AttributeCombination>> {
    prop::collection::vec((arb_title(), arb_title()), size).prop_map(move |pairs| {
        pairs
            .into_iter()
            .map(|(attribute, value)| AttributeCombination {
                attribute: Translations::new().with(locale.clone(), attribute),
                value: Translations::new().with(locale.clone(), value),
            })
            .collect()
    })
}
