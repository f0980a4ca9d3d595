use std::collections::BTreeSet;

/// Cuisine name to business-search category aliases
///
/// Loaded once as static data and never mutated.
const CUISINE_CATEGORIES: &[(&str, &[&str])] = &[
    ("indian", &["indpak", "indian", "pakistani", "himalayan"]),
    ("chinese", &["chinese", "cantonese", "dimsum", "shanghainese", "szechuan"]),
    ("italian", &["italian", "sicilian", "sardinian", "tuscan"]),
    ("mexican", &["mexican", "tex-mex", "tacos", "newmexican"]),
    ("japanese", &["japanese", "sushi", "ramen", "teppanyaki", "izakaya"]),
    ("thai", &["thai", "laotian"]),
    ("vietnamese", &["vietnamese", "pho"]),
    ("korean", &["korean", "kbbq"]),
    ("american", &["newamerican", "tradamerican", "burgers", "diners"]),
    ("mediterranean", &["mediterranean", "greek", "lebanese", "turkish"]),
    ("middle eastern", &["mideastern", "lebanese", "turkish", "egyptian"]),
    ("french", &["french", "bistros", "provencal"]),
    ("seafood", &["seafood", "fishnchips", "raw_food"]),
    ("vegetarian", &["vegetarian", "vegan"]),
    ("bbq", &["bbq", "smokehouse"]),
    ("dessert", &["desserts", "icecream", "bakeries"]),
];

/// Normalize a cuisine name for lookup and counting
#[inline]
pub fn normalize_cuisine(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Provider categories for a single cuisine
///
/// Unknown cuisines fall back to the normalized name itself so they still
/// produce a best-effort filter.
pub fn categories_for(cuisine: &str) -> BTreeSet<String> {
    let normalized = normalize_cuisine(cuisine);

    match CUISINE_CATEGORIES.iter().find(|(name, _)| *name == normalized) {
        Some((_, aliases)) => aliases.iter().map(|a| a.to_string()).collect(),
        None => BTreeSet::from([normalized]),
    }
}

/// Union of provider categories over many cuisines
pub fn categories_for_all<I, S>(cuisines: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cuisines
        .into_iter()
        .filter(|c| !c.as_ref().trim().is_empty())
        .flat_map(|c| categories_for(c.as_ref()))
        .collect()
}
