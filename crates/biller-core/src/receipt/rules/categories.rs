//! Category canonicalization.

use crate::models::bill::Category;
use crate::models::config::CategoryPolicy;

/// Resolve free-form category text to a canonical category.
///
/// Returns `None` when nothing matches; callers drop the item rather than
/// guessing a category.
pub fn resolve_category(text: &str, policy: CategoryPolicy) -> Option<Category> {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    match policy {
        CategoryPolicy::Exact => Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized),
        CategoryPolicy::Fuzzy => Category::ALL.into_iter().find(|c| {
            let name = c.as_str();
            name.contains(normalized.as_str()) || normalized.contains(name)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exact_policy() {
        assert_eq!(resolve_category("grocery", CategoryPolicy::Exact), Some(Category::Grocery));
        assert_eq!(resolve_category(" Clothing ", CategoryPolicy::Exact), Some(Category::Clothing));
        assert_eq!(resolve_category("MISCELLANEOUS", CategoryPolicy::Exact), Some(Category::Miscellaneous));
        assert_eq!(resolve_category("grocery items", CategoryPolicy::Exact), None);
        assert_eq!(resolve_category("electronics", CategoryPolicy::Exact), None);
    }

    #[test]
    fn test_fuzzy_policy() {
        assert_eq!(resolve_category("grocery items", CategoryPolicy::Fuzzy), Some(Category::Grocery));
        assert_eq!(resolve_category("util", CategoryPolicy::Fuzzy), None);
        assert_eq!(resolve_category("utensil/tools", CategoryPolicy::Fuzzy), Some(Category::Utensil));
        assert_eq!(resolve_category("misc", CategoryPolicy::Fuzzy), Some(Category::Miscellaneous));
        assert_eq!(resolve_category("electronics", CategoryPolicy::Fuzzy), None);
    }

    #[test]
    fn test_plural_fails_under_both_policies() {
        // "groceries" neither contains nor is contained in "grocery".
        assert_eq!(resolve_category("groceries", CategoryPolicy::Exact), None);
        assert_eq!(resolve_category("groceries", CategoryPolicy::Fuzzy), None);
    }

    #[test]
    fn test_empty_never_matches() {
        assert_eq!(resolve_category("", CategoryPolicy::Fuzzy), None);
        assert_eq!(resolve_category("   ", CategoryPolicy::Exact), None);
    }

    #[test]
    fn test_fuzzy_checks_canonical_order() {
        // Both "grocery" and "clothing" are contained; the first in canonical order wins.
        assert_eq!(
            resolve_category("clothing or grocery", CategoryPolicy::Fuzzy),
            Some(Category::Grocery)
        );
    }
}
