use serde::{Deserialize, Serialize};

/// Result of one catalog probe.
///
/// The two signals come from different layers and may disagree; that
/// disagreement is the cache desync failure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Backing store holds at least one published item
    pub products_exist: bool,
    /// Customer-facing listing query returned nothing
    pub shop_query_empty: bool,
}

impl CheckResult {
    pub fn healthy() -> Self {
        Self {
            products_exist: true,
            shop_query_empty: false,
        }
    }

    pub fn empty() -> Self {
        Self {
            products_exist: false,
            shop_query_empty: true,
        }
    }

    pub fn desync() -> Self {
        Self {
            products_exist: true,
            shop_query_empty: true,
        }
    }

    /// Items exist but the listing hides them
    pub fn is_desync(&self) -> bool {
        self.products_exist && self.shop_query_empty
    }
}
