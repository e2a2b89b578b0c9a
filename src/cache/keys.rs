//! Cache key generation

use std::fmt;

use crate::upstream::SearchField;

/// Key for one cached order search.
///
/// The authenticated user is part of the key: the same value searched by two
/// different users never shares a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub field: SearchField,
    pub value: String,
    pub user: String,
}

impl CacheKey {
    pub fn order_search(field: SearchField, value: &str, user: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
            user: user.to_string(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.field, self.value, self.user)
    }
}
