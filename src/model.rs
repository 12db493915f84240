use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::num::NonZeroU32;

/// A fetched value, or `None` when the endpoint gave no valid response.
pub type FetchResult<T> = Option<T>;

/// Identifier of a remote user record. Always in `1..=N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(NonZeroU32);

impl UserId {
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(UserId)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Identifiers `1..=count` in increasing order.
    pub fn range(count: u32) -> impl Iterator<Item = UserId> {
        (1..=count).filter_map(UserId::new)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user record as returned by the endpoint: a JSON object with opaque fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User {
    fields: Map<String, Value>,
}

impl User {
    pub fn id(&self) -> Option<u64> {
        self.fields.get("id").and_then(Value::as_u64)
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_id_rejects_zero() {
        assert!(UserId::new(0).is_none());
        assert_eq!(UserId::new(7).map(UserId::get), Some(7));
    }

    #[test]
    fn test_range_is_increasing_and_complete() {
        let ids: Vec<u32> = UserId::range(5).map(UserId::get).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(UserId::range(0).count(), 0);
    }

    #[test]
    fn test_user_from_json_object() {
        let user: User =
            serde_json::from_value(json!({"id": 3, "name": "Clementine Bauch", "username": "Samantha"}))
                .unwrap();
        assert_eq!(user.id(), Some(3));
        assert_eq!(user.name(), Some("Clementine Bauch"));
        assert_eq!(user.field("username"), Some(&json!("Samantha")));
        assert_eq!(user.field("email"), None);
    }

    #[test]
    fn test_user_rejects_non_object() {
        assert!(serde_json::from_value::<User>(json!([1, 2, 3])).is_err());
        assert!(serde_json::from_value::<User>(json!("user")).is_err());
    }
}
