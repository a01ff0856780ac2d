//! Identifier types used across the workflow core.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier from an existing string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Create a fresh random identifier.
            #[must_use]
            pub fn fresh() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id! {
    /// Investment record identifier.
    InvestmentId
}

string_id! {
    /// Cashflow record identifier.
    CashflowId
}

string_id! {
    /// User identifier.
    UserId
}

string_id! {
    /// Company identifier.
    CompanyId
}

string_id! {
    /// Corporate group identifier.
    GroupId
}

string_id! {
    /// Notification record identifier.
    NotificationId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = InvestmentId::new("inv-1");
        assert_eq!(id.as_str(), "inv-1");
        assert_eq!(id.to_string(), "inv-1");
        assert_eq!(InvestmentId::from("inv-1"), id);
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        assert_ne!(CashflowId::fresh(), CashflowId::fresh());
    }
}
