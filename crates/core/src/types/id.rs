//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. The backend issues
//! opaque string identifiers, so every ID wraps a `String`.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use iwb_core::define_id;
/// define_id!(TicketId);
/// define_id!(InvoiceId);
///
/// let ticket = TicketId::new("abc123");
/// assert_eq!(ticket.as_str(), "abc123");
///
/// // These are different types, so this won't compile:
/// // let _: InvoiceId = ticket;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

define_id!(QueryId);
define_id!(UserId);

impl UserId {
    /// Identifier used when no shopper is signed in.
    pub const GUEST: &'static str = "guest";

    /// The guest user.
    #[must_use]
    pub fn guest() -> Self {
        Self::new(Self::GUEST)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::guest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_serde() {
        let id = QueryId::new("65f1c0ffee");
        assert_eq!(id.to_string(), "65f1c0ffee");
        assert_eq!(
            serde_json::to_string(&id).expect("serialize"),
            "\"65f1c0ffee\""
        );
    }

    #[test]
    fn test_user_id_defaults_to_guest() {
        assert_eq!(UserId::default().as_str(), "guest");
    }
}
