use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw database value.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the underlying numeric value.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_type! {
    /// Unique identifier for a catalog product.
    ///
    /// Wraps the `BIGSERIAL` primary key to provide type safety and
    /// prevent mixing product ids with other numeric identifiers.
    ProductId
}

id_type! {
    /// Unique identifier for an order.
    OrderId
}

id_type! {
    /// Identifier of the customer an order belongs to.
    CustomerId
}

impl CustomerId {
    /// A zero customer id means the request never named a customer.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}
