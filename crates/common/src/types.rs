use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype.
///
/// Every identifier gets the same surface: random construction, conversion
/// from and to [`Uuid`], parsing from text and a transparent serde form.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Parses the identifier from its hyphenated text form.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identifier of a journal stream (one aggregate instance).
    AggregateId
);
uuid_id!(
    /// Identifier of a catalog product.
    ProductId
);
uuid_id!(
    /// Identifier of a catalog category.
    CategoryId
);
uuid_id!(
    /// Identifier of an already-authenticated shop user.
    UserId
);
uuid_id!(
    /// Identifier of a user's cart.
    CartId
);
uuid_id!(
    /// Identifier of a single cart entry.
    CartItemId
);
uuid_id!(
    /// Identifier of a placed order.
    OrderId
);
uuid_id!(
    /// Identifier of one order-placement attempt.
    ///
    /// The same UUID is reused as the attempt's [`ReservationToken`] and as the
    /// [`OrderId`] of the order it creates, which makes every step of the
    /// attempt addressable after a crash.
    SagaId
);
uuid_id!(
    /// Idempotency token under which the stock ledger records a committed batch.
    ReservationToken
);

impl SagaId {
    /// The stock reservation token for this attempt.
    pub fn reservation_token(&self) -> ReservationToken {
        ReservationToken(self.0)
    }

    /// The id of the order this attempt creates.
    pub fn order_id(&self) -> OrderId {
        OrderId(self.0)
    }
}

impl From<OrderId> for AggregateId {
    fn from(id: OrderId) -> Self {
        AggregateId(id.0)
    }
}

impl From<SagaId> for AggregateId {
    fn from(id: SagaId) -> Self {
        AggregateId(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(ProductId::new(), ProductId::new());
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        assert_eq!(CategoryId::from_uuid(uuid).as_uuid(), uuid);
    }

    #[test]
    fn parse_accepts_surrounding_whitespace() {
        let id = CartItemId::new();
        let parsed = CartItemId::parse(&format!("  {id} ")).unwrap();
        assert_eq!(parsed, id);
        assert!(CartItemId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn saga_id_derives_token_and_order_id() {
        let saga_id = SagaId::new();
        assert_eq!(saga_id.reservation_token().as_uuid(), saga_id.as_uuid());
        assert_eq!(saga_id.order_id().as_uuid(), saga_id.as_uuid());
        assert_eq!(AggregateId::from(saga_id).as_uuid(), saga_id.as_uuid());
    }

    #[test]
    fn ids_serialize_as_plain_uuid_strings() {
        let id = OrderId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
