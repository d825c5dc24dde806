use serde::Serialize;

use crate::schema::{Cardinality, Field, Kind, Message};

/// How options are generated for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Strategy {
    Scalar,
    Enum,
    Repeated,
    Map,
    Message,
    OneofMember,
}

impl Strategy {
    /// Classifies `field` of `message`. The first matching rule wins.
    pub fn classify(message: &Message, field: &Field) -> Self {
        if message.oneof_of(field).map_or(false, |o| !o.synthetic) {
            return Strategy::OneofMember;
        }
        match (&field.cardinality, &field.kind) {
            (Cardinality::Map { .. }, _) => Strategy::Map,
            (Cardinality::Repeated, _) => Strategy::Repeated,
            (Cardinality::Singular, Kind::Enum(_)) => Strategy::Enum,
            (Cardinality::Singular, Kind::Message(_)) => Strategy::Message,
            (Cardinality::Singular, _) => Strategy::Scalar,
        }
    }
}
