//! Organization lookup model

use serde::{Deserialize, Serialize};

/// An organization as shown in the filter dropdown.
///
/// This is a read-only lookup record derived from the event collection;
/// the id is the join key, the name is denormalized display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}
