use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The identifier taken from the `/books/{id}` path segment.
///
/// Forwarded to the service as a single scalar, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct BookId(pub String);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
