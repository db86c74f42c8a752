use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::{
    openapi::{ObjectBuilder, RefOr, Schema},
    ToSchema,
};

use super::book_id::BookId;

/// An opaque book payload.
///
/// The routing layer never looks inside a book. Its shape is owned by the [`BookService`](crate::service::BookService).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Book(pub serde_json::Value);

impl<'s> ToSchema<'s> for Book {
    fn schema() -> (&'s str, RefOr<Schema>) {
        (
            "Book",
            ObjectBuilder::new()
                .description(Some("Opaque book payload owned by the book service"))
                .into(),
        )
    }
}

impl Book {
    /// Reads the `id` field of the payload, if it is a string or a number.
    pub fn id(&self) -> Option<BookId> {
        match self.0.get("id")? {
            serde_json::Value::String(id) => Some(BookId(id.clone())),
            serde_json::Value::Number(id) => Some(BookId(id.to_string())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn id_reads_strings_and_numbers() {
        assert_eq!(
            Book(json!({ "id": "abc" })).id(),
            Some(BookId("abc".to_string()))
        );
        assert_eq!(Book(json!({ "id": 42 })).id(), Some(BookId("42".to_string())));
        assert_eq!(Book(json!({ "id": [1] })).id(), None);
        assert_eq!(Book(json!("just a string")).id(), None);
    }

    #[test]
    fn serializes_transparently() {
        let book = Book(json!({ "title": "Dune", "id": 1 }));

        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            json!({ "title": "Dune", "id": 1 })
        );
    }
}
