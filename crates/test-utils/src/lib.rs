//! Quire test utilities.
//!
//! Fixture builders for integration tests: unique slugs and emails, sample
//! schemas and entry payloads, and the JSON argument objects the operation
//! API expects. Nothing here depends on the kernel.

use serde_json::{Value as JsonValue, json};
use uuid::Uuid;

/// Short random suffix for names that must be unique per test.
///
/// Taken from the random tail of a v7 UUID; the head is a timestamp.
pub fn unique_suffix() -> String {
    let id = Uuid::now_v7().simple().to_string();
    id[id.len() - 12..].to_string()
}

/// A slug unique to this call, e.g. `article-3f2a9c0d1b4e`.
pub fn unique_slug(prefix: &str) -> String {
    format!("{prefix}-{}", unique_suffix())
}

/// An email address unique to this call.
pub fn unique_email() -> String {
    format!("operator-{}@example.com", unique_suffix())
}

/// Create a content type fixture with a unique name and slug.
pub fn test_content_type(prefix: &str) -> TestContentType {
    let slug = unique_slug(prefix);
    TestContentType {
        name: format!("Type {slug}"),
        slug,
        description: None,
        schema: schemas::article(),
    }
}

/// A content type fixture.
#[derive(Debug, Clone)]
pub struct TestContentType {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub schema: JsonValue,
}

impl TestContentType {
    /// Set the name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Set the schema document.
    pub fn with_schema(mut self, schema: JsonValue) -> Self {
        self.schema = schema;
        self
    }

    /// Arguments for `createContentType`. The schema travels as JSON text.
    pub fn arguments(&self) -> JsonValue {
        let mut args = json!({
            "name": self.name,
            "slug": self.slug,
            "schema": self.schema.to_string(),
        });
        if let (Some(obj), Some(description)) = (args.as_object_mut(), &self.description) {
            obj.insert("description".to_string(), json!(description));
        }
        args
    }
}

/// Create an entry fixture with a title.
pub fn test_entry(title: &str) -> TestEntry {
    TestEntry {
        data: json!({ "title": title }),
        status: None,
    }
}

/// A content entry fixture.
#[derive(Debug, Clone)]
pub struct TestEntry {
    pub data: JsonValue,
    pub status: Option<String>,
}

impl TestEntry {
    /// Add a single data field.
    pub fn with_field(mut self, name: &str, value: JsonValue) -> Self {
        if let Some(obj) = self.data.as_object_mut() {
            obj.insert(name.to_string(), value);
        }
        self
    }

    /// Set the status.
    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    /// Arguments for `createContent` under the given content type.
    pub fn arguments(&self, type_slug: &str) -> JsonValue {
        let mut args = json!({
            "typeSlug": type_slug,
            "data": self.data.to_string(),
        });
        if let (Some(obj), Some(status)) = (args.as_object_mut(), &self.status) {
            obj.insert("status".to_string(), json!(status));
        }
        args
    }
}

/// Arguments for `register` and `login`.
pub fn credentials(email: &str, password: &str) -> JsonValue {
    json!({ "email": email, "password": password })
}

/// Build an operation request body.
pub fn operation(name: &str, arguments: JsonValue) -> JsonValue {
    json!({ "operation": name, "arguments": arguments })
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON value lacks a specific key.
    pub fn lacks_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_none(),
            "expected JSON to lack key '{key}', got: {value}"
        );
    }

    /// Assert that a response body is an error envelope of the given kind.
    pub fn error_kind(body: &Value, kind: &str) {
        assert_eq!(
            body["error"]["kind"].as_str(),
            Some(kind),
            "expected error kind '{kind}', got: {body}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "expected string to NOT contain '{needle}'\nactual: {haystack}"
        );
    }
}

/// Sample schema documents.
pub mod schemas {
    use serde_json::json;

    /// An article with a required title and optional body and tags.
    pub fn article() -> serde_json::Value {
        json!({
            "type": "object",
            "required": ["title"],
            "properties": {
                "title": {"type": "string", "maxLength": 255},
                "body": {"type": "string"},
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        })
    }

    /// A page with a title and a rich body.
    pub fn page() -> serde_json::Value {
        json!({
            "type": "object",
            "required": ["title", "body"],
            "properties": {
                "title": {"type": "string"},
                "body": {"type": "string", "format": "html"}
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn unique_values_differ() {
        assert_ne!(unique_slug("article"), unique_slug("article"));
        assert_ne!(unique_email(), unique_email());
        assert!(unique_slug("article").starts_with("article-"));
    }

    #[test]
    fn content_type_arguments_carry_schema_as_text() {
        let fixture = test_content_type("page")
            .with_name("Page")
            .with_schema(schemas::page());
        let args = fixture.arguments();

        assert_eq!(args["name"], "Page");
        let schema: JsonValue = serde_json::from_str(args["schema"].as_str().unwrap()).unwrap();
        assert_eq!(schema, schemas::page());
        assert::lacks_key(&args, "description");

        let args = fixture.with_description("Static pages").arguments();
        assert_eq!(args["description"], "Static pages");
    }

    #[test]
    fn entry_arguments() {
        let args = test_entry("Hello")
            .with_field("tags", json!(["a"]))
            .with_status("published")
            .arguments("article");

        assert_eq!(args["typeSlug"], "article");
        assert_eq!(args["status"], "published");
        let data: JsonValue = serde_json::from_str(args["data"].as_str().unwrap()).unwrap();
        assert_eq!(data, json!({"title": "Hello", "tags": ["a"]}));
    }

    #[test]
    fn operation_envelope() {
        let body = operation("login", credentials("a@x.com", "pw"));
        assert_eq!(body["operation"], "login");
        assert_eq!(body["arguments"]["email"], "a@x.com");
        assert::has_key(&body, "arguments");
    }

    #[test]
    fn error_kind_assertion() {
        let body = json!({"error": {"kind": "NOT_FOUND", "message": "not found: x"}});
        assert::error_kind(&body, "NOT_FOUND");
        assert::not_contains(body["error"]["message"].as_str().unwrap(), "password");
    }
}
