//! Small builders for the OpenAPI fragments each module contributes.

use serde_json::{json, Map, Value};

/// `$ref` to a schema under `#/components/schemas`.
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

pub fn array_of(item: Value) -> Value {
    json!({ "type": "array", "items": item })
}

/// JSON response entry for `description` carrying `schema`.
pub fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

/// Error response entry that uses the shared error envelope.
pub fn error_response(description: &str) -> Value {
    json_response(description, schema_ref("ErrorResponse"))
}

pub fn path_param(name: &str, ty: &str) -> Value {
    json!({ "name": name, "in": "path", "required": true, "schema": { "type": ty } })
}

pub fn query_param(name: &str, ty: &str, required: bool) -> Value {
    json!({ "name": name, "in": "query", "required": required, "schema": { "type": ty } })
}

/// The four query parameters of every `/page` route.
pub fn page_params() -> Vec<Value> {
    vec![
        query_param("pageNumber", "integer", true),
        query_param("pageSize", "integer", true),
        query_param("sortDirection", "string", false),
        query_param("sortProperty", "string", false),
    ]
}

pub fn json_body(schema: Value) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema } }
    })
}

/// A single operation object.
pub struct Operation {
    inner: Map<String, Value>,
    responses: Map<String, Value>,
}

impl Operation {
    pub fn new(summary: &str, tag: &str) -> Self {
        let mut inner = Map::new();
        inner.insert("summary".into(), json!(summary));
        inner.insert("tags".into(), json!([tag]));
        Self {
            inner,
            responses: Map::new(),
        }
    }

    pub fn params(mut self, params: Vec<Value>) -> Self {
        self.inner.insert("parameters".into(), Value::Array(params));
        self
    }

    pub fn body(mut self, schema: Value) -> Self {
        self.inner.insert("requestBody".into(), json_body(schema));
        self
    }

    pub fn response(mut self, status: &str, response: Value) -> Self {
        self.responses.insert(status.into(), response);
        self
    }

    pub fn build(mut self) -> Value {
        self.inner
            .insert("responses".into(), Value::Object(self.responses));
        Value::Object(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_collects_parameters_and_responses() {
        let op = Operation::new("Get genre", "Genres")
            .params(vec![path_param("id", "integer")])
            .response("200", json_response("Genre", schema_ref("Genre")))
            .response("404", error_response("Genre not found"))
            .build();

        assert_eq!(op["tags"][0], "Genres");
        assert_eq!(op["parameters"][0]["in"], "path");
        assert_eq!(
            op["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Genre"
        );
        assert!(op["responses"]["404"].is_object());
    }
}
