use crate::errors::FieldError;
use crate::helpers::pagination::Pagination;
use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

pub struct JsonResponseBuilder<T> {
    item: Option<T>,
    items: Option<Vec<T>>,
    pagination: Option<Pagination>,
    meta: Option<Value>,
}

impl<T> Default for JsonResponseBuilder<T> {
    fn default() -> Self {
        Self {
            item: None,
            items: None,
            pagination: None,
            meta: None,
        }
    }
}

impl<T> JsonResponseBuilder<T>
where
    T: Serialize,
{
    pub fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub fn set_list(mut self, list: Vec<T>) -> Self {
        self.items = Some(list);
        self
    }

    pub fn set_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn set_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    fn into_body(self, message: String) -> JsonResponse<T> {
        JsonResponse {
            message,
            item: self.item,
            items: self.items,
            pagination: self.pagination,
            meta: self.meta,
        }
    }

    pub fn ok<S: Into<String>>(self, msg: S) -> HttpResponse {
        HttpResponse::Ok().json(self.into_body(msg.into()))
    }

    pub fn created<S: Into<String>>(self, msg: S) -> HttpResponse {
        HttpResponse::Created().json(self.into_body(msg.into()))
    }
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    pub fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder::default()
    }
}

pub fn error_body(msg: &str) -> Value {
    json!({ "error": msg })
}

/// Flattens the nested serde_valid error tree into dotted field paths.
pub fn validation_errors(errors: &serde_valid::validation::Errors) -> Vec<FieldError> {
    let tree = serde_json::to_value(errors).unwrap_or(Value::Null);
    let mut out = vec![];
    collect(&tree, "", &mut out);
    out
}

fn collect(node: &Value, path: &str, out: &mut Vec<FieldError>) {
    // leaf fields serialize as a bare list of messages
    if let Some(messages) = node.as_array() {
        push_messages(messages, path, out);
        return;
    }
    let Some(object) = node.as_object() else {
        return;
    };

    if let Some(messages) = object.get("errors").and_then(Value::as_array) {
        push_messages(messages, path, out);
    }

    if let Some(properties) = object.get("properties").and_then(Value::as_object) {
        for (name, child) in properties {
            let child_path = if path.is_empty() {
                name.clone()
            } else {
                format!("{path}.{name}")
            };
            collect(child, &child_path, out);
        }
    }

    if let Some(items) = object.get("items").and_then(Value::as_object) {
        for (index, child) in items {
            collect(child, &format!("{path}[{index}]"), out);
        }
    }
}

fn push_messages(messages: &[Value], path: &str, out: &mut Vec<FieldError>) {
    let field = if path.is_empty() {
        "body".to_string()
    } else {
        path.to_string()
    };
    for message in messages {
        let message = match message {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out.push(FieldError {
            field: field.clone(),
            message,
        });
    }
}
