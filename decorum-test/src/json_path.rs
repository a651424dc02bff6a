//! Dotted JSON paths for assertions: `users[0].name`, `items.len()`.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    Field(String),
    Index(usize),
    /// `len()` or `size()`: the length of an array, object or string.
    Len,
}

pub fn tokenize_path(path: &str) -> Vec<PathToken> {
    fn flush(field: &mut String, tokens: &mut Vec<PathToken>) {
        if field.is_empty() {
            return;
        }
        tokens.push(match field.as_str() {
            "len()" | "size()" => PathToken::Len,
            _ => PathToken::Field(field.clone()),
        });
        field.clear();
    }

    let mut tokens = Vec::new();
    let mut field = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            '.' => flush(&mut field, &mut tokens),
            '[' => {
                flush(&mut field, &mut tokens);
                let index: String = chars.by_ref().take_while(|c| *c != ']').collect();
                let index = index
                    .trim()
                    .parse()
                    .unwrap_or_else(|_| panic!("invalid array index `{index}` in JSON path `{path}`"));
                tokens.push(PathToken::Index(index));
            }
            c => field.push(c),
        }
    }
    flush(&mut field, &mut tokens);
    tokens
}

/// Resolve `path` against `root`. Missing fields and indices resolve to
/// `null`. `len()` must be the last segment.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let mut current = root;
    for (position, token) in tokenize_path(path).iter().enumerate() {
        let next = match token {
            PathToken::Field(name) => current.get(name),
            PathToken::Index(index) => current.get(*index),
            PathToken::Len => {
                let len = match current {
                    Value::Array(items) => items.len(),
                    Value::Object(fields) => fields.len(),
                    Value::String(text) => text.len(),
                    other => panic!("len() applied to {other} at segment {position} of JSON path `{path}`"),
                };
                return Value::from(len);
            }
        };
        match next {
            Some(value) => current = value,
            None => return Value::Null,
        }
    }
    current.clone()
}
