#![allow(dead_code)]

use serde_json::{json, Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tradelang::domain::catalog::{FieldKind, VariantDescriptor};
use tradelang::domain::error::ValidationErrors;

pub fn instrument(ticker: &str) -> Value {
    json!({"name": ticker, "type": "equity", "ticker": ticker})
}

pub fn rsi(candletime: &str) -> Value {
    json!({
        "function": "RSI",
        "instrument": instrument("R"),
        "candletime": candletime,
        "period": 14
    })
}

pub fn market_order(ticker: &str, quantity: i64) -> Value {
    json!({
        "function": "Place Market Order",
        "exchange": "NSE",
        "instrument": instrument(ticker),
        "quantity": quantity
    })
}

pub fn greater_than(lhs: Value, rhs: Value) -> Value {
    json!({"function": ">", "args": [lhs, rhs]})
}

pub fn ifthen(condition: Value, then: Vec<Value>) -> Value {
    json!({"function": "ifthen", "if": condition, "then": then})
}

pub fn strategy(root: Value) -> Value {
    json!({"name": "S", "author": "A", "strategy": root})
}

/// `{name:"S", author:"A", strategy: if 30 > RSI then buy 12 R}`.
pub fn rsi_strategy(candletime: &str) -> Value {
    strategy(ifthen(
        greater_than(json!(30), rsi(candletime)),
        vec![market_order("R", 12)],
    ))
}

/// The smallest well-formed value for a field kind.
pub fn minimal_value(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::Expression => json!(1),
        FieldKind::Sequence { arity } => Value::Array(vec![json!(1); arity.unwrap_or(0)]),
        FieldKind::OneOf(allowed) => json!(allowed[0]),
        FieldKind::Text => json!("X"),
        FieldKind::Identifier => json!("x"),
        FieldKind::Shape(specs) => {
            let mut obj = Map::new();
            for spec in specs.iter().filter(|s| s.kind.is_required()) {
                obj.insert(spec.name.to_string(), minimal_value(&spec.kind));
            }
            Value::Object(obj)
        }
        FieldKind::Optional(inner) => minimal_value(inner),
    }
}

/// A call node carrying exactly the required fields of `descriptor`.
pub fn minimal_call(descriptor: &VariantDescriptor) -> Value {
    let mut obj = Map::new();
    obj.insert("function".to_string(), json!(descriptor.name));
    for spec in descriptor.required_fields() {
        obj.insert(spec.name.to_string(), minimal_value(&spec.kind));
    }
    Value::Object(obj)
}

pub fn paths(errors: &ValidationErrors) -> Vec<String> {
    errors.iter().map(|e| e.path.to_string()).collect()
}

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn write_document(dir: &Path, name: &str, document: &Value) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(document.to_string().as_bytes()).unwrap();
    path
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
