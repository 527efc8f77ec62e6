//! Validated strategy AST.
//!
//! These types are only ever produced by the validator, so holding one means
//! the document was well-formed. They serialize back to the document's JSON
//! shape, minus any keys the catalog does not declare.

use crate::domain::catalog::CONDITIONAL;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Number;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal exactly as written, so `12` and `12.0` survive a round trip.
    Number(Number),
    Call(FunctionCall),
    Conditional(Box<Conditional>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub function: &'static str,
    /// Declared fields that were present, in catalog order.
    pub fields: Vec<(&'static str, FieldValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Expression(Box<Expression>),
    Sequence(Vec<Expression>),
    /// A member of a fixed value set.
    Choice(&'static str),
    Text(String),
    Shape(Vec<(&'static str, FieldValue)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub condition: Expression,
    /// Actions in execution order.
    pub then: Vec<Expression>,
    pub otherwise: Option<Vec<Expression>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Strategy {
    pub name: String,
    pub author: String,
    pub strategy: Conditional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    Equity,
    Options,
    Futures,
}

impl InstrumentType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "equity" => Some(InstrumentType::Equity),
            "options" => Some(InstrumentType::Options),
            "futures" => Some(InstrumentType::Futures),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentType::Equity => "equity",
            InstrumentType::Options => "options",
            InstrumentType::Futures => "futures",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Instrument {
    pub name: String,
    pub ticker: String,
    #[serde(rename = "type")]
    pub instrument_type: InstrumentType,
}

impl Instrument {
    pub fn from_shape(fields: &[(&'static str, FieldValue)]) -> Option<Self> {
        let lookup = |key: &str| fields.iter().find(|(name, _)| *name == key).map(|(_, v)| v);
        let name = lookup("name")?.as_str()?.to_string();
        let ticker = lookup("ticker")?.as_str()?.to_string();
        let instrument_type = InstrumentType::parse(lookup("type")?.as_str()?)?;
        Some(Self {
            name,
            ticker,
            instrument_type,
        })
    }
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Choice(s) => Some(*s),
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            FieldValue::Expression(expr) => Some(expr.as_ref()),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Expression]> {
        match self {
            FieldValue::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl FunctionCall {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn args(&self) -> Option<&[Expression]> {
        self.field("args")?.as_sequence()
    }

    /// The instrument this call refers to, if its contract has one.
    pub fn instrument(&self) -> Option<Instrument> {
        match self.field("instrument")? {
            FieldValue::Shape(fields) => Instrument::from_shape(fields),
            _ => None,
        }
    }
}

impl Expression {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Expression::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn function_name(&self) -> Option<&'static str> {
        match self {
            Expression::Number(_) => None,
            Expression::Call(call) => Some(call.function),
            Expression::Conditional(_) => Some(CONDITIONAL),
        }
    }

    /// Nesting depth counting this node as 1.
    pub fn depth(&self) -> usize {
        match self {
            Expression::Number(_) => 1,
            Expression::Call(call) => 1 + fields_depth(&call.fields),
            Expression::Conditional(cond) => cond.depth(),
        }
    }
}

fn fields_depth(fields: &[(&'static str, FieldValue)]) -> usize {
    fields
        .iter()
        .map(|(_, value)| match value {
            FieldValue::Expression(expr) => expr.depth(),
            FieldValue::Sequence(items) => items.iter().map(Expression::depth).max().unwrap_or(0),
            FieldValue::Shape(inner) => fields_depth(inner),
            FieldValue::Choice(_) | FieldValue::Text(_) => 0,
        })
        .max()
        .unwrap_or(0)
}

impl Strategy {
    /// Distinct instruments referenced anywhere in the tree, in document order.
    pub fn instruments(&self) -> Vec<Instrument> {
        let mut found = Vec::new();
        self.strategy.collect_instruments(&mut found);
        found
    }
}

impl Expression {
    fn collect_instruments(&self, out: &mut Vec<Instrument>) {
        match self {
            Expression::Number(_) => {}
            Expression::Call(call) => {
                if let Some(instrument) = call.instrument()
                    && !out.contains(&instrument)
                {
                    out.push(instrument);
                }
                for (_, value) in &call.fields {
                    value.collect_instruments(out);
                }
            }
            Expression::Conditional(cond) => cond.collect_instruments(out),
        }
    }
}

impl FieldValue {
    fn collect_instruments(&self, out: &mut Vec<Instrument>) {
        match self {
            FieldValue::Expression(expr) => expr.collect_instruments(out),
            FieldValue::Sequence(items) => {
                for item in items {
                    item.collect_instruments(out);
                }
            }
            FieldValue::Choice(_) | FieldValue::Text(_) | FieldValue::Shape(_) => {}
        }
    }
}

impl Conditional {
    fn collect_instruments(&self, out: &mut Vec<Instrument>) {
        self.condition.collect_instruments(out);
        for action in self.then.iter().chain(self.otherwise.iter().flatten()) {
            action.collect_instruments(out);
        }
    }

    pub fn depth(&self) -> usize {
        let branches = self
            .then
            .iter()
            .chain(self.otherwise.iter().flatten())
            .map(Expression::depth)
            .max()
            .unwrap_or(0);
        1 + self.condition.depth().max(branches)
    }
}

// --- serialization -----------------------------------------------------------

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expression::Number(n) => n.serialize(serializer),
            Expression::Call(call) => call.serialize(serializer),
            Expression::Conditional(cond) => cond.serialize(serializer),
        }
    }
}

impl Serialize for FunctionCall {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("function", self.function)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Expression(expr) => expr.serialize(serializer),
            FieldValue::Sequence(items) => items.serialize(serializer),
            FieldValue::Choice(s) => serializer.serialize_str(s),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Shape(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

impl Serialize for Conditional {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.otherwise.is_some() { 4 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("function", CONDITIONAL)?;
        map.serialize_entry("if", &self.condition)?;
        map.serialize_entry("then", &self.then)?;
        if let Some(otherwise) = &self.otherwise {
            map.serialize_entry("else", otherwise)?;
        }
        map.end()
    }
}

// --- display -----------------------------------------------------------------

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Number(n) => write!(f, "{}", n),
            Expression::Call(call) => write!(f, "{}", call),
            Expression::Conditional(cond) => write!(f, "{}", cond),
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Operators with a bare args list print as NAME(a, b).
        if let [("args", FieldValue::Sequence(args))] = self.fields.as_slice() {
            write!(f, "{}(", self.function)?;
            write_list(f, args)?;
            return write!(f, ")");
        }
        write!(f, "{}(", self.function)?;
        write_fields(f, &self.fields)?;
        write!(f, ")")
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Expression(expr) => write!(f, "{}", expr),
            FieldValue::Sequence(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            FieldValue::Choice(s) => write!(f, "{}", s),
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::Shape(fields) => {
                write!(f, "{{")?;
                write_fields(f, fields)?;
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Display for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF {} THEN [", self.condition)?;
        write_list(f, &self.then)?;
        write!(f, "]")?;
        if let Some(otherwise) = &self.otherwise {
            write!(f, " ELSE [")?;
            write_list(f, otherwise)?;
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ticker, self.instrument_type.as_str())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expression]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[(&'static str, FieldValue)]) -> fmt::Result {
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}={}", name, value)?;
    }
    Ok(())
}
