//! Structural validation of strategy documents.
//!
//! The walk is a three-way dispatch over JSON nodes: a bare number is a
//! literal, an object whose `function` is `ifthen` goes to the conditional
//! validator, and an object naming a catalog entry goes to the function-call
//! validator. Both of those call back into the dispatcher for every child.
//! Failures are pushed into one [`ErrorCollector`] and never abort the walk,
//! so a single call reports every defect in the document, in depth-first,
//! left-to-right order.

use crate::domain::catalog::{self, FieldKind, FieldSpec, VariantDescriptor, CONDITIONAL};
use crate::domain::collector::ErrorCollector;
use crate::domain::error::{ErrorKind, FieldPath, PathSegment, ValidationErrors};
use crate::domain::expression::{Conditional, Expression, FieldValue, FunctionCall, Strategy};
use crate::domain::policy::Policy;
use serde_json::{Map, Value};
use tracing::{debug, trace};

const CONDITIONAL_FIELDS: &[&str] = &["function", "if", "then", "else"];
const STRATEGY_FIELDS: &[&str] = &["name", "author", "strategy"];

#[derive(Debug, Clone, Default)]
pub struct Validator {
    policy: Policy,
}

impl Validator {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Validates a whole strategy document: `{name, author, strategy}` where
    /// `strategy` must itself be a conditional.
    pub fn validate_strategy(&self, document: &Value) -> Result<Strategy, ValidationErrors> {
        let mut walk = Walk::new(&self.policy);
        let strategy = walk.strategy(document);
        let result = walk.errors.finish(strategy);
        match &result {
            Ok(strategy) => debug!(
                name = %strategy.name,
                depth = strategy.strategy.depth(),
                "strategy document is valid"
            ),
            Err(errors) => debug!(errors = errors.len(), "strategy document rejected"),
        }
        result
    }

    /// Validates a standalone expression (any of literal, call, conditional).
    pub fn validate_expression(&self, node: &Value) -> Result<Expression, ValidationErrors> {
        let mut walk = Walk::new(&self.policy);
        let expression = walk.expression(node, 1);
        walk.errors.finish(expression)
    }
}

struct Walk<'p> {
    policy: &'p Policy,
    errors: ErrorCollector,
    /// Location of the node being visited.
    path: FieldPath,
}

impl<'p> Walk<'p> {
    fn new(policy: &'p Policy) -> Self {
        Self {
            policy,
            errors: ErrorCollector::new(),
            path: FieldPath::root(),
        }
    }

    fn descend<R>(&mut self, segment: PathSegment, visit: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(segment);
        let result = visit(self);
        self.path.pop();
        result
    }

    fn field<R>(&mut self, name: &str, visit: impl FnOnce(&mut Self) -> R) -> R {
        self.descend(PathSegment::Field(name.to_string()), visit)
    }

    fn index<R>(&mut self, index: usize, visit: impl FnOnce(&mut Self) -> R) -> R {
        self.descend(PathSegment::Index(index), visit)
    }

    fn report(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(self.path.clone(), kind, message);
    }

    fn strategy(&mut self, document: &Value) -> Option<Strategy> {
        let Value::Object(obj) = document else {
            self.report(
                ErrorKind::WrongTopLevelShape,
                format!("expected a strategy object, found {}", describe(document)),
            );
            return None;
        };

        let name = self.required_string(obj, "name");
        let author = self.required_string(obj, "author");

        let strategy = self.field("strategy", |walk| match obj.get("strategy") {
            None => {
                walk.missing("strategy");
                None
            }
            Some(Value::Object(node)) if is_conditional(node) => walk.conditional(node, 1),
            Some(other) => {
                walk.report(
                    ErrorKind::WrongTopLevelShape,
                    format!(
                        "strategy root must be an `{}` conditional, found {}",
                        CONDITIONAL,
                        describe_node(other)
                    ),
                );
                None
            }
        });

        self.unexpected_fields(obj, STRATEGY_FIELDS.iter().copied());

        Some(Strategy {
            name: name?,
            author: author?,
            strategy: strategy?,
        })
    }

    fn required_string(&mut self, obj: &Map<String, Value>, key: &str) -> Option<String> {
        self.field(key, |walk| match obj.get(key) {
            None => {
                walk.missing(key);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                walk.wrong_type("a string", other);
                None
            }
        })
    }

    /// The dispatcher.
    fn expression(&mut self, node: &Value, depth: usize) -> Option<Expression> {
        if depth > self.policy.max_depth {
            self.report(
                ErrorKind::RecursionLimitExceeded,
                format!("expression nesting exceeds the limit of {}", self.policy.max_depth),
            );
            return None;
        }
        trace!(path = %self.path, depth, "dispatching node");

        match node {
            Value::Number(n) => Some(Expression::Number(n.clone())),
            Value::Object(obj) => match obj.get("function") {
                None => {
                    self.field("function", |walk| walk.missing("function"));
                    None
                }
                Some(Value::String(name)) if name == CONDITIONAL => self
                    .conditional(obj, depth)
                    .map(|cond| Expression::Conditional(Box::new(cond))),
                Some(Value::String(name)) => match catalog::lookup(name) {
                    Some(descriptor) => self.call(descriptor, obj, depth).map(Expression::Call),
                    None => {
                        self.report(
                            ErrorKind::UnknownFunction,
                            format!("unknown function '{}'", name),
                        );
                        None
                    }
                },
                Some(other) => {
                    self.field("function", |walk| walk.wrong_type("a function name", other));
                    None
                }
            },
            other => {
                self.wrong_type("a number or an expression object", other);
                None
            }
        }
    }

    fn conditional(&mut self, obj: &Map<String, Value>, depth: usize) -> Option<Conditional> {
        let condition = self.field("if", |walk| match obj.get("if") {
            None => {
                walk.missing("if");
                None
            }
            Some(node) => walk.expression(node, depth + 1),
        });

        let then = self.field("then", |walk| match obj.get("then") {
            None => {
                walk.missing("then");
                None
            }
            Some(value) => walk.branch(value, depth),
        });

        // Absent `else` is fine; a failed one must still fail the node.
        let otherwise = match obj.get("else") {
            None => Some(None),
            Some(value) => self.field("else", |walk| walk.branch(value, depth)).map(Some),
        };

        self.unexpected_fields(obj, CONDITIONAL_FIELDS.iter().copied());

        Some(Conditional {
            condition: condition?,
            then: then?,
            otherwise: otherwise?,
        })
    }

    fn branch(&mut self, value: &Value, depth: usize) -> Option<Vec<Expression>> {
        let Value::Array(items) = value else {
            self.wrong_type("an array", value);
            return None;
        };
        if items.is_empty() && !self.policy.allow_empty_branches {
            self.report(
                ErrorKind::ArrayLengthMismatch,
                "expected at least 1 action, found 0",
            );
            return None;
        }
        self.elements(items, depth)
    }

    fn call(
        &mut self,
        descriptor: &'static VariantDescriptor,
        obj: &Map<String, Value>,
        depth: usize,
    ) -> Option<FunctionCall> {
        let fields = self.fields(descriptor.fields, obj, depth);
        let declared = std::iter::once("function").chain(descriptor.fields.iter().map(|f| f.name));
        self.unexpected_fields(obj, declared);
        Some(FunctionCall {
            function: descriptor.name,
            fields: fields?,
        })
    }

    /// Validates every declared field in catalog order. Undeclared keys are
    /// left to [`Walk::unexpected_fields`].
    fn fields(
        &mut self,
        specs: &'static [FieldSpec],
        obj: &Map<String, Value>,
        depth: usize,
    ) -> Option<Vec<(&'static str, FieldValue)>> {
        let mark = self.errors.mark();
        let mut values = Vec::with_capacity(specs.len());

        for spec in specs {
            let (kind, required) = spec.kind.unwrap_optional();
            match obj.get(spec.name) {
                None if required => self.field(spec.name, |walk| walk.missing(spec.name)),
                None => {}
                Some(value) => {
                    let parsed = self.field(spec.name, |walk| walk.field_value(kind, value, depth));
                    if let Some(v) = parsed {
                        values.push((spec.name, v));
                    }
                }
            }
        }

        if self.errors.failed_since(mark) {
            None
        } else {
            Some(values)
        }
    }

    fn field_value(&mut self, kind: FieldKind, value: &Value, depth: usize) -> Option<FieldValue> {
        match kind {
            FieldKind::Expression => self
                .expression(value, depth + 1)
                .map(|expr| FieldValue::Expression(Box::new(expr))),
            FieldKind::Sequence { arity } => {
                let Value::Array(items) = value else {
                    self.wrong_type("an array", value);
                    return None;
                };
                if let Some(expected) = arity
                    && items.len() != expected
                {
                    self.report(
                        ErrorKind::ArrayLengthMismatch,
                        format!(
                            "expected exactly {} element(s), found {}",
                            expected,
                            items.len()
                        ),
                    );
                    return None;
                }
                self.elements(items, depth).map(FieldValue::Sequence)
            }
            FieldKind::OneOf(allowed) => {
                let Value::String(s) = value else {
                    self.wrong_type("a string", value);
                    return None;
                };
                match allowed.iter().find(|candidate| **candidate == s.as_str()) {
                    Some(choice) => Some(FieldValue::Choice(*choice)),
                    None => {
                        self.report(
                            ErrorKind::EnumValueNotAllowed,
                            format!("'{}' is not one of {}", s, allowed.join(", ")),
                        );
                        None
                    }
                }
            }
            FieldKind::Text => match value {
                Value::String(s) => Some(FieldValue::Text(s.clone())),
                other => {
                    self.wrong_type("a string", other);
                    None
                }
            },
            FieldKind::Identifier => match value {
                Value::String(s) if catalog::is_identifier(s) => Some(FieldValue::Text(s.clone())),
                Value::String(s) => {
                    self.report(
                        ErrorKind::WrongFieldType,
                        format!("expected an identifier, found '{}'", s),
                    );
                    None
                }
                other => {
                    self.wrong_type("an identifier", other);
                    None
                }
            },
            FieldKind::Shape(specs) => {
                let Value::Object(obj) = value else {
                    self.wrong_type("an object", value);
                    return None;
                };
                let fields = self.fields(specs, obj, depth);
                self.unexpected_fields(obj, specs.iter().map(|f| f.name));
                fields.map(FieldValue::Shape)
            }
            FieldKind::Optional(inner) => self.field_value(*inner, value, depth),
        }
    }

    fn elements(&mut self, items: &[Value], depth: usize) -> Option<Vec<Expression>> {
        let mark = self.errors.mark();
        let mut elements = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if let Some(expr) = self.index(i, |walk| walk.expression(item, depth + 1)) {
                elements.push(expr);
            }
        }
        if self.errors.failed_since(mark) {
            None
        } else {
            Some(elements)
        }
    }

    /// In strict mode, reports keys outside `declared`. `serde_json::Map`
    /// iterates in key order, which keeps the report deterministic.
    fn unexpected_fields<'a>(
        &mut self,
        obj: &Map<String, Value>,
        declared: impl Iterator<Item = &'a str> + Clone,
    ) {
        if !self.policy.strict {
            return;
        }
        for key in obj.keys() {
            if !declared.clone().any(|d| d == key) {
                self.field(key, |walk| {
                    walk.report(
                        ErrorKind::UnexpectedField,
                        format!("field '{}' is not part of this contract", key),
                    )
                });
            }
        }
    }

    fn missing(&mut self, key: &str) {
        self.report(
            ErrorKind::MissingRequiredField,
            format!("missing required field '{}'", key),
        );
    }

    fn wrong_type(&mut self, expected: &str, found: &Value) {
        self.report(
            ErrorKind::WrongFieldType,
            format!("expected {}, found {}", expected, describe(found)),
        );
    }
}

fn is_conditional(obj: &Map<String, Value>) -> bool {
    matches!(obj.get("function"), Some(Value::String(name)) if name == CONDITIONAL)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn describe_node(value: &Value) -> String {
    match value {
        Value::Object(obj) => match obj.get("function") {
            Some(Value::String(name)) => format!("function '{}'", name),
            _ => "an object without a function".to_string(),
        },
        other => describe(other).to_string(),
    }
}
