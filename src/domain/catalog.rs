//! Variant catalog: the field contract of every function in the language.
//!
//! Each entry maps a function name (the `function` discriminant of a node) to
//! the ordered list of fields that node must carry. Expression and sequence
//! fields are defined in terms of the recursive expression type, which is what
//! lets the validator recurse from a function call back into the dispatcher.
//!
//! `ifthen` is deliberately absent: conditionals have their own validator.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Discriminant of the conditional node.
pub const CONDITIONAL: &str = "ifthen";

pub const CANDLE_TIMES: &[&str] = &["1min", "5min", "1hour", "1day", "1week"];
pub const EXCHANGES: &[&str] = &["NSE", "BSE"];
pub const CURRENCIES: &[&str] = &["INR"];
pub const INSTRUMENT_TYPES: &[&str] = &["equity", "options", "futures"];

/// Declared shape of one field in a function's contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Expression,
    /// Ordered list of expressions; `arity` pins the exact length.
    Sequence { arity: Option<usize> },
    OneOf(&'static [&'static str]),
    Text,
    /// A string restricted to `[A-Za-z_][A-Za-z0-9_]*`, used for variable names.
    Identifier,
    /// Nested object with its own contract (e.g. an instrument).
    Shape(&'static [FieldSpec]),
    Optional(&'static FieldKind),
}

impl FieldKind {
    /// Strips any `Optional` wrapper, returning the inner kind and whether
    /// the field is required.
    pub fn unwrap_optional(&self) -> (FieldKind, bool) {
        match self {
            FieldKind::Optional(inner) => (inner.unwrap_optional().0, false),
            other => (*other, true),
        }
    }

    pub fn is_required(&self) -> bool {
        self.unwrap_optional().1
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Expression => write!(f, "expression"),
            FieldKind::Sequence { arity: None } => write!(f, "[expression, ...]"),
            FieldKind::Sequence { arity: Some(n) } => write!(f, "[expression; {}]", n),
            FieldKind::OneOf(values) => write!(f, "one of {}", values.join("|")),
            FieldKind::Text => write!(f, "string"),
            FieldKind::Identifier => write!(f, "identifier"),
            FieldKind::Shape(fields) => {
                write!(f, "{{")?;
                for (i, spec) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", spec.name, spec.kind)?;
                }
                write!(f, "}}")
            }
            FieldKind::Optional(inner) => write!(f, "optional {}", inner),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Catalog section a function belongs to; used for listing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    UserData,
    MarketData,
    Orders,
    Arithmetic,
    Logic,
    Comparison,
    Variables,
    MovingAverage,
    TrendStrength,
    Momentum,
    Volatility,
    Volume,
    MarketStructure,
    Misc,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Group::UserData => "user data",
            Group::MarketData => "market data",
            Group::Orders => "orders",
            Group::Arithmetic => "arithmetic",
            Group::Logic => "logic",
            Group::Comparison => "comparison",
            Group::Variables => "variables",
            Group::MovingAverage => "moving average",
            Group::TrendStrength => "trend strength",
            Group::Momentum => "momentum",
            Group::Volatility => "volatility",
            Group::Volume => "volume",
            Group::MarketStructure => "market structure",
            Group::Misc => "misc",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub name: &'static str,
    pub group: Group,
    pub fields: &'static [FieldSpec],
}

impl VariantDescriptor {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|spec| spec.kind.is_required())
    }
}

impl fmt::Display for VariantDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.name, self.group)?;
        for spec in self.fields {
            writeln!(f, "  {}: {}", spec.name, spec.kind)?;
        }
        Ok(())
    }
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

const fn variant(
    name: &'static str,
    group: Group,
    fields: &'static [FieldSpec],
) -> VariantDescriptor {
    VariantDescriptor {
        name,
        group,
        fields,
    }
}

const EXPR: FieldKind = FieldKind::Expression;
const OPTIONAL_EXPR: FieldKind = FieldKind::Optional(&FieldKind::Expression);
const CANDLETIME: FieldKind = FieldKind::OneOf(CANDLE_TIMES);
const EXCHANGE: FieldKind = FieldKind::OneOf(EXCHANGES);

pub const INSTRUMENT_FIELDS: &[FieldSpec] = &[
    field("name", FieldKind::Text),
    field("type", FieldKind::OneOf(INSTRUMENT_TYPES)),
    field("ticker", FieldKind::Text),
];
const INSTRUMENT: FieldKind = FieldKind::Shape(INSTRUMENT_FIELDS);

const ANY_ARGS: &[FieldSpec] = &[field("args", FieldKind::Sequence { arity: None })];
const UNARY_ARGS: &[FieldSpec] = &[field("args", FieldKind::Sequence { arity: Some(1) })];
const BINARY_ARGS: &[FieldSpec] = &[field("args", FieldKind::Sequence { arity: Some(2) })];

// instrument + candletime + period, the most common indicator contract.
const PERIOD_INDICATOR: &[FieldSpec] = &[
    field("instrument", INSTRUMENT),
    field("candletime", CANDLETIME),
    field("period", EXPR),
    field("index", OPTIONAL_EXPR),
];

// instrument + candletime + a required bar index.
const INDEXED_SERIES: &[FieldSpec] = &[
    field("instrument", INSTRUMENT),
    field("candletime", CANDLETIME),
    field("index", EXPR),
];

const FAST_SLOW_INDICATOR: &[FieldSpec] = &[
    field("instrument", INSTRUMENT),
    field("candletime", CANDLETIME),
    field("fast", EXPR),
    field("slow", EXPR),
    field("index", OPTIONAL_EXPR),
];

const STOCHASTIC_FIELDS: &[FieldSpec] = &[
    field("instrument", INSTRUMENT),
    field("candletime", CANDLETIME),
    field("k_period", EXPR),
    field("d_period", EXPR),
    field("key", FieldKind::OneOf(&["k", "d"])),
    field("index", OPTIONAL_EXPR),
];

const BAND_KEYS: &[&str] = &["high", "middle", "low"];

static FUNCTIONS: &[VariantDescriptor] = &[
    // user data
    variant(
        "Get Capital",
        Group::UserData,
        &[field("index", EXPR), field("key", FieldKind::OneOf(&["quantity"]))],
    ),
    variant(
        "Get Position",
        Group::UserData,
        &[
            field("index", EXPR),
            field("key", FieldKind::OneOf(&["entry_price", "quantity"])),
        ],
    ),
    // market data
    variant(
        "Get Order Book",
        Group::MarketData,
        &[
            field("instrument", INSTRUMENT),
            field("side", FieldKind::OneOf(&["bid", "offer"])),
            field("index", EXPR),
            field("key", FieldKind::OneOf(&["price", "quantity"])),
        ],
    ),
    variant(
        "Get Candle",
        Group::MarketData,
        &[
            field("instrument", INSTRUMENT),
            field("candletime", CANDLETIME),
            field("index", EXPR),
            field(
                "key",
                FieldKind::OneOf(&["open", "high", "low", "close", "volume"]),
            ),
        ],
    ),
    variant(
        "Get Tic",
        Group::MarketData,
        &[
            field("instrument", INSTRUMENT),
            field("index", EXPR),
            field("key", FieldKind::OneOf(&["ltp", "volume"])),
        ],
    ),
    // orders
    variant(
        "Place Market Order",
        Group::Orders,
        &[
            field("exchange", EXCHANGE),
            field("instrument", INSTRUMENT),
            field("quantity", EXPR),
        ],
    ),
    variant(
        "Place Limit Order",
        Group::Orders,
        &[
            field("exchange", EXCHANGE),
            field("instrument", INSTRUMENT),
            field("quantity", EXPR),
            field("currency", FieldKind::OneOf(CURRENCIES)),
            field("limit_price", EXPR),
        ],
    ),
    // arithmetic
    variant("+", Group::Arithmetic, ANY_ARGS),
    variant("-", Group::Arithmetic, ANY_ARGS),
    variant("*", Group::Arithmetic, ANY_ARGS),
    variant("/", Group::Arithmetic, ANY_ARGS),
    variant("^", Group::Arithmetic, BINARY_ARGS),
    variant("ABS", Group::Arithmetic, UNARY_ARGS),
    variant("MIN", Group::Arithmetic, ANY_ARGS),
    variant("MAX", Group::Arithmetic, ANY_ARGS),
    // logic
    variant("AND", Group::Logic, ANY_ARGS),
    variant("OR", Group::Logic, ANY_ARGS),
    variant("NOT", Group::Logic, UNARY_ARGS),
    // comparison
    variant(">", Group::Comparison, BINARY_ARGS),
    variant("<", Group::Comparison, BINARY_ARGS),
    variant(">=", Group::Comparison, BINARY_ARGS),
    variant("<=", Group::Comparison, BINARY_ARGS),
    variant("==", Group::Comparison, BINARY_ARGS),
    variant("!=", Group::Comparison, BINARY_ARGS),
    // variables
    variant(
        "get",
        Group::Variables,
        &[field("symbol", FieldKind::Identifier)],
    ),
    variant(
        "set",
        Group::Variables,
        &[field("symbol", FieldKind::Identifier), field("value", EXPR)],
    ),
    // moving averages
    variant("SMA", Group::MovingAverage, PERIOD_INDICATOR),
    variant(
        "EMA",
        Group::MovingAverage,
        &[
            field("instrument", INSTRUMENT),
            field("candletime", CANDLETIME),
            field("period", EXPR),
            field("smoothing", EXPR),
            field("index", OPTIONAL_EXPR),
        ],
    ),
    variant("WMA", Group::MovingAverage, PERIOD_INDICATOR),
    variant("HMA", Group::MovingAverage, PERIOD_INDICATOR),
    variant("SMMA", Group::MovingAverage, PERIOD_INDICATOR),
    variant("DEMA", Group::MovingAverage, FAST_SLOW_INDICATOR),
    variant("TEMA", Group::MovingAverage, FAST_SLOW_INDICATOR),
    variant("TRIMA", Group::MovingAverage, PERIOD_INDICATOR),
    variant("KAMA", Group::MovingAverage, PERIOD_INDICATOR),
    // trend strength
    variant("ADX", Group::TrendStrength, PERIOD_INDICATOR),
    variant("ADXR", Group::TrendStrength, PERIOD_INDICATOR),
    variant(
        "DMI",
        Group::TrendStrength,
        &[
            field("instrument", INSTRUMENT),
            field("candletime", CANDLETIME),
            field("period", EXPR),
            field("key", FieldKind::OneOf(&["plus", "minus"])),
            field("index", OPTIONAL_EXPR),
        ],
    ),
    variant(
        "Aroon",
        Group::TrendStrength,
        &[
            field("instrument", INSTRUMENT),
            field("candletime", CANDLETIME),
            field("period", EXPR),
            field("key", FieldKind::OneOf(&["up", "down"])),
            field("index", OPTIONAL_EXPR),
        ],
    ),
    variant(
        "Parabolic SAR",
        Group::TrendStrength,
        &[
            field("instrument", INSTRUMENT),
            field("candletime", CANDLETIME),
            field("step", EXPR),
            field("max_step", EXPR),
            field("index", OPTIONAL_EXPR),
        ],
    ),
    variant(
        "Ichimoku",
        Group::TrendStrength,
        &[
            field("instrument", INSTRUMENT),
            field("candletime", CANDLETIME),
            field("tenkan", EXPR),
            field("kijun", EXPR),
            field("senkou_a", EXPR),
            field("senkou_b", EXPR),
            field(
                "key",
                FieldKind::OneOf(&["tenkan", "kijun", "senkou_a", "senkou_b", "chikou"]),
            ),
            field("index", OPTIONAL_EXPR),
        ],
    ),
    // momentum
    variant("RSI", Group::Momentum, PERIOD_INDICATOR),
    variant("Stochastic", Group::Momentum, STOCHASTIC_FIELDS),
    variant("Stochastic RSI", Group::Momentum, STOCHASTIC_FIELDS),
    variant("CCI", Group::Momentum, PERIOD_INDICATOR),
    variant("ROC", Group::Momentum, PERIOD_INDICATOR),
    variant("Williams %R", Group::Momentum, PERIOD_INDICATOR),
    variant("Ultimate Oscillator", Group::Momentum, PERIOD_INDICATOR),
    variant("TRIX", Group::Momentum, PERIOD_INDICATOR),
    variant(
        "MACD",
        Group::Momentum,
        &[
            field("instrument", INSTRUMENT),
            field("candletime", CANDLETIME),
            field("fast", EXPR),
            field("slow", EXPR),
            field("signal", EXPR),
            field("key", FieldKind::OneOf(&["macd", "signal", "hist"])),
            field("index", OPTIONAL_EXPR),
        ],
    ),
    // volatility
    variant("ATR", Group::Volatility, PERIOD_INDICATOR),
    variant(
        "Bollinger Bands",
        Group::Volatility,
        &[
            field("instrument", INSTRUMENT),
            field("candletime", CANDLETIME),
            field("period", EXPR),
            field("stddev", EXPR),
            field("key", FieldKind::OneOf(BAND_KEYS)),
            field("index", OPTIONAL_EXPR),
        ],
    ),
    variant(
        "Donchian Channels",
        Group::Volatility,
        &[
            field("instrument", INSTRUMENT),
            field("candletime", CANDLETIME),
            field("period", EXPR),
            field("key", FieldKind::OneOf(&["high", "low"])),
            field("index", OPTIONAL_EXPR),
        ],
    ),
    variant(
        "Keltner Channels",
        Group::Volatility,
        &[
            field("instrument", INSTRUMENT),
            field("candletime", CANDLETIME),
            field("period", EXPR),
            field("multiplier", EXPR),
            field("key", FieldKind::OneOf(BAND_KEYS)),
            field("index", OPTIONAL_EXPR),
        ],
    ),
    // volume
    variant("OBV", Group::Volume, INDEXED_SERIES),
    variant("Chaikin Money Flow", Group::Volume, PERIOD_INDICATOR),
    variant("Accum/Dist Line", Group::Volume, INDEXED_SERIES),
    variant("Force Index", Group::Volume, PERIOD_INDICATOR),
    variant("Volume Oscillator", Group::Volume, PERIOD_INDICATOR),
    // market structure
    variant(
        "Pivot Points",
        Group::MarketStructure,
        &[
            field("instrument", INSTRUMENT),
            field("candletime", CANDLETIME),
            field("period", EXPR),
            field(
                "key",
                FieldKind::OneOf(&["pp", "r1", "r2", "r3", "s1", "s2", "s3"]),
            ),
            field("index", OPTIONAL_EXPR),
        ],
    ),
    // misc
    variant("Fair Value Gap", Group::Misc, INDEXED_SERIES),
    variant("Put Call Ratio", Group::Misc, PERIOD_INDICATOR),
    variant("Open Interest", Group::Misc, PERIOD_INDICATOR),
    variant(
        "VWAP",
        Group::Misc,
        &[
            field("instrument", INSTRUMENT),
            field("candletime", CANDLETIME),
            field("index", OPTIONAL_EXPR),
        ],
    ),
];

static CATALOG: LazyLock<HashMap<&'static str, &'static VariantDescriptor>> =
    LazyLock::new(|| FUNCTIONS.iter().map(|d| (d.name, d)).collect());

/// Resolves a function name. Names are matched exactly.
pub fn lookup(name: &str) -> Option<&'static VariantDescriptor> {
    CATALOG.get(name).copied()
}

/// All catalog entries in declaration order.
pub fn all() -> &'static [VariantDescriptor] {
    FUNCTIONS
}

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[_a-zA-Z][_a-zA-Z0-9]*$").expect("identifier pattern is a valid regex")
});

/// Variable names accepted by `get`/`set`.
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER_RE.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<&str> = all().iter().map(|d| d.name).collect();
        assert_eq!(names.len(), all().len());
        assert_eq!(CATALOG.len(), all().len());
    }

    #[test]
    fn catalog_size() {
        assert_eq!(all().len(), 64);
    }

    #[test]
    fn conditional_is_not_a_catalog_entry() {
        assert!(lookup(CONDITIONAL).is_none());
    }

    #[test]
    fn lookup_is_exact() {
        assert!(lookup("RSI").is_some());
        assert!(lookup("rsi").is_none());
        assert!(lookup(" RSI").is_none());
        assert!(lookup("Place Market Order").is_some());
    }

    #[test]
    fn comparisons_are_binary() {
        for name in [">", "<", ">=", "<=", "==", "!=", "^"] {
            let d = lookup(name).unwrap();
            assert_eq!(
                d.field("args").unwrap().kind,
                FieldKind::Sequence { arity: Some(2) },
                "{name}"
            );
        }
    }

    #[test]
    fn unary_operators() {
        for name in ["NOT", "ABS"] {
            let d = lookup(name).unwrap();
            assert_eq!(
                d.field("args").unwrap().kind,
                FieldKind::Sequence { arity: Some(1) }
            );
        }
    }

    #[test]
    fn variadic_operators() {
        for name in ["+", "-", "*", "/", "MIN", "MAX", "AND", "OR"] {
            let d = lookup(name).unwrap();
            assert_eq!(
                d.field("args").unwrap().kind,
                FieldKind::Sequence { arity: None }
            );
        }
    }

    #[test]
    fn indicators_take_optional_index() {
        let rsi = lookup("RSI").unwrap();
        let index = rsi.field("index").unwrap();
        assert_eq!(index.kind.unwrap_optional(), (FieldKind::Expression, false));
        assert_eq!(rsi.required_fields().count(), 3);

        let obv = lookup("OBV").unwrap();
        assert!(obv.field("index").unwrap().kind.is_required());
    }

    #[test]
    fn instrument_shape() {
        let order = lookup("Place Market Order").unwrap();
        match order.field("instrument").unwrap().kind {
            FieldKind::Shape(fields) => {
                let names: Vec<&str> = fields.iter().map(|f| f.name).collect();
                assert_eq!(names, vec!["name", "type", "ticker"]);
            }
            other => panic!("expected shape, got {other:?}"),
        }
    }

    #[test]
    fn identifier_rule() {
        assert!(is_identifier("entry_price"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("has space"));
        assert!(!is_identifier("dash-ed"));
        assert!(!is_identifier("entry\n"));
        assert!(!is_identifier("prix_d_entrée"));
    }

    #[test]
    fn field_kind_display() {
        assert_eq!(FieldKind::Expression.to_string(), "expression");
        assert_eq!(
            FieldKind::Sequence { arity: Some(2) }.to_string(),
            "[expression; 2]"
        );
        assert_eq!(OPTIONAL_EXPR.to_string(), "optional expression");
        assert_eq!(EXCHANGE.to_string(), "one of NSE|BSE");
        assert_eq!(
            INSTRUMENT.to_string(),
            "{name: string, type: one of equity|options|futures, ticker: string}"
        );
    }

    #[test]
    fn descriptor_display_lists_fields() {
        let text = lookup("get").unwrap().to_string();
        assert_eq!(text, "get (variables)\n  symbol: identifier\n");
    }
}
