/*!
The canonical JSON form of the AST, used for cross-tool interchange.

The format is bit-exact and externally owned, so values are built and
inspected by hand rather than derived: field spellings such as `compliment`
and the inverted sense of `isChar` (true for *Unicode*) are part of the wire
format.

Parsing is lenient: a regex body (or anchor) may be given as a bare tagged
operator, a toplevel-entry object, or an array of entries, and the toplevel
booleans default to `false`. Emission is canonical, so
`emit(parse(emit(parse(X)))) == emit(parse(X))` for every `X` that parses.
*/

use std::fmt;

use brex_unicode::ranges::CharRange;
use serde_json::{json, Map, Value};

use crate::ast::{Alphabet, Regex, RegexComponent, RegexKind, RegexOpt, ToplevelEntry};

/// A malformed regex JSON document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonError {
    pub msg: String,
}

impl JsonError {
    fn new(msg: impl Into<String>) -> Self {
        JsonError { msg: msg.into() }
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid regex JSON: {}", self.msg)
    }
}

impl std::error::Error for JsonError {}

/// Emits a regex in the canonical JSON shape.
pub fn emit_regex(re: &Regex) -> Value {
    json!({
        "isPath": re.kind == RegexKind::Path,
        "isChar": re.alphabet == Alphabet::Unicode,
        "preanchor": re.pre_anchor.as_ref().map(emit_entry).unwrap_or(Value::Null),
        "postanchor": re.post_anchor.as_ref().map(emit_entry).unwrap_or(Value::Null),
        "re": emit_component(&re.root),
    })
}

fn emit_component(root: &RegexComponent) -> Value {
    match root {
        RegexComponent::Single(e) => emit_entry(e),
        RegexComponent::AllOf(es) => Value::Array(es.iter().map(emit_entry).collect()),
    }
}

fn emit_entry(e: &ToplevelEntry) -> Value {
    json!({
        "isNegated": e.negated,
        "isFrontCheck": e.front_check,
        "isBackCheck": e.back_check,
        "opt": emit_opt(&e.opt),
    })
}

/// Emits one operator node as a tagged object.
pub fn emit_opt(opt: &RegexOpt) -> Value {
    match opt {
        RegexOpt::Literal { codes, unicode } => json!({
            "tag": "LiteralOpt",
            "charcodes": codes,
            "isunicode": unicode,
        }),
        RegexOpt::CharRange {
            complemented,
            ranges,
            unicode,
        } => json!({
            "tag": "CharRangeOpt",
            "compliment": complemented,
            "isunicode": unicode,
            "range": ranges
                .iter()
                .map(|r| json!({"lb": r.low, "ub": r.high}))
                .collect::<Vec<_>>(),
        }),
        RegexOpt::Dot => json!({"tag": "CharClassDotOpt"}),
        RegexOpt::NamedRef { name } => json!({"tag": "NamedRegexOpt", "rname": name}),
        RegexOpt::EnvRef { name } => json!({"tag": "EnvRegexOpt", "ename": name}),
        RegexOpt::Star(r) => json!({"tag": "StarRepeatOpt", "repeat": emit_opt(r)}),
        RegexOpt::Plus(r) => json!({"tag": "PlusRepeatOpt", "repeat": emit_opt(r)}),
        RegexOpt::Range { low, high, opt } => json!({
            "tag": "RangeRepeatOpt",
            "low": low,
            "high": high.map(Value::from).unwrap_or(Value::Null),
            "repeat": emit_opt(opt),
        }),
        RegexOpt::Optional(r) => json!({"tag": "OptionalOpt", "opt": emit_opt(r)}),
        RegexOpt::AnyOf(opts) => json!({
            "tag": "AnyOfOpt",
            "opts": opts.iter().map(emit_opt).collect::<Vec<_>>(),
        }),
        RegexOpt::Sequence(opts) => json!({
            "tag": "SequenceOpt",
            "regexs": opts.iter().map(emit_opt).collect::<Vec<_>>(),
        }),
        RegexOpt::Negate(r) => json!({"tag": "NegateOpt", "opt": emit_opt(r)}),
        RegexOpt::AllOf(opts) => json!({
            "tag": "AllOfOpt",
            "musts": opts.iter().map(emit_opt).collect::<Vec<_>>(),
        }),
    }
}

/// Parses a regex from its JSON form.
pub fn parse_regex(v: &Value) -> Result<Regex, JsonError> {
    let obj = v
        .as_object()
        .ok_or_else(|| JsonError::new("regex must be an object"))?;

    let is_path = opt_bool(obj, "isPath")?;
    let is_char = opt_bool(obj, "isChar")?;
    let pre_anchor = match obj.get("preanchor") {
        None | Some(Value::Null) => None,
        Some(v) => Some(parse_entry(v)?),
    };
    let post_anchor = match obj.get("postanchor") {
        None | Some(Value::Null) => None,
        Some(v) => Some(parse_entry(v)?),
    };
    let root = match obj.get("re") {
        None | Some(Value::Null) => return Err(JsonError::new("missing `re`")),
        Some(Value::Array(items)) => {
            let entries = items
                .iter()
                .map(parse_entry)
                .collect::<Result<Vec<_>, _>>()?;
            if entries.is_empty() {
                return Err(JsonError::new("`re` array must not be empty"));
            }
            RegexComponent::AllOf(entries)
        }
        Some(v) => RegexComponent::Single(parse_entry(v)?),
    };

    Ok(Regex {
        kind: if is_path {
            RegexKind::Path
        } else {
            RegexKind::Std
        },
        alphabet: if is_char {
            Alphabet::Unicode
        } else {
            Alphabet::Ascii
        },
        pre_anchor,
        root,
        post_anchor,
    })
}

/// An entry is either a toplevel object or a bare tagged operator.
fn parse_entry(v: &Value) -> Result<ToplevelEntry, JsonError> {
    let obj = v
        .as_object()
        .ok_or_else(|| JsonError::new("entry must be an object"))?;
    if obj.contains_key("tag") {
        return Ok(ToplevelEntry::plain(parse_opt(v)?));
    }
    let opt = obj
        .get("opt")
        .ok_or_else(|| JsonError::new("entry is missing `opt`"))?;
    Ok(ToplevelEntry {
        negated: opt_bool(obj, "isNegated")?,
        front_check: opt_bool(obj, "isFrontCheck")?,
        back_check: opt_bool(obj, "isBackCheck")?,
        opt: parse_opt(opt)?,
    })
}

/// Parses one tagged operator node.
pub fn parse_opt(v: &Value) -> Result<RegexOpt, JsonError> {
    let obj = v
        .as_object()
        .ok_or_else(|| JsonError::new("operator must be an object"))?;
    let tag = obj
        .get("tag")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonError::new("operator is missing its `tag`"))?;

    match tag {
        "LiteralOpt" => {
            let codes = req_array(obj, "charcodes")?
                .iter()
                .map(|c| {
                    c.as_u64()
                        .filter(|&n| n <= brex_unicode::MAX_UNICODE_CP as u64)
                        .map(|n| n as u32)
                        .ok_or_else(|| JsonError::new("bad codepoint in `charcodes`"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RegexOpt::Literal {
                codes,
                unicode: req_bool(obj, "isunicode")?,
            })
        }
        "CharRangeOpt" => {
            let ranges = req_array(obj, "range")?
                .iter()
                .map(parse_range)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RegexOpt::CharRange {
                complemented: req_bool(obj, "compliment")?,
                ranges,
                // Absent in older emitters.
                unicode: match obj.get("isunicode") {
                    None | Some(Value::Null) => true,
                    Some(v) => v
                        .as_bool()
                        .ok_or_else(|| JsonError::new("`isunicode` must be a bool"))?,
                },
            })
        }
        "CharClassDotOpt" => Ok(RegexOpt::Dot),
        "NamedRegexOpt" => Ok(RegexOpt::NamedRef {
            name: req_str(obj, "rname")?.to_string(),
        }),
        "EnvRegexOpt" => Ok(RegexOpt::EnvRef {
            name: req_str(obj, "ename")?.to_string(),
        }),
        "StarRepeatOpt" => Ok(RegexOpt::Star(Box::new(parse_opt(req(obj, "repeat")?)?))),
        "PlusRepeatOpt" => Ok(RegexOpt::Plus(Box::new(parse_opt(req(obj, "repeat")?)?))),
        "RangeRepeatOpt" => {
            let low = req(obj, "low")?
                .as_u64()
                .filter(|&n| n <= u16::MAX as u64)
                .ok_or_else(|| JsonError::new("bad `low` bound"))? as u16;
            let high = match obj.get("high") {
                None | Some(Value::Null) => None,
                Some(v) => Some(
                    v.as_u64()
                        .filter(|&n| n <= u16::MAX as u64)
                        .ok_or_else(|| JsonError::new("bad `high` bound"))?
                        as u16,
                ),
            };
            if let Some(h) = high {
                if low > h {
                    return Err(JsonError::new("`low` bound exceeds `high` bound"));
                }
            }
            Ok(RegexOpt::Range {
                low,
                high,
                opt: Box::new(parse_opt(req(obj, "repeat")?)?),
            })
        }
        "OptionalOpt" => Ok(RegexOpt::Optional(Box::new(parse_opt(req(obj, "opt")?)?))),
        "AnyOfOpt" => Ok(RegexOpt::AnyOf(
            req_array(obj, "opts")?
                .iter()
                .map(parse_opt)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        "SequenceOpt" => Ok(RegexOpt::Sequence(
            req_array(obj, "regexs")?
                .iter()
                .map(parse_opt)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        "NegateOpt" => Ok(RegexOpt::Negate(Box::new(parse_opt(req(obj, "opt")?)?))),
        "AllOfOpt" => Ok(RegexOpt::AllOf(
            req_array(obj, "musts")?
                .iter()
                .map(parse_opt)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        other => Err(JsonError::new(format!("unknown operator tag `{other}`"))),
    }
}

fn parse_range(v: &Value) -> Result<CharRange, JsonError> {
    let obj = v
        .as_object()
        .ok_or_else(|| JsonError::new("range item must be an object"))?;
    let bound = |key: &str| {
        obj.get(key)
            .and_then(Value::as_u64)
            .filter(|&n| n <= brex_unicode::MAX_UNICODE_CP as u64)
            .map(|n| n as u32)
            .ok_or_else(|| JsonError::new(format!("bad range bound `{key}`")))
    };
    let (lb, ub) = (bound("lb")?, bound("ub")?);
    if lb > ub {
        return Err(JsonError::new("range `lb` exceeds `ub`"));
    }
    Ok(CharRange::new(lb, ub))
}

fn req<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Value, JsonError> {
    obj.get(key)
        .ok_or_else(|| JsonError::new(format!("missing `{key}`")))
}

fn req_bool(obj: &Map<String, Value>, key: &str) -> Result<bool, JsonError> {
    req(obj, key)?
        .as_bool()
        .ok_or_else(|| JsonError::new(format!("`{key}` must be a bool")))
}

fn opt_bool(obj: &Map<String, Value>, key: &str) -> Result<bool, JsonError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| JsonError::new(format!("`{key}` must be a bool"))),
    }
}

fn req_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a str, JsonError> {
    req(obj, key)?
        .as_str()
        .ok_or_else(|| JsonError::new(format!("`{key}` must be a string")))
}

fn req_array<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Vec<Value>, JsonError> {
    req(obj, key)?
        .as_array()
        .ok_or_else(|| JsonError::new(format!("`{key}` must be an array")))
}
