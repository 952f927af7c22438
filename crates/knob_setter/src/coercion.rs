use std::{collections::HashMap, sync::LazyLock};

use host_graph::FormatRegistry;
use regex::Regex;
use shared::{
    domain::{Coerced, KnobKind, KnobValue},
    error::{KnobError, KnobResult},
};

/// Converts one piece of user text into a knob value.
pub type CoerceFn = fn(&str, &dyn FormatRegistry) -> KnobResult<KnobValue>;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?[\w.]+").expect("token pattern is valid"));

/// Fixed kind -> coercion mapping. Kinds without an entry use the text
/// fallback.
#[derive(Clone)]
pub struct CoercionTable {
    handlers: HashMap<KnobKind, CoerceFn>,
    fallback: CoerceFn,
}

impl CoercionTable {
    pub fn standard() -> Self {
        let handlers: HashMap<KnobKind, CoerceFn> = HashMap::from([
            (KnobKind::Boolean, int_or_one as CoerceFn),
            (KnobKind::ChannelMask, text as CoerceFn),
            (KnobKind::Enumeration, int_or_text as CoerceFn),
            (KnobKind::Integer, strict_int as CoerceFn),
            (KnobKind::Format, format_name as CoerceFn),
            (KnobKind::Array, strict_float as CoerceFn),
            (KnobKind::Disable, int_or_one as CoerceFn),
        ]);

        Self {
            handlers,
            fallback: text as CoerceFn,
        }
    }

    pub fn handler(&self, kind: &KnobKind) -> CoerceFn {
        self.handlers.get(kind).copied().unwrap_or(self.fallback)
    }

    /// Coerces `raw` for a knob of `kind` holding `arity` slots.
    ///
    /// A single-slot knob gets the whole string. Otherwise the text is
    /// split into tokens which must either match `arity` one to one, or
    /// be a single token that is repeated into every slot.
    pub fn coerce_value(
        &self,
        raw: &str,
        kind: &KnobKind,
        arity: usize,
        formats: &dyn FormatRegistry,
    ) -> KnobResult<Coerced> {
        if arity == 0 {
            return Err(KnobError::InvalidInput(
                "knob arity must be at least 1".into(),
            ));
        }

        let convert = self.handler(kind);
        if arity == 1 {
            return convert(raw, formats).map(Coerced::Scalar);
        }

        let tokens = tokenize(raw);
        match tokens.len() {
            n if n == arity => tokens
                .into_iter()
                .map(|token| convert(token, formats))
                .collect::<KnobResult<Vec<_>>>()
                .map(Coerced::Array),
            1 => {
                let value = convert(tokens[0], formats)?;
                Ok(Coerced::Array(vec![value; arity]))
            }
            actual => Err(KnobError::ArityMismatch {
                expected: arity,
                actual,
            }),
        }
    }
}

impl Default for CoercionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Splits free-typed input on anything that is not a word character,
/// a dot or a leading sign: `"1.2, .5 .7 1"` gives four tokens.
pub fn tokenize(raw: &str) -> Vec<&str> {
    TOKEN.find_iter(raw).map(|m| m.as_str()).collect()
}

/// Every character an ASCII digit. Surrounding spaces disqualify.
fn digits(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn text(raw: &str, _: &dyn FormatRegistry) -> KnobResult<KnobValue> {
    Ok(KnobValue::Text(raw.to_string()))
}

fn int_or_one(raw: &str, _: &dyn FormatRegistry) -> KnobResult<KnobValue> {
    Ok(KnobValue::Int(digits(raw).unwrap_or(1)))
}

fn int_or_text(raw: &str, _: &dyn FormatRegistry) -> KnobResult<KnobValue> {
    Ok(match digits(raw) {
        Some(n) => KnobValue::Int(n),
        None => KnobValue::Text(raw.to_string()),
    })
}

fn strict_int(raw: &str, _: &dyn FormatRegistry) -> KnobResult<KnobValue> {
    raw.trim()
        .parse()
        .map(KnobValue::Int)
        .map_err(|_| KnobError::type_mismatch(&KnobKind::Integer, raw))
}

fn strict_float(raw: &str, _: &dyn FormatRegistry) -> KnobResult<KnobValue> {
    raw.trim()
        .parse()
        .map(KnobValue::Float)
        .map_err(|_| KnobError::type_mismatch(&KnobKind::Array, raw))
}

/// `0` is the root format; `n` is the n-th registered format.
fn format_name(raw: &str, formats: &dyn FormatRegistry) -> KnobResult<KnobValue> {
    let index = digits(raw).ok_or_else(|| KnobError::type_mismatch(&KnobKind::Format, raw))?;
    if index == 0 {
        return Ok(KnobValue::Text(formats.default_format().name().to_string()));
    }

    let registered = formats.list_formats();
    let position = usize::try_from(index - 1).unwrap_or(usize::MAX);
    registered
        .get(position)
        .map(|format| KnobValue::Text(format.name().to_string()))
        .ok_or_else(|| {
            KnobError::host(format!(
                "format index {index} out of range, {} formats registered",
                registered.len()
            ))
        })
}

#[cfg(test)]
#[path = "tests/coercion_tests.rs"]
mod tests;
