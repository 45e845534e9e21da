//! Filename construction for expanded configs
//!
//! Renders one `name=value` part per grid parameter, sanitized for the
//! filesystem, with a content-hash suffix once names grow past the byte
//! limit. String values are named by their token-level diff against the
//! base value so a one-word change in a long string stays readable.

use indexmap::IndexMap;
use regex_lite::Regex;
use sha2::{Digest, Sha256};
use similar::{capture_diff_slices, Algorithm, DiffOp};
use toml_edit::Value;

/// Maximum filename byte length (extension excluded) before the hash
/// suffix kicks in.
const MAX_NAME_BYTES: usize = 250;

/// Hex characters kept from the disambiguation hash.
const HASH_LEN: usize = 8;

/// Build a filename for one combination of grid parameters.
///
/// Parts are `name=value` in parameter order, joined by `__` and prefixed
/// with the base stem. Names over [`MAX_NAME_BYTES`] UTF-8 bytes are
/// truncated on a character boundary and suffixed with an 8-character
/// content hash of the full parameter string.
pub fn make_config_name(
    params: &[(&str, &Value)],
    base_stem: &str,
    base_values: &IndexMap<String, Option<Value>>,
    short_names: bool,
) -> String {
    config_name(params, base_stem, base_values, short_names, false)
}

pub(crate) fn config_name(
    params: &[(&str, &Value)],
    base_stem: &str,
    base_values: &IndexMap<String, Option<Value>>,
    short_names: bool,
    force_hash: bool,
) -> String {
    let mut parts = Vec::with_capacity(params.len());
    for (path, value) in params {
        let name = if short_names {
            shorten_param_name(path).to_string()
        } else {
            path.replace('.', "_")
        };
        let base = base_values.get(*path).and_then(Option::as_ref);
        parts.push(format!("{name}={}", value_token(value, base)));
    }

    let param_str = parts.join("__");
    let mut base_name = format!("{base_stem}__{param_str}");

    if force_hash || base_name.len() > MAX_NAME_BYTES {
        let hash = short_hash(&param_str);
        let truncated = truncate_to_bytes(&base_name, MAX_NAME_BYTES - HASH_LEN - 1);
        base_name = format!("{truncated}_{hash}");
    }

    format!("{base_name}.toml")
}

/// Render a single value as a filename token.
///
/// Strings are diffed against the base value when one is known; floats get
/// `.` -> `p` and `-` -> `neg`; everything else is stringified and
/// sanitized.
pub fn value_token(value: &Value, base: Option<&Value>) -> String {
    if let (Value::String(new), Some(Value::String(old))) = (value, base) {
        let diff = diff_tokens(old.value(), new.value());
        if !diff.is_empty() {
            return sanitize_for_filename(&diff);
        }
    }

    match value {
        Value::Float(f) => render_float(*f.value()),
        Value::Boolean(b) => b.value().to_string(),
        other => sanitize_for_filename(&render_value(other)),
    }
}

/// Replace or drop characters that are illegal or awkward in filenames.
pub fn sanitize_for_filename(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '[' | ']' | ' ' | '?' | '"' | '<' | '>' => {}
            ',' => out.push('-'),
            '.' => out.push('p'),
            '/' | '\\' | ':' | '|' => out.push('_'),
            '*' => out.push_str("star"),
            _ => out.push(c),
        }
    }
    out
}

/// Word tokens added or changed between `old` and `new`, joined by `_`.
///
/// Empty when the strings tokenize identically or `new` only removes
/// tokens.
pub fn diff_tokens(old: &str, new: &str) -> String {
    let word = match Regex::new(r"\w+") {
        Ok(re) => re,
        Err(_) => return String::new(),
    };
    let old_tokens: Vec<&str> = word.find_iter(old).map(|m| m.as_str()).collect();
    let new_tokens: Vec<&str> = word.find_iter(new).map(|m| m.as_str()).collect();

    let mut changed: Vec<&str> = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &old_tokens, &new_tokens) {
        match op {
            DiffOp::Insert {
                new_index, new_len, ..
            }
            | DiffOp::Replace {
                new_index, new_len, ..
            } => changed.extend(&new_tokens[new_index..new_index + new_len]),
            _ => {}
        }
    }
    changed.join("_")
}

/// Last component of a dotted parameter path.
pub fn shorten_param_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Truncate to at most `max_bytes` UTF-8 bytes without splitting a
/// multi-byte character.
pub fn truncate_to_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn render_float(f: f64) -> String {
    let text = if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    };
    text.replace('.', "p").replace('-', "neg")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.value().clone(),
        Value::Integer(i) => i.value().to_string(),
        Value::Float(f) => {
            let f = *f.value();
            if f.is_finite() && f.fract() == 0.0 {
                format!("{f:.1}")
            } else {
                f.to_string()
            }
        }
        Value::Boolean(b) => b.value().to_string(),
        Value::Datetime(d) => d.value().to_string(),
        Value::Array(array) => {
            let items: Vec<String> = array.iter().map(render_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::InlineTable(table) => {
            let items: Vec<String> = table
                .iter()
                .map(|(key, value)| format!("{key}={}", render_value(value)))
                .collect();
            format!("[{}]", items.join(", "))
        }
    }
}

fn short_hash(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())[..HASH_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn val(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_for_filename("[0.1, 0.5]"), "0p1-0p5");
        assert_eq!(sanitize_for_filename("a/b\\c:d|e"), "a_b_c_d_e");
        assert_eq!(sanitize_for_filename("so*me\"na<me>?"), "sostarmename");
        assert_eq!(sanitize_for_filename("v1.2.3"), "v1p2p3");
    }

    #[test]
    fn test_float_rendering() {
        assert_eq!(value_token(&Value::from(0.1), None), "0p1");
        assert_eq!(value_token(&Value::from(-0.5), None), "neg0p5");
        assert_eq!(value_token(&Value::from(1.0), None), "1p0");
        assert_eq!(value_token(&Value::from(2.5), None), "2p5");
    }

    #[test]
    fn test_bool_and_integer_rendering() {
        assert_eq!(value_token(&Value::from(true), None), "true");
        assert_eq!(value_token(&Value::from(false), None), "false");
        assert_eq!(value_token(&Value::from(42i64), None), "42");
    }

    #[test]
    fn test_array_rendering() {
        let mut array = toml_edit::Array::new();
        array.push(0.1);
        array.push(0.5);
        assert_eq!(
            value_token(&Value::Array(array), None),
            "0p1-0p5"
        );
    }

    #[test]
    fn test_diff_naming_single_word() {
        let base = val("a quick brown fox");
        let new = val("a quick red fox");
        assert_eq!(value_token(&new, Some(&base)), "red");
    }

    #[test]
    fn test_diff_naming_multiple_words() {
        assert_eq!(
            diff_tokens("train on split one", "train on split two extra"),
            "two_extra"
        );
    }

    #[test]
    fn test_diff_identical_falls_back_to_full_string() {
        let base = val("same value");
        let new = val("same value");
        assert_eq!(value_token(&new, Some(&base)), "samevalue");
    }

    #[test]
    fn test_diff_skipped_when_base_not_string() {
        let base = Value::from(3i64);
        let new = val("a name");
        assert_eq!(value_token(&new, Some(&base)), "aname");
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let s = "abc\u{00e9}\u{00e9}"; // 3 + 2 + 2 bytes
        assert_eq!(truncate_to_bytes(s, 4), "abc");
        assert_eq!(truncate_to_bytes(s, 5), "abc\u{00e9}");
        assert_eq!(truncate_to_bytes(s, 100), s);
    }

    #[test]
    fn test_short_vs_long_param_names() {
        let value = Value::from(0.1);
        let params = vec![("model.dropout", &value)];
        let bases = IndexMap::new();

        let long = make_config_name(&params, "cfg", &bases, false);
        assert_eq!(long, "cfg__model_dropout=0p1.toml");

        let short = make_config_name(&params, "cfg", &bases, true);
        assert_eq!(short, "cfg__dropout=0p1.toml");
    }

    #[test]
    fn test_long_name_truncated_with_hash() {
        let big_a = val(&"alpha ".repeat(60));
        let big_b = val(&"bravo ".repeat(60));
        let bases = IndexMap::new();

        let name_a = make_config_name(&[("param", &big_a)], "cfg", &bases, false);
        let name_b = make_config_name(&[("param", &big_b)], "cfg", &bases, false);

        for name in [&name_a, &name_b] {
            let stem = name.strip_suffix(".toml").unwrap();
            assert!(stem.len() <= MAX_NAME_BYTES, "{} bytes", stem.len());
        }
        // Differing parameter strings hash differently
        assert_ne!(name_a, name_b);
        let hash_of = |name: &str| {
            name.strip_suffix(".toml")
                .and_then(|stem| stem.rsplit('_').next().map(str::to_string))
                .unwrap()
        };
        assert_ne!(hash_of(&name_a), hash_of(&name_b));
    }

    #[test]
    fn test_forced_hash_differs_from_plain() {
        let value = val("x");
        let bases = IndexMap::new();
        let plain = config_name(&[("p", &value)], "cfg", &bases, false, false);
        let hashed = config_name(&[("p", &value)], "cfg", &bases, false, true);

        assert_ne!(plain, hashed);
        assert!(hashed.strip_suffix(".toml").unwrap().len() <= MAX_NAME_BYTES);
    }
}
