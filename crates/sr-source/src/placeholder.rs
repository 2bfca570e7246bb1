use std::sync::OnceLock;

use regex::Regex;
use sr_core::{find_value_by_path, value_to_script_text, ScriptError, ValuesMap};

pub const CURRENT_ITEM_TOKEN: &str = "$CURRENT_ITEM";

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\{\{\$\bCURRENT_ITEM(\.[^}]+)*\}\}").expect("placeholder regex")
    })
}

/// Rewrites every `{{$CURRENT_ITEM.path}}` in `code` with the field's value.
///
/// Current values win over defaults; a current-side `null` falls through to the
/// defaults while a default-side `null` is used as is. Unknown paths are spliced
/// back as plain text.
pub fn replace_placeholders(
    code: &str,
    current: &ValuesMap,
    defaults: &ValuesMap,
) -> Result<String, ScriptError> {
    let mut output = String::with_capacity(code.len());
    let mut last_index = 0usize;
    for found in placeholder_regex().find_iter(code) {
        output.push_str(&code[last_index..found.start()]);
        let field = strip_placeholder(found.as_str());
        output.push_str(&field_value_text(field, current, defaults)?);
        last_index = found.end();
    }
    output.push_str(&code[last_index..]);
    Ok(output)
}

fn strip_placeholder(token: &str) -> &str {
    let inner = &token[2..token.len() - 2];
    let inner = inner.strip_prefix(CURRENT_ITEM_TOKEN).unwrap_or(inner);
    inner.strip_prefix('.').unwrap_or(inner)
}

pub fn field_value_text(
    field: &str,
    current: &ValuesMap,
    defaults: &ValuesMap,
) -> Result<String, ScriptError> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(String::new());
    }

    if field.starts_with('"') && field.ends_with('"') {
        let literal = field.get(1..field.len() - 1).unwrap_or_default();
        return Ok(literal.replace("\\\"", "\""));
    }

    let resolved = find_value_by_path(current, field)
        .filter(|value| !value.is_null())
        .or_else(|| find_value_by_path(defaults, field));

    match resolved {
        Some(value) => value_to_script_text(value).map_err(|error| ScriptError {
            message: format!("field \"{}\": {}", field, error.message),
            ..error
        }),
        None => Ok(field.to_string()),
    }
}

#[cfg(test)]
mod placeholder_tests {
    use super::*;
    use serde_json::{json, Value};

    fn values(value: Value) -> ValuesMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("test values must be an object"),
        }
    }

    fn replace(code: &str, current: Value, defaults: Value) -> String {
        replace_placeholders(code, &values(current), &values(defaults))
            .expect("substitution should pass")
    }

    #[test]
    fn unknown_field_is_passed_through_as_text() {
        assert_eq!(
            replace("return {{$CURRENT_ITEM.field}};", json!({}), json!({})),
            "return field;"
        );
    }

    #[test]
    fn quoted_literal_skips_lookup() {
        let current = json!({"x": 1, "\"x\"": 2});
        assert_eq!(
            replace("{{$CURRENT_ITEM.\"x\"}}", current, json!({"x": 3})),
            "x"
        );
        assert_eq!(
            replace(r#"{{$CURRENT_ITEM."say \"hi\""}}"#, json!({}), json!({})),
            r#"say "hi""#
        );
    }

    #[test]
    fn current_values_take_precedence() {
        assert_eq!(
            replace("{{$CURRENT_ITEM.a.b}}", json!({"a": {"b": 5}}), json!({})),
            "5"
        );
        assert_eq!(
            replace(
                "{{$CURRENT_ITEM.a.b}}",
                json!({"a": {"b": 5}}),
                json!({"a": {"b": 7}})
            ),
            "5"
        );
    }

    #[test]
    fn current_null_falls_back_to_default() {
        assert_eq!(
            replace("{{$CURRENT_ITEM.a}}", json!({"a": null}), json!({"a": 9})),
            "9"
        );
    }

    #[test]
    fn default_null_is_used() {
        assert_eq!(
            replace("{{$CURRENT_ITEM.a}}", json!({}), json!({"a": null})),
            "null"
        );
        assert_eq!(
            replace("{{$CURRENT_ITEM.a}}", json!({"a": null}), json!({"a": null})),
            "null"
        );
    }

    #[test]
    fn empty_segments_resolve_to_empty_string() {
        assert_eq!(replace("[{{$CURRENT_ITEM}}]", json!({}), json!({})), "[]");
        assert_eq!(
            replace("[{{$CURRENT_ITEM.   }}]", json!({}), json!({})),
            "[]"
        );
    }

    #[test]
    fn objects_are_spliced_as_json() {
        let current = json!({"address": {"city": "Oslo", "zip": "0150"}});
        assert_eq!(
            replace("const a = {{$CURRENT_ITEM.address}};", current, json!({})),
            r#"const a = {"city":"Oslo","zip":"0150"};"#
        );
    }

    #[test]
    fn multiple_placeholders_and_surrounding_text_are_kept() {
        let code = "const total = {{$CURRENT_ITEM.price}} * {{$CURRENT_ITEM.qty}}; // {{other}}";
        assert_eq!(
            replace(code, json!({"price": 2.5}), json!({"qty": 4})),
            "const total = 2.5 * 4; // {{other}}"
        );
    }

    #[test]
    fn whitespace_around_path_is_trimmed() {
        assert_eq!(
            replace("{{$CURRENT_ITEM. name }}", json!({"name": "Ada"}), json!({})),
            "Ada"
        );
    }

    #[test]
    fn non_matching_tokens_are_untouched() {
        let code = "{{$OTHER.a}} {{ $CURRENT_ITEM.a }} {{$CURRENT_ITEMS.a}}";
        assert_eq!(replace(code, json!({"a": 1}), json!({})), code);
    }

    #[test]
    fn input_text_is_not_mutated() {
        let code = String::from("{{$CURRENT_ITEM.a}}");
        let output = replace(&code, json!({"a": 1}), json!({}));
        assert_eq!(code, "{{$CURRENT_ITEM.a}}");
        assert_eq!(output, "1");
    }
}
