//! Placeholder substitution for subject and body strings.
//!
//! Placeholders are written `{{name}}`, with no inner whitespace, where
//! `name` is a declared field. The template is scanned once from left to
//! right; inserted values are never rescanned, so a value that itself
//! contains `{{...}}` is emitted verbatim. Tokens without a matching value
//! stay in the output unchanged.

use super::extra_data::ExtraData;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// How inserted values are escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    None,
    Html,
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        let name = &after_open[..end];

        // "{{ a {{name}}": the innermost opener starts the real token
        if let Some(inner) = name.rfind(OPEN) {
            let split = start + OPEN.len() + inner;
            out.push(Segment::Text(&rest[..split]));
            rest = &rest[split..];
            continue;
        }

        if start > 0 {
            out.push(Segment::Text(&rest[..start]));
        }
        out.push(Segment::Placeholder(name));
        rest = &after_open[end + CLOSE.len()..];
    }

    if !rest.is_empty() {
        out.push(Segment::Text(rest));
    }
    out
}

/// Names referenced by `{{name}}` tokens, in order of appearance
pub fn placeholders(template: &str) -> Vec<&str> {
    segments(template)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Placeholder(name) if !name.is_empty() => Some(name),
            _ => None,
        })
        .collect()
}

/// Replace every `{{name}}` token that has a value in `data`.
pub fn replace_data(template: &str, data: &ExtraData, escape: Escape) -> String {
    let mut result = String::with_capacity(template.len());

    for segment in segments(template) {
        match segment {
            Segment::Text(text) => result.push_str(text),
            Segment::Placeholder(name) => match data.get(name) {
                Some(value) => match escape {
                    Escape::None => result.push_str(value),
                    Escape::Html => push_html_escaped(&mut result, value),
                },
                None => {
                    result.push_str(OPEN);
                    result.push_str(name);
                    result.push_str(CLOSE);
                }
            },
        }
    }

    result
}

fn push_html_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> ExtraData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_simple() {
        let result = replace_data("Welcome {{userName}}", &data(&[("userName", "Ada")]), Escape::None);
        assert_eq!(result, "Welcome Ada");
    }

    #[test]
    fn test_substitute_multiple_occurrences() {
        let result = replace_data(
            "Order {{order_id}} shipped. Track {{order_id}} via {{carrier}}",
            &data(&[("order_id", "ORD-123"), ("carrier", "FedEx")]),
            Escape::None,
        );
        assert_eq!(result, "Order ORD-123 shipped. Track ORD-123 via FedEx");
    }

    #[test]
    fn test_unmatched_placeholder_is_kept() {
        let result = replace_data("Hi {{name}}, code {{code}}", &data(&[("name", "Ada")]), Escape::None);
        assert_eq!(result, "Hi Ada, code {{code}}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let result = replace_data(
            "{{a}} and {{b}}",
            &data(&[("a", "{{b}}"), ("b", "B")]),
            Escape::None,
        );
        assert_eq!(result, "{{b}} and B");
    }

    #[test]
    fn test_full_data_leaves_no_tokens() {
        let template = "<p>{{first}} {{last}}</p><p>{{first}}</p>";
        let values = data(&[("first", "Ada"), ("last", "Lovelace")]);
        let result = replace_data(template, &values, Escape::Html);
        assert!(placeholders(&result).is_empty());
        assert_eq!(result, "<p>Ada Lovelace</p><p>Ada</p>");
    }

    #[test]
    fn test_idempotent() {
        let values = data(&[("name", "Ada")]);
        let once = replace_data("Hi {{name}} {{other}}", &values, Escape::Html);
        let twice = replace_data(&once, &values, Escape::Html);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_html_escaping() {
        let values = data(&[("name", "<script>alert('x')</script> & \"co\"")]);
        assert_eq!(
            replace_data("<h1>{{name}}</h1>", &values, Escape::Html),
            "<h1>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; &quot;co&quot;</h1>"
        );
        assert_eq!(
            replace_data("{{name}}", &values, Escape::None),
            "<script>alert('x')</script> & \"co\""
        );
    }

    #[test]
    fn test_unterminated_and_nested_openers() {
        let values = data(&[("name", "Ada")]);
        assert_eq!(replace_data("Hi {{name", &values, Escape::None), "Hi {{name");
        assert_eq!(replace_data("{{ {{name}}", &values, Escape::None), "{{ Ada");
        assert_eq!(replace_data("{{}}", &values, Escape::None), "{{}}");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            placeholders("{{a}} x {{b}} {{a}} {{}} {{c"),
            vec!["a", "b", "a"]
        );
    }
}
