//! Token substitution over a JSON-like model.
//!
//! `{{ key }}` inserts the HTML-escaped value of `key`, `{{{ key }}}` inserts
//! it unescaped. Keys are dotted paths: `{{ user.name }}` looks up `name` in
//! the `user` object and `{{ items.0 }}` indexes an array. Only scalars can be
//! inserted: missing keys and `null` render as nothing, booleans, numbers and
//! strings as their text.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed tag at byte {position}")]
    Unclosed { position: usize },

    #[error("empty tag at byte {position}")]
    EmptyTag { position: usize },

    #[error("key `{key}` is not a scalar value")]
    NotScalar { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Escaped(String),
    Raw(String),
}

/// A parsed template, renderable any number of times.
#[derive(Debug, Clone)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut tokens = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                tokens.push(Token::Text(rest[..start].to_owned()));
            }

            let position = offset + start;
            let raw = rest[start..].starts_with("{{{");
            let (open, close) = if raw { ("{{{", "}}}") } else { ("{{", "}}") };

            let body = &rest[start + open.len()..];
            let end = body.find(close).ok_or(TemplateError::Unclosed { position })?;
            let key = body[..end].trim();
            if key.is_empty() {
                return Err(TemplateError::EmptyTag { position });
            }

            tokens.push(if raw { Token::Raw(key.to_owned()) } else { Token::Escaped(key.to_owned()) });

            let consumed = start + open.len() + end + close.len();
            rest = &rest[consumed..];
            offset += consumed;
        }

        if !rest.is_empty() {
            tokens.push(Token::Text(rest.to_owned()));
        }
        Ok(Self { tokens })
    }

    pub fn render(&self, model: &Map<String, Value>) -> Result<String, TemplateError> {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::Escaped(key) => escape_into(&mut out, &scalar(model, key)?),
                Token::Raw(key) => out.push_str(&scalar(model, key)?),
            }
        }
        Ok(out)
    }
}

/// Parses and renders `source` in one go.
pub fn render(source: &str, model: &Map<String, Value>) -> Result<String, TemplateError> {
    Template::parse(source)?.render(model)
}

fn lookup<'a>(model: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut segments = key.split('.');
    let mut value = model.get(segments.next()?)?;
    for segment in segments {
        value = match value {
            Value::Object(object) => object.get(segment)?,
            Value::Array(array) => array.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(value)
}

fn scalar(model: &Map<String, Value>, key: &str) -> Result<String, TemplateError> {
    match lookup(model, key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Array(_) | Value::Object(_)) => Err(TemplateError::NotScalar { key: key.to_owned() }),
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn substitutes_and_escapes() {
        let model = model(json!({ "name": "<b>Tom & Jerry</b>", "age": 7, "admin": false, "nick": null }));

        assert_eq!(render("Hi {{ name }}!", &model).unwrap(), "Hi &lt;b&gt;Tom &amp; Jerry&lt;/b&gt;!");
        assert_eq!(render("{{{name}}}", &model).unwrap(), "<b>Tom & Jerry</b>");
        assert_eq!(render("{{age}} {{ admin }} [{{ nick }}]", &model).unwrap(), "7 false []");
        assert_eq!(render("no tags", &model).unwrap(), "no tags");
    }

    #[test]
    fn dotted_paths() {
        let model = model(json!({ "user": { "name": "Ann", "tags": ["a", "b"] } }));

        assert_eq!(render("{{ user.name }}/{{ user.tags.1 }}", &model).unwrap(), "Ann/b");
        assert_eq!(render("{{ user }}", &model), Err(TemplateError::NotScalar { key: "user".to_owned() }));
        assert_eq!(render("[{{ user.tags.9 }}]", &model).unwrap(), "[]");
        assert_eq!(render("[{{ user.name.first }}]", &model).unwrap(), "[]");
    }

    #[test]
    fn malformed_tags() {
        let model = Map::new();

        assert_eq!(render("abc {{ name", &model), Err(TemplateError::Unclosed { position: 4 }));
        assert_eq!(render("{{   }}", &model), Err(TemplateError::EmptyTag { position: 0 }));
    }

    #[test]
    fn missing_keys_render_empty() {
        let model = model(json!({ "a": 1 }));
        assert_eq!(render("<p>{{ missing }}</p>", &model).unwrap(), "<p></p>");
        assert_eq!(render("{{{ a.b }}}{{ a }}", &model).unwrap(), "1");
    }

    #[test]
    fn template_is_reusable() {
        let template = Template::parse("<p>{{ n }}</p>").unwrap();
        assert_eq!(template.render(&model(json!({ "n": 1 }))).unwrap(), "<p>1</p>");
        assert_eq!(template.render(&model(json!({ "n": 2 }))).unwrap(), "<p>2</p>");
    }
}
