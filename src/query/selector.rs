//! Typed selector queries
//!
//! [extract] walks the match tree of a complete parse and builds a [SelectorQuery]. The
//! walk is keyed by rule name: each named record is flattened into the tokens its literals
//! matched and the named records directly below it, which is all the structure each
//! grammar rule needs to be read back.
//!
//! `Display` writes a query back out in canonical form, so `Node . bar` prints as
//! `Node.bar` and `* >#a` as `* > #a`.

use crate::query::error::QueryError;
use crate::query::grammar::selector::{
    ARGS, ATTR, ATTR_QUERY, PSEUDO_CLASS, QUERY, SELECTORS, SUB_QUERY, TYPE_ID_QUERY, VALUE,
};
use crate::query::lexing::quote;
use crate::query::matching::MatchRecord;
use crate::query::token::{Token, TokenKind};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorQuery {
    pub target: Target,
    pub selectors: Vec<Selector>,
    pub pseudo_class: Option<PseudoClass>,
    pub attributes: Vec<Attribute>,
    pub sub_query: Option<Box<SubQuery>>,
}

/// What kind of node the query is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "kebab-case")]
pub enum Target {
    /// A node type name, `Mesh`
    Type(String),
    /// `*`
    Any,
    /// Query starts with `#id` or `.class`
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "kebab-case")]
pub enum Selector {
    Id(String),
    Class(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PseudoClass {
    pub name: String,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Value {
    Identifier(String),
    Digits(String),
    String(String),
}

impl Value {
    pub fn as_str(&self) -> &str {
        match self {
            Value::Identifier(s) | Value::Digits(s) | Value::String(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Combinator {
    /// `a > b`: b is a direct child of a
    Child,
    /// `a b`: b is anywhere below a
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubQuery {
    pub combinator: Combinator,
    pub query: SelectorQuery,
}

impl SelectorQuery {
    fn new(target: Target) -> Self {
        Self {
            target,
            selectors: Vec::new(),
            pseudo_class: None,
            attributes: Vec::new(),
            sub_query: None,
        }
    }

    /// Number of queries in the combinator chain, this one included
    pub fn depth(&self) -> usize {
        1 + self.sub_query.as_ref().map_or(0, |sub| sub.query.depth())
    }

    /// The last query of the combinator chain: the nodes the whole query selects
    pub fn leaf(&self) -> &SelectorQuery {
        match &self.sub_query {
            Some(sub) => sub.query.leaf(),
            None => self,
        }
    }
}

enum Item<'r, 'g> {
    Token(&'r Token),
    Rule(&'r MatchRecord<'g>),
}

/// Tokens and named records directly below `record`, in match order
fn items<'r, 'g>(record: &'r MatchRecord<'g>) -> Vec<Item<'r, 'g>> {
    fn collect<'r, 'g>(record: &'r MatchRecord<'g>, out: &mut Vec<Item<'r, 'g>>) {
        if !record.matched() {
            return;
        }
        if let Some(token) = record.token() {
            out.push(Item::Token(token));
        } else if record.name().is_some() {
            out.push(Item::Rule(record));
        } else {
            for child in record.children() {
                collect(child, out);
            }
        }
    }

    let mut out = Vec::new();
    for child in record.children() {
        collect(child, &mut out);
    }
    out
}

fn malformed(record: &MatchRecord<'_>) -> QueryError {
    QueryError::Malformed {
        rule: record.name().unwrap_or(record.rule().kind().label()).to_string(),
    }
}

/// Build a [SelectorQuery] from the record of a matched `query` rule
pub fn extract(record: &MatchRecord<'_>) -> Result<SelectorQuery, QueryError> {
    if !record.matched() {
        return Err(QueryError::NoMatch);
    }
    if record.name() != Some(QUERY) {
        return Err(malformed(record));
    }

    let mut query = None;
    let mut sub_query = None;
    for item in items(record) {
        match item {
            Item::Rule(r) if r.name() == Some(TYPE_ID_QUERY) => query = Some(type_id_query(r)?),
            Item::Rule(r) if r.name() == Some(ATTR_QUERY) => query = Some(attr_query(r)?),
            Item::Rule(r) if r.name() == Some(SUB_QUERY) => sub_query = Some(sub(r)?),
            _ => return Err(malformed(record)),
        }
    }

    let mut query = query.ok_or_else(|| malformed(record))?;
    query.sub_query = sub_query.map(Box::new);
    Ok(query)
}

fn type_id_query(record: &MatchRecord<'_>) -> Result<SelectorQuery, QueryError> {
    let mut items = items(record).into_iter();
    let target = match items.next() {
        Some(Item::Token(t)) if t.kind == TokenKind::Identifier => Target::Type(t.literal.clone()),
        Some(Item::Token(t)) if t.kind == TokenKind::Star => Target::Any,
        _ => return Err(malformed(record)),
    };
    let mut query = SelectorQuery::new(target);
    for item in items {
        qualify(&mut query, record, item)?;
    }
    Ok(query)
}

fn attr_query(record: &MatchRecord<'_>) -> Result<SelectorQuery, QueryError> {
    let mut query = SelectorQuery::new(Target::Unspecified);
    for item in items(record) {
        qualify(&mut query, record, item)?;
    }
    Ok(query)
}

/// Fold one selector, pseudo-class or attribute list into `query`
fn qualify(
    query: &mut SelectorQuery,
    parent: &MatchRecord<'_>,
    item: Item<'_, '_>,
) -> Result<(), QueryError> {
    match item {
        Item::Rule(r) if r.name() == Some(SELECTORS) => query.selectors.extend(selectors(r)?),
        Item::Rule(r) if r.name() == Some(PSEUDO_CLASS) => {
            query.pseudo_class = Some(pseudo_class(r)?)
        }
        Item::Rule(r) if r.name() == Some(ATTR) => query.attributes.extend(attributes(r)?),
        _ => return Err(malformed(parent)),
    }
    Ok(())
}

fn selectors(record: &MatchRecord<'_>) -> Result<Vec<Selector>, QueryError> {
    let mut out = Vec::new();
    let mut current = record;
    loop {
        let items = items(current);
        let selector = match items.as_slice() {
            [Item::Token(sigil), Item::Token(name), ..] => match sigil.kind {
                TokenKind::Hash => Selector::Id(name.literal.clone()),
                TokenKind::Dot => Selector::Class(name.literal.clone()),
                _ => return Err(malformed(current)),
            },
            _ => return Err(malformed(current)),
        };
        out.push(selector);
        match items.get(2) {
            Some(&Item::Rule(next)) if next.name() == Some(SELECTORS) => current = next,
            None => return Ok(out),
            _ => return Err(malformed(current)),
        }
    }
}

fn pseudo_class(record: &MatchRecord<'_>) -> Result<PseudoClass, QueryError> {
    match items(record).as_slice() {
        [Item::Token(_colon), Item::Token(name)] => Ok(PseudoClass {
            name: name.literal.clone(),
            args: Vec::new(),
        }),
        [Item::Token(_colon), Item::Token(name), Item::Token(_open), Item::Rule(list), Item::Token(_close)]
            if list.name() == Some(ARGS) =>
        {
            Ok(PseudoClass {
                name: name.literal.clone(),
                args: args(list)?,
            })
        }
        _ => Err(malformed(record)),
    }
}

fn args(record: &MatchRecord<'_>) -> Result<Vec<Value>, QueryError> {
    let mut out = Vec::new();
    let mut current = record;
    loop {
        match items(current).as_slice() {
            [Item::Rule(v)] => {
                out.push(value(v)?);
                return Ok(out);
            }
            [Item::Rule(v), Item::Token(_comma), Item::Rule(rest)]
                if rest.name() == Some(ARGS) =>
            {
                out.push(value(v)?);
                current = *rest;
            }
            _ => return Err(malformed(current)),
        }
    }
}

fn value(record: &MatchRecord<'_>) -> Result<Value, QueryError> {
    if record.name() != Some(VALUE) {
        return Err(malformed(record));
    }
    match items(record).as_slice() {
        [Item::Token(t)] => match t.kind {
            TokenKind::Identifier => Ok(Value::Identifier(t.literal.clone())),
            TokenKind::Digits => Ok(Value::Digits(t.literal.clone())),
            TokenKind::String => Ok(Value::String(t.literal.clone())),
            _ => Err(malformed(record)),
        },
        _ => Err(malformed(record)),
    }
}

fn attributes(record: &MatchRecord<'_>) -> Result<Vec<Attribute>, QueryError> {
    let mut out = Vec::new();
    let mut current = record;
    loop {
        let items = items(current);
        let (key, value_record, rest) = match items.as_slice() {
            [Item::Token(_open), Item::Token(key), Item::Token(_eq), Item::Rule(v), Item::Token(_close), rest @ ..] => {
                (*key, *v, rest)
            }
            _ => return Err(malformed(current)),
        };
        out.push(Attribute {
            key: key.literal.clone(),
            value: value(value_record)?,
        });
        match rest {
            [] => return Ok(out),
            [Item::Rule(next)] if next.name() == Some(ATTR) => current = *next,
            _ => return Err(malformed(current)),
        }
    }
}

fn sub(record: &MatchRecord<'_>) -> Result<SubQuery, QueryError> {
    let items = items(record);
    let (combinator, inner) = match items.as_slice() {
        [Item::Token(t), Item::Rule(q)] if t.kind == TokenKind::Greater => (Combinator::Child, *q),
        [Item::Rule(q)] => (Combinator::Descendant, *q),
        _ => return Err(malformed(record)),
    };
    Ok(SubQuery {
        combinator,
        query: extract(inner)?,
    })
}

fn fmt_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let is_identifier = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if is_identifier {
        f.write_str(name)
    } else {
        f.write_str(&quote(name))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Identifier(s) | Value::Digits(s) => f.write_str(s),
            Value::String(s) => f.write_str(&quote(s)),
        }
    }
}

impl fmt::Display for SelectorQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Type(name) => f.write_str(name)?,
            Target::Any => f.write_str("*")?,
            Target::Unspecified => {}
        }
        for selector in &self.selectors {
            let (sigil, name) = match selector {
                Selector::Id(name) => ("#", name),
                Selector::Class(name) => (".", name),
            };
            f.write_str(sigil)?;
            fmt_name(f, name)?;
        }
        if let Some(pseudo) = &self.pseudo_class {
            write!(f, ":{}", pseudo.name)?;
            if !pseudo.args.is_empty() {
                f.write_str("(")?;
                for (i, arg) in pseudo.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")?;
            }
        }
        for attribute in &self.attributes {
            write!(f, "[{}={}]", attribute.key, attribute.value)?;
        }
        if let Some(sub) = &self.sub_query {
            match sub.combinator {
                Combinator::Child => f.write_str(" > ")?,
                Combinator::Descendant => f.write_str(" ")?,
            }
            write!(f, "{}", sub.query)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::engine::Engine;
    use crate::query::lexing::lex;
    use crate::query::scanner::Scanner;

    fn parse(text: &str) -> SelectorQuery {
        Engine::default()
            .parse_selector(text)
            .unwrap_or_else(|e| panic!("`{}` should parse: {}", text, e))
    }

    #[test]
    fn test_id_only() {
        let query = parse("#foo");
        assert_eq!(query.target, Target::Unspecified);
        assert_eq!(query.selectors, vec![Selector::Id("foo".to_string())]);
        assert!(query.pseudo_class.is_none());
        assert!(query.sub_query.is_none());
    }

    #[test]
    fn test_type_class_and_pseudo_class() {
        let query = parse("Node.bar:visible(true)");
        assert_eq!(query.target, Target::Type("Node".to_string()));
        assert_eq!(query.selectors, vec![Selector::Class("bar".to_string())]);
        assert_eq!(
            query.pseudo_class,
            Some(PseudoClass {
                name: "visible".to_string(),
                args: vec![Value::Identifier("true".to_string())],
            })
        );
    }

    #[test]
    fn test_selector_chain_and_string_names() {
        let query = parse(r#"Mesh#body.red."with space""#);
        assert_eq!(
            query.selectors,
            vec![
                Selector::Id("body".to_string()),
                Selector::Class("red".to_string()),
                Selector::Class("with space".to_string()),
            ]
        );
    }

    #[test]
    fn test_pseudo_class_argument_list() {
        let query = parse(r#"*:nth(1, odd, "x")"#);
        let pseudo = query.pseudo_class.unwrap();
        assert_eq!(
            pseudo.args,
            vec![
                Value::Digits("1".to_string()),
                Value::Identifier("odd".to_string()),
                Value::String("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_attributes() {
        let query = parse("Light[type=spot][range=20]");
        assert_eq!(
            query.attributes,
            vec![
                Attribute {
                    key: "type".to_string(),
                    value: Value::Identifier("spot".to_string()),
                },
                Attribute {
                    key: "range".to_string(),
                    value: Value::Digits("20".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_child_and_descendant_combinators() {
        let query = parse("* > #child Leaf");
        assert_eq!(query.target, Target::Any);
        assert_eq!(query.depth(), 3);

        let child = query.sub_query.as_ref().unwrap();
        assert_eq!(child.combinator, Combinator::Child);
        assert_eq!(child.query.selectors, vec![Selector::Id("child".to_string())]);

        let descendant = child.query.sub_query.as_ref().unwrap();
        assert_eq!(descendant.combinator, Combinator::Descendant);
        assert_eq!(query.leaf().target, Target::Type("Leaf".to_string()));
    }

    #[test]
    fn test_canonical_display() {
        assert_eq!(parse("Node . bar").to_string(), "Node.bar");
        assert_eq!(parse("*>#a").to_string(), "* > #a");
        assert_eq!(
            parse(r#"Mesh."a b":p( 1 ,x )[k='v']"#).to_string(),
            r#"Mesh."a b":p(1,x)[k="v"]"#
        );
    }

    #[test]
    fn test_canonical_strings_keep_control_characters() {
        for text in ["a\rb", "a\0b", "a\u{1}b", "tab\there", "q\"uote\\"] {
            let query = SelectorQuery {
                selectors: vec![Selector::Class(text.to_string())],
                attributes: vec![Attribute {
                    key: "k".to_string(),
                    value: Value::String(text.to_string()),
                }],
                ..SelectorQuery::new(Target::Any)
            };
            assert_eq!(parse(&query.to_string()), query, "round trip of {:?}", text);
        }
    }

    #[test]
    fn test_extract_rejects_other_rules() {
        let engine = Engine::default();
        let value = engine.grammar().get(VALUE).unwrap();
        let record = engine.evaluate(value, Scanner::new(lex("a")));
        assert_eq!(
            extract(&record),
            Err(QueryError::Malformed {
                rule: VALUE.to_string()
            })
        );
    }
}
