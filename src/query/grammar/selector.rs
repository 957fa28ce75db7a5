//! The selector query grammar
//!
//! ```text
//! value        := identifier | digits | string                  (exclusive)
//! attr         := '[' identifier '=' value ']' [attr]?
//! args         := value [',' args]?
//! pseudoClass  := ':' identifier ['(' args ')']?
//! selectors    := ('#' | '.') (identifier | string) [selectors]?
//! typeIdQuery  := (identifier | '*') [selectors]? [pseudoClass]? [attr]?
//! attrQuery    := selectors [pseudoClass]? [attr]?
//! subQuery     := ['>']? query
//! query        := (typeIdQuery | attrQuery) [subQuery]?          (root)
//! ```
//!
//! Rule names double as the keys [selector](crate::query::selector) extraction walks the
//! match tree by, so they are exported as constants.

use super::{Grammar, Rule};
use crate::query::error::GrammarResult;

pub const VALUE: &str = "value";
pub const ATTR: &str = "attr";
pub const ARGS: &str = "args";
pub const PSEUDO_CLASS: &str = "pseudoClass";
pub const SELECTORS: &str = "selectors";
pub const TYPE_ID_QUERY: &str = "typeIdQuery";
pub const ATTR_QUERY: &str = "attrQuery";
pub const SUB_QUERY: &str = "subQuery";
pub const QUERY: &str = "query";

fn punct(symbol: &str) -> GrammarResult<Rule> {
    Rule::reserved(symbol)
}

fn maybe(name: &str) -> Rule {
    Rule::optional(Rule::reference(name))
}

/// Build the rule table, in dependency order
pub fn rules() -> GrammarResult<Vec<Rule>> {
    let value = Rule::exclusive([Rule::identifier(), Rule::digits(), Rule::string()]).named(VALUE);

    let attr = Rule::sequence([
        punct("[")?,
        Rule::identifier(),
        punct("=")?,
        Rule::reference(VALUE),
        punct("]")?,
        maybe(ATTR),
    ])
    .named(ATTR);

    let args = Rule::sequence([
        Rule::reference(VALUE),
        Rule::optional(Rule::sequence([punct(",")?, Rule::reference(ARGS)])),
    ])
    .named(ARGS);

    let pseudo_class = Rule::sequence([
        punct(":")?,
        Rule::identifier(),
        Rule::optional(Rule::sequence([
            punct("(")?,
            Rule::reference(ARGS),
            punct(")")?,
        ])),
    ])
    .named(PSEUDO_CLASS);

    let selectors = Rule::sequence([
        Rule::alternation([punct("#")?, punct(".")?]),
        Rule::alternation([Rule::identifier(), Rule::string()]),
        maybe(SELECTORS),
    ])
    .named(SELECTORS);

    // Both query forms end in the same optional pseudo-class and attribute list
    let qualifiers = [maybe(PSEUDO_CLASS), maybe(ATTR)];

    let type_id_query = Rule::sequence(
        [
            Rule::alternation([Rule::identifier(), punct("*")?]),
            maybe(SELECTORS),
        ]
        .into_iter()
        .chain(qualifiers.iter().map(Rule::duplicate)),
    )
    .named(TYPE_ID_QUERY);

    let attr_query = Rule::sequence(
        [Rule::reference(SELECTORS)]
            .into_iter()
            .chain(qualifiers.iter().map(Rule::duplicate)),
    )
    .named(ATTR_QUERY);

    let sub_query = Rule::sequence([
        Rule::optional(punct(">")?),
        Rule::lazy_reference(QUERY),
    ])
    .named(SUB_QUERY);

    let query = Rule::sequence([
        Rule::alternation([Rule::reference(TYPE_ID_QUERY), Rule::reference(ATTR_QUERY)]),
        maybe(SUB_QUERY),
    ])
    .named(QUERY);

    Ok(vec![
        value,
        attr,
        args,
        pseudo_class,
        selectors,
        type_id_query,
        attr_query,
        sub_query,
        query,
    ])
}

/// The assembled selector grammar, rooted at `query`
pub fn grammar() -> GrammarResult<Grammar> {
    Grammar::new(rules()?, QUERY)
}
