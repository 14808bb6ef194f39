//! Statement-level guard for ad-hoc admin queries.
//!
//! A query passes only if it is a single `SELECT`, or a single `PRAGMA` from a
//! read-only allow-list. The text is tokenized with the SQLite dialect so that
//! comments, string literals and quoted identifiers cannot hide a second
//! statement behind a `;`.
//!
//! SQLite ends a block comment at the first `*/`, while the tokenizer nests
//! `/* /* */ */`. A block comment containing `/*` is refused outright so the
//! two never disagree about where a comment stops.

use sqlparser::dialect::SQLiteDialect;
use sqlparser::tokenizer::{Token, Tokenizer, Whitespace};

/// Pragmas that only report state when called without `=`.
const READ_ONLY_PRAGMAS: &[&str] = &[
    "application_id",
    "collation_list",
    "compile_options",
    "database_list",
    "encoding",
    "foreign_key_check",
    "foreign_key_list",
    "foreign_keys",
    "freelist_count",
    "function_list",
    "index_info",
    "index_list",
    "index_xinfo",
    "integrity_check",
    "journal_mode",
    "module_list",
    "page_count",
    "page_size",
    "pragma_list",
    "quick_check",
    "schema_version",
    "table_info",
    "table_list",
    "table_xinfo",
    "user_version",
];

/// Pragmas whose parenthesised argument selects what to inspect rather than a new value.
const INTROSPECTION_PRAGMAS: &[&str] = &[
    "foreign_key_check",
    "foreign_key_list",
    "index_info",
    "index_list",
    "index_xinfo",
    "integrity_check",
    "quick_check",
    "table_info",
    "table_list",
    "table_xinfo",
];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryGuardError {
    #[error("Query is required")]
    Empty,

    #[error("Only SELECT and PRAGMA queries are allowed for safety. Use a database client for data modifications.")]
    NotReadOnly,

    #[error("Only a single statement can be executed per query")]
    MultipleStatements,

    #[error("Nested block comments are not allowed")]
    NestedComment,

    #[error("PRAGMA {0} is not allowed here")]
    PragmaNotAllowed(String),

    #[error("Could not parse query: {0}")]
    Unparseable(String),
}

impl QueryGuardError {
    /// True when the query was understood but refused by policy (as opposed to malformed input).
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            Self::NotReadOnly
                | Self::MultipleStatements
                | Self::NestedComment
                | Self::PragmaNotAllowed(_)
        )
    }
}

/// Checks that `sql` is a single read-only statement.
pub fn check_read_only(sql: &str) -> Result<(), QueryGuardError> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(QueryGuardError::Empty);
    }

    let upper = trimmed.to_uppercase();
    if !upper.starts_with("SELECT") && !upper.starts_with("PRAGMA") {
        return Err(QueryGuardError::NotReadOnly);
    }

    let tokens = Tokenizer::new(&SQLiteDialect {}, trimmed)
        .tokenize()
        .map_err(|e| QueryGuardError::Unparseable(e.to_string()))?;

    let nested = tokens.iter().any(|t| {
        matches!(t, Token::Whitespace(Whitespace::MultiLineComment(body)) if body.contains("/*"))
    });
    if nested {
        return Err(QueryGuardError::NestedComment);
    }

    // comments are whitespace tokens
    let significant: Vec<Token> = tokens
        .into_iter()
        .filter(|t| !matches!(t, Token::Whitespace(_) | Token::EOF))
        .collect();

    let statements: Vec<&[Token]> = significant
        .split(|t| matches!(t, Token::SemiColon))
        .filter(|s| !s.is_empty())
        .collect();

    let statement = match statements.as_slice() {
        [single] => *single,
        [] => return Err(QueryGuardError::Empty),
        _ => return Err(QueryGuardError::MultipleStatements),
    };

    match statement.first() {
        Some(Token::Word(w)) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case("SELECT") => {
            Ok(())
        }
        Some(Token::Word(w)) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case("PRAGMA") => {
            check_pragma(&statement[1..])
        }
        _ => Err(QueryGuardError::NotReadOnly),
    }
}

fn check_pragma(rest: &[Token]) -> Result<(), QueryGuardError> {
    let (name, args) = match rest {
        [Token::Word(_schema), Token::Period, Token::Word(name), tail @ ..] => (name, tail),
        [Token::Word(name), tail @ ..] => (name, tail),
        _ => {
            return Err(QueryGuardError::Unparseable(
                "expected a pragma name".to_string(),
            ))
        }
    };

    let name = name.value.to_lowercase();

    if args.iter().any(|t| matches!(t, Token::Eq)) {
        return Err(QueryGuardError::PragmaNotAllowed(name));
    }
    if !READ_ONLY_PRAGMAS.contains(&name.as_str()) {
        return Err(QueryGuardError::PragmaNotAllowed(name));
    }
    if !args.is_empty() && !INTROSPECTION_PRAGMAS.contains(&name.as_str()) {
        return Err(QueryGuardError::PragmaNotAllowed(name));
    }

    Ok(())
}
