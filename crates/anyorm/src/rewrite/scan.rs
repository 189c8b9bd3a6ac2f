//! Top-level keyword scanning over SQL text.
//!
//! This is a textual heuristic, not a parser. Keywords count only at
//! parenthesis depth 0, outside quoted text and on word boundaries.

use std::sync::OnceLock;

use regex::Regex;

use crate::dialect::Dialect;
use crate::rendered::count_placeholders;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
    Fetch,
    For,
}

impl Keyword {
    const ALL: [Keyword; 10] = [
        Keyword::Select,
        Keyword::From,
        Keyword::Where,
        Keyword::GroupBy,
        Keyword::Having,
        Keyword::OrderBy,
        Keyword::Limit,
        Keyword::Offset,
        Keyword::Fetch,
        Keyword::For,
    ];

    fn pattern(self) -> &'static str {
        match self {
            Keyword::Select => r"(?i)\bSELECT\b",
            Keyword::From => r"(?i)\bFROM\b",
            Keyword::Where => r"(?i)\bWHERE\b",
            Keyword::GroupBy => r"(?i)\bGROUP\s+BY\b",
            Keyword::Having => r"(?i)\bHAVING\b",
            Keyword::OrderBy => r"(?i)\bORDER\s+BY\b",
            Keyword::Limit => r"(?i)\bLIMIT\b",
            Keyword::Offset => r"(?i)\bOFFSET\b",
            Keyword::Fetch => r"(?i)\bFETCH\b",
            Keyword::For => r"(?i)\bFOR\b",
        }
    }

    fn regex(self) -> &'static Regex {
        static CACHE: OnceLock<Vec<Regex>> = OnceLock::new();
        let cache = CACHE.get_or_init(|| {
            Keyword::ALL
                .iter()
                .map(|k| Regex::new(k.pattern()).expect("invalid built-in keyword regex"))
                .collect()
        });
        &cache[self as usize]
    }
}

/// Clauses that end a WHERE clause.
const AFTER_WHERE: &[Keyword] = &[
    Keyword::GroupBy,
    Keyword::Having,
    Keyword::OrderBy,
    Keyword::Limit,
    Keyword::Offset,
    Keyword::Fetch,
    Keyword::For,
];

/// Clauses that may follow ORDER BY.
const AFTER_ORDER: &[Keyword] = &[Keyword::Limit, Keyword::Offset, Keyword::Fetch, Keyword::For];

/// SQL text with a per-byte "at top level" mask.
pub(crate) struct Scanner<'a> {
    sql: &'a str,
    top: Vec<bool>,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(sql: &'a str) -> Self {
        let bytes = sql.as_bytes();
        let mut top = vec![false; bytes.len()];
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;
        for (i, &b) in bytes.iter().enumerate() {
            match quote {
                Some(q) => {
                    if b == q {
                        quote = None;
                    }
                }
                None => match b {
                    b'\'' | b'"' | b'`' => quote = Some(b),
                    b'(' => depth += 1,
                    b')' => depth = depth.saturating_sub(1),
                    _ => top[i] = depth == 0,
                },
            }
        }
        Self { sql, top }
    }

    /// First top-level occurrence of `keyword` at or after byte `from`.
    pub(crate) fn find(&self, keyword: Keyword, from: usize) -> Option<(usize, usize)> {
        keyword
            .regex()
            .find_iter(self.sql)
            .find(|m| m.start() >= from && self.top[m.start()])
            .map(|m| (m.start(), m.end()))
    }

    /// Start of the earliest top-level occurrence of any of `keywords`.
    pub(crate) fn find_any(&self, keywords: &[Keyword], from: usize) -> Option<usize> {
        keywords
            .iter()
            .filter_map(|k| self.find(*k, from).map(|(start, _)| start))
            .min()
    }

    pub(crate) fn contains(&self, keyword: Keyword) -> bool {
        self.find(keyword, 0).is_some()
    }
}

fn complexity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\(\s*SELECT\b|\bJOIN\b|\bGROUP\s+BY\b|\bHAVING\b|\bDISTINCT\b|\bUNION\b|\bINTERSECT\b|\bEXCEPT\b",
        )
        .expect("invalid built-in complexity regex")
    })
}

/// `true` if `sql` mentions both `SELECT` and `FROM`.
pub(crate) fn is_full_statement(sql: &str) -> bool {
    Keyword::Select.regex().is_match(sql) && Keyword::From.regex().is_match(sql)
}

/// `true` if counting `sql` needs a derived table: it has a subquery, join,
/// grouping, DISTINCT or a set operation.
pub fn is_complex(sql: &str) -> bool {
    complexity_regex().is_match(sql)
}

/// Byte offset at which a WHERE predicate is appended: the first top-level
/// clause after FROM that ends a WHERE clause, or the end of the text.
fn where_tail(scanner: &Scanner<'_>, sql: &str) -> usize {
    let from = scanner.find(Keyword::From, 0).map_or(0, |(_, end)| end);
    scanner.find_any(AFTER_WHERE, from).unwrap_or(sql.len())
}

fn splice(sql: &str, at: usize, insert: &str) -> String {
    let head = sql[..at].trim_end();
    let tail = sql[at..].trim_start();
    if tail.is_empty() {
        format!("{}{}", head, insert)
    } else {
        format!("{}{} {}", head, insert, tail)
    }
}

/// Insert `WHERE 1=1` if `sql` has no top-level WHERE.
pub fn ensure_where(sql: &str) -> String {
    let scanner = Scanner::new(sql);
    if scanner.contains(Keyword::Where) {
        return sql.to_string();
    }
    splice(sql, where_tail(&scanner, sql), " WHERE 1=1")
}

/// AND `predicate` into the statement's WHERE clause.
///
/// An existing WHERE body is parenthesised first so the predicate constrains
/// every branch of it. Returns the new text and the number of placeholders
/// that precede the inserted predicate, so its parameters can be spliced into
/// place.
pub(crate) fn and_predicate(sql: &str, predicate: &str) -> (String, usize) {
    let scanner = Scanner::new(sql);
    let after_from = scanner.find(Keyword::From, 0).map_or(0, |(_, end)| end);
    let Some((_, body_start)) = scanner.find(Keyword::Where, after_from) else {
        let sql = ensure_where(sql);
        let scanner = Scanner::new(&sql);
        let at = where_tail(&scanner, &sql);
        let before = count_placeholders(&sql[..at]);
        return (splice(&sql, at, &format!(" AND ({})", predicate)), before);
    };
    let body_end = scanner.find_any(AFTER_WHERE, body_start).unwrap_or(sql.len());
    let before = count_placeholders(&sql[..body_end]);
    let body = sql[body_start..body_end].trim();
    let clause = format!(" ({}) AND ({})", body, predicate);
    let head = sql[..body_start].trim_end();
    let tail = sql[body_end..].trim_start();
    let out = if tail.is_empty() {
        format!("{}{}", head, clause)
    } else {
        format!("{}{} {}", head, clause, tail)
    };
    (out, before)
}

/// `true` if `sql` has an ORDER BY outside parentheses and quoted text.
pub(crate) fn has_top_level_order_by(sql: &str) -> bool {
    Scanner::new(sql).contains(Keyword::OrderBy)
}

/// Add `ORDER BY <sort>` unless the statement already has a top-level ORDER BY.
pub fn apply_sort(sql: &str, sort: &[String]) -> String {
    if sort.is_empty() {
        return sql.to_string();
    }
    let scanner = Scanner::new(sql);
    if scanner.contains(Keyword::OrderBy) {
        return sql.to_string();
    }
    let at = scanner.find_any(AFTER_ORDER, 0).unwrap_or(sql.len());
    splice(sql, at, &format!(" ORDER BY {}", sort.join(", ")))
}

/// Remove the top-level ORDER BY clause, keeping any LIMIT/OFFSET/FETCH/FOR
/// that follows it. An ORDER BY that binds parameters is kept.
pub fn strip_order_by(sql: &str) -> String {
    let scanner = Scanner::new(sql);
    let Some((start, end)) = scanner.find(Keyword::OrderBy, 0) else {
        return sql.to_string();
    };
    let stop = scanner.find_any(AFTER_ORDER, end).unwrap_or(sql.len());
    if count_placeholders(&sql[start..stop]) > 0 {
        return sql.to_string();
    }
    let head = sql[..start].trim_end();
    let tail = sql[stop..].trim_start();
    if tail.is_empty() {
        head.to_string()
    } else {
        format!("{} {}", head, tail)
    }
}

/// Remove a trailing top-level row-locking clause (`FOR UPDATE`, `FOR SHARE`
/// and their variants).
fn strip_lock(sql: &str) -> &str {
    let scanner = Scanner::new(sql);
    let after_from = scanner.find(Keyword::From, 0).map_or(0, |(_, end)| end);
    let Some((start, end)) = scanner.find(Keyword::For, after_from) else {
        return sql;
    };
    let rest = sql[end..].trim_start().to_ascii_uppercase();
    let is_lock = ["UPDATE", "SHARE", "NO KEY UPDATE", "KEY SHARE"]
        .iter()
        .any(|mode| rest.starts_with(mode));
    if is_lock && count_placeholders(&sql[start..]) == 0 {
        sql[..start].trim_end()
    } else {
        sql
    }
}

/// Derive the COUNT(*) statement for `sql`.
///
/// Simple statements have their projection replaced in place. Complex ones,
/// or ones whose projection binds parameters, are wrapped as
/// `SELECT COUNT(*) FROM (<sql>) AS <alias>`. A trailing row lock is dropped.
pub fn derive_count(sql: &str, alias: &str) -> String {
    let sql = strip_order_by(sql);
    let sql = strip_lock(&sql).to_string();
    if !is_complex(&sql) {
        let scanner = Scanner::new(&sql);
        if let Some((from, _)) = scanner.find(Keyword::From, 0) {
            if count_placeholders(&sql[..from]) == 0 {
                return format!("SELECT COUNT(*) {}", &sql[from..]);
            }
        }
    }
    format!("SELECT COUNT(*) FROM ({}) AS {}", sql, alias)
}

/// Derive the page-limited statement for `sql`.
pub fn derive_page(sql: &str, dialect: Option<&dyn Dialect>, offset: u64, limit: u64) -> String {
    match dialect {
        Some(dialect) => dialect.paginate(sql, offset, limit),
        None => format!("{} LIMIT {} OFFSET {}", sql, limit, offset),
    }
}
