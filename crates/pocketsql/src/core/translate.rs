//! MySQL-flavored SQL → SQLite rewriting.
//!
//! The translator is an ordered list of independent [`Rule`]s. Each rule
//! re-scans the whole statement; keywords match case-insensitively and all
//! other text is left as typed. Clauses SQLite has no equivalent for
//! (storage engines, table options, partitioning, table locks) are dropped
//! rather than rejected.
//!
//! Already-translated text matches none of the patterns, so running
//! [`translate`] twice gives the same output as running it once.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// A single rewrite step.
pub struct Rule {
    pub name: &'static str,
    scope: Scope,
    rewrite: Rewrite,
}

enum Scope {
    Anywhere,
    /// Only statements that create a table.
    CreateTable,
    /// Only statements whose beginning matches.
    Leading(Regex),
}

enum Rewrite {
    /// Applied in order, each over the output of the previous one.
    Patterns(Vec<(Regex, &'static str)>),
    /// Hand-written scanner; `None` means nothing changed.
    Scan(fn(&str) -> Option<String>),
}

static CREATE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\bCREATE\s+(?:TEMP(?:ORARY)?\s+)?TABLE\b"));

static PARTITION_BY: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\bPARTITION\s+BY\b"));

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(build_rules);

impl Rule {
    fn in_scope(&self, sql: &str) -> bool {
        match &self.scope {
            Scope::Anywhere => true,
            Scope::CreateTable => CREATE_TABLE.is_match(sql),
            Scope::Leading(head) => head.is_match(sql),
        }
    }

    /// Applies this rule alone. Returns `Cow::Borrowed` when nothing matched.
    pub fn apply<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        if !self.in_scope(sql) {
            return Cow::Borrowed(sql);
        }
        match &self.rewrite {
            Rewrite::Patterns(patterns) => {
                let mut out = Cow::Borrowed(sql);
                for (pattern, replacement) in patterns {
                    let replaced = match pattern.replace_all(&out, *replacement) {
                        Cow::Owned(s) => Some(s),
                        Cow::Borrowed(_) => None,
                    };
                    if let Some(s) = replaced {
                        out = Cow::Owned(s);
                    }
                }
                out
            }
            Rewrite::Scan(scan) => match scan(sql) {
                Some(s) => Cow::Owned(s),
                None => Cow::Borrowed(sql),
            },
        }
    }
}

/// The full rule list, in application order.
pub fn rules() -> &'static [Rule] {
    &RULES
}

/// Looks a rule up by name.
pub fn rule(name: &str) -> Option<&'static Rule> {
    rules().iter().find(|r| r.name == name)
}

/// Rewrites `sql` into syntax SQLite accepts.
pub fn translate(sql: &str) -> String {
    let mut out = sql.to_string();
    for rule in rules() {
        let rewritten = match rule.apply(&out) {
            Cow::Owned(s) => Some(s),
            Cow::Borrowed(_) => None,
        };
        if let Some(s) = rewritten {
            tracing::trace!(rule = rule.name, "rewrote statement");
            out = s;
        }
    }
    out
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex must compile")
}

fn build_rules() -> Vec<Rule> {
    const INT_COLUMN: &str = r"\bINT(?:EGER)?(?:\s*\(\s*\d+\s*\))?(?:\s+UNSIGNED)?(?:\s+NOT\s+NULL)?";

    vec![
        Rule {
            name: "auto_increment",
            scope: Scope::Anywhere,
            rewrite: Rewrite::Patterns(vec![
                (
                    re(&format!(r"(?i){INT_COLUMN}\s+AUTO_INCREMENT\s+PRIMARY\s+KEY\b")),
                    "INTEGER PRIMARY KEY AUTOINCREMENT",
                ),
                (
                    re(&format!(r"(?i){INT_COLUMN}\s+PRIMARY\s+KEY\s+AUTO_INCREMENT\b")),
                    "INTEGER PRIMARY KEY AUTOINCREMENT",
                ),
                // Table-level `AUTO_INCREMENT=<n>` is left for the table_options rule.
                (
                    re(r"(?i)\bAUTO_INCREMENT\b(\s*[^=\s]|\s*$)"),
                    "AUTOINCREMENT${1}",
                ),
            ]),
        },
        Rule {
            name: "enum",
            scope: Scope::Anywhere,
            rewrite: Rewrite::Patterns(vec![(re(r"(?i)\bENUM\s*\([^)]*\)"), "TEXT")]),
        },
        Rule {
            name: "engine",
            scope: Scope::Anywhere,
            rewrite: Rewrite::Patterns(vec![(re(r"(?i)\bENGINE\s*=\s*\w+"), "")]),
        },
        Rule {
            name: "unsigned",
            scope: Scope::Anywhere,
            rewrite: Rewrite::Patterns(vec![(re(r"(?i)\bUNSIGNED\b"), "")]),
        },
        Rule {
            name: "truncate",
            scope: Scope::Leading(re(r"(?i)^\s*TRUNCATE\b")),
            rewrite: Rewrite::Patterns(vec![(
                re(r"(?i)^(\s*)TRUNCATE(?:\s+TABLE)?\b"),
                "${1}DELETE FROM",
            )]),
        },
        Rule {
            name: "now",
            scope: Scope::Anywhere,
            rewrite: Rewrite::Patterns(vec![(re(r"(?i)\bNOW\s*\(\s*\)"), "CURRENT_TIMESTAMP")]),
        },
        Rule {
            name: "hash_comment",
            scope: Scope::Anywhere,
            rewrite: Rewrite::Scan(hash_comments),
        },
        Rule {
            name: "insert_ignore",
            scope: Scope::Anywhere,
            // Also takes a priority hint between INSERT and IGNORE.
            rewrite: Rewrite::Patterns(vec![(
                re(r"(?i)\bINSERT\s+(?:(?:LOW_PRIORITY|DELAYED|HIGH_PRIORITY)\s+)?IGNORE\b"),
                "INSERT OR IGNORE",
            )]),
        },
        Rule {
            name: "table_options",
            scope: Scope::CreateTable,
            rewrite: Rewrite::Patterns(vec![
                (re(r"(?i)(?:\bDEFAULT\s+)?\b(?:CHARSET|CHARACTER\s+SET)\s*=\s*\w+"), ""),
                (re(r"(?i)(?:\bDEFAULT\s+)?\bCOLLATE\s*=\s*\w+"), ""),
                (re(r"(?i)\bROW_FORMAT\s*=\s*\w+"), ""),
                (re(r"(?i)\bCOMMENT\s*=?\s*'[^']*'"), ""),
                (re(r"(?i)\bAUTO_INCREMENT\s*=\s*\d+"), ""),
                (re(r"(?i)\bCHECKSUM\s*=\s*\d+"), ""),
            ]),
        },
        Rule {
            name: "optimizer_hints",
            scope: Scope::Anywhere,
            rewrite: Rewrite::Patterns(vec![(
                re(r"(?i)\b(?:SQL_CALC_FOUND_ROWS|SQL_NO_CACHE|HIGH_PRIORITY|LOW_PRIORITY|DELAYED|QUICK)\b"),
                "",
            )]),
        },
        Rule {
            name: "lock_tables",
            scope: Scope::Leading(re(r"(?i)^\s*(?:UN)?LOCK\s+TABLES\b")),
            rewrite: Rewrite::Patterns(vec![(re(r"(?m)^"), "-- ")]),
        },
        Rule {
            name: "partition_by",
            scope: Scope::Anywhere,
            rewrite: Rewrite::Scan(drop_partitioning),
        },
    ]
}

/// `#` starts a comment in MySQL; SQLite wants `--`. Quoted text and
/// existing `--` comments are copied untouched.
fn hash_comments(sql: &str) -> Option<String> {
    if !sql.contains('#') {
        return None;
    }

    let mut out = String::with_capacity(sql.len() + 8);
    let mut changed = false;
    let mut quote: Option<char> = None;
    let mut in_comment = false;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if in_comment {
            in_comment = c != '\n';
            out.push(c);
            continue;
        }
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            out.push(c);
            continue;
        }
        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '#' => {
                out.push_str("--");
                in_comment = true;
                changed = true;
            }
            '-' if chars.peek() == Some(&'-') => {
                out.push(c);
                in_comment = true;
            }
            _ => out.push(c),
        }
    }

    changed.then_some(out)
}

/// Drops a top-level `PARTITION BY ...` clause through the end of the
/// statement. Occurrences inside parentheses belong to window functions
/// (`OVER (PARTITION BY ...)`) and are kept.
fn drop_partitioning(sql: &str) -> Option<String> {
    let at = PARTITION_BY
        .find_iter(sql)
        .map(|m| m.start())
        .find(|&start| is_top_level(sql, start))?;

    let mut out = sql[..at].trim_end().to_string();
    if sql.trim_end().ends_with(';') {
        out.push(';');
    }
    Some(out)
}

/// True when byte offset `at` is outside any quotes and parentheses.
fn is_top_level(sql: &str, at: usize) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in sql[..at].chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            },
        }
    }
    depth == 0 && quote.is_none()
}
