//! Named-to-positional placeholder rewriting.
//!
//! Query templates reference parameters as `%(name)s`. The PostgreSQL driver only
//! understands `$1, $2, ...`, so templates are rewritten in a single pass:
//!
//! - every *occurrence* of a named placeholder gets the next index, so a name used
//!   twice is bound twice (`a=%(x)s AND b=%(x)s` becomes `a=$1 AND b=$2`);
//! - `%%` is a literal `%`;
//! - any other `%` is a template error.

use crate::executor::DbError;
use crate::query::params::ParameterSet;
use crate::value::Value;

/// A template rewritten into positional form.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalQuery {
    /// SQL with `$n` placeholders.
    pub sql: String,
    /// Parameter name bound at each position; `names[0]` is `$1`.
    pub names: Vec<String>,
}

impl PositionalQuery {
    /// Resolve the positional argument list against `params`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::MissingParameter` for the first name without a value.
    pub fn bind(&self, params: &ParameterSet) -> Result<Vec<Value>, DbError> {
        self.names
            .iter()
            .map(|name| {
                params
                    .get(name)
                    .cloned()
                    .ok_or_else(|| DbError::MissingParameter(name.clone()))
            })
            .collect()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Rewrite `%(name)s` placeholders into `$n`, one index per occurrence.
///
/// # Errors
///
/// Returns `DbError::Template` for a stray `%`, an unterminated or empty name, or a
/// conversion other than `s`.
pub fn to_positional(template: &str) -> Result<PositionalQuery, DbError> {
    let mut sql = String::with_capacity(template.len());
    let mut names = Vec::new();
    let mut chars = template.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        if c != '%' {
            sql.push(c);
            continue;
        }
        match chars.next() {
            Some((_, '%')) => sql.push('%'),
            Some((_, '(')) => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, ')')) => break,
                        Some((_, ch)) if is_name_char(ch) => name.push(ch),
                        Some((pos, ch)) => {
                            return Err(DbError::Template(format!(
                                "invalid character {ch:?} in placeholder name at byte {pos}"
                            )))
                        }
                        None => {
                            return Err(DbError::Template(format!(
                                "unterminated placeholder starting at byte {at}"
                            )))
                        }
                    }
                }
                if name.is_empty() {
                    return Err(DbError::Template(format!(
                        "empty placeholder name at byte {at}"
                    )));
                }
                match chars.next() {
                    Some((_, 's')) => {}
                    _ => {
                        return Err(DbError::Template(format!(
                            "placeholder %({name}) at byte {at} must end with 's'"
                        )))
                    }
                }
                names.push(name);
                sql.push('$');
                sql.push_str(&names.len().to_string());
            }
            _ => {
                return Err(DbError::Template(format!(
                    "unescaped '%' at byte {at}; use '%%' for a literal percent sign"
                )))
            }
        }
    }

    Ok(PositionalQuery { sql, names })
}
