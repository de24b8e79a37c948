//! Field-level validation for customer candidates.
//!
//! Every field is checked independently and all violations are collected.
//! Within a single field the rules run in order and the first failure wins,
//! so a blank email reports `cannot be blank` rather than a syntax error.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::types::NewCustomer;

pub const EMAIL_MAX_LEN: usize = 50;
pub const TITLE_MAX_LEN: usize = 50;
pub const CONTENT_MAX_LEN: usize = 150;

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .expect("email regex is valid");
}

/// Validation failures keyed by field name.
///
/// Never empty: [`validate`] returns `Ok(())` instead of an empty map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

#[cfg(test)]
impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

/// Renders as `email: cannot be blank; title: cannot be blank.` with fields in name order.
impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
        }
        f.write_str(".")
    }
}

impl std::error::Error for FieldErrors {}

type Rule = fn(&str) -> Option<String>;

fn required(value: &str) -> Option<String> {
    value.is_empty().then(|| "cannot be blank".to_string())
}

fn email(value: &str) -> Option<String> {
    // Empty values are left to `required`
    (!value.is_empty() && !EMAIL_RE.is_match(value)).then(|| "must be a valid email address".to_string())
}

fn max_len<const N: usize>(value: &str) -> Option<String> {
    (value.chars().count() > N).then(|| format!("the length must be no more than {}", N))
}

fn check(value: &str, rules: &[Rule]) -> Option<String> {
    rules.iter().find_map(|rule| rule(value))
}

/// Checks a candidate against the customer field constraints.
pub fn validate(candidate: &NewCustomer) -> Result<(), FieldErrors> {
    let checks: [(&'static str, Option<String>); 3] = [
        ("email", check(&candidate.email, &[required, email, max_len::<EMAIL_MAX_LEN>])),
        ("title", check(&candidate.title, &[required, max_len::<TITLE_MAX_LEN>])),
        ("content", check(&candidate.content, &[max_len::<CONTENT_MAX_LEN>])),
    ];

    let errors: BTreeMap<&'static str, String> =
        checks.into_iter().filter_map(|(field, err)| err.map(|msg| (field, msg))).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(FieldErrors(errors))
    }
}
