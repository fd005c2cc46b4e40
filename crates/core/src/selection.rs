//! Job name filters (shell-style globs).
//!
//! Patterns follow POSIX `fnmatch` semantics, case-sensitive:
//!
//! | Token     | Matches                                   |
//! |-----------|-------------------------------------------|
//! | `*`       | any run of characters, including none     |
//! | `?`       | exactly one character                     |
//! | `[seq]`   | one character in `seq` (ranges allowed)   |
//! | `[!seq]`  | one character not in `seq`                |
//!
//! An unterminated `[` matches a literal bracket. Each glob is compiled to
//! an anchored [`Regex`] once, when the filter set is built.

use regex::Regex;

use crate::error::CoreError;
use crate::types::Job;

/// A compiled set of job name globs. A name is selected when it matches
/// any of them.
#[derive(Debug, Clone)]
pub struct JobFilter {
    patterns: Vec<String>,
    compiled: Vec<Regex>,
}

impl JobFilter {
    /// Compile a set of glob patterns.
    pub fn new<I, S>(patterns: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let compiled = patterns
            .iter()
            .map(|p| {
                Regex::new(&glob_to_regex(p)).map_err(|e| CoreError::InvalidPattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns, compiled })
    }

    /// The source glob patterns, in the order given.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether `name` matches any pattern.
    pub fn matches(&self, name: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(name))
    }

    /// Keep the jobs whose name matches, preserving platform order.
    ///
    /// A job matching several patterns is returned once.
    pub fn select(&self, jobs: impl IntoIterator<Item = Job>) -> Vec<Job> {
        jobs.into_iter().filter(|job| self.matches(&job.name)).collect()
    }
}

/// Translate one glob into an anchored regular expression.
fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("(?s)^");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                // Collapse runs of stars.
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i..end]));
                    i = end + 1;
                }
                None => out.push_str(r"\["),
            },
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }

    out.push('$');
    out
}

/// Index of the `]` closing a class that opens just before `start`.
///
/// A `!` and a `]` directly after the opening bracket belong to the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

/// Translate the body of a `[...]` class (without the brackets).
fn translate_class(body: &[char]) -> String {
    let mut out = String::from("[");
    let mut rest = body;

    if let Some(('!', tail)) = rest.split_first().map(|(c, t)| (*c, t)) {
        out.push('^');
        rest = tail;
    } else if rest.first() == Some(&'^') {
        out.push_str(r"\^");
        rest = &rest[1..];
    }

    let mut prev = None;
    for &c in rest {
        match c {
            // Characters with meaning inside regex-crate classes.
            '\\' | '[' | ']' | '&' | '~' | '^' => {
                out.push('\\');
                out.push(c);
            }
            // `--` is set difference in the regex crate.
            '-' if prev == Some('-') => out.push_str(r"\-"),
            _ => out.push(c),
        }
        prev = Some(c);
    }

    out.push(']');
    out
}
