//! SQL function patterns
//!
//! Some predicates need SQL that has no builder method, such as the
//! `@@` text-search match operator. They go through a [`FunctionRegistry`]:
//! a map from function name to a pattern with positional `?1..?n`
//! placeholders that are substituted with already-rendered SQL fragments.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Name of the full-text match function
pub const TSVECTOR_MATCH: &str = "tsvector_match";

/// Registered SQL function patterns
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    patterns: HashMap<String, String>,
}

impl FunctionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// PostgreSQL registry: `tsvector_match(a, b)` renders as `a @@ b`
    pub fn postgres() -> Self {
        let mut registry = Self::new();
        registry.register_pattern(TSVECTOR_MATCH, "?1 @@ ?2");
        registry
    }

    /// Register (or replace) a function pattern
    pub fn register_pattern(&mut self, name: impl Into<String>, pattern: impl Into<String>) {
        self.patterns.insert(name.into(), pattern.into());
    }

    /// Pattern registered under `name`
    pub fn pattern(&self, name: &str) -> Option<&str> {
        self.patterns.get(name).map(String::as_str)
    }

    /// Render `name(args...)` through its pattern
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when the function is unknown or the pattern
    /// references an argument that was not supplied.
    pub fn render(&self, name: &str, args: &[&str]) -> Result<String> {
        let pattern = self
            .pattern(name)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown SQL function '{name}'")))?;

        let mut rendered = String::with_capacity(pattern.len());
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '?' {
                rendered.push(c);
                continue;
            }

            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }

            if digits.is_empty() {
                rendered.push('?');
                continue;
            }

            let position: usize = digits
                .parse()
                .map_err(|_| Error::InvalidArgument(format!("bad placeholder ?{digits}")))?;
            let arg = position
                .checked_sub(1)
                .and_then(|index| args.get(index))
                .ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "function '{name}' references ?{position} but got {} argument(s)",
                        args.len()
                    ))
                })?;
            rendered.push_str(arg);
        }

        Ok(rendered)
    }
}
