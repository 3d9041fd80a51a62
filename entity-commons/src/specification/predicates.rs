//! Reusable predicates
//!
//! Every predicate returns a [`Specification`]. Absent or blank inputs return
//! the always-true specification, so callers can conjoin optional filters
//! without branching:
//!
//! ```rust
//! use entity_commons::specification::{contains_query, has_author_id, in_period, is_active};
//!
//! let spec = is_active()
//!     .and(has_author_id(None))
//!     .and(in_period::<i64>(None, None))
//!     .and(contains_query(Some("   "), None));
//!
//! assert!(spec.joins().is_empty());
//! assert!(spec.orderings().is_empty());
//! ```
//!
//! The free functions use [`FieldConventions::default`]; services with other
//! column names build a [`Predicates`] from their own conventions.

use sea_query::{Alias, Expr, SimpleExpr, Value};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dialect::{FunctionRegistry, TSVECTOR_MATCH};
use super::{JoinKind, Specification, ROOT};
use crate::model::Status;
use crate::repository::OrderDirection;

/// Column and association names the predicates refer to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConventions {
    /// Status column
    pub status: String,
    /// Creation timestamp column
    pub created: String,
    /// Author association name (and join alias)
    pub author: String,
    /// Table the author association points to
    pub author_table: String,
    /// Root column holding the author id
    pub author_key: String,
    /// Precomputed `tsvector` column
    pub search_column: String,
    /// Text-search dictionary used when the caller gives none
    pub search_language: String,
}

impl Default for FieldConventions {
    fn default() -> Self {
        Self {
            status: "status".to_string(),
            created: "created".to_string(),
            author: "author".to_string(),
            author_table: "users".to_string(),
            author_key: "author_id".to_string(),
            search_column: "fts".to_string(),
            search_language: "russian".to_string(),
        }
    }
}

/// Predicate factory bound to a set of conventions
#[derive(Debug, Clone)]
pub struct Predicates {
    conventions: FieldConventions,
    functions: FunctionRegistry,
}

impl Default for Predicates {
    fn default() -> Self {
        Self::new(FieldConventions::default())
    }
}

impl Predicates {
    /// Predicates over the given conventions, rendering through the
    /// PostgreSQL function registry
    pub fn new(conventions: FieldConventions) -> Self {
        Self {
            conventions,
            functions: FunctionRegistry::postgres(),
        }
    }

    /// Replace the function registry
    #[must_use]
    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// The conventions in use
    pub fn conventions(&self) -> &FieldConventions {
        &self.conventions
    }

    fn root_column(&self, column: &str) -> Expr {
        Expr::col((Alias::new(ROOT), Alias::new(column)))
    }

    /// Rows in the given status
    pub fn has_status(&self, status: Status) -> Specification {
        Specification::filter(
            self.root_column(&self.conventions.status)
                .eq(SimpleExpr::Value(status.into())),
        )
    }

    /// Rows written by the given author; `None` restricts nothing
    pub fn has_author_id(&self, author_id: Option<Uuid>) -> Specification {
        let Some(author_id) = author_id else {
            return Specification::unrestricted();
        };

        let mut spec = Specification::unrestricted();
        let alias = spec.join(
            &self.conventions.author,
            &self.conventions.author_table,
            &self.conventions.author_key,
            JoinKind::Inner,
        );
        spec.with_condition(
            Expr::col((Alias::new(alias), Alias::new("id")))
                .eq(SimpleExpr::Value(author_id.into())),
        )
    }

    /// Rows created within the inclusive range
    ///
    /// A missing bound leaves that side open; no bounds restrict nothing.
    pub fn in_period<V>(&self, start: Option<V>, end: Option<V>) -> Specification
    where
        V: Ord + Into<Value>,
    {
        let created = self.root_column(&self.conventions.created);
        let bound = |v: V| SimpleExpr::Value(v.into());

        match (start, end) {
            (Some(start), Some(end)) => {
                Specification::filter(created.between(bound(start), bound(end)))
            }
            (Some(start), None) => Specification::filter(created.gte(bound(start))),
            (None, Some(end)) => Specification::filter(created.lte(bound(end))),
            (None, None) => Specification::unrestricted(),
        }
    }

    /// Active rows created within the inclusive range
    pub fn active_in_period<V>(&self, start: Option<V>, end: Option<V>) -> Specification
    where
        V: Ord + Into<Value>,
    {
        self.has_status(Status::Active)
            .and(self.in_period(start, end))
    }

    /// Full-text match on the search column, ordered by rank
    ///
    /// Each whitespace-separated token becomes a prefix term (`token:*`) and
    /// the terms are AND-ed. Blank or absent text restricts nothing and adds
    /// no ordering. `language` falls back to the configured dictionary.
    pub fn contains_query(&self, text: Option<&str>, language: Option<&str>) -> Specification {
        let Some(terms) = text.and_then(prefix_terms) else {
            return Specification::unrestricted();
        };
        let language = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.conventions.search_language)
            .to_string();

        let column = format!(
            "{}.{}",
            quote_ident(ROOT),
            quote_ident(&self.conventions.search_column)
        );
        let tsquery = "to_tsquery($1::regconfig, $2)";

        let matches = self
            .functions
            .render(TSVECTOR_MATCH, &[&column, tsquery])
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Falling back to the built-in text-search match");
                format!("{column} @@ {tsquery}")
            });
        let rank = format!("ts_rank({column}, {tsquery})");

        Specification::filter(Expr::cust_with_values(
            matches,
            [language.clone(), terms.clone()],
        ))
        .order_by(
            Expr::cust_with_values(rank, [language, terms]),
            OrderDirection::Desc,
        )
    }
}

/// `red car` -> `red:* & car:*`; `None` when there is no token
fn prefix_terms(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split_whitespace()
        .map(|token| format!("{token}:*"))
        .collect();
    (!terms.is_empty()).then(|| terms.join(" & "))
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// [`Predicates::has_status`] with default conventions
pub fn has_status(status: Status) -> Specification {
    Predicates::default().has_status(status)
}

/// Rows in [`Status::Active`]
pub fn is_active() -> Specification {
    has_status(Status::Active)
}

/// Rows in [`Status::NotActive`]
pub fn is_not_active() -> Specification {
    has_status(Status::NotActive)
}

/// Rows in [`Status::Blocked`]
pub fn is_blocked() -> Specification {
    has_status(Status::Blocked)
}

/// Rows in [`Status::Deleted`]
pub fn is_deleted() -> Specification {
    has_status(Status::Deleted)
}

/// Rows in [`Status::UnderModeration`]
pub fn is_under_moderation() -> Specification {
    has_status(Status::UnderModeration)
}

/// Rows in [`Status::ModerationDeclined`]
pub fn is_moderation_declined() -> Specification {
    has_status(Status::ModerationDeclined)
}

/// Rows in [`Status::Draft`]
pub fn is_draft() -> Specification {
    has_status(Status::Draft)
}

/// [`Predicates::has_author_id`] with default conventions
pub fn has_author_id(author_id: Option<Uuid>) -> Specification {
    Predicates::default().has_author_id(author_id)
}

/// [`Predicates::in_period`] with default conventions
pub fn in_period<V>(start: Option<V>, end: Option<V>) -> Specification
where
    V: Ord + Into<Value>,
{
    Predicates::default().in_period(start, end)
}

/// [`Predicates::active_in_period`] with default conventions
pub fn active_in_period<V>(start: Option<V>, end: Option<V>) -> Specification
where
    V: Ord + Into<Value>,
{
    Predicates::default().active_in_period(start, end)
}

/// [`Predicates::contains_query`] with default conventions
pub fn contains_query(text: Option<&str>, language: Option<&str>) -> Specification {
    Predicates::default().contains_query(text, language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sql(spec: &Specification) -> String {
        spec.count_sql("posts")
    }

    #[test]
    fn test_has_status() {
        assert!(sql(&has_status(Status::Blocked)).contains(r#""root"."status" = 'BLOCKED'"#));
        assert!(sql(&is_draft()).contains("'DRAFT'"));
        assert!(sql(&is_moderation_declined()).contains("'MODERATION_DECLINED'"));
    }

    #[test]
    fn test_has_author_id_none_is_unrestricted() {
        assert!(has_author_id(None).is_unrestricted());
    }

    #[test]
    fn test_has_author_id_joins_author() {
        let id = Uuid::parse_str("0190c7b2-6f7c-7cc2-8d2e-1f6b1c2d3e4f").unwrap();
        let spec = has_author_id(Some(id));
        let sql = sql(&spec);

        assert_eq!(spec.joins().len(), 1);
        assert!(sql.contains(r#"INNER JOIN "users" AS "author""#));
        assert!(sql.contains(r#""author"."id" = '0190c7b2-6f7c-7cc2-8d2e-1f6b1c2d3e4f'"#));
    }

    #[test]
    fn test_author_or_draft_keeps_authorless_drafts() {
        let id = Uuid::parse_str("0190c7b2-6f7c-7cc2-8d2e-1f6b1c2d3e4f").unwrap();
        let sql = sql(&has_author_id(Some(id)).or(is_draft()));

        assert!(!sql.contains("INNER JOIN"));
        assert!(sql.contains(r#"LEFT JOIN "users" AS "author""#));
        assert!(sql.contains(r#"OR "root"."status" = 'DRAFT'"#));
    }

    #[test]
    fn test_in_period_both_bounds_is_inclusive_between() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let sql = sql(&in_period(Some(start), Some(end)));
        assert!(sql.contains(r#""root"."created" BETWEEN '2024-01-01"#));
        assert!(sql.contains("AND '2024-01-31"));
    }

    #[test]
    fn test_in_period_open_bounds() {
        assert!(sql(&in_period(Some(5), None)).contains(r#""root"."created" >= 5"#));
        assert!(sql(&in_period(None, Some(9))).contains(r#""root"."created" <= 9"#));
    }

    #[test]
    fn test_in_period_no_bounds_is_unrestricted() {
        assert!(in_period::<i64>(None, None).is_unrestricted());
    }

    #[test]
    fn test_active_in_period() {
        let sql = sql(&active_in_period(Some(1), Some(2)));
        assert!(sql.contains(r#""root"."status" = 'ACTIVE'"#));
        assert!(sql.contains("BETWEEN 1 AND 2"));

        let status_only = active_in_period::<i64>(None, None);
        assert_eq!(status_only, is_active());
    }

    #[test]
    fn test_contains_query_blank_is_unrestricted() {
        assert!(contains_query(None, None).is_unrestricted());
        assert!(contains_query(Some(""), Some("english")).is_unrestricted());
        assert!(contains_query(Some(" \t\n "), None).is_unrestricted());
    }

    #[test]
    fn test_contains_query_builds_prefix_terms() {
        let spec = contains_query(Some("red car"), Some("english"));
        let sql = sql(&spec);
        assert!(sql.contains(
            r#""root"."fts" @@ to_tsquery('english'::regconfig, 'red:* & car:*')"#
        ));
    }

    #[test]
    fn test_contains_query_collapses_whitespace_runs() {
        assert_eq!(
            prefix_terms("  red \t  car\nwash ").as_deref(),
            Some("red:* & car:* & wash:*")
        );
    }

    #[test]
    fn test_contains_query_keeps_duplicates_and_order() {
        assert_eq!(
            prefix_terms("car red car").as_deref(),
            Some("car:* & red:* & car:*")
        );
    }

    #[test]
    fn test_contains_query_orders_by_rank() {
        let spec = contains_query(Some("red"), None);
        assert_eq!(spec.orderings().len(), 1);
        assert_eq!(spec.orderings()[0].direction, OrderDirection::Desc);

        let pageable = crate::repository::Pageable::page(1, 10, Default::default());
        let sql = spec.select_sql("posts", &pageable);
        assert!(sql.contains(
            r#"ORDER BY ts_rank("root"."fts", to_tsquery('russian'::regconfig, 'red:*')) DESC"#
        ));
    }

    #[test]
    fn test_contains_query_default_language() {
        let sql = sql(&contains_query(Some("дом"), None));
        assert!(sql.contains("'russian'::regconfig"));
        assert!(sql.contains("'дом:*'"));
    }

    #[test]
    fn test_contains_query_uses_conventions() {
        let predicates = Predicates::new(FieldConventions {
            search_column: "search_vector".into(),
            search_language: "simple".into(),
            ..FieldConventions::default()
        });
        let sql = sql(&predicates.contains_query(Some("rust"), None));
        assert!(sql.contains(r#""root"."search_vector" @@ to_tsquery('simple'::regconfig"#));
    }

    #[test]
    fn test_contains_query_renders_through_registry() {
        let mut functions = FunctionRegistry::new();
        functions.register_pattern(TSVECTOR_MATCH, "?2 @@ ?1");
        let predicates = Predicates::default().with_functions(functions);
        let sql = sql(&predicates.contains_query(Some("rust"), Some("english")));
        assert!(sql.contains(r#"to_tsquery('english'::regconfig, 'rust:*') @@ "root"."fts""#));
    }

    #[test]
    fn test_contains_query_values_are_escaped() {
        let sql = sql(&contains_query(Some("o'reilly"), Some("english")));
        assert!(sql.contains("'o''reilly:*'") || sql.contains(r"E'o\'reilly:*'"));
    }

    #[test]
    fn test_conventions_deserialize_with_defaults() {
        let conventions: FieldConventions =
            serde_json::from_value(serde_json::json!({ "search_language": "english" })).unwrap();
        assert_eq!(conventions.search_language, "english");
        assert_eq!(conventions.search_column, "fts");
    }
}
