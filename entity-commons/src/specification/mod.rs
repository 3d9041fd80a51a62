//! Composable query specifications
//!
//! A [`Specification`] is a restriction on the rows of one root table: an
//! optional boolean condition, the association joins that condition needs,
//! and any ordering it contributes (full-text rank, for instance). An absent
//! condition means "always true"; such a specification leaves the query
//! untouched when applied.
//!
//! Specifications are rendered with [sea-query](sea_query) against the root
//! table, which is always aliased as [`ROOT`].
//!
//! # Example
//!
//! ```rust
//! use entity_commons::model::Status;
//! use entity_commons::specification::{has_status, in_period};
//!
//! let spec = has_status(Status::Active).and(in_period(Some(10), None));
//! let sql = spec.count_sql("posts");
//! assert!(sql.contains(r#""root"."status" = 'ACTIVE'"#));
//! assert!(sql.contains(r#""root"."created" >= 10"#));
//! ```

mod builder;
mod dialect;
mod predicates;

pub use builder::{CriteriaSpecBuilder, SpecBuilder, StandardSpecBuilder};
pub use dialect::{FunctionRegistry, TSVECTOR_MATCH};
pub use predicates::{
    active_in_period, contains_query, has_author_id, has_status, in_period, is_active,
    is_blocked, is_deleted, is_draft, is_moderation_declined, is_not_active,
    is_under_moderation, FieldConventions, Predicates,
};

use sea_query::{
    Alias, Asterisk, Expr, JoinType, PostgresQueryBuilder, Query, SelectStatement,
    SimpleExpr,
};

use crate::repository::{OrderDirection, Pageable};

/// Alias given to the root table in rendered statements
pub const ROOT: &str = "root";

/// How an association is joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// Rows without a match are dropped
    Inner,
    /// Rows without a match are kept with NULL columns
    Left,
}

impl JoinKind {
    fn join_type(self) -> JoinType {
        match self {
            Self::Inner => JoinType::InnerJoin,
            Self::Left => JoinType::LeftJoin,
        }
    }
}

/// A to-one association joined onto the root table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssociationJoin {
    /// Association name, e.g. `author`
    pub association: String,
    /// Alias the joined table is referenced by
    pub alias: String,
    /// Joined table
    pub table: String,
    /// Root column referencing the joined table's `id`
    pub foreign_key: String,
    /// Join kind
    pub kind: JoinKind,
}

/// An ordering clause contributed by a specification
#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    /// Expression to order by
    pub expr: SimpleExpr,
    /// Direction
    pub direction: OrderDirection,
}

/// Composable restriction over one root table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Specification {
    condition: Option<SimpleExpr>,
    joins: Vec<AssociationJoin>,
    orderings: Vec<Ordering>,
}

impl Specification {
    /// The always-true specification
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Specification holding a single condition
    pub fn filter(condition: SimpleExpr) -> Self {
        Self {
            condition: Some(condition),
            ..Self::default()
        }
    }

    /// Whether applying this specification changes nothing
    pub fn is_unrestricted(&self) -> bool {
        self.condition.is_none() && self.joins.is_empty() && self.orderings.is_empty()
    }

    /// The condition, `None` when always true
    pub fn condition(&self) -> Option<&SimpleExpr> {
        self.condition.as_ref()
    }

    /// Joins required by the condition
    pub fn joins(&self) -> &[AssociationJoin] {
        &self.joins
    }

    /// Orderings contributed by this specification
    pub fn orderings(&self) -> &[Ordering] {
        &self.orderings
    }

    /// Conjunction; joins are merged and orderings appended
    #[must_use]
    pub fn and(mut self, other: Specification) -> Self {
        self.condition = match (self.condition.take(), other.condition) {
            (Some(left), Some(right)) => Some(left.and(right)),
            (left, right) => left.or(right),
        };
        self.merge_parts(other.joins, other.orderings);
        self
    }

    /// Disjunction; an always-true side makes the result always true
    ///
    /// Joins from both sides become LEFT joins so a row matched by one
    /// disjunct is not dropped for lacking the other's association.
    #[must_use]
    pub fn or(mut self, other: Specification) -> Self {
        self.condition = match (self.condition.take(), other.condition) {
            (Some(left), Some(right)) => Some(left.or(right)),
            _ => None,
        };
        for join in &mut self.joins {
            join.kind = JoinKind::Left;
        }
        for join in other.joins {
            if !self.joins.iter().any(|j| j.alias == join.alias) {
                self.joins.push(AssociationJoin {
                    kind: JoinKind::Left,
                    ..join
                });
            }
        }
        self.orderings.extend(other.orderings);
        self
    }

    /// Negation; negating the always-true specification matches nothing
    #[must_use]
    pub fn not(mut self) -> Self {
        self.condition = Some(match self.condition.take() {
            Some(condition) => condition.not(),
            None => Expr::cust("FALSE"),
        });
        self
    }

    /// Add a condition to this specification
    #[must_use]
    pub fn with_condition(self, condition: SimpleExpr) -> Self {
        self.and(Self::filter(condition))
    }

    /// Add an ordering clause
    #[must_use]
    pub fn order_by(mut self, expr: SimpleExpr, direction: OrderDirection) -> Self {
        self.orderings.push(Ordering { expr, direction });
        self
    }

    /// Join an association, reusing an existing join of the same kind
    ///
    /// Returns the alias to reference the joined table by. A second join of
    /// the same association with a different kind gets its own alias.
    pub fn join(
        &mut self,
        association: &str,
        table: &str,
        foreign_key: &str,
        kind: JoinKind,
    ) -> String {
        if let Some(existing) = self
            .joins
            .iter()
            .find(|join| join.association == association && join.kind == kind)
        {
            return existing.alias.clone();
        }

        let taken = self
            .joins
            .iter()
            .filter(|join| join.association == association)
            .count();
        let alias = if taken == 0 {
            association.to_string()
        } else {
            format!("{association}_{taken}")
        };

        self.joins.push(AssociationJoin {
            association: association.to_string(),
            alias: alias.clone(),
            table: table.to_string(),
            foreign_key: foreign_key.to_string(),
            kind,
        });
        alias
    }

    // Joins under the same alias collapse into one; if the kinds disagree
    // the inner join wins.
    fn merge_parts(&mut self, joins: Vec<AssociationJoin>, orderings: Vec<Ordering>) {
        for join in joins {
            match self.joins.iter_mut().find(|j| j.alias == join.alias) {
                Some(existing) if existing.kind != join.kind => existing.kind = JoinKind::Inner,
                Some(_) => {}
                None => self.joins.push(join),
            }
        }
        self.orderings.extend(orderings);
    }

    /// Add this specification's joins and condition to `query`
    pub fn apply(&self, query: &mut SelectStatement) {
        for join in &self.joins {
            query.join_as(
                join.kind.join_type(),
                Alias::new(&join.table),
                Alias::new(&join.alias),
                Expr::col((Alias::new(ROOT), Alias::new(&join.foreign_key)))
                    .equals((Alias::new(&join.alias), Alias::new("id"))),
            );
        }
        if let Some(condition) = &self.condition {
            query.and_where(condition.clone());
        }
    }

    /// Add this specification's orderings to `query`
    pub fn apply_orderings(&self, query: &mut SelectStatement) {
        for ordering in &self.orderings {
            query.order_by_expr(ordering.expr.clone(), ordering.direction.to_order());
        }
    }

    /// `SELECT root.* FROM <table> AS root ...` for one page
    ///
    /// Specification orderings come before the pageable's sort.
    pub fn select(&self, table: &str, pageable: &Pageable) -> SelectStatement {
        let mut query = Query::select();
        query
            .column((Alias::new(ROOT), Asterisk))
            .from_as(Alias::new(table), Alias::new(ROOT));

        self.apply(&mut query);
        self.apply_orderings(&mut query);

        for order in pageable.sort.orders() {
            query.order_by(
                (Alias::new(ROOT), Alias::new(&order.field)),
                order.direction.to_order(),
            );
        }

        query.limit(pageable.limit).offset(pageable.offset);
        query
    }

    /// `SELECT COUNT(*) FROM <table> AS root ...`
    pub fn count(&self, table: &str) -> SelectStatement {
        let mut query = Query::select();
        query
            .expr(Expr::col(Asterisk).count())
            .from_as(Alias::new(table), Alias::new(ROOT));

        self.apply(&mut query);
        query
    }

    /// [`Specification::select`] rendered with values inlined, for logging and tests
    pub fn select_sql(&self, table: &str, pageable: &Pageable) -> String {
        self.select(table, pageable).to_string(PostgresQueryBuilder)
    }

    /// [`Specification::count`] rendered with values inlined
    pub fn count_sql(&self, table: &str) -> String {
        self.count(table).to_string(PostgresQueryBuilder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Sort;

    fn eq(column: &str, value: &str) -> Specification {
        Specification::filter(Expr::col((Alias::new(ROOT), Alias::new(column))).eq(value))
    }

    #[test]
    fn test_unrestricted_leaves_query_untouched() {
        let spec = Specification::unrestricted();
        assert!(spec.is_unrestricted());
        assert_eq!(
            spec.count_sql("posts"),
            r#"SELECT COUNT(*) FROM "posts" AS "root""#
        );
    }

    #[test]
    fn test_and_with_unrestricted_keeps_condition() {
        let spec = Specification::unrestricted().and(eq("title", "a"));
        assert_eq!(spec, eq("title", "a"));

        let spec = eq("title", "a").and(Specification::unrestricted());
        assert_eq!(spec, eq("title", "a"));
    }

    #[test]
    fn test_and_conjoins() {
        let sql = eq("title", "a").and(eq("slug", "b")).count_sql("posts");
        assert!(sql.contains(r#""root"."title" = 'a' AND "root"."slug" = 'b'"#));
    }

    #[test]
    fn test_or_with_unrestricted_is_unrestricted() {
        let spec = eq("title", "a").or(Specification::unrestricted());
        assert!(spec.condition().is_none());
    }

    #[test]
    fn test_or_disjoins() {
        let sql = eq("title", "a").or(eq("title", "b")).count_sql("posts");
        assert!(sql.contains(r#""root"."title" = 'a' OR "root"."title" = 'b'"#));
    }

    #[test]
    fn test_not_of_unrestricted_matches_nothing() {
        let sql = Specification::unrestricted().not().count_sql("posts");
        assert!(sql.ends_with("WHERE FALSE"));
    }

    #[test]
    fn test_join_reuses_same_kind() {
        let mut spec = Specification::unrestricted();
        let first = spec.join("author", "users", "author_id", JoinKind::Inner);
        let second = spec.join("author", "users", "author_id", JoinKind::Inner);

        assert_eq!(first, "author");
        assert_eq!(second, "author");
        assert_eq!(spec.joins().len(), 1);
    }

    #[test]
    fn test_join_missing_is_created() {
        let mut spec = Specification::unrestricted();
        assert!(spec.joins().is_empty());
        spec.join("author", "users", "author_id", JoinKind::Left);

        let join = &spec.joins()[0];
        assert_eq!(join.table, "users");
        assert_eq!(join.kind, JoinKind::Left);
    }

    #[test]
    fn test_join_different_kind_gets_new_alias() {
        let mut spec = Specification::unrestricted();
        spec.join("author", "users", "author_id", JoinKind::Inner);
        let alias = spec.join("author", "users", "author_id", JoinKind::Left);

        assert_eq!(alias, "author_1");
        assert_eq!(spec.joins().len(), 2);
    }

    #[test]
    fn test_and_merges_joins_by_alias() {
        let mut left = Specification::unrestricted();
        left.join("author", "users", "author_id", JoinKind::Left);
        let mut right = Specification::unrestricted();
        right.join("author", "users", "author_id", JoinKind::Inner);

        let merged = left.and(right);
        assert_eq!(merged.joins().len(), 1);
        assert_eq!(merged.joins()[0].kind, JoinKind::Inner);
    }

    #[test]
    fn test_or_turns_joins_into_left_joins() {
        let mut left = Specification::unrestricted();
        let alias = left.join("author", "users", "author_id", JoinKind::Inner);
        let left = left.with_condition(Expr::col((Alias::new(&alias), Alias::new("id"))).eq("x"));

        let merged = left.or(eq("status", "DRAFT"));
        assert_eq!(merged.joins().len(), 1);
        assert_eq!(merged.joins()[0].kind, JoinKind::Left);

        let sql = merged.count_sql("posts");
        assert!(!sql.contains("INNER JOIN"));
        assert!(sql.contains(
            r#"LEFT JOIN "users" AS "author" ON "root"."author_id" = "author"."id""#
        ));
        assert!(sql.contains(r#""author"."id" = 'x' OR "root"."status" = 'DRAFT'"#));
    }

    #[test]
    fn test_or_merges_joins_from_both_sides_as_left() {
        let mut left = Specification::unrestricted();
        left.join("author", "users", "author_id", JoinKind::Inner);
        let mut right = Specification::unrestricted();
        right.join("author", "users", "author_id", JoinKind::Inner);
        right.join("editor", "users", "editor_id", JoinKind::Inner);

        let merged = left.or(right);
        assert_eq!(merged.joins().len(), 2);
        assert!(merged.joins().iter().all(|j| j.kind == JoinKind::Left));
    }

    #[test]
    fn test_join_rendering() {
        let mut spec = Specification::unrestricted();
        spec.join("author", "users", "author_id", JoinKind::Inner);
        let sql = spec.count_sql("posts");
        assert!(sql.contains(
            r#"INNER JOIN "users" AS "author" ON "root"."author_id" = "author"."id""#
        ));
    }

    #[test]
    fn test_select_applies_window_and_sorts() {
        let spec = eq("title", "a")
            .order_by(Expr::col((Alias::new(ROOT), Alias::new("score"))).into(), OrderDirection::Desc);
        let pageable = Pageable::page(3, 10, Sort::by("created", OrderDirection::Asc));
        let sql = spec.select_sql("posts", &pageable);

        assert!(sql.starts_with(r#"SELECT "root".* FROM "posts" AS "root""#));
        assert!(sql.contains(r#"ORDER BY "root"."score" DESC, "root"."created" ASC"#));
        assert!(sql.ends_with("LIMIT 10 OFFSET 20"));
    }

    #[test]
    fn test_count_ignores_orderings() {
        let spec = eq("title", "a")
            .order_by(Expr::col((Alias::new(ROOT), Alias::new("score"))).into(), OrderDirection::Desc);
        assert!(!spec.count_sql("posts").contains("ORDER BY"));
    }
}
