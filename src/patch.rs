use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// Assembles a parameterized `UPDATE` statement from a set of optional field
/// diffs. Column names are static data supplied by the caller, never request
/// input. Every statement touches `updated_at`, so an empty diff still
/// refreshes the timestamp and returns the row otherwise unchanged.
pub struct UpdateBuilder<'args> {
    qb: QueryBuilder<'args, Postgres>,
}

impl<'args> UpdateBuilder<'args> {
    pub fn new(table: &str) -> Self {
        let mut qb = QueryBuilder::new("UPDATE ");
        qb.push(table).push(" SET updated_at = now()");
        Self { qb }
    }

    /// Adds `column = $n` when the field was supplied; `None` leaves the
    /// stored value untouched.
    pub fn set<T>(&mut self, column: &'static str, value: Option<T>) -> &mut Self
    where
        T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send,
    {
        if let Some(value) = value {
            self.qb.push(", ").push(column).push(" = ").push_bind(value);
        }
        self
    }

    /// Unconditionally overwrites a column, e.g. `last_editor_user_id`.
    pub fn set_always<T>(&mut self, column: &'static str, value: T) -> &mut Self
    where
        T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send,
    {
        self.qb.push(", ").push(column).push(" = ").push_bind(value);
        self
    }

    /// Completes the statement with the row filter and RETURNING list.
    pub fn finish(mut self, id: Uuid, returning: &str) -> QueryBuilder<'args, Postgres> {
        self.qb.push(" WHERE id = ").push_bind(id);
        self.qb.push(" RETURNING ").push(returning);
        self.qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_diff_only_touches_updated_at() {
        let builder = UpdateBuilder::new("users");
        let qb = builder.finish(Uuid::new_v4(), "id");
        assert_eq!(
            qb.sql(),
            "UPDATE users SET updated_at = now() WHERE id = $1 RETURNING id"
        );
    }

    #[test]
    fn supplied_fields_become_ordered_placeholders() {
        let mut builder = UpdateBuilder::new("instructors");
        builder
            .set("name", Some("Grace Hopper".to_string()))
            .set::<String>("email", None)
            .set("notes", Some("emerita".to_string()));
        let qb = builder.finish(Uuid::new_v4(), "id, name");
        assert_eq!(
            qb.sql(),
            "UPDATE instructors SET updated_at = now(), name = $1, notes = $2 \
             WHERE id = $3 RETURNING id, name"
        );
    }

    #[test]
    fn set_always_applies_without_a_diff() {
        let mut builder = UpdateBuilder::new("courses");
        builder
            .set_always("last_editor_user_id", Uuid::new_v4())
            .set("credit_hours", Some(3i32));
        let qb = builder.finish(Uuid::new_v4(), "id");
        assert_eq!(
            qb.sql(),
            "UPDATE courses SET updated_at = now(), last_editor_user_id = $1, \
             credit_hours = $2 WHERE id = $3 RETURNING id"
        );
    }
}
