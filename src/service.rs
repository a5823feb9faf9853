use chrono::NaiveDate;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    db::{Database, DbError},
    models::{DATE_FORMAT, User},
};

/// User persistence on top of the `users` table.
#[derive(Clone)]
pub struct UserService {
    db: Database,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Rows come back in whatever order the database yields them.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, limit: u32, offset: u32) -> Result<Vec<User>, DbError> {
        let rows = self
            .db
            .query(
                "SELECT id, name, date_of_birth FROM users LIMIT $1 OFFSET $2",
                &[limit.into(), offset.into()],
            )
            .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// Returns the user as constructed here; it is not read back from storage.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, name: String, date_of_birth: NaiveDate) -> Result<User, DbError> {
        let user = User {
            id: Uuid::new_v4(),
            name,
            date_of_birth,
        };

        self.db
            .update(
                "INSERT INTO users (id, name, date_of_birth) VALUES ($1, $2, $3)",
                &[
                    user.id.to_string().into(),
                    user.name.as_str().into(),
                    format_date(user.date_of_birth).into(),
                ],
            )
            .await?;

        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<User, DbError> {
        let rows = self
            .db
            .query(
                "SELECT id, name, date_of_birth FROM users WHERE id = $1",
                &[id.to_string().into()],
            )
            .await?;

        match rows.first() {
            Some(row) => user_from_row(row),
            None => Err(DbError::NotFound { id: id.to_string() }),
        }
    }

    /// Overwrites name and date of birth. A missing id is not an error: nothing
    /// is written and the requested values are still returned.
    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        name: String,
        date_of_birth: NaiveDate,
    ) -> Result<User, DbError> {
        let affected = self
            .db
            .update(
                "UPDATE users SET name = $1, date_of_birth = $2 WHERE id = $3",
                &[
                    name.as_str().into(),
                    format_date(date_of_birth).into(),
                    id.to_string().into(),
                ],
            )
            .await?;

        if affected == 0 {
            tracing::warn!(user_id = %id, "update matched no rows");
        }

        Ok(User {
            id,
            name,
            date_of_birth,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let affected = self
            .db
            .update("DELETE FROM users WHERE id = $1", &[id.to_string().into()])
            .await?;

        if affected == 0 {
            tracing::warn!(user_id = %id, "delete matched no rows");
        }
        Ok(())
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn user_from_row(row: &PgRow) -> Result<User, DbError> {
    let id: String = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let date_of_birth: String = row.try_get("date_of_birth")?;

    Ok(User {
        id: parse_id(&id)?,
        name,
        date_of_birth: parse_date(&date_of_birth)?,
    })
}

fn parse_id(raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|_| DbError::Decode {
        column: "id",
        value: raw.to_string(),
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| DbError::Decode {
        column: "date_of_birth",
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_are_stored_as_iso() {
        let date = NaiveDate::from_ymd_opt(1990, 1, 5).unwrap();
        assert_eq!(format_date(date), "1990-01-05");
        assert_eq!(parse_date("1990-01-05").unwrap(), date);
    }

    #[test]
    fn day_first_dates_are_rejected() {
        match parse_date("15-01-1990") {
            Err(DbError::Decode { column, value }) => {
                assert_eq!(column, "date_of_birth");
                assert_eq!(value, "15-01-1990");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!(matches!(parse_id("not-a-uuid"), Err(DbError::Decode { column: "id", .. })));
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
