use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage format of `users.date_of_birth`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const ADULT_AGE: i32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub date_of_birth: NaiveDate,
}

/// A `User` as the API returns it, with fields derived at response time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseUser {
    pub id: Uuid,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub age: i32,
    pub is_adult: bool,
}

impl ResponseUser {
    pub fn at(user: User, today: NaiveDate) -> Self {
        let age = age_on(user.date_of_birth, today);
        Self {
            id: user.id,
            name: user.name,
            date_of_birth: user.date_of_birth,
            age,
            is_adult: age >= ADULT_AGE,
        }
    }
}

impl From<User> for ResponseUser {
    fn from(user: User) -> Self {
        Self::at(user, Local::now().date_naive())
    }
}

/// Whole years from `date_of_birth` to `today`. Negative for dates in the future.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    match today.years_since(date_of_birth) {
        Some(years) => years as i32,
        None => -(date_of_birth.years_since(today).unwrap_or(0) as i32),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub name: String,
    pub date_of_birth: NaiveDate,
}
