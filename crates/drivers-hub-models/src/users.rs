//! Users and the role model.
//!
//! Every account carries exactly one [`UserRole`]. The role is stored as a
//! `SMALLINT` code and travels over JSON as that integer, while incoming JSON
//! and query strings may also name it (`"admin"`, `"instructor"`, `"staff"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[repr(i16)]
pub enum UserRole {
    Admin = 0,
    Instructor = 1,
    Staff = 2,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Instructor, UserRole::Staff];

    pub fn code(self) -> i16 {
        self as i16
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Instructor => "instructor",
            UserRole::Staff => "staff",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRole(pub String);

impl fmt::Display for InvalidRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not a valid role (expected 0/admin, 1/instructor or 2/staff)",
            self.0
        )
    }
}

impl std::error::Error for InvalidRole {}

impl TryFrom<i16> for UserRole {
    type Error = InvalidRole;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(UserRole::Admin),
            1 => Ok(UserRole::Instructor),
            2 => Ok(UserRole::Staff),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

impl FromStr for UserRole {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i16>() {
            return UserRole::try_from(code);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "instructor" => Ok(UserRole::Instructor),
            "staff" => Ok(UserRole::Staff),
            _ => Err(InvalidRole(trimmed.to_string())),
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.code())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(i64),
            Label(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Code(code) => i16::try_from(code)
                .map_err(|_| InvalidRole(code.to_string()))
                .and_then(UserRole::try_from)
                .map_err(serde::de::Error::custom),
            Repr::Label(label) => label.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A user as exposed over the API. The password hash never leaves the service layer.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[schema(value_type = i16, example = 2)]
    pub role: UserRole,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Row shape used for credential checks.
#[derive(FromRow, Debug, Clone)]
pub struct UserWithPassword {
    #[sqlx(flatten)]
    pub user: User,
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
}

/// Columns selected whenever a [`User`] is loaded.
pub const USER_COLUMNS: &str =
    "id, first_name, last_name, email, phone, role, created_at, updated_at";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_as_code() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "0");
        assert_eq!(serde_json::to_string(&UserRole::Staff).unwrap(), "2");
    }

    #[test]
    fn test_role_accepts_both_vocabularies() {
        for (input, expected) in [
            ("1", UserRole::Instructor),
            (r#""instructor""#, UserRole::Instructor),
            (r#""ADMIN""#, UserRole::Admin),
            (r#""2""#, UserRole::Staff),
            ("0", UserRole::Admin),
        ] {
            let role: UserRole = serde_json::from_str(input).unwrap();
            assert_eq!(role, expected, "input {}", input);
        }
    }

    #[test]
    fn test_role_rejects_unknown_values() {
        assert!(serde_json::from_str::<UserRole>("3").is_err());
        assert!(serde_json::from_str::<UserRole>("-1").is_err());
        assert!(serde_json::from_str::<UserRole>("70000").is_err());
        assert!(serde_json::from_str::<UserRole>(r#""teacher""#).is_err());
    }

    #[test]
    fn test_role_code_round_trip() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::try_from(role.code()).unwrap(), role);
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
    }
}
