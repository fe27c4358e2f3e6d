use sqlx::PgPool;
use uuid::Uuid;

use drivers_hub_core::{AppError, FieldError};
use drivers_hub_models::UserRole;

use crate::middleware::auth::AuthUser;
use crate::modules::instructors::service::InstructorService;

/// Which instructor's records the caller may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructorScope {
    /// Admins see every instructor's records.
    All,
    /// Instructors see only records carrying their own instructor id.
    Own(Uuid),
}

impl InstructorScope {
    /// Instructor filter to apply to a listing. An instructor's own id always
    /// overrides whatever filter was requested.
    pub fn filter(self, requested: Option<Uuid>) -> Option<Uuid> {
        match self {
            Self::All => requested,
            Self::Own(id) => Some(id),
        }
    }

    pub fn permits(self, instructor_id: Uuid) -> bool {
        match self {
            Self::All => true,
            Self::Own(id) => id == instructor_id,
        }
    }

    /// Instructor id for a new record.
    ///
    /// Admins must name one; instructors may only name themselves.
    pub fn assign(self, requested: Option<Uuid>) -> Result<Uuid, AppError> {
        match (self, requested) {
            (Self::All, Some(id)) => Ok(id),
            (Self::All, None) => Err(AppError::validation(vec![FieldError::new(
                "instructor_id",
                "instructor_id is required",
            )])),
            (Self::Own(own), Some(id)) if id != own => Err(AppError::forbidden(
                "Instructors can only manage their own records",
            )),
            (Self::Own(own), _) => Ok(own),
        }
    }
}

/// Resolve the caller's scope. Instructors without a linked instructor row get 403.
pub async fn instructor_scope(db: &PgPool, auth_user: &AuthUser) -> Result<InstructorScope, AppError> {
    match auth_user.role() {
        UserRole::Admin => Ok(InstructorScope::All),
        UserRole::Instructor => {
            let id = InstructorService::instructor_id_for_user(db, auth_user.id()).await?;
            Ok(InstructorScope::Own(id))
        }
        UserRole::Staff => Err(AppError::forbidden(
            "Access denied. Required role: admin or instructor",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_forces_own_id() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert_eq!(InstructorScope::All.filter(Some(other)), Some(other));
        assert_eq!(InstructorScope::All.filter(None), None);
        assert_eq!(InstructorScope::Own(own).filter(Some(other)), Some(own));
        assert_eq!(InstructorScope::Own(own).filter(None), Some(own));
    }

    #[test]
    fn test_permits() {
        let own = Uuid::new_v4();
        assert!(InstructorScope::All.permits(Uuid::new_v4()));
        assert!(InstructorScope::Own(own).permits(own));
        assert!(!InstructorScope::Own(own).permits(Uuid::new_v4()));
    }

    #[test]
    fn test_admin_must_name_an_instructor() {
        let err = InstructorScope::All.assign(None).unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
        assert_eq!(err.errors[0].field, "instructor_id");

        let id = Uuid::new_v4();
        assert_eq!(InstructorScope::All.assign(Some(id)).unwrap(), id);
    }

    #[test]
    fn test_instructor_assigns_themselves() {
        let own = Uuid::new_v4();
        assert_eq!(InstructorScope::Own(own).assign(None).unwrap(), own);
        assert_eq!(InstructorScope::Own(own).assign(Some(own)).unwrap(), own);

        let err = InstructorScope::Own(own).assign(Some(Uuid::new_v4())).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
    }
}
