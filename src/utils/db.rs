use drivers_hub_core::AppError;

/// Map a unique-constraint violation to a 400 with `message`; anything else is internal.
pub fn unique_violation(e: sqlx::Error, message: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::bad_request(anyhow::anyhow!(message));
    }
    AppError::database(e)
}

/// Map a foreign-key violation (a referenced row does not exist) to a 400.
pub fn reference_violation(e: sqlx::Error, message: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_foreign_key_violation()
    {
        return AppError::bad_request(anyhow::anyhow!(message));
    }
    AppError::database(e)
}

/// `%term%` for `ILIKE`, or `None` for blank search input.
pub fn like_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern(Some(" ada ")), Some("%ada%".to_string()));
        assert_eq!(like_pattern(Some("   ")), None);
        assert_eq!(like_pattern(None), None);
        assert_eq!(like_pattern(Some("50%_off")), Some("%50\\%\\_off%".to_string()));
    }
}
