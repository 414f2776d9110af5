use clearance_core::{AppError, AppResult};

/// Scope value granting access to every resource boundary.
pub const GLOBAL_SCOPE: &str = "*";

/// Returns whether an assignment scope covers a requested resource scope.
///
/// Precedence: exact equality, the global scope, a trailing-`*` prefix
/// pattern, then hierarchical containment (a scope covers every nested
/// sub-scope below it).
#[must_use]
pub fn scope_matches(assignment_scope: &str, resource_scope: &str) -> bool {
    if assignment_scope == resource_scope {
        return true;
    }
    if assignment_scope == GLOBAL_SCOPE {
        return true;
    }
    if let Some(prefix) = assignment_scope.strip_suffix('*') {
        return resource_scope.starts_with(prefix);
    }

    resource_scope
        .strip_prefix(assignment_scope)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Validates a scope string for assignment creation.
///
/// Scopes are opaque slash-delimited paths; a `type:` segment with an empty
/// entity id is rejected.
pub fn validate_scope(scope: &str) -> AppResult<()> {
    if scope.trim().is_empty() {
        return Err(AppError::Validation(
            "scope must not be empty or whitespace".to_owned(),
        ));
    }
    if scope == GLOBAL_SCOPE {
        return Ok(());
    }

    for segment in scope.split('/') {
        if segment.is_empty() {
            return Err(AppError::Validation(format!(
                "scope '{scope}' contains an empty path segment"
            )));
        }
        if let Some((entity_type, entity_id)) = segment.split_once(':')
            && entity_id.is_empty()
        {
            return Err(AppError::Validation(format!(
                "scope segment '{entity_type}' is missing a required entity id"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{scope_matches, validate_scope};

    #[test]
    fn exact_scope_matches_itself() {
        assert!(scope_matches("customer:123", "customer:123"));
        assert!(scope_matches("customer:123/asset:456", "customer:123/asset:456"));
    }

    #[test]
    fn global_scope_matches_anything() {
        assert!(scope_matches("*", "customer:123"));
        assert!(scope_matches("*", "customer:123/asset:456"));
    }

    #[test]
    fn trailing_wildcard_matches_prefix() {
        assert!(scope_matches("customer:1*", "customer:123"));
        assert!(scope_matches("customer:123/*", "customer:123/asset:456"));
        assert!(!scope_matches("customer:2*", "customer:123"));
    }

    #[test]
    fn parent_scope_contains_nested_scope() {
        assert!(scope_matches("customer:123", "customer:123/asset:456"));
        assert!(!scope_matches("customer:123/asset:456", "customer:123"));
    }

    #[test]
    fn sibling_prefix_is_not_containment() {
        assert!(!scope_matches("customer:12", "customer:123"));
        assert!(!scope_matches("customer:123", "customer:999"));
    }

    #[test]
    fn validate_scope_rejects_empty_entity_id() {
        assert!(validate_scope("customer:").is_err());
        assert!(validate_scope("customer:123/asset:").is_err());
        assert!(validate_scope("").is_err());
        assert!(validate_scope("customer:123//asset:456").is_err());
    }

    #[test]
    fn validate_scope_accepts_hierarchies_and_global() {
        assert!(validate_scope("*").is_ok());
        assert!(validate_scope("customer:123").is_ok());
        assert!(validate_scope("customer:123/asset:456").is_ok());
        assert!(validate_scope("customer:*").is_ok());
    }
}
