use serde::{Deserialize, Serialize};

/// Kind of principal performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    /// A human or machine user acting under its own identity.
    User,
    /// The platform itself, e.g. a scheduled sweep.
    System,
}

impl ActorType {
    /// Returns a stable storage value for this actor type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
        }
    }
}

/// Identity of the principal performing an administrative operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    user_id: Option<String>,
    actor_type: ActorType,
}

impl ActorIdentity {
    /// Creates an identity for a user principal.
    #[must_use]
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            actor_type: ActorType::User,
        }
    }

    /// Creates an identity for the platform itself.
    #[must_use]
    pub fn system() -> Self {
        Self {
            user_id: None,
            actor_type: ActorType::System,
        }
    }

    /// Returns the user identifier, if the actor is a user.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns the actor kind.
    #[must_use]
    pub fn actor_type(&self) -> ActorType {
        self.actor_type
    }

    /// Returns the value recorded in `created_by`/`updated_by` columns.
    #[must_use]
    pub fn audit_label(&self) -> &str {
        self.user_id.as_deref().unwrap_or("system")
    }
}

#[cfg(test)]
mod tests {
    use super::{ActorIdentity, ActorType};

    #[test]
    fn user_actor_exposes_user_id() {
        let actor = ActorIdentity::user("u-1");
        assert_eq!(actor.user_id(), Some("u-1"));
        assert_eq!(actor.actor_type(), ActorType::User);
        assert_eq!(actor.audit_label(), "u-1");
    }

    #[test]
    fn system_actor_has_stable_audit_label() {
        let actor = ActorIdentity::system();
        assert_eq!(actor.user_id(), None);
        assert_eq!(actor.audit_label(), "system");
    }
}
