use chrono::{DateTime, Utc};

/// Events emitted by the company, profile and API-token actions.
///
/// Events are always fired. If no listeners are registered they are
/// dropped. Register listeners via
/// [`register_event_listeners`](crate::register_event_listeners).
#[derive(Debug, Clone)]
pub enum CompanyEvent {
    // companies
    CompanyCreated {
        company_id: i64,
        owner_id: i64,
        name: String,
        personal: bool,
        at: DateTime<Utc>,
    },
    CompanyUpdated {
        company_id: i64,
        name: String,
        at: DateTime<Utc>,
    },
    CompanyDeleted {
        company_id: i64,
        at: DateTime<Utc>,
    },
    CompanySwitched {
        user_id: i64,
        company_id: i64,
        at: DateTime<Utc>,
    },

    // employees
    CompanyEmployeeAdded {
        company_id: i64,
        user_id: i64,
        role: Option<String>,
        at: DateTime<Utc>,
    },
    CompanyEmployeeInvited {
        company_id: i64,
        invitation_id: i64,
        email: String,
        role: Option<String>,
        at: DateTime<Utc>,
    },
    CompanyInvitationAccepted {
        company_id: i64,
        user_id: i64,
        email: String,
        at: DateTime<Utc>,
    },
    CompanyInvitationCancelled {
        company_id: i64,
        invitation_id: i64,
        at: DateTime<Utc>,
    },
    CompanyEmployeeRemoved {
        company_id: i64,
        user_id: i64,
        at: DateTime<Utc>,
    },
    CompanyEmployeeRoleUpdated {
        company_id: i64,
        user_id: i64,
        role: Option<String>,
        at: DateTime<Utc>,
    },

    // users
    UserRegistered {
        user_id: i64,
        email: String,
        at: DateTime<Utc>,
    },
    UserDeleted {
        user_id: i64,
        at: DateTime<Utc>,
    },

    // api tokens
    ApiTokenCreated {
        user_id: i64,
        token_id: i64,
        at: DateTime<Utc>,
    },
    ApiTokenDeleted {
        user_id: i64,
        token_id: i64,
        at: DateTime<Utc>,
    },
}

impl CompanyEvent {
    /// Returns a dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CompanyCreated { .. } => "company.created",
            Self::CompanyUpdated { .. } => "company.updated",
            Self::CompanyDeleted { .. } => "company.deleted",
            Self::CompanySwitched { .. } => "company.switched",
            Self::CompanyEmployeeAdded { .. } => "company.employee.added",
            Self::CompanyEmployeeInvited { .. } => "company.employee.invited",
            Self::CompanyInvitationAccepted { .. } => "company.invitation.accepted",
            Self::CompanyInvitationCancelled { .. } => "company.invitation.cancelled",
            Self::CompanyEmployeeRemoved { .. } => "company.employee.removed",
            Self::CompanyEmployeeRoleUpdated { .. } => "company.employee.role_updated",
            Self::UserRegistered { .. } => "user.registered",
            Self::UserDeleted { .. } => "user.deleted",
            Self::ApiTokenCreated { .. } => "api_token.created",
            Self::ApiTokenDeleted { .. } => "api_token.deleted",
        }
    }

    /// Returns the timestamp when this event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::CompanyCreated { at, .. }
            | Self::CompanyUpdated { at, .. }
            | Self::CompanyDeleted { at, .. }
            | Self::CompanySwitched { at, .. }
            | Self::CompanyEmployeeAdded { at, .. }
            | Self::CompanyEmployeeInvited { at, .. }
            | Self::CompanyInvitationAccepted { at, .. }
            | Self::CompanyInvitationCancelled { at, .. }
            | Self::CompanyEmployeeRemoved { at, .. }
            | Self::CompanyEmployeeRoleUpdated { at, .. }
            | Self::UserRegistered { at, .. }
            | Self::UserDeleted { at, .. }
            | Self::ApiTokenCreated { at, .. }
            | Self::ApiTokenDeleted { at, .. } => *at,
        }
    }

    /// The company this event concerns, if any.
    pub fn company_id(&self) -> Option<i64> {
        match self {
            Self::CompanyCreated { company_id, .. }
            | Self::CompanyUpdated { company_id, .. }
            | Self::CompanyDeleted { company_id, .. }
            | Self::CompanySwitched { company_id, .. }
            | Self::CompanyEmployeeAdded { company_id, .. }
            | Self::CompanyEmployeeInvited { company_id, .. }
            | Self::CompanyInvitationAccepted { company_id, .. }
            | Self::CompanyInvitationCancelled { company_id, .. }
            | Self::CompanyEmployeeRemoved { company_id, .. }
            | Self::CompanyEmployeeRoleUpdated { company_id, .. } => Some(*company_id),
            Self::UserRegistered { .. }
            | Self::UserDeleted { .. }
            | Self::ApiTokenCreated { .. }
            | Self::ApiTokenDeleted { .. } => None,
        }
    }
}
