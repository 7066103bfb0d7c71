//! `SQLite` implementations of the company repositories.

mod company;
mod current;
mod invitation;
mod membership;

pub use company::SqliteCompanyRepository;
pub use current::SqliteCurrentCompanyRepository;
pub use invitation::SqliteCompanyInvitationRepository;
pub use membership::SqliteCompanyMembershipRepository;

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::companies::{Company, CompanyMembership};

#[derive(FromRow)]
struct CompanyRecord {
    id: i64,
    user_id: i64,
    name: String,
    personal_company: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CompanyRecord> for Company {
    fn from(row: CompanyRecord) -> Self {
        Company {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            personal_company: row.personal_company,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct MembershipRecord {
    id: i64,
    company_id: i64,
    user_id: i64,
    role: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MembershipRecord> for CompanyMembership {
    fn from(row: MembershipRecord) -> Self {
        CompanyMembership {
            id: row.id,
            company_id: row.company_id,
            user_id: row.user_id,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COMPANY_COLUMNS: &str = "id, user_id, name, personal_company, created_at, updated_at";
const MEMBERSHIP_COLUMNS: &str = "id, company_id, user_id, role, created_at, updated_at";
