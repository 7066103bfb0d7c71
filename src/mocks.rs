//! In-memory backend implementing every repository trait.
//!
//! All tables live behind one lock so the multi-table operations
//! (invitation acceptance, company purge, account deletion) are atomic
//! like their SQL counterparts.

#![allow(clippy::significant_drop_tightening)]

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::companies::{
    Company, CompanyEmployee, CompanyInvitation, CompanyInvitationRepository,
    CompanyMembership, CompanyMembershipRepository, CompanyRepository, CurrentCompanyRepository,
    NewCompany, NewInvitation, NewMembership,
};
use crate::repository::{ApiToken, ApiTokenRepository, NewApiToken, NewUser, User, UserRepository};
use crate::CompanyError;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    companies: BTreeMap<i64, Company>,
    memberships: BTreeMap<i64, CompanyMembership>,
    invitations: BTreeMap<i64, CompanyInvitation>,
    api_tokens: BTreeMap<i64, ApiToken>,
}

fn next_id<T>(table: &BTreeMap<i64, T>) -> i64 {
    table.keys().next_back().map_or(1, |id| id + 1)
}

fn by_name(mut companies: Vec<Company>) -> Vec<Company> {
    companies.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    companies
}

/// Shared in-memory database. Clones share state.
#[derive(Clone, Default)]
pub struct MockDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, CompanyError> {
        self.tables
            .read()
            .map_err(|_| CompanyError::Internal("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, CompanyError> {
        self.tables
            .write()
            .map_err(|_| CompanyError::Internal("lock poisoned".into()))
    }

    /// Inserts a user directly, bypassing registration.
    pub fn seed_user(&self, name: &str, email: &str) -> Result<User, CompanyError> {
        let mut tables = self.write()?;
        let user = User::mock(next_id(&tables.users), name, email);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn membership_count(&self) -> Result<usize, CompanyError> {
        Ok(self.read()?.memberships.len())
    }

    pub fn invitation_count(&self) -> Result<usize, CompanyError> {
        Ok(self.read()?.invitations.len())
    }
}

#[async_trait]
impl UserRepository for MockDatabase {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, CompanyError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CompanyError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, data: NewUser) -> Result<User, CompanyError> {
        let mut tables = self.write()?;
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(CompanyError::UserAlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: next_id(&tables.users),
            name: data.name,
            email: data.email,
            hashed_password: data.hashed_password,
            current_company_id: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update_profile(
        &self,
        user_id: i64,
        name: &str,
        email: &str,
    ) -> Result<User, CompanyError> {
        let mut tables = self.write()?;
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email) && u.id != user_id)
        {
            return Err(CompanyError::UserAlreadyExists);
        }

        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or(CompanyError::UserNotFound)?;
        name.clone_into(&mut user.name);
        email.clone_into(&mut user.email);
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn update_password(
        &self,
        user_id: i64,
        hashed_password: &str,
    ) -> Result<(), CompanyError> {
        let mut tables = self.write()?;
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or(CompanyError::UserNotFound)?;
        hashed_password.clone_into(&mut user.hashed_password);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), CompanyError> {
        let mut tables = self.write()?;
        if tables.users.remove(&user_id).is_none() {
            return Err(CompanyError::UserNotFound);
        }

        let owned: Vec<i64> = tables
            .companies
            .values()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.id)
            .collect();
        tables.companies.retain(|_, c| c.user_id != user_id);
        tables
            .memberships
            .retain(|_, m| m.user_id != user_id && !owned.contains(&m.company_id));
        tables
            .invitations
            .retain(|_, i| !owned.contains(&i.company_id));
        tables.api_tokens.retain(|_, t| t.user_id != user_id);
        for user in tables.users.values_mut() {
            if user.current_company_id.is_some_and(|id| owned.contains(&id)) {
                user.current_company_id = None;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ApiTokenRepository for MockDatabase {
    async fn create_token(&self, data: NewApiToken) -> Result<ApiToken, CompanyError> {
        let mut tables = self.write()?;
        let now = Utc::now();
        let token = ApiToken {
            id: next_id(&tables.api_tokens),
            user_id: data.user_id,
            name: data.name,
            token_hash: data.token_hash,
            abilities: data.abilities,
            last_used_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.api_tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<ApiToken>, CompanyError> {
        Ok(self
            .read()?
            .api_tokens
            .values()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn find_user_token(
        &self,
        user_id: i64,
        token_id: i64,
    ) -> Result<Option<ApiToken>, CompanyError> {
        Ok(self
            .read()?
            .api_tokens
            .get(&token_id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }

    async fn tokens_for_user(&self, user_id: i64) -> Result<Vec<ApiToken>, CompanyError> {
        let mut tokens: Vec<ApiToken> = self
            .read()?
            .api_tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tokens.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tokens)
    }

    async fn update_abilities(
        &self,
        token_id: i64,
        abilities: &[String],
    ) -> Result<ApiToken, CompanyError> {
        let mut tables = self.write()?;
        let token = tables
            .api_tokens
            .get_mut(&token_id)
            .ok_or(CompanyError::ApiTokenNotFound)?;
        token.abilities = abilities.to_vec();
        token.updated_at = Utc::now();
        Ok(token.clone())
    }

    async fn touch_last_used(&self, token_id: i64) -> Result<(), CompanyError> {
        if let Some(token) = self.write()?.api_tokens.get_mut(&token_id) {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn delete_token(&self, token_id: i64) -> Result<(), CompanyError> {
        self.write()?.api_tokens.remove(&token_id);
        Ok(())
    }
}

#[async_trait]
impl CompanyRepository for MockDatabase {
    async fn create_company(&self, data: NewCompany) -> Result<Company, CompanyError> {
        let mut tables = self.write()?;
        let now = Utc::now();
        let company = Company {
            id: next_id(&tables.companies),
            user_id: data.user_id,
            name: data.name,
            personal_company: data.personal_company,
            created_at: now,
            updated_at: now,
        };
        tables.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn find_company(&self, id: i64) -> Result<Option<Company>, CompanyError> {
        Ok(self.read()?.companies.get(&id).cloned())
    }

    async fn owned_companies(&self, user_id: i64) -> Result<Vec<Company>, CompanyError> {
        Ok(by_name(
            self.read()?
                .companies
                .values()
                .filter(|c| c.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn personal_company(&self, user_id: i64) -> Result<Option<Company>, CompanyError> {
        Ok(self
            .read()?
            .companies
            .values()
            .find(|c| c.user_id == user_id && c.personal_company)
            .cloned())
    }

    async fn update_company_name(&self, id: i64, name: &str) -> Result<Company, CompanyError> {
        let mut tables = self.write()?;
        let company = tables
            .companies
            .get_mut(&id)
            .ok_or(CompanyError::CompanyNotFound)?;
        name.clone_into(&mut company.name);
        company.updated_at = Utc::now();
        Ok(company.clone())
    }

    async fn purge_company(&self, id: i64) -> Result<(), CompanyError> {
        let mut tables = self.write()?;
        if tables.companies.remove(&id).is_none() {
            return Err(CompanyError::CompanyNotFound);
        }

        tables.memberships.retain(|_, m| m.company_id != id);
        tables.invitations.retain(|_, i| i.company_id != id);
        for user in tables.users.values_mut() {
            if user.current_company_id == Some(id) {
                user.current_company_id = None;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CompanyMembershipRepository for MockDatabase {
    async fn add_member(&self, data: NewMembership) -> Result<CompanyMembership, CompanyError> {
        let mut tables = self.write()?;
        if tables
            .memberships
            .values()
            .any(|m| m.company_id == data.company_id && m.user_id == data.user_id)
        {
            return Err(CompanyError::AlreadyMember);
        }

        let now = Utc::now();
        let membership = CompanyMembership {
            id: next_id(&tables.memberships),
            company_id: data.company_id,
            user_id: data.user_id,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        tables.memberships.insert(membership.id, membership.clone());
        Ok(membership)
    }

    async fn find_membership(
        &self,
        company_id: i64,
        user_id: i64,
    ) -> Result<Option<CompanyMembership>, CompanyError> {
        Ok(self
            .read()?
            .memberships
            .values()
            .find(|m| m.company_id == company_id && m.user_id == user_id)
            .cloned())
    }

    async fn employees(&self, company_id: i64) -> Result<Vec<CompanyEmployee>, CompanyError> {
        let tables = self.read()?;
        let mut employees: Vec<CompanyEmployee> = tables
            .memberships
            .values()
            .filter(|m| m.company_id == company_id)
            .filter_map(|m| {
                tables.users.get(&m.user_id).map(|u| CompanyEmployee {
                    user_id: u.id,
                    name: u.name.clone(),
                    email: u.email.clone(),
                    role: m.role.clone(),
                    joined_at: m.created_at,
                })
            })
            .collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(employees)
    }

    async fn member_companies(&self, user_id: i64) -> Result<Vec<Company>, CompanyError> {
        let tables = self.read()?;
        Ok(by_name(
            tables
                .memberships
                .values()
                .filter(|m| m.user_id == user_id)
                .filter_map(|m| tables.companies.get(&m.company_id).cloned())
                .collect(),
        ))
    }

    async fn update_role(
        &self,
        company_id: i64,
        user_id: i64,
        role: Option<&str>,
    ) -> Result<CompanyMembership, CompanyError> {
        let mut tables = self.write()?;
        let membership = tables
            .memberships
            .values_mut()
            .find(|m| m.company_id == company_id && m.user_id == user_id)
            .ok_or(CompanyError::EmployeeNotFound)?;
        membership.role = role.map(str::to_owned);
        membership.updated_at = Utc::now();
        Ok(membership.clone())
    }

    async fn remove_member(&self, company_id: i64, user_id: i64) -> Result<(), CompanyError> {
        let mut tables = self.write()?;
        let before = tables.memberships.len();
        tables
            .memberships
            .retain(|_, m| !(m.company_id == company_id && m.user_id == user_id));
        if tables.memberships.len() == before {
            return Err(CompanyError::EmployeeNotFound);
        }

        if let Some(user) = tables.users.get_mut(&user_id) {
            if user.current_company_id == Some(company_id) {
                user.current_company_id = None;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CompanyInvitationRepository for MockDatabase {
    async fn create_invitation(
        &self,
        data: NewInvitation,
    ) -> Result<CompanyInvitation, CompanyError> {
        let mut tables = self.write()?;
        if tables
            .invitations
            .values()
            .any(|i| {
                i.company_id == data.company_id && i.email.eq_ignore_ascii_case(&data.email)
            })
        {
            return Err(CompanyError::AlreadyInvited);
        }

        let now = Utc::now();
        let invitation = CompanyInvitation {
            id: next_id(&tables.invitations),
            company_id: data.company_id,
            email: data.email,
            role: data.role,
            token_hash: data.token_hash,
            created_at: now,
            updated_at: now,
        };
        tables.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    async fn find_invitation(&self, id: i64) -> Result<Option<CompanyInvitation>, CompanyError> {
        Ok(self.read()?.invitations.get(&id).cloned())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<CompanyInvitation>, CompanyError> {
        Ok(self
            .read()?
            .invitations
            .values()
            .find(|i| i.token_hash == token_hash)
            .cloned())
    }

    async fn find_by_company_and_email(
        &self,
        company_id: i64,
        email: &str,
    ) -> Result<Option<CompanyInvitation>, CompanyError> {
        Ok(self
            .read()?
            .invitations
            .values()
            .find(|i| i.company_id == company_id && i.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn invitations_for_company(
        &self,
        company_id: i64,
    ) -> Result<Vec<CompanyInvitation>, CompanyError> {
        Ok(self
            .read()?
            .invitations
            .values()
            .filter(|i| i.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn delete_invitation(&self, id: i64) -> Result<(), CompanyError> {
        self.write()?
            .invitations
            .remove(&id)
            .map(|_| ())
            .ok_or(CompanyError::InvitationNotFound)
    }

    async fn accept_invitation(
        &self,
        invitation_id: i64,
        user_id: i64,
    ) -> Result<CompanyMembership, CompanyError> {
        let mut tables = self.write()?;
        let invitation = tables
            .invitations
            .get(&invitation_id)
            .cloned()
            .ok_or(CompanyError::InvitationNotFound)?;

        if tables
            .memberships
            .values()
            .any(|m| m.company_id == invitation.company_id && m.user_id == user_id)
        {
            return Err(CompanyError::AlreadyMember);
        }

        let now = Utc::now();
        let membership = CompanyMembership {
            id: next_id(&tables.memberships),
            company_id: invitation.company_id,
            user_id,
            role: invitation.role,
            created_at: now,
            updated_at: now,
        };
        tables.invitations.remove(&invitation_id);
        tables.memberships.insert(membership.id, membership.clone());

        Ok(membership)
    }
}

#[async_trait]
impl CurrentCompanyRepository for MockDatabase {
    async fn set_current_company(
        &self,
        user_id: i64,
        company_id: Option<i64>,
    ) -> Result<(), CompanyError> {
        let mut tables = self.write()?;
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or(CompanyError::UserNotFound)?;
        user.current_company_id = company_id;
        user.updated_at = Utc::now();
        Ok(())
    }
}
