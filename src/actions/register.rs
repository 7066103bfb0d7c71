use chrono::Utc;

use crate::companies::{CompanyRepository, CurrentCompanyRepository, NewCompany};
use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::events::{CompanyEvent, dispatch};
use crate::repository::{NewUser, User, UserRepository};
use crate::validators::{PasswordPolicy, normalize_email, validate_email, validate_name};
use crate::{CompanyError, SecretString};

#[derive(Debug, Clone)]
pub struct RegisterUserInput {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub password_confirmation: SecretString,
}

/// Creates a user together with their personal company, named after the
/// user's first name, and makes it the current company.
pub struct RegisterUserAction<U, C, K, H = Argon2Hasher>
where
    U: UserRepository,
    C: CompanyRepository,
    K: CurrentCompanyRepository,
{
    users: U,
    companies: C,
    current: K,
    password_policy: PasswordPolicy,
    hasher: H,
}

impl<U, C, K> RegisterUserAction<U, C, K, Argon2Hasher>
where
    U: UserRepository,
    C: CompanyRepository,
    K: CurrentCompanyRepository,
{
    /// Default password policy and hasher.
    pub fn new(users: U, companies: C, current: K) -> Self {
        Self::with_hasher(
            users,
            companies,
            current,
            PasswordPolicy::default(),
            Argon2Hasher::default(),
        )
    }

    pub fn with_policy(users: U, companies: C, current: K, password_policy: PasswordPolicy) -> Self {
        Self::with_hasher(
            users,
            companies,
            current,
            password_policy,
            Argon2Hasher::default(),
        )
    }
}

impl<U, C, K, H> RegisterUserAction<U, C, K, H>
where
    U: UserRepository,
    C: CompanyRepository,
    K: CurrentCompanyRepository,
    H: PasswordHasher,
{
    pub fn with_hasher(
        users: U,
        companies: C,
        current: K,
        password_policy: PasswordPolicy,
        hasher: H,
    ) -> Self {
        Self {
            users,
            companies,
            current,
            password_policy,
            hasher,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "register_user", skip_all, err)
    )]
    pub async fn execute(&self, input: RegisterUserInput) -> Result<User, CompanyError> {
        let name = input.name.trim();
        validate_name(name)?;
        let email = normalize_email(&input.email);
        validate_email(&email)?;
        self.password_policy.validate_confirmed(
            input.password.expose_secret(),
            input.password_confirmation.expose_secret(),
        )?;

        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(CompanyError::UserAlreadyExists);
        }

        let hashed_password = self.hasher.hash(input.password.expose_secret())?;

        let mut user = self
            .users
            .create_user(NewUser {
                name: name.to_owned(),
                email,
                hashed_password,
            })
            .await?;

        let company = self
            .companies
            .create_company(NewCompany {
                user_id: user.id,
                name: format!("{}'s Company", user.first_name()),
                personal_company: true,
            })
            .await?;

        self.current
            .set_current_company(user.id, Some(company.id))
            .await?;
        user.current_company_id = Some(company.id);

        dispatch(CompanyEvent::UserRegistered {
            user_id: user.id,
            email: user.email.clone(),
            at: Utc::now(),
        })
        .await;

        dispatch(CompanyEvent::CompanyCreated {
            company_id: company.id,
            owner_id: user.id,
            name: company.name,
            personal: true,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "companies",
            "msg=\"user registered\", user_id={}, company_id={}",
            user.id,
            company.id
        );

        Ok(user)
    }
}
