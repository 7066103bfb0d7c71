use chrono::Utc;

use crate::companies::{Company, CompanyRepository, CurrentCompanyRepository, NewCompany};
use crate::events::{CompanyEvent, dispatch};
use crate::repository::User;
use crate::validators::validate_company_name;
use crate::CompanyError;

/// Creates a non-personal company owned by the user and switches the user
/// into it.
pub struct CreateCompanyAction<C, U>
where
    C: CompanyRepository,
    U: CurrentCompanyRepository,
{
    companies: C,
    current: U,
}

impl<C: CompanyRepository, U: CurrentCompanyRepository> CreateCompanyAction<C, U> {
    pub fn new(companies: C, current: U) -> Self {
        Self { companies, current }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_company", skip_all, err)
    )]
    pub async fn execute(&self, user: &User, name: &str) -> Result<Company, CompanyError> {
        validate_company_name(name)?;

        let company = self
            .companies
            .create_company(NewCompany {
                user_id: user.id,
                name: name.trim().to_owned(),
                personal_company: false,
            })
            .await?;

        self.current
            .set_current_company(user.id, Some(company.id))
            .await?;

        dispatch(CompanyEvent::CompanyCreated {
            company_id: company.id,
            owner_id: user.id,
            name: company.name.clone(),
            personal: false,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "companies",
            "msg=\"company created\", company_id={}, user_id={}",
            company.id,
            user.id
        );

        Ok(company)
    }
}
