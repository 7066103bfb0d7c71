use chrono::Utc;

use super::find_owned_company;
use crate::companies::{Company, CompanyRepository};
use crate::events::{CompanyEvent, dispatch};
use crate::repository::User;
use crate::validators::validate_company_name;
use crate::CompanyError;

/// Renames a company. Owner only.
pub struct UpdateCompanyNameAction<C: CompanyRepository> {
    companies: C,
}

impl<C: CompanyRepository> UpdateCompanyNameAction<C> {
    pub fn new(companies: C) -> Self {
        Self { companies }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "update_company_name", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user: &User,
        company_id: i64,
        name: &str,
    ) -> Result<Company, CompanyError> {
        let company = find_owned_company(&self.companies, user, company_id).await?;
        validate_company_name(name)?;

        let company = self
            .companies
            .update_company_name(company.id, name.trim())
            .await?;

        dispatch(CompanyEvent::CompanyUpdated {
            company_id: company.id,
            name: company.name.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(company)
    }
}
