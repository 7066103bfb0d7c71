mod accept;
mod add_employee;
mod cancel_invitation;
mod create;
mod delete;
mod invite;
mod remove_employee;
mod update_name;
mod update_role;

pub use accept::AcceptCompanyInvitationAction;
pub use add_employee::AddCompanyEmployeeAction;
pub use cancel_invitation::CancelCompanyInvitationAction;
pub use create::CreateCompanyAction;
pub use delete::DeleteCompanyAction;
pub use invite::{InviteCompanyEmployeeAction, InviteCompanyEmployeeOutput};
pub use remove_employee::RemoveCompanyEmployeeAction;
pub use update_name::UpdateCompanyNameAction;
pub use update_role::UpdateCompanyEmployeeRoleAction;

use super::{Company, CompanyRepository};
use crate::CompanyError;
use crate::repository::User;

/// Loads a company that `user` must own.
async fn find_owned_company<C: CompanyRepository>(
    companies: &C,
    user: &User,
    company_id: i64,
) -> Result<Company, CompanyError> {
    let company = companies
        .find_company(company_id)
        .await?
        .ok_or(CompanyError::CompanyNotFound)?;

    if !company.is_owned_by(user.id) {
        return Err(CompanyError::Forbidden);
    }

    Ok(company)
}
