//! Companies, their employees and invitations.
//!
//! A company has one owner (`companies.user_id`) and any number of
//! employees stored in the `company_user` pivot with an optional role.
//! Owners invite employees by e-mail or, when invitations are disabled, add
//! existing users directly. [`CompanyResolver`] answers membership,
//! current-company and permission questions for a user.

mod actions;
mod permission_set;
mod repository;
mod resolver;
mod roles;
mod types;

pub use actions::{
    AcceptCompanyInvitationAction, AddCompanyEmployeeAction, CancelCompanyInvitationAction,
    CreateCompanyAction, DeleteCompanyAction, InviteCompanyEmployeeAction,
    InviteCompanyEmployeeOutput, RemoveCompanyEmployeeAction, UpdateCompanyEmployeeRoleAction,
    UpdateCompanyNameAction,
};
pub use permission_set::{
    CREATE_WILDCARD, PermissionSet, PermissionSetBuilder, UPDATE_WILDCARD, WILDCARD,
};
pub use repository::{
    CompanyInvitationRepository, CompanyMembershipRepository, CompanyRepository,
    CurrentCompanyRepository, NewCompany, NewInvitation, NewMembership,
};
pub use resolver::CompanyResolver;
pub use roles::{CompanyRole, Role, RoleRegistry};
pub use types::{Company, CompanyEmployee, CompanyInvitation, CompanyMembership};
