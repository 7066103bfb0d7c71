//! Account self-service: registration, profile, password, account deletion
//! and personal API tokens.
//!
//! Company management lives in [`crate::companies`].

mod api_tokens;
mod delete_user;
mod register;
mod update_password;
mod update_profile;

pub use api_tokens::{
    AuthenticateApiTokenAction, CreateApiTokenAction, CreateApiTokenOutput, DeleteApiTokenAction,
    ListApiTokensAction, UpdateApiTokenPermissionsAction,
};
pub use delete_user::DeleteUserAction;
pub use register::{RegisterUserAction, RegisterUserInput};
pub use update_password::UpdatePasswordAction;
pub use update_profile::UpdateProfileInformationAction;
