// these tests use #[serial] because each one opens a fresh in-memory
// database; running them sequentially keeps migration logs readable.

//! End-to-end tests for the `SQLite` repositories.
//!
//! Run with: `cargo test --features sqlx_sqlite --test e2e_sqlite`

#![cfg(feature = "sqlx_sqlite")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use companies::actions::{
    AuthenticateApiTokenAction, CreateApiTokenAction, DeleteUserAction, RegisterUserAction,
    RegisterUserInput,
};
use companies::companies::{
    AcceptCompanyInvitationAction, CompanyInvitationRepository, CompanyMembershipRepository,
    CompanyRepository, CompanyResolver, CreateCompanyAction, CurrentCompanyRepository,
    DeleteCompanyAction, InviteCompanyEmployeeAction, NewCompany, NewInvitation, NewMembership,
};
use companies::crypto::{Argon2Hasher, hash_token};
use companies::repository::NewUser;
use companies::sqlite::{SqliteRepositories, create_repositories, migrations};
use companies::validators::PasswordPolicy;
use companies::{
    ApiTokenRepository, CompaniesConfig, CompanyError, NewApiToken, SecretString, User,
    UserRepository,
};
use serial_test::serial;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

async fn setup_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory SQLite database");

    migrations::run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

async fn setup() -> SqliteRepositories {
    create_repositories(setup_db().await)
}

async fn seed_user(repos: &SqliteRepositories, name: &str, email: &str) -> User {
    repos
        .users
        .create_user(NewUser {
            name: name.to_owned(),
            email: email.to_owned(),
            hashed_password: "hashed".to_owned(),
        })
        .await
        .expect("Failed to create user")
}

#[tokio::test]
#[serial]
async fn test_migrations_are_idempotent() {
    let pool = setup_db().await;
    migrations::run(&pool).await.expect("second run failed");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _companies_migrations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(applied, 5);
}

#[tokio::test]
#[serial]
async fn test_user_repository_crud() {
    let repos = setup().await;
    let user = seed_user(&repos, "Taylor Otwell", "taylor@example.com").await;
    assert!(user.id > 0);
    assert_eq!(user.current_company_id, None);

    let found = repos
        .users
        .find_user_by_email("taylor@example.com")
        .await
        .unwrap()
        .expect("User not found");
    assert_eq!(found.id, user.id);

    let updated = repos
        .users
        .update_profile(user.id, "Taylor", "otwell@example.com")
        .await
        .unwrap();
    assert_eq!(updated.name, "Taylor");
    assert_eq!(updated.email, "otwell@example.com");

    let duplicate = repos
        .users
        .create_user(NewUser {
            name: "Other".to_owned(),
            email: "otwell@example.com".to_owned(),
            hashed_password: "hashed".to_owned(),
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate, CompanyError::UserAlreadyExists);

    repos.users.update_password(user.id, "rehashed").await.unwrap();
    let found = repos.users.find_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(found.hashed_password, "rehashed");

    repos.users.delete_user(user.id).await.unwrap();
    assert!(repos.users.find_user_by_id(user.id).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_email_columns_ignore_case() {
    let repos = setup().await;
    let taylor = seed_user(&repos, "Taylor Otwell", "taylor@example.com").await;
    let adam = seed_user(&repos, "Adam Wathan", "adam@example.com").await;

    let found = repos
        .users
        .find_user_by_email("TAYLOR@Example.com")
        .await
        .unwrap()
        .expect("User not found");
    assert_eq!(found.id, taylor.id);

    let duplicate = repos
        .users
        .create_user(NewUser {
            name: "Other".to_owned(),
            email: "Taylor@example.com".to_owned(),
            hashed_password: "hashed".to_owned(),
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate, CompanyError::UserAlreadyExists);

    let company = repos
        .companies
        .create_company(NewCompany {
            user_id: taylor.id,
            name: "Laravel".to_owned(),
            personal_company: false,
        })
        .await
        .unwrap();
    repos
        .memberships
        .add_member(NewMembership {
            company_id: company.id,
            user_id: adam.id,
            role: None,
        })
        .await
        .unwrap();

    let invite = InviteCompanyEmployeeAction::new(
        repos.companies.clone(),
        repos.users.clone(),
        repos.memberships.clone(),
        repos.invitations.clone(),
        CompaniesConfig::default().roles,
    );
    assert_eq!(
        invite
            .execute(&taylor, company.id, "ADAM@example.com", Some("editor"))
            .await
            .unwrap_err(),
        CompanyError::AlreadyMember
    );
    assert!(repos
        .invitations
        .invitations_for_company(company.id)
        .await
        .unwrap()
        .is_empty());

    invite
        .execute(&taylor, company.id, "new@example.com", Some("editor"))
        .await
        .unwrap();
    assert_eq!(
        invite
            .execute(&taylor, company.id, "NEW@example.com", Some("editor"))
            .await
            .unwrap_err(),
        CompanyError::AlreadyInvited
    );

    // the unique index also holds for rows written directly
    let duplicate = repos
        .invitations
        .create_invitation(NewInvitation {
            company_id: company.id,
            email: "New@Example.com".to_owned(),
            role: None,
            token_hash: hash_token("other-token"),
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate, CompanyError::AlreadyInvited);
    assert!(repos
        .invitations
        .find_by_company_and_email(company.id, "NEW@EXAMPLE.COM")
        .await
        .unwrap()
        .is_some());
    assert_eq!(
        repos
            .invitations
            .invitations_for_company(company.id)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
#[serial]
async fn test_company_and_membership_queries() {
    let repos = setup().await;
    let taylor = seed_user(&repos, "Taylor Otwell", "taylor@example.com").await;
    let adam = seed_user(&repos, "Adam Wathan", "adam@example.com").await;

    let personal = repos
        .companies
        .create_company(NewCompany {
            user_id: taylor.id,
            name: "Taylor's Company".to_owned(),
            personal_company: true,
        })
        .await
        .unwrap();
    let laravel = repos
        .companies
        .create_company(NewCompany {
            user_id: taylor.id,
            name: "Laravel".to_owned(),
            personal_company: false,
        })
        .await
        .unwrap();

    let owned = repos.companies.owned_companies(taylor.id).await.unwrap();
    assert_eq!(owned.len(), 2);
    assert_eq!(owned[0].name, "Laravel");

    let found = repos.companies.personal_company(taylor.id).await.unwrap().unwrap();
    assert_eq!(found.id, personal.id);

    let renamed = repos
        .companies
        .update_company_name(laravel.id, "Laravel LLC")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Laravel LLC");
    assert_eq!(
        repos
            .companies
            .update_company_name(9999, "Nope")
            .await
            .unwrap_err(),
        CompanyError::CompanyNotFound
    );

    let membership = repos
        .memberships
        .add_member(NewMembership {
            company_id: laravel.id,
            user_id: adam.id,
            role: Some("editor".to_owned()),
        })
        .await
        .unwrap();
    assert_eq!(membership.role.as_deref(), Some("editor"));

    let duplicate = repos
        .memberships
        .add_member(NewMembership {
            company_id: laravel.id,
            user_id: adam.id,
            role: None,
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate, CompanyError::AlreadyMember);

    let employees = repos.memberships.employees(laravel.id).await.unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].email, "adam@example.com");
    assert_eq!(employees[0].role.as_deref(), Some("editor"));

    let updated = repos
        .memberships
        .update_role(laravel.id, adam.id, Some("admin"))
        .await
        .unwrap();
    assert_eq!(updated.role.as_deref(), Some("admin"));

    let member_of = repos.memberships.member_companies(adam.id).await.unwrap();
    assert_eq!(member_of.len(), 1);
    assert_eq!(member_of[0].id, laravel.id);

    repos
        .current
        .set_current_company(adam.id, Some(laravel.id))
        .await
        .unwrap();
    repos.memberships.remove_member(laravel.id, adam.id).await.unwrap();

    let adam = repos.users.find_user_by_id(adam.id).await.unwrap().unwrap();
    assert_eq!(adam.current_company_id, None);
    assert_eq!(
        repos
            .memberships
            .remove_member(laravel.id, adam.id)
            .await
            .unwrap_err(),
        CompanyError::EmployeeNotFound
    );

    assert_eq!(
        repos
            .current
            .set_current_company(9999, None)
            .await
            .unwrap_err(),
        CompanyError::UserNotFound
    );
}

#[tokio::test]
#[serial]
async fn test_accept_invitation_is_atomic() {
    let repos = setup().await;
    let taylor = seed_user(&repos, "Taylor Otwell", "taylor@example.com").await;
    let adam = seed_user(&repos, "Adam Wathan", "adam@example.com").await;

    let company = repos
        .companies
        .create_company(NewCompany {
            user_id: taylor.id,
            name: "Laravel".to_owned(),
            personal_company: false,
        })
        .await
        .unwrap();

    let invitation = repos
        .invitations
        .create_invitation(NewInvitation {
            company_id: company.id,
            email: "adam@example.com".to_owned(),
            role: Some("editor".to_owned()),
            token_hash: hash_token("invite-token"),
        })
        .await
        .unwrap();

    let duplicate = repos
        .invitations
        .create_invitation(NewInvitation {
            company_id: company.id,
            email: "adam@example.com".to_owned(),
            role: None,
            token_hash: hash_token("other-token"),
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate, CompanyError::AlreadyInvited);

    // adam is already an employee, so the insert fails and the delete rolls back
    repos
        .memberships
        .add_member(NewMembership {
            company_id: company.id,
            user_id: adam.id,
            role: None,
        })
        .await
        .unwrap();
    let err = repos
        .invitations
        .accept_invitation(invitation.id, adam.id)
        .await
        .unwrap_err();
    assert_eq!(err, CompanyError::AlreadyMember);
    assert!(repos
        .invitations
        .find_invitation(invitation.id)
        .await
        .unwrap()
        .is_some());

    repos.memberships.remove_member(company.id, adam.id).await.unwrap();

    let membership = repos
        .invitations
        .accept_invitation(invitation.id, adam.id)
        .await
        .unwrap();
    assert_eq!(membership.role.as_deref(), Some("editor"));
    assert!(repos
        .invitations
        .invitations_for_company(company.id)
        .await
        .unwrap()
        .is_empty());

    assert_eq!(
        repos
            .invitations
            .accept_invitation(invitation.id, adam.id)
            .await
            .unwrap_err(),
        CompanyError::InvitationNotFound
    );
}

#[tokio::test]
#[serial]
async fn test_full_workflow() {
    let repos = setup().await;
    let config = CompaniesConfig::default();

    let register = RegisterUserAction::with_hasher(
        repos.users.clone(),
        repos.companies.clone(),
        repos.current.clone(),
        PasswordPolicy::default(),
        Argon2Hasher::fast(),
    );
    let input = |name: &str, email: &str| RegisterUserInput {
        name: name.to_owned(),
        email: email.to_owned(),
        password: SecretString::new("password123"),
        password_confirmation: SecretString::new("password123"),
    };
    let taylor = register.execute(input("Taylor Otwell", "taylor@example.com")).await.unwrap();
    let adam = register.execute(input("Adam Wathan", "adam@example.com")).await.unwrap();

    let company = CreateCompanyAction::new(repos.companies.clone(), repos.current.clone())
        .execute(&taylor, "Laravel")
        .await
        .unwrap();

    let output = InviteCompanyEmployeeAction::new(
        repos.companies.clone(),
        repos.users.clone(),
        repos.memberships.clone(),
        repos.invitations.clone(),
        config.roles.clone(),
    )
    .execute(&taylor, company.id, "ADAM@example.com", Some("admin"))
    .await
    .unwrap();
    assert_eq!(output.invitation.email, "adam@example.com");

    AcceptCompanyInvitationAction::new(
        repos.companies.clone(),
        repos.memberships.clone(),
        repos.invitations.clone(),
    )
    .execute(&output.token, &adam)
    .await
    .unwrap();

    let resolver = CompanyResolver::new(
        repos.companies.clone(),
        repos.memberships.clone(),
        repos.current.clone(),
        config.roles.clone(),
    );
    resolver.switch_company(&adam, company.id).await.unwrap();
    assert!(resolver.has_company_permission(&adam, &company, "delete", None).await.unwrap());

    let token = CreateApiTokenAction::with_config(repos.api_tokens.clone(), &config)
        .execute(&adam, "ci", &["read".to_owned(), "deploy".to_owned()])
        .await
        .unwrap();
    assert_eq!(token.token.abilities, vec!["read".to_owned()]);

    let (found, api_token) =
        AuthenticateApiTokenAction::new(repos.users.clone(), repos.api_tokens.clone())
            .execute(token.plain_text_token.expose_secret())
            .await
            .unwrap();
    assert_eq!(found.id, adam.id);
    assert!(!resolver
        .has_company_permission(&adam, &company, "delete", Some(&api_token))
        .await
        .unwrap());
    let touched = repos
        .api_tokens
        .find_user_token(adam.id, api_token.id)
        .await
        .unwrap()
        .unwrap();
    assert!(touched.last_used_at.is_some());

    // deleting the company clears adam's current company
    DeleteCompanyAction::new(repos.companies.clone())
        .execute(&taylor, company.id)
        .await
        .unwrap();
    let adam = repos.users.find_user_by_id(adam.id).await.unwrap().unwrap();
    assert_eq!(adam.current_company_id, None);
    assert!(repos.memberships.member_companies(adam.id).await.unwrap().is_empty());

    DeleteUserAction::with_hasher(repos.users.clone(), Argon2Hasher::fast())
        .execute(&adam, &SecretString::new("password123"))
        .await
        .unwrap();

    assert!(repos.users.find_user_by_id(adam.id).await.unwrap().is_none());
    assert!(repos.api_tokens.tokens_for_user(adam.id).await.unwrap().is_empty());
    assert!(repos.companies.personal_company(adam.id).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_delete_user_cascades() {
    let repos = setup().await;
    let taylor = seed_user(&repos, "Taylor Otwell", "taylor@example.com").await;
    let adam = seed_user(&repos, "Adam Wathan", "adam@example.com").await;

    let owned = repos
        .companies
        .create_company(NewCompany {
            user_id: taylor.id,
            name: "Laravel".to_owned(),
            personal_company: false,
        })
        .await
        .unwrap();
    let foreign = repos
        .companies
        .create_company(NewCompany {
            user_id: adam.id,
            name: "Tailwind".to_owned(),
            personal_company: false,
        })
        .await
        .unwrap();
    for (company_id, user_id) in [(owned.id, adam.id), (foreign.id, taylor.id)] {
        repos
            .memberships
            .add_member(NewMembership {
                company_id,
                user_id,
                role: None,
            })
            .await
            .unwrap();
    }
    repos
        .invitations
        .create_invitation(NewInvitation {
            company_id: owned.id,
            email: "new@example.com".to_owned(),
            role: None,
            token_hash: hash_token("invite-token"),
        })
        .await
        .unwrap();
    repos
        .current
        .set_current_company(adam.id, Some(owned.id))
        .await
        .unwrap();
    repos
        .api_tokens
        .create_token(NewApiToken {
            user_id: taylor.id,
            name: "deploy".to_owned(),
            token_hash: hash_token("secret"),
            abilities: vec!["read".to_owned()],
        })
        .await
        .unwrap();

    repos.users.delete_user(taylor.id).await.unwrap();

    assert!(repos.users.find_user_by_id(taylor.id).await.unwrap().is_none());
    assert!(repos.companies.find_company(owned.id).await.unwrap().is_none());
    assert!(repos.companies.find_company(foreign.id).await.unwrap().is_some());
    assert!(repos.memberships.employees(foreign.id).await.unwrap().is_empty());
    assert!(repos.memberships.member_companies(adam.id).await.unwrap().is_empty());
    assert!(repos.invitations.invitations_for_company(owned.id).await.unwrap().is_empty());
    assert!(repos.api_tokens.tokens_for_user(taylor.id).await.unwrap().is_empty());
    let adam = repos.users.find_user_by_id(adam.id).await.unwrap().unwrap();
    assert_eq!(adam.current_company_id, None);

    assert_eq!(
        repos.users.delete_user(taylor.id).await.unwrap_err(),
        CompanyError::UserNotFound
    );
}

#[tokio::test]
#[serial]
async fn test_api_token_repository() {
    let repos = setup().await;
    let user = seed_user(&repos, "Taylor Otwell", "taylor@example.com").await;

    let token = repos
        .api_tokens
        .create_token(NewApiToken {
            user_id: user.id,
            name: "deploy".to_owned(),
            token_hash: hash_token("secret"),
            abilities: vec!["read".to_owned(), "update".to_owned()],
        })
        .await
        .unwrap();
    assert_eq!(token.abilities, vec!["read".to_owned(), "update".to_owned()]);
    assert!(token.last_used_at.is_none());

    let found = repos
        .api_tokens
        .find_token_by_hash(&hash_token("secret"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, token.id);

    let updated = repos
        .api_tokens
        .update_abilities(token.id, &["delete".to_owned()])
        .await
        .unwrap();
    assert_eq!(updated.abilities, vec!["delete".to_owned()]);

    repos.api_tokens.delete_token(token.id).await.unwrap();
    assert!(repos
        .api_tokens
        .find_user_token(user.id, token.id)
        .await
        .unwrap()
        .is_none());
}
