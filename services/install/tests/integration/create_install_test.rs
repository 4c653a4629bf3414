use chrono::{Duration, Utc};

use clinpush_install::domain::types::InstallMetadata;
use clinpush_install::error::InstallServiceError;
use clinpush_install::usecase::create_install::{CreateInstallInput, CreateInstallUseCase};

use crate::helpers::{MockIdentityPort, MockInstallCodeRepo, MockProfileRepo, test_install_code, test_user_id};

fn input(email: &str) -> CreateInstallInput {
    CreateInstallInput {
        email: email.to_owned(),
        metadata: InstallMetadata {
            name: Some("Clínica Exemplo".to_owned()),
            wh_id: Some("1804".to_owned()),
            inst: None,
        },
        redirect_to: Some("https://app.example.com/".to_owned()),
    }
}

#[tokio::test]
async fn should_issue_new_code_for_unknown_email() {
    let codes = MockInstallCodeRepo::empty();
    let profiles = MockProfileRepo::empty();
    let codes_handle = codes.codes_handle();
    let profiles_handle = profiles.profiles_handle();

    let uc = CreateInstallUseCase {
        identity: MockIdentityPort::new(test_user_id()),
        codes,
        profiles,
    };

    let out = uc.execute(input("user@example.com")).await.unwrap();

    assert!(!out.reused);
    assert_eq!(out.email, "user@example.com");

    let codes = codes_handle.lock().unwrap();
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].code, out.code);
    assert_eq!(codes[0].user_id, test_user_id());
    assert_eq!(codes[0].use_count, 0);
    assert!(codes[0].expires_at > Utc::now() + Duration::days(29));

    let profiles = profiles_handle.lock().unwrap();
    assert_eq!(profiles.len(), 1, "profile row should be upserted");
    assert_eq!(profiles[0].name.as_deref(), Some("Clínica Exemplo"));
}

#[tokio::test]
async fn should_reuse_recent_code_on_reissue() {
    let codes = MockInstallCodeRepo::empty();
    let codes_handle = codes.codes_handle();

    let uc = CreateInstallUseCase {
        identity: MockIdentityPort::new(test_user_id()),
        codes,
        profiles: MockProfileRepo::empty(),
    };

    let first = uc.execute(input("user@example.com")).await.unwrap();
    let second = uc.execute(input("user@example.com")).await.unwrap();

    assert!(!first.reused);
    assert!(second.reused);
    assert_eq!(first.code, second.code, "reissue should hand back the same code");
    assert_eq!(codes_handle.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_mint_new_code_when_prior_expired() {
    let mut prior = test_install_code(test_user_id(), "user@example.com");
    prior.expires_at = Utc::now() - Duration::hours(1);
    let prior_code = prior.code;

    let uc = CreateInstallUseCase {
        identity: MockIdentityPort::new(test_user_id()),
        codes: MockInstallCodeRepo::new(vec![prior]),
        profiles: MockProfileRepo::empty(),
    };

    let out = uc.execute(input("user@example.com")).await.unwrap();
    assert!(!out.reused);
    assert_ne!(out.code, prior_code);
}

#[tokio::test]
async fn should_mint_new_code_when_prior_at_usage_cap() {
    let mut prior = test_install_code(test_user_id(), "user@example.com");
    prior.use_count = prior.max_uses;
    let prior_code = prior.code;

    let uc = CreateInstallUseCase {
        identity: MockIdentityPort::new(test_user_id()),
        codes: MockInstallCodeRepo::new(vec![prior]),
        profiles: MockProfileRepo::empty(),
    };

    let out = uc.execute(input("user@example.com")).await.unwrap();
    assert!(!out.reused);
    assert_ne!(out.code, prior_code);
}

#[tokio::test]
async fn should_reject_blank_email_without_identity_call() {
    let identity = MockIdentityPort::new(test_user_id());
    let calls = identity.calls_handle();

    let uc = CreateInstallUseCase {
        identity,
        codes: MockInstallCodeRepo::empty(),
        profiles: MockProfileRepo::empty(),
    };

    let result = uc.execute(input("  ")).await;

    assert!(
        matches!(result, Err(InstallServiceError::MissingEmail)),
        "expected MissingEmail, got {result:?}"
    );
    assert_eq!(*calls.lock().unwrap(), 0);
}
