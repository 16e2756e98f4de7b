use std::sync::Arc;

use matrimony_auth::domain::types::{CodePurpose, PendingAction, SessionState};
use matrimony_auth::error::AuthServiceError;
use matrimony_auth::usecase::register::{RegisterInput, RegisterUseCase, VerifyRegisterInput};
use matrimony_auth_types::session::SessionId;

use crate::helpers::{
    FailingMailer, MockCodeRepo, MockSessionRepo, MockUserRepo, RecordingMailer, TEST_HASH_COST,
    TEST_PASSWORD, dispatcher, issuer, ledger, password_user,
};

struct Fixture {
    users: MockUserRepo,
    codes: MockCodeRepo,
    sessions: MockSessionRepo,
    mailer: RecordingMailer,
}

impl Fixture {
    fn new(users: MockUserRepo) -> Self {
        Self {
            users,
            codes: MockCodeRepo::empty(),
            sessions: MockSessionRepo::empty(),
            mailer: RecordingMailer::default(),
        }
    }

    fn usecase(&self) -> RegisterUseCase<MockUserRepo, MockCodeRepo, MockSessionRepo> {
        RegisterUseCase {
            users: self.users.clone(),
            ledger: ledger(&self.codes),
            sessions: issuer(&self.sessions),
            dispatcher: dispatcher(Arc::new(self.mailer.clone())),
            hash_cost: TEST_HASH_COST,
        }
    }
}

fn register_input(email: &str) -> RegisterInput {
    RegisterInput {
        email: email.to_owned(),
        password: TEST_PASSWORD.to_owned(),
        first_name: Some("Anna".to_owned()),
        last_name: Some("Thomas".to_owned()),
    }
}

// ── start ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_send_code_and_hold_registration_pending() {
    let fx = Fixture::new(MockUserRepo::empty());
    let sid = SessionId::generate();

    let out = fx
        .usecase()
        .start(&sid, register_input("  Anna@Example.COM "))
        .await
        .unwrap();

    assert_eq!(out.email, "anna@example.com");
    assert_eq!(out.first_name.as_deref(), Some("Anna"));
    assert!(fx.users.all().is_empty(), "no account before verification");

    let sent = fx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "anna@example.com");
    assert_eq!(sent[0].purpose, CodePurpose::Register);
    assert_eq!(sent[0].subject, "Verify Your Email Address");
    assert_eq!(
        fx.codes.latest("anna@example.com", CodePurpose::Register),
        Some(sent[0].code.clone())
    );

    match fx.sessions.state_of(&sid) {
        SessionState::Pending(pending) => {
            assert_eq!(pending.email, "anna@example.com");
            let PendingAction::Register { password_hash, .. } = pending.action else {
                panic!("expected register action");
            };
            assert!(bcrypt::verify(TEST_PASSWORD, &password_hash).unwrap());
        }
        other => panic!("expected pending session, got {other:?}"),
    }
}

#[tokio::test]
async fn should_reject_registered_email_without_sending() {
    let existing = password_user("anna@example.com", TEST_PASSWORD);
    let fx = Fixture::new(MockUserRepo::new(vec![existing]));

    let result = fx
        .usecase()
        .start(&SessionId::generate(), register_input("ANNA@example.com"))
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::EmailTaken)),
        "expected EmailTaken, got {result:?}"
    );
    assert!(fx.mailer.sent().is_empty());
    assert!(fx.codes.all().is_empty());
}

#[tokio::test]
async fn should_reject_malformed_email_and_short_password() {
    let fx = Fixture::new(MockUserRepo::empty());

    let bad_email = fx
        .usecase()
        .start(&SessionId::generate(), register_input("not-an-email"))
        .await;
    assert!(matches!(bad_email, Err(AuthServiceError::Validation(_))));

    let mut input = register_input("anna@example.com");
    input.password = "short".to_owned();
    let bad_password = fx.usecase().start(&SessionId::generate(), input).await;
    assert!(matches!(bad_password, Err(AuthServiceError::Validation(_))));

    assert!(fx.codes.all().is_empty());
}

#[tokio::test]
async fn should_report_delivery_failure_after_recording_pending() {
    let fx = Fixture::new(MockUserRepo::empty());
    let mut usecase = fx.usecase();
    usecase.dispatcher = dispatcher(Arc::new(FailingMailer));
    let sid = SessionId::generate();

    let result = usecase.start(&sid, register_input("anna@example.com")).await;

    assert!(
        matches!(result, Err(AuthServiceError::Delivery(_))),
        "expected Delivery, got {result:?}"
    );
    assert!(matches!(fx.sessions.state_of(&sid), SessionState::Pending(_)));
}

// ── verify ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_verified_account_and_sign_in() {
    let fx = Fixture::new(MockUserRepo::empty());
    let sid = SessionId::generate();
    fx.usecase()
        .start(&sid, register_input("anna@example.com"))
        .await
        .unwrap();
    let code = fx.mailer.sent()[0].code.clone();

    let signed_in = fx
        .usecase()
        .verify(
            &sid,
            VerifyRegisterInput {
                email: "Anna@Example.com".to_owned(),
                code,
            },
        )
        .await
        .unwrap();
    let user = signed_in.user;

    assert_eq!(user.email.as_deref(), Some("anna@example.com"));
    assert!(user.email_verified);
    assert!(user.google_id.is_none());
    assert_eq!(user.last_name.as_deref(), Some("Thomas"));
    assert_eq!(fx.users.all().len(), 1);
    assert_ne!(signed_in.session_id, sid);
    assert_eq!(fx.sessions.state_of(&sid), SessionState::Anonymous);
    assert_eq!(
        fx.sessions.state_of(&signed_in.session_id),
        SessionState::Authenticated(user.id)
    );
    assert_eq!(fx.sessions.logins(), vec![user.id]);
    assert!(fx.codes.all().iter().all(|c| c.consumed));
}

#[tokio::test]
async fn should_not_register_twice_with_one_code() {
    let fx = Fixture::new(MockUserRepo::empty());
    let sid = SessionId::generate();
    fx.usecase()
        .start(&sid, register_input("anna@example.com"))
        .await
        .unwrap();
    let code = fx.mailer.sent()[0].code.clone();
    let verify = |code: String| VerifyRegisterInput {
        email: "anna@example.com".to_owned(),
        code,
    };

    fx.usecase().verify(&sid, verify(code.clone())).await.unwrap();
    let replay = fx.usecase().verify(&sid, verify(code)).await;

    assert!(matches!(replay, Err(AuthServiceError::InvalidCode)));
    assert_eq!(fx.users.all().len(), 1);
}

#[tokio::test]
async fn should_reject_wrong_code_without_creating_account() {
    let fx = Fixture::new(MockUserRepo::empty());
    let sid = SessionId::generate();
    fx.usecase()
        .start(&sid, register_input("anna@example.com"))
        .await
        .unwrap();
    let issued = fx.mailer.sent()[0].code.clone();
    let wrong = if issued == "000000" { "000001" } else { "000000" };

    let result = fx
        .usecase()
        .verify(
            &sid,
            VerifyRegisterInput {
                email: "anna@example.com".to_owned(),
                code: wrong.to_owned(),
            },
        )
        .await;

    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
    assert!(fx.users.all().is_empty());
    assert!(matches!(fx.sessions.state_of(&sid), SessionState::Pending(_)));
}

#[tokio::test]
async fn should_require_pending_registration_in_the_same_session() {
    let fx = Fixture::new(MockUserRepo::empty());
    fx.usecase()
        .start(&SessionId::generate(), register_input("anna@example.com"))
        .await
        .unwrap();
    let code = fx.mailer.sent()[0].code.clone();

    let result = fx
        .usecase()
        .verify(
            &SessionId::generate(),
            VerifyRegisterInput {
                email: "anna@example.com".to_owned(),
                code,
            },
        )
        .await;

    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
    assert!(fx.users.all().is_empty());
    assert!(
        fx.codes.all().iter().all(|c| !c.consumed),
        "code must survive a request from the wrong session"
    );
}

#[tokio::test]
async fn should_reject_email_that_differs_from_pending_registration() {
    let fx = Fixture::new(MockUserRepo::empty());
    let sid = SessionId::generate();
    fx.usecase()
        .start(&sid, register_input("anna@example.com"))
        .await
        .unwrap();
    let code = fx.mailer.sent()[0].code.clone();

    let result = fx
        .usecase()
        .verify(
            &sid,
            VerifyRegisterInput {
                email: "mallory@example.com".to_owned(),
                code,
            },
        )
        .await;

    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
    assert!(fx.users.all().is_empty());
}
