use std::sync::Arc;

use matrimony_auth::domain::types::{CodePurpose, PendingAction, SessionState};
use matrimony_auth::error::AuthServiceError;
use matrimony_auth::usecase::login::{
    CodeLoginInput, CodeLoginUseCase, PasswordLoginInput, PasswordLoginUseCase,
};
use matrimony_auth_types::session::SessionId;

use crate::helpers::{
    MockCodeRepo, MockSessionRepo, MockUserRepo, RecordingMailer, TEST_PASSWORD, dispatcher,
    google_user, issuer, ledger, password_user,
};

// ── PasswordLoginUseCase ─────────────────────────────────────────────────────

fn password_login(
    users: &MockUserRepo,
    sessions: &MockSessionRepo,
) -> PasswordLoginUseCase<MockUserRepo, MockSessionRepo> {
    PasswordLoginUseCase {
        users: users.clone(),
        sessions: issuer(sessions),
    }
}

#[tokio::test]
async fn should_sign_in_with_correct_password() {
    let user = password_user("anna@example.com", TEST_PASSWORD);
    let users = MockUserRepo::new(vec![user.clone()]);
    let sessions = MockSessionRepo::empty();
    let sid = SessionId::generate();

    let signed_in = password_login(&users, &sessions)
        .execute(
            &sid,
            PasswordLoginInput {
                email: " ANNA@example.com".to_owned(),
                password: TEST_PASSWORD.to_owned(),
            },
        )
        .await
        .unwrap();

    assert_eq!(signed_in.user.id, user.id);
    assert_ne!(signed_in.session_id, sid);
    assert_eq!(sessions.state_of(&sid), SessionState::Anonymous);
    assert_eq!(
        sessions.state_of(&signed_in.session_id),
        SessionState::Authenticated(user.id)
    );
    assert_eq!(sessions.logins(), vec![user.id]);
}

#[tokio::test]
async fn should_give_one_answer_for_every_credential_failure() {
    let users = MockUserRepo::new(vec![
        password_user("anna@example.com", TEST_PASSWORD),
        google_user(Some("mathew@example.com"), "google-sub-1"),
    ]);
    let sessions = MockSessionRepo::empty();
    let cases = [
        ("anna@example.com", "wrong password"),
        ("nobody@example.com", TEST_PASSWORD),
        ("mathew@example.com", TEST_PASSWORD),
    ];

    for (email, password) in cases {
        let sid = SessionId::generate();
        let result = password_login(&users, &sessions)
            .execute(
                &sid,
                PasswordLoginInput {
                    email: email.to_owned(),
                    password: password.to_owned(),
                },
            )
            .await;
        assert!(
            matches!(result, Err(AuthServiceError::InvalidCredentials)),
            "{email}: expected InvalidCredentials, got {result:?}"
        );
        assert_eq!(sessions.state_of(&sid), SessionState::Anonymous);
    }
    assert!(sessions.logins().is_empty());
}

// ── CodeLoginUseCase ─────────────────────────────────────────────────────────

struct CodeFixture {
    users: MockUserRepo,
    codes: MockCodeRepo,
    sessions: MockSessionRepo,
    mailer: RecordingMailer,
}

impl CodeFixture {
    fn with_user(email: &str) -> Self {
        Self {
            users: MockUserRepo::new(vec![password_user(email, TEST_PASSWORD)]),
            codes: MockCodeRepo::empty(),
            sessions: MockSessionRepo::empty(),
            mailer: RecordingMailer::default(),
        }
    }

    fn usecase(&self) -> CodeLoginUseCase<MockUserRepo, MockCodeRepo, MockSessionRepo> {
        CodeLoginUseCase {
            users: self.users.clone(),
            ledger: ledger(&self.codes),
            sessions: issuer(&self.sessions),
            dispatcher: dispatcher(Arc::new(self.mailer.clone())),
        }
    }
}

#[tokio::test]
async fn should_send_login_code_and_mark_session_pending() {
    let fx = CodeFixture::with_user("anna@example.com");
    let sid = SessionId::generate();

    fx.usecase().start(&sid, "Anna@Example.com").await.unwrap();

    let sent = fx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].purpose, CodePurpose::Login);
    assert_eq!(sent[0].subject, "Your Login Verification Code");
    assert!(sent[0].html.contains(&sent[0].code));
    match fx.sessions.state_of(&sid) {
        SessionState::Pending(pending) => {
            assert_eq!(pending.email, "anna@example.com");
            assert_eq!(pending.action, PendingAction::Login);
        }
        other => panic!("expected pending session, got {other:?}"),
    }
}

#[tokio::test]
async fn should_report_unknown_email_for_code_login() {
    let fx = CodeFixture::with_user("anna@example.com");

    let result = fx
        .usecase()
        .start(&SessionId::generate(), "nobody@example.com")
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
    assert!(fx.codes.all().is_empty());
    assert!(fx.mailer.sent().is_empty());
}

#[tokio::test]
async fn should_sign_in_with_emailed_code() {
    let fx = CodeFixture::with_user("anna@example.com");
    let sid = SessionId::generate();
    fx.usecase().start(&sid, "anna@example.com").await.unwrap();
    let code = fx.mailer.sent()[0].code.clone();

    let signed_in = fx
        .usecase()
        .verify(
            &sid,
            CodeLoginInput {
                email: "anna@example.com".to_owned(),
                code: code.clone(),
            },
        )
        .await
        .unwrap();

    assert_eq!(fx.sessions.state_of(&sid), SessionState::Anonymous);
    assert_eq!(
        fx.sessions.state_of(&signed_in.session_id),
        SessionState::Authenticated(signed_in.user.id)
    );

    let replay = fx
        .usecase()
        .verify(
            &SessionId::generate(),
            CodeLoginInput {
                email: "anna@example.com".to_owned(),
                code,
            },
        )
        .await;
    assert!(matches!(replay, Err(AuthServiceError::InvalidCode)));
}

#[tokio::test]
async fn should_not_accept_register_code_for_login() {
    let fx = CodeFixture::with_user("anna@example.com");
    let code = ledger(&fx.codes)
        .issue("anna@example.com", CodePurpose::Register)
        .await
        .unwrap();

    let result = fx
        .usecase()
        .verify(
            &SessionId::generate(),
            CodeLoginInput {
                email: "anna@example.com".to_owned(),
                code,
            },
        )
        .await;

    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
}
