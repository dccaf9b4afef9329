//! Defines the endpoint for creating a new transaction.
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;
use serde_json::{Map, Value};

use crate::{
    Error,
    app_state::TransactionState,
    session::{SessionId, resolve_or_start_session, resolve_session},
    transaction::{NewTransaction, Transaction, TransactionStore, TransactionType},
    validation::{
        IssueCode, ValidationErrors, json_type_name, required_enum, required_number,
        required_string,
    },
};

const INVALID_BODY: &str = "Invalid body";

/// A route handler for creating a new transaction.
///
/// This is the only transaction route that does not require a session: if
/// the request has no session cookie, a new session is started and its
/// cookie is returned alongside the 201 Created response. The response body
/// is empty.
///
/// Debit amounts are negated before they are stored.
///
/// # Errors
/// Returns an [Error::Validation] if the body is not a JSON object with a
/// string `title`, a numeric `amount` and a `type` of "credit" or "debit", or
/// if adding the amount would take the session's total outside the range of
/// a finite number.
pub async fn create_transaction_endpoint<T>(
    State(state): State<TransactionState<T>>,
    jar: CookieJar,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, CookieJar), Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let body = match body {
        Ok(Json(Value::Object(body))) => body,
        Ok(Json(other)) => {
            return Err(invalid_body(ValidationErrors::for_form(
                format!("Expected object, received {}", json_type_name(&other)),
                IssueCode::InvalidType,
            )));
        }
        Err(rejection) => {
            return Err(invalid_body(ValidationErrors::for_form(
                rejection.body_text(),
                IssueCode::InvalidJson,
            )));
        }
    };

    // Validate before touching the session so that a rejected request does
    // not start a new one.
    let form = parse_transaction_body(&body)?;
    if let Some(session_id) = resolve_session(&jar) {
        check_session_total(&state.transaction_store, &session_id, &form)?;
    }
    let (jar, session_id) = resolve_or_start_session(jar);

    let transaction = state
        .transaction_store
        .create(form.into_transaction(session_id))?;

    tracing::debug!("Created transaction {}.", transaction.id);

    Ok((StatusCode::CREATED, jar))
}

/// The validated fields of a create transaction request.
#[derive(Debug, PartialEq)]
struct TransactionForm {
    title: String,
    amount: f64,
    kind: TransactionType,
}

impl TransactionForm {
    fn into_transaction(self, session_id: SessionId) -> NewTransaction {
        Transaction::build(session_id, &self.title, self.amount, self.kind)
    }
}

fn parse_transaction_body(body: &Map<String, Value>) -> Result<TransactionForm, Error> {
    let mut errors = ValidationErrors::new();

    let title = required_string(body, "title", &mut errors);
    let amount = required_number(body, "amount", &mut errors);
    let kind = required_enum(body, "type", &TransactionType::NAMES, &mut errors)
        .and_then(|name| name.parse::<TransactionType>().ok());

    match (title, amount, kind) {
        (Some(title), Some(amount), Some(kind)) => Ok(TransactionForm {
            title,
            amount,
            kind,
        }),
        _ => Err(invalid_body(errors)),
    }
}

/// Reject `form` if the session total would no longer be a finite number
/// once the new amount is added.
fn check_session_total<T: TransactionStore>(
    store: &T,
    session_id: &SessionId,
    form: &TransactionForm,
) -> Result<(), Error> {
    let total = store.sum_amount(session_id)?;

    if (total + form.kind.normalize_amount(form.amount)).is_finite() {
        Ok(())
    } else {
        Err(invalid_body(ValidationErrors::for_field(
            "amount",
            "Amount would take the session total out of range",
            IssueCode::TooBig,
        )))
    }
}

fn invalid_body(errors: ValidationErrors) -> Error {
    Error::Validation {
        message: INVALID_BODY,
        errors,
    }
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::{CookieJar, cookie::Cookie};
    use serde_json::{Value, json};

    use crate::{
        Error,
        app_state::TransactionState,
        session::{COOKIE_SESSION_ID, SessionId},
        test_utils::MemoryTransactionStore,
        transaction::{TransactionStore, TransactionType, create_transaction_endpoint},
        validation::IssueCode,
    };

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn get_test_state() -> TransactionState<MemoryTransactionStore> {
        TransactionState {
            transaction_store: MemoryTransactionStore::new(),
        }
    }

    async fn create(
        state: &TransactionState<MemoryTransactionStore>,
        jar: CookieJar,
        body: Value,
    ) -> Result<(StatusCode, CookieJar), Error> {
        create_transaction_endpoint(State(state.clone()), jar, Ok(Json(body))).await
    }

    #[tokio::test]
    async fn creates_credit_and_starts_session() {
        let state = get_test_state();

        let (status, jar) = create(
            &state,
            CookieJar::new(),
            json!({"title": "x", "amount": 10, "type": "credit"}),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        let cookie = jar
            .get(COOKIE_SESSION_ID)
            .expect("expected a new session cookie");
        let session_id = SessionId::new(cookie.value());
        let transactions = state.transaction_store.list(&session_id).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 10.0);
        assert_eq!(transactions[0].kind, TransactionType::Credit);
    }

    #[tokio::test]
    async fn debit_is_stored_negated() {
        let state = get_test_state();
        let jar = CookieJar::new().add(Cookie::new(COOKIE_SESSION_ID, "session"));

        create(
            &state,
            jar,
            json!({"title": "coffee", "amount": 5, "type": "debit"}),
        )
        .await
        .unwrap();

        let transactions = state
            .transaction_store
            .list(&SessionId::new("session"))
            .unwrap();
        assert_eq!(transactions[0].amount, -5.0);
    }

    #[tokio::test]
    async fn existing_session_issues_no_cookie() {
        let state = get_test_state();
        let jar = CookieJar::new().add(Cookie::new(COOKIE_SESSION_ID, "session"));

        let (_, jar) = create(
            &state,
            jar,
            json!({"title": "coffee", "amount": 5, "type": "debit"}),
        )
        .await
        .unwrap();

        let response = jar.into_response();
        assert!(
            response.headers().get("set-cookie").is_none(),
            "expected no set-cookie header for an existing session"
        );
    }

    #[tokio::test]
    async fn session_token_is_not_logged() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let state = get_test_state();
        let jar = CookieJar::new().add(Cookie::new(COOKIE_SESSION_ID, "secret-session-token"));

        create(
            &state,
            jar,
            json!({"title": "coffee", "amount": 5, "type": "debit"}),
        )
        .await
        .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Created transaction"), "got logs: {output}");
        assert!(!output.contains("secret-session-token"), "got logs: {output}");
    }

    #[tokio::test]
    async fn reports_every_invalid_field() {
        let state = get_test_state();

        let result = create(
            &state,
            CookieJar::new(),
            json!({"amount": "10", "type": "refund"}),
        )
        .await;

        let Err(Error::Validation { message, errors }) = result else {
            panic!("expected a validation error");
        };
        assert_eq!(message, "Invalid body");
        assert_eq!(errors.field("title")[0].message, "Required");
        assert_eq!(errors.field("amount")[0].error_code, IssueCode::InvalidType);
        assert_eq!(
            errors.field("type")[0].error_code,
            IssueCode::InvalidEnumValue
        );
        assert_eq!(state.transaction_store.call_count(), 0);
    }

    #[tokio::test]
    async fn rejects_non_object_body() {
        let state = get_test_state();

        let result = create(&state, CookieJar::new(), json!([1, 2, 3])).await;

        let Err(Error::Validation { errors, .. }) = result else {
            panic!("expected a validation error");
        };
        assert_eq!(errors.form()[0].message, "Expected object, received array");
    }

    #[tokio::test]
    async fn rejects_amount_that_overflows_session_total() {
        let state = get_test_state();
        let jar = CookieJar::new().add(Cookie::new(COOKIE_SESSION_ID, "session"));
        let body = json!({"title": "windfall", "amount": 1.7e308, "type": "credit"});

        create(&state, jar.clone(), body.clone()).await.unwrap();
        let result = create(&state, jar, body).await;

        let Err(Error::Validation { message, errors }) = result else {
            panic!("expected a validation error");
        };
        assert_eq!(message, "Invalid body");
        assert_eq!(errors.field("amount")[0].error_code, IssueCode::TooBig);
        let session_id = SessionId::new("session");
        assert_eq!(state.transaction_store.list(&session_id).unwrap().len(), 1);
        assert_eq!(
            state.transaction_store.sum_amount(&session_id).unwrap(),
            1.7e308
        );
    }

    #[tokio::test]
    async fn large_debit_after_large_credit_is_accepted() {
        let state = get_test_state();
        let jar = CookieJar::new().add(Cookie::new(COOKIE_SESSION_ID, "session"));

        for kind in ["credit", "debit"] {
            create(
                &state,
                jar.clone(),
                json!({"title": "swing", "amount": 1.7e308, "type": kind}),
            )
            .await
            .unwrap();
        }

        let total = state
            .transaction_store
            .sum_amount(&SessionId::new("session"))
            .unwrap();
        assert_eq!(total, 0.0);
    }

    #[tokio::test]
    async fn zero_amount_is_accepted_for_both_types() {
        let state = get_test_state();
        let jar = CookieJar::new().add(Cookie::new(COOKIE_SESSION_ID, "session"));

        for kind in ["credit", "debit"] {
            create(
                &state,
                jar.clone(),
                json!({"title": "nothing", "amount": 0, "type": kind}),
            )
            .await
            .unwrap();
        }

        let transactions = state
            .transaction_store
            .list(&SessionId::new("session"))
            .unwrap();
        assert!(transactions.iter().all(|t| t.amount == 0.0));
        assert_eq!(transactions[0].kind, TransactionType::Credit);
        assert_eq!(transactions[1].kind, TransactionType::Debit);
    }
}
