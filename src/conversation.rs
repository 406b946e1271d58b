//! Conversation state and the submit/resolve cycle.
//!
//! A submission is split in two halves so presentation layers can keep drawing
//! while the request is in flight: [`Conversation::begin`] records the user turn
//! and picks generate vs. refine, [`Conversation::resolve`] applies the outcome.
//! [`Conversation::submit`] chains both for callers that can simply await.

use crate::model::{
    Message, Mode, ServiceRequest, SessionSnapshot, ValidationResult, YamlResponse, ACK_MESSAGE,
    FAILURE_MESSAGE,
};
use crate::service::{ServiceError, YamlService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty or whitespace-only text; nothing changed.
    Ignored,
    /// A request is already in flight; nothing changed.
    Busy,
    /// The user turn was recorded and this request must be sent.
    Dispatched(ServiceRequest),
}

#[derive(Debug, Default)]
pub struct Conversation {
    transcript: Vec<Message>,
    document: String,
    validation: ValidationResult,
    pending: bool,
    /// Text being composed; cleared whenever a submission resolves.
    pub input: String,
    last_failure: Option<ServiceError>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Tagged reason of the most recent failed submission, cleared on success.
    pub fn last_failure(&self) -> Option<&ServiceError> {
        self.last_failure.as_ref()
    }

    /// Mode the next submission will use.
    pub fn next_mode(&self) -> Mode {
        if self.document.is_empty() {
            Mode::Generate
        } else {
            Mode::Refine
        }
    }

    pub fn begin(&mut self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }
        if self.pending {
            tracing::warn!("submission rejected: a request is already in flight");
            return SubmitOutcome::Busy;
        }

        self.transcript.push(Message::user(text));
        self.pending = true;

        let request = match self.next_mode() {
            Mode::Refine => ServiceRequest::refine(text, self.document.clone()),
            Mode::Generate => ServiceRequest::generate(text),
        };
        tracing::info!(mode = ?request.mode(), "submission started");
        SubmitOutcome::Dispatched(request)
    }

    /// Submit the current input buffer.
    pub fn begin_input(&mut self) -> SubmitOutcome {
        let text = self.input.clone();
        self.begin(&text)
    }

    pub fn resolve(&mut self, result: Result<YamlResponse, ServiceError>) {
        if !self.pending {
            tracing::warn!("response ignored: no request in flight");
            return;
        }

        match result {
            Ok(resp) => {
                tracing::info!(
                    valid = resp.validation.valid,
                    errors = resp.validation.errors.len(),
                    "document updated"
                );
                self.document = resp.yaml;
                self.validation = resp.validation;
                self.last_failure = None;
                self.transcript.push(Message::system(ACK_MESSAGE));
            }
            Err(e) => {
                tracing::error!(reason = e.reason(), error = %e, "request failed");
                self.last_failure = Some(e);
                self.transcript.push(Message::system(FAILURE_MESSAGE));
            }
        }

        self.pending = false;
        self.input.clear();
    }

    /// Run a full submission against `service`. Returns false when the text was
    /// ignored or rejected, true once a response (success or failure) was applied.
    pub async fn submit<S: YamlService + ?Sized>(&mut self, service: &S, text: &str) -> bool {
        let request = match self.begin(text) {
            SubmitOutcome::Dispatched(request) => request,
            SubmitOutcome::Ignored | SubmitOutcome::Busy => return false,
        };
        let result = service.call(&request).await;
        self.resolve(result);
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            yaml: self.document.clone(),
            validation: self.validation.clone(),
            transcript: self.transcript.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Origin;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned outcomes in order and records every request it receives.
    struct ScriptedService {
        outcomes: Mutex<VecDeque<Result<YamlResponse, ServiceError>>>,
        requests: Mutex<Vec<ServiceRequest>>,
    }

    impl ScriptedService {
        fn new(outcomes: Vec<Result<YamlResponse, ServiceError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<ServiceRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl YamlService for ScriptedService {
        async fn call(&self, request: &ServiceRequest) -> Result<YamlResponse, ServiceError> {
            self.requests.lock().unwrap().push(request.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request")
        }
    }

    fn ok(yaml: &str, valid: bool, errors: &[&str]) -> Result<YamlResponse, ServiceError> {
        Ok(YamlResponse {
            yaml: yaml.to_string(),
            validation: ValidationResult {
                valid,
                errors: errors.iter().map(|s| s.to_string()).collect(),
            },
            parsed_requirements: None,
        })
    }

    #[tokio::test]
    async fn first_submission_generates_and_acknowledges() {
        let service = ScriptedService::new(vec![ok("version: '1.0'\n", true, &[])]);
        let mut conv = Conversation::new();
        conv.input = "Deploy a Python app with Redis".into();

        assert!(conv.submit(&service, "Deploy a Python app with Redis").await);

        assert_eq!(
            service.requests(),
            vec![ServiceRequest::generate("Deploy a Python app with Redis")]
        );
        assert_eq!(conv.document(), "version: '1.0'\n");
        assert_eq!(
            conv.transcript(),
            &[
                Message::user("Deploy a Python app with Redis"),
                Message::system(ACK_MESSAGE),
            ]
        );
        assert!(!conv.is_pending());
        assert!(conv.input.is_empty());
    }

    #[tokio::test]
    async fn existing_document_switches_to_refine() {
        let service = ScriptedService::new(vec![
            ok("a: 1\n", true, &[]),
            ok("a: 2\n", false, &["bad a"]),
        ]);
        let mut conv = Conversation::new();

        conv.submit(&service, "make a").await;
        assert_eq!(conv.next_mode(), Mode::Refine);
        conv.submit(&service, "bump a").await;

        let reqs = service.requests();
        assert_eq!(reqs[1], ServiceRequest::refine("bump a", "a: 1\n"));
        assert_eq!(conv.document(), "a: 2\n");
        assert_eq!(
            conv.validation(),
            &ValidationResult {
                valid: false,
                errors: vec!["bad a".into()],
            }
        );
    }

    #[tokio::test]
    async fn blank_text_is_a_noop() {
        let service = ScriptedService::new(vec![]);
        let mut conv = Conversation::new();
        conv.input = "   ".into();

        assert!(!conv.submit(&service, "   \t\n").await);
        assert!(!conv.submit(&service, "").await);

        assert!(conv.transcript().is_empty());
        assert!(conv.document().is_empty());
        assert_eq!(conv.validation(), &ValidationResult::default());
        assert!(!conv.is_pending());
        assert_eq!(conv.input, "   ");
        assert!(service.requests().is_empty());
    }

    #[tokio::test]
    async fn failure_keeps_document_and_validation() {
        let service = ScriptedService::new(vec![
            ok("a: 1\n", false, &["e1"]),
            Err(ServiceError::Status(502)),
        ]);
        let mut conv = Conversation::new();
        conv.submit(&service, "first").await;
        conv.input = "second".into();

        conv.submit(&service, "second").await;

        assert_eq!(conv.document(), "a: 1\n");
        assert_eq!(conv.validation().errors, vec!["e1"]);
        let last_two: Vec<_> = conv.transcript()[2..].to_vec();
        assert_eq!(
            last_two,
            vec![Message::user("second"), Message::system(FAILURE_MESSAGE)]
        );
        assert_eq!(conv.last_failure().map(|e| e.reason()), Some("status"));
        assert!(!conv.is_pending());
        assert!(conv.input.is_empty());
    }

    #[tokio::test]
    async fn success_after_failure_clears_failure_reason() {
        let service = ScriptedService::new(vec![
            Err(ServiceError::Network("refused".into())),
            ok("b: 1\n", true, &[]),
        ]);
        let mut conv = Conversation::new();

        conv.submit(&service, "one").await;
        assert!(conv.last_failure().is_some());
        // Failed generate leaves the document empty, so the retry generates again.
        conv.submit(&service, "two").await;

        assert_eq!(service.requests()[1].mode(), Mode::Generate);
        assert!(conv.last_failure().is_none());
        assert_eq!(conv.document(), "b: 1\n");
    }

    #[test]
    fn pending_only_between_begin_and_resolve() {
        let mut conv = Conversation::new();
        assert!(!conv.is_pending());

        let outcome = conv.begin("hello");
        assert!(matches!(outcome, SubmitOutcome::Dispatched(_)));
        assert!(conv.is_pending());
        assert_eq!(conv.transcript().len(), 1);
        assert_eq!(conv.transcript()[0].origin, Origin::User);

        conv.resolve(Err(ServiceError::Payload("bad".into())));
        assert!(!conv.is_pending());
    }

    #[test]
    fn begin_while_pending_is_rejected_without_side_effects() {
        let mut conv = Conversation::new();
        conv.begin("first");
        conv.input = "second".into();

        assert_eq!(conv.begin("second"), SubmitOutcome::Busy);
        assert_eq!(conv.transcript().len(), 1);
        assert_eq!(conv.input, "second");
        assert!(conv.is_pending());
    }

    #[test]
    fn resolve_while_idle_is_ignored() {
        let mut conv = Conversation::new();
        conv.resolve(ok("x: 1\n", true, &[]));
        assert!(conv.document().is_empty());
        assert!(conv.transcript().is_empty());
    }

    #[test]
    fn user_text_is_recorded_untrimmed() {
        let mut conv = Conversation::new();
        conv.input = "  add redis  ".into();
        let outcome = conv.begin_input();

        assert_eq!(conv.transcript()[0].text, "  add redis  ");
        assert_eq!(
            outcome,
            SubmitOutcome::Dispatched(ServiceRequest::generate("  add redis  "))
        );
    }
}
