//! The conversation client: a three-phase state machine (`Input` →
//! `Chat` → `Result`) over an append-only history, with a busy flag
//! keeping gateway calls strictly sequential.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::config::TriggerConfig;
use crate::error::{CrossroadsError, Result};
use crate::gateway::default_suggested_replies;
use crate::models::{AssistantReply, ChatMessage, OptionPair};

/// Question source the state machine talks to. Implemented in-process by
/// `DecisionGateway` and over the wire by `HttpGateway`.
#[async_trait]
pub trait QuestionGateway: Send + Sync {
    /// One `ask_questions` round: next clarifying question for the
    /// given history.
    async fn ask(&self, options: &OptionPair, history: &[ChatMessage]) -> Result<AssistantReply>;

    /// The single `final_decision` round: synthesize the report from the
    /// full history.
    async fn conclude(
        &self,
        options: &OptionPair,
        history: &[ChatMessage],
    ) -> Result<AssistantReply>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Input,
    Chat,
    Result,
}

/// What a submission amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Dropped without effect: busy, blank input, or wrong phase.
    Ignored,
    /// Another clarifying question, with its suggested replies.
    Question(AssistantReply),
    /// The terminal report, stored verbatim.
    Report(String),
}

struct SessionState {
    phase: Phase,
    options: OptionPair,
    history: Vec<ChatMessage>,
    report: Option<String>,
}

/// One decision session. All state lives in memory and dies with the
/// value; restarting means building a fresh session.
pub struct Session<G> {
    gateway: G,
    trigger: TriggerConfig,
    state: Mutex<SessionState>,
    busy: AtomicBool,
}

/// Releases the in-flight guard on drop, including early error returns.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<G: QuestionGateway> Session<G> {
    pub fn new(gateway: G, trigger: TriggerConfig) -> Self {
        Self {
            gateway,
            trigger,
            state: Mutex::new(SessionState {
                phase: Phase::Input,
                options: OptionPair::default(),
                history: Vec::new(),
                report: None,
            }),
            busy: AtomicBool::new(false),
        }
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn history(&self) -> Vec<ChatMessage> {
        self.lock().history.clone()
    }

    /// The terminal report, verbatim as the gateway returned it.
    pub fn report(&self) -> Option<String> {
        self.lock().report.clone()
    }

    /// `Input → Chat`: requires both options non-empty, then issues the
    /// one opening `ask_questions` call with empty history. Nothing is
    /// committed unless that call succeeds.
    pub async fn begin(&self, opt1: &str, opt2: &str) -> Result<AssistantReply> {
        let _busy = BusyGuard::acquire(&self.busy)
            .ok_or_else(|| CrossroadsError::Validation("session is busy".to_string()))?;

        if self.lock().phase != Phase::Input {
            return Err(CrossroadsError::Validation(
                "session already started".to_string(),
            ));
        }
        if opt1.trim().is_empty() || opt2.trim().is_empty() {
            return Err(CrossroadsError::Validation(
                "both options are required".to_string(),
            ));
        }

        let options = OptionPair::new(opt1.trim(), opt2.trim());
        let reply = with_default_replies(self.gateway.ask(&options, &[]).await?);

        let mut state = self.lock();
        state.options = options;
        state.phase = Phase::Chat;
        state.history.push(ChatMessage::assistant(&reply.text));
        Ok(reply)
    }

    /// One user submission while in `Chat`: free text or a click on a
    /// suggested reply, the machine does not distinguish. While a call
    /// is outstanding further submissions are ignored, not queued.
    pub async fn submit(&self, input: &str) -> Result<Submission> {
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            tracing::debug!("submission ignored: request outstanding");
            return Ok(Submission::Ignored);
        };

        if input.trim().is_empty() {
            return Ok(Submission::Ignored);
        }

        let (options, mut candidate, user_turns) = {
            let state = self.lock();
            if state.phase != Phase::Chat {
                return Ok(Submission::Ignored);
            }
            let user_turns = state.history.iter().filter(|m| m.role == "user").count();
            (state.options.clone(), state.history.clone(), user_turns)
        };
        candidate.push(ChatMessage::user(input));

        if self.concludes(input, user_turns + 1) {
            let reply = self.gateway.conclude(&options, &candidate).await?;
            let mut state = self.lock();
            candidate.push(ChatMessage::assistant(&reply.text));
            state.history = candidate;
            state.phase = Phase::Result;
            state.report = Some(reply.text.clone());
            Ok(Submission::Report(reply.text))
        } else {
            let reply = with_default_replies(self.gateway.ask(&options, &candidate).await?);
            let mut state = self.lock();
            candidate.push(ChatMessage::assistant(&reply.text));
            state.history = candidate;
            Ok(Submission::Question(reply))
        }
    }

    /// `Chat → Result` trigger policy: sentinel match, then keyword,
    /// then user-turn threshold. First hit wins.
    fn concludes(&self, input: &str, user_turns: usize) -> bool {
        if let Some(sentinel) = &self.trigger.sentinel {
            if input == sentinel {
                return true;
            }
        }
        if let Some(keyword) = &self.trigger.keyword {
            if input.to_lowercase().contains(&keyword.to_lowercase()) {
                return true;
            }
        }
        if let Some(max) = self.trigger.max_user_turns {
            if user_turns >= max {
                return true;
            }
        }
        false
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn with_default_replies(mut reply: AssistantReply) -> AssistantReply {
    let missing = reply
        .options
        .as_ref()
        .map(|o| o.is_empty())
        .unwrap_or(true);
    if missing {
        reply.options = Some(default_suggested_replies());
    }
    reply
}
