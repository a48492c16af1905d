//! Refinement Session: targeted yes/no/unsure questioning.
//!
//! A [`RefinementRound`] is an explicit state machine:
//!
//! ```text
//! Idle ──next_question──▶ Asking ──answer──▶ Asking … ──▶ Done(Exhausted | BudgetReached)
//!                           │
//!                           ├──answer(Quit)──▶ Done(Quit)
//!                           └──source ran dry──▶ Done(InputExhausted)
//! ```
//!
//! For each candidate disease, in insertion order, the round asks about the
//! disease's symptoms that are neither matched for it nor already answered
//! in this session, in lexicographic order. A `yes` confirms the symptom for
//! the rest of the session; `no` and `unsure` are recorded as declined and
//! the symptom is never asked again. The round stops after `max_questions`
//! answers, when nothing is left to ask, or immediately on `quit`.
//!
//! Rounds can be driven push-style (`next_question` / `answer`) or handed an
//! [`AnswerSource`] via [`RefinementRound::run`].

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::candidates::CandidateSet;
use crate::graph::KnowledgeGraph;

/// Default question budget per round.
pub const DEFAULT_MAX_QUESTIONS: usize = 10;

/// Refinement tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineConfig {
    /// Maximum questions asked per round.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
}

fn default_max_questions() -> usize {
    DEFAULT_MAX_QUESTIONS
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
        }
    }
}

/// A user's answer to one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
    Unsure,
    Quit,
}

impl Answer {
    /// Parse one of the four recognized tokens, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "yes" => Some(Answer::Yes),
            "no" => Some(Answer::No),
            "unsure" => Some(Answer::Unsure),
            "quit" => Some(Answer::Quit),
            _ => None,
        }
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Answer::Yes => write!(f, "yes"),
            Answer::No => write!(f, "no"),
            Answer::Unsure => write!(f, "unsure"),
            Answer::Quit => write!(f, "quit"),
        }
    }
}

/// A pending question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// The candidate disease whose symptom is being checked.
    pub disease: String,
    pub symptom: String,
    /// 1-based position within the round.
    pub number: usize,
}

impl Question {
    pub fn prompt(&self) -> String {
        format!(
            "Do you experience {}? (yes/no/unsure) or type 'quit' to exit: ",
            self.symptom
        )
    }
}

/// Supplies answers to refinement questions.
///
/// Implementations own re-prompting: anything other than the four
/// recognized answers must be retried before returning. `None` means the
/// source has no answers left; the round ends without a quit and may still
/// be scored.
pub trait AnswerSource {
    fn ask(&mut self, question: &Question) -> Option<Answer>;
}

/// Session-scoped record of answered symptoms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnswerLog {
    /// Symptoms the user affirmed.
    pub confirmed: BTreeSet<String>,
    /// Symptoms answered `no` or `unsure`.
    pub declined: BTreeSet<String>,
}

impl AnswerLog {
    pub fn is_answered(&self, symptom: &str) -> bool {
        self.confirmed.contains(symptom) || self.declined.contains(symptom)
    }

    pub fn clear(&mut self) {
        self.confirmed.clear();
        self.declined.clear();
    }
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEnd {
    /// Every candidate's remaining symptoms were asked.
    Exhausted,
    /// The question budget ran out.
    BudgetReached,
    /// The user quit. No scoring should follow.
    Quit,
    /// The answer source ran out before the round finished.
    InputExhausted,
}

/// Current state of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundState {
    Idle,
    Asking(Question),
    Done(RoundEnd),
}

/// Summary of a finished (or abandoned) round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundOutcome {
    /// Questions answered in this round.
    pub asked: usize,
    /// Symptoms confirmed during this round, in the order confirmed.
    pub confirmed: Vec<String>,
    pub end: RoundEnd,
}

impl RoundOutcome {
    pub fn quit(&self) -> bool {
        self.end == RoundEnd::Quit
    }
}

/// One refinement round over a fixed candidate set.
pub struct RefinementRound<'a> {
    graph: &'a KnowledgeGraph,
    candidates: &'a CandidateSet,
    log: &'a mut AnswerLog,
    max_questions: usize,
    next_disease: usize,
    current_disease: Option<String>,
    queue: VecDeque<String>,
    state: RoundState,
    asked: usize,
    confirmed: Vec<String>,
}

impl<'a> RefinementRound<'a> {
    pub fn new(
        graph: &'a KnowledgeGraph,
        candidates: &'a CandidateSet,
        log: &'a mut AnswerLog,
        config: &RefineConfig,
    ) -> Self {
        Self {
            graph,
            candidates,
            log,
            max_questions: config.max_questions,
            next_disease: 0,
            current_disease: None,
            queue: VecDeque::new(),
            state: RoundState::Idle,
            asked: 0,
            confirmed: Vec::new(),
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn asked(&self) -> usize {
        self.asked
    }

    /// Advance to the next question, or to `Done`.
    ///
    /// Returns the pending question. Calling again without answering
    /// returns the same question.
    pub fn next_question(&mut self) -> Option<&Question> {
        if matches!(self.state, RoundState::Idle) {
            self.advance();
        }
        match &self.state {
            RoundState::Asking(q) => Some(q),
            _ => None,
        }
    }

    /// Record the answer to the pending question.
    ///
    /// Has no effect unless a question is pending.
    pub fn answer(&mut self, answer: Answer) -> &RoundState {
        let RoundState::Asking(question) = &self.state else {
            return &self.state;
        };
        let symptom = question.symptom.clone();
        tracing::debug!(
            disease = %question.disease,
            symptom = %symptom,
            %answer,
            "refinement answer"
        );

        match answer {
            Answer::Quit => {
                self.state = RoundState::Done(RoundEnd::Quit);
                return &self.state;
            }
            Answer::Yes => {
                if self.log.confirmed.insert(symptom.clone()) {
                    self.confirmed.push(symptom);
                }
            }
            Answer::No | Answer::Unsure => {
                self.log.declined.insert(symptom);
            }
        }

        self.asked += 1;
        if self.asked >= self.max_questions {
            self.state = RoundState::Done(RoundEnd::BudgetReached);
        } else {
            self.advance();
        }
        &self.state
    }

    /// Move to the next unanswered symptom, opening diseases as needed.
    fn advance(&mut self) {
        if self.asked >= self.max_questions {
            self.state = RoundState::Done(RoundEnd::BudgetReached);
            return;
        }
        loop {
            if let Some(symptom) = self.queue.pop_front() {
                // A shared symptom may have been answered under another disease.
                if self.log.is_answered(&symptom) {
                    continue;
                }
                let disease = self.current_disease.clone().unwrap_or_default();
                self.state = RoundState::Asking(Question {
                    disease,
                    symptom,
                    number: self.asked + 1,
                });
                return;
            }

            let Some((disease, matched)) = self.candidates.get_index(self.next_disease) else {
                self.state = RoundState::Done(RoundEnd::Exhausted);
                return;
            };
            self.next_disease += 1;

            let remaining: Vec<String> = self
                .graph
                .symptoms_of(disease)
                .into_iter()
                .filter(|s| !matched.contains(*s) && !self.log.is_answered(s))
                .map(str::to_string)
                .collect();
            if remaining.is_empty() {
                tracing::debug!(disease, "no remaining symptoms, skipping");
                continue;
            }
            self.current_disease = Some(disease.to_string());
            self.queue = remaining.into();
        }
    }

    /// Drive the round to completion with an answer source.
    pub fn run(mut self, source: &mut dyn AnswerSource) -> RoundOutcome {
        while let Some(question) = self.next_question() {
            let question = question.clone();
            match source.ask(&question) {
                Some(answer) => {
                    self.answer(answer);
                }
                None => {
                    tracing::debug!(symptom = %question.symptom, "answer source exhausted");
                    self.state = RoundState::Done(RoundEnd::InputExhausted);
                }
            }
        }
        self.finish()
    }

    /// Consume the round and summarize it.
    ///
    /// A round abandoned before reaching `Done` reports `Exhausted`; an
    /// unanswered pending question is dropped.
    pub fn finish(self) -> RoundOutcome {
        let end = match self.state {
            RoundState::Done(end) => end,
            RoundState::Idle | RoundState::Asking(_) => RoundEnd::Exhausted,
        };
        tracing::info!(
            asked = self.asked,
            confirmed = self.confirmed.len(),
            end = ?end,
            "refinement round finished"
        );
        RoundOutcome {
            asked: self.asked,
            confirmed: self.confirmed,
            end,
        }
    }
}

/// Answers from a fixed script, for tests and non-interactive runs.
///
/// Unrecognized entries are skipped, as a console would re-prompt past
/// them. When the script runs out the source reports exhaustion, which
/// ends the round without quitting.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAnswers {
    script: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedAnswers {
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: script.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Symptoms asked about, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl AnswerSource for ScriptedAnswers {
    fn ask(&mut self, question: &Question) -> Option<Answer> {
        self.asked.push(question.symptom.clone());
        while let Some(raw) = self.script.pop_front() {
            if let Some(answer) = Answer::parse(&raw) {
                return Some(answer);
            }
            tracing::debug!(input = %raw, "skipping unrecognized scripted answer");
        }
        None
    }
}
