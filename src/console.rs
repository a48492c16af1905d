//! Line-oriented console: the interactive collaborator and the chat loop.
//!
//! Generic over `BufRead`/`Write` so tests drive it with in-memory buffers.

use std::io::{self, BufRead, Write};

use crate::extract::SymptomExtractor;
use crate::normalize::capitalize;
use crate::refine::{Answer, AnswerSource, Question, RoundEnd};
use crate::session::DiagnosisSession;

const DISCLAIMER: &str = "Welcome to the diagnosis assistant.\n\
    DISCLAIMER: This tool is for informational purposes only and is not a substitute \
    for professional medical advice, diagnosis, or treatment.";

const DESCRIBE_PROMPT: &str = "\nPlease describe your symptoms (or type 'quit' to exit, \
    'add' to add more symptoms, 'list' to show current symptoms, 'reset' to start over): ";

const CONTINUE_PROMPT: &str = "\nDo you want to continue the diagnosis process? (yes/no): ";

const INVALID_ANSWER: &str = "Invalid input. Please enter 'yes', 'no', 'unsure', or 'quit'.";

/// A prompt/response console over any reader and writer.
pub struct Console<R, W> {
    input: R,
    output: W,
    /// Disease whose header was printed last in this round.
    current_disease: Option<String>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            current_disease: None,
        }
    }

    /// Print a prompt and read one line. `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Print a line.
    pub fn say(&mut self, text: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    /// Ask a yes/no question until answered. `None` at end of input.
    pub fn confirm(&mut self, prompt: &str) -> io::Result<Option<bool>> {
        loop {
            let Some(line) = self.read_line(prompt)? else {
                return Ok(None);
            };
            match line.to_lowercase().as_str() {
                "yes" | "y" => return Ok(Some(true)),
                "no" | "n" => return Ok(Some(false)),
                _ => self.say("Please answer 'yes' or 'no'.")?,
            }
        }
    }

    /// Forget the last printed disease header.
    pub fn begin_round(&mut self) {
        self.current_disease = None;
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// End of input counts as `quit`.
    fn ask_io(&mut self, question: &Question) -> io::Result<Answer> {
        if self.current_disease.as_deref() != Some(question.disease.as_str()) {
            writeln!(
                self.output,
                "\nChecking symptoms for {}:",
                capitalize(&question.disease)
            )?;
            self.current_disease = Some(question.disease.clone());
        }
        loop {
            let Some(line) = self.read_line(&question.prompt())? else {
                return Ok(Answer::Quit);
            };
            match Answer::parse(&line) {
                Some(answer) => return Ok(answer),
                None => self.say(INVALID_ANSWER)?,
            }
        }
    }
}

impl<R: BufRead, W: Write> AnswerSource for Console<R, W> {
    fn ask(&mut self, question: &Question) -> Option<Answer> {
        let answer = self.ask_io(question).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "console I/O failed, treating as quit");
            Answer::Quit
        });
        Some(answer)
    }
}

/// How a chat ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEnd {
    /// The user typed `quit` (or input ended).
    Quit,
    /// The user quit in the middle of a refinement round.
    QuitDuringRefinement,
}

/// Runs the full conversational loop over a session.
pub struct ChatDriver<'a, R, W> {
    session: DiagnosisSession,
    extractor: &'a dyn SymptomExtractor,
    console: Console<R, W>,
}

impl<'a, R: BufRead, W: Write> ChatDriver<'a, R, W> {
    pub fn new(
        session: DiagnosisSession,
        extractor: &'a dyn SymptomExtractor,
        console: Console<R, W>,
    ) -> Self {
        Self {
            session,
            extractor,
            console,
        }
    }

    pub fn session(&self) -> &DiagnosisSession {
        &self.session
    }

    pub fn into_parts(self) -> (DiagnosisSession, Console<R, W>) {
        (self.session, self.console)
    }

    /// Run until the user quits or input ends.
    pub fn run(&mut self) -> io::Result<ChatEnd> {
        self.console.say(DISCLAIMER)?;

        let end = loop {
            let Some(line) = self.console.read_line(DESCRIBE_PROMPT)? else {
                break ChatEnd::Quit;
            };
            match line.to_lowercase().as_str() {
                "quit" => break ChatEnd::Quit,
                "" => continue,
                "add" => {
                    self.console.say("Please describe your additional symptoms.")?;
                    continue;
                }
                "list" => {
                    self.list_symptoms()?;
                    continue;
                }
                "reset" => {
                    self.session.reset();
                    self.console.say("Session reset. Let's start over.")?;
                    continue;
                }
                _ => {}
            }

            if let Some(end) = self.handle_description(&line)? {
                break end;
            }
        };

        match end {
            ChatEnd::Quit => self.console.say("\nThank you for using the diagnosis assistant. Take care!")?,
            ChatEnd::QuitDuringRefinement => self.console.say("\nExiting the diagnosis process.")?,
        }
        Ok(end)
    }

    fn list_symptoms(&mut self) -> io::Result<()> {
        if self.session.all_symptoms().is_empty() {
            return self.console.say("No symptoms recorded yet.");
        }
        let listed = self.session.all_symptoms().join(", ");
        self.console.say(format!("Current symptoms: {listed}"))
    }

    /// Process one description. Returns how the chat ends, if it does.
    fn handle_description(&mut self, text: &str) -> io::Result<Option<ChatEnd>> {
        let detected = self.session.describe(text, self.extractor);
        if detected.is_empty() {
            self.console.say("\nNo symptoms detected in that description.")?;
        } else {
            self.console.say("\nDetected Symptoms:")?;
            for symptom in self.session.all_symptoms() {
                self.console.say(format!("- {symptom}"))?;
            }
        }

        if self.session.potential_diseases().is_empty() {
            self.console
                .say("\nNo potential diseases found based on the given symptoms.")?;
            return Ok(None);
        }
        self.console.say("\nPotential diseases based on initial symptoms:")?;
        for disease in self.session.potential_diseases().diseases() {
            self.console.say(format!("- {}", capitalize(disease)))?;
        }

        loop {
            self.console.begin_round();
            let outcome = self.session.refine(&mut self.console);
            if outcome.quit() {
                return Ok(Some(ChatEnd::QuitDuringRefinement));
            }

            self.session.diagnose();
            let report = self.session.report();
            self.console.say("")?;
            self.console.say(&report)?;

            if outcome.end == RoundEnd::Exhausted && outcome.asked == 0 {
                self.console.say("No further symptoms to check.")?;
                return Ok(None);
            }
            match self.console.confirm(CONTINUE_PROMPT)? {
                Some(true) => continue,
                Some(false) => return Ok(None),
                // Input ended after a scored round.
                None => return Ok(Some(ChatEnd::Quit)),
            }
        }
    }
}
