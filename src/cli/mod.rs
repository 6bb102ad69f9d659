// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// The entry point for all user interaction. `clap` parses the
// arguments; all the work is delegated to Layer 2.
//
// Three commands are supported:
//   1. `ask`         - answer one question
//   2. `retrieve`    - show which sections would be read
//   3. `interactive` - answer questions from stdin, one per line
//
// Artifacts are loaded once per process, so `interactive` pays
// the model-loading cost only at startup.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use std::io::{self, BufRead, Write};

use commands::{AskArgs, Commands, PipelineArgs, RetrieveArgs};
use crate::application::ask_use_case::AskUseCase;
use crate::application::config::AskConfig;
use crate::domain::answer::Answer;
use crate::domain::document::RetrievedSection;
use crate::domain::traits::QuestionAnswerer;

#[derive(Parser, Debug)]
#[command(
    name = "textbook-qa",
    version = "0.1.0",
    about = "Answer questions from a textbook: retrieve the relevant sections, then extract the answer span."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the right handler. The CLI layer only routes and prints.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Ask(args)         => run_ask(args),
            Commands::Retrieve(args)    => run_retrieve(args),
            Commands::Interactive(args) => run_interactive(args),
        }
    }
}

fn run_ask(args: AskArgs) -> Result<()> {
    let config: AskConfig = args.pipeline.into();
    let use_case = AskUseCase::from_config(&config)?;

    let answer = use_case.answer(&args.question)?;
    let mut out = io::stdout().lock();
    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&answer)?)?;
    } else {
        print_answer(&mut out, &answer)?;
    }
    Ok(())
}

fn run_retrieve(args: RetrieveArgs) -> Result<()> {
    let config: AskConfig = args.pipeline.into();
    let use_case = AskUseCase::from_config(&config)?;

    let sections = use_case.retrieve(&args.question)?;
    print_sections(&mut io::stdout().lock(), &sections)
}

fn run_interactive(args: PipelineArgs) -> Result<()> {
    let config: AskConfig = args.into();
    let use_case = AskUseCase::from_config(&config)?;

    println!("Ask a question about the textbook (type 'exit' or press Ctrl-D to quit).");
    let answered = answer_lines(&use_case, io::stdin().lock(), io::stdout().lock())?;
    tracing::info!("Session ended after {} question(s)", answered);
    Ok(())
}

/// Answer every non-blank line of `input` until EOF or `exit`.
///
/// A failing question is logged and skipped; the loop keeps going.
/// Returns the number of questions answered.
pub fn answer_lines<Q, R, W>(qa: &Q, input: R, mut out: W) -> Result<usize>
where
    Q: QuestionAnswerer,
    R: BufRead,
    W: Write,
{
    let mut answered = 0;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let question = line?;
        let question = question.trim();

        if question.eq_ignore_ascii_case("exit") {
            break;
        }
        if !question.is_empty() {
            match qa.answer(question) {
                Ok(answer) => {
                    print_answer(&mut out, &answer)?;
                    answered += 1;
                }
                Err(e) => tracing::error!("Could not answer '{}': {:#}", question, e),
            }
        }

        write!(out, "> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(answered)
}

fn print_answer(out: &mut impl Write, answer: &Answer) -> Result<()> {
    let (text, section) = answer.as_pair();
    writeln!(out, "\nAnswer: {}", text)?;
    writeln!(out, "\nMost Relevant Section:\n{}\n", section)?;
    Ok(())
}

fn print_sections(out: &mut impl Write, sections: &[RetrievedSection]) -> Result<()> {
    if sections.is_empty() {
        writeln!(out, "No section matched the question.")?;
        return Ok(());
    }
    for (rank, section) in sections.iter().enumerate() {
        writeln!(out, "[{}] section {} (score {:.4})", rank + 1, section.id, section.score)?;
        writeln!(out, "{}\n", section.text)?;
    }
    Ok(())
}
