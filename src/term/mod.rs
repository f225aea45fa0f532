// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Decorative command console.
//!
//! A novelty overlay with static informational commands; nothing here has
//! any functional effect on documents. Supports input history, prefix
//! completion, and a closest-match suggestion for unknown commands.

pub const COMMAND_NAMES: &[&str] = &[
    "help", "about", "version", "features", "contact", "support", "docs", "feedback", "report",
    "echo", "ls", "cat", "pwd", "whoami", "date", "clear", "exit",
];

const PROMPT: &str = "halimede:~$";
const SUGGESTION_THRESHOLD: f64 = 60.0;

/// What the host UI should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleOutcome {
    Output,
    Clear,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    None,
    Single(String),
    Multiple(Vec<&'static str>),
}

#[derive(Debug, Clone, Default)]
pub struct Console {
    transcript: Vec<String>,
    history: Vec<String>,
    history_cursor: Option<usize>,
}

impl Console {
    pub fn new() -> Self {
        let mut console = Self::default();
        console.transcript.push(format!("{PROMPT} Welcome to the Halimede console"));
        console
            .transcript
            .push("Type 'help' for available commands".to_owned());
        console.transcript.push(String::new());
        console
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Runs one input line, appending the echo and output to the transcript.
    pub fn execute(&mut self, line: &str) -> ConsoleOutcome {
        let line = line.trim();
        if line.is_empty() {
            return ConsoleOutcome::Output;
        }
        self.history.push(line.to_owned());
        self.history_cursor = None;
        self.transcript.push(format!("{PROMPT} {line}"));

        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match name {
            "clear" => {
                self.transcript.clear();
                return ConsoleOutcome::Clear;
            }
            "exit" => return ConsoleOutcome::Exit,
            _ => {}
        }

        let output = dispatch(name, &args);
        match output {
            Some(lines) => self.transcript.extend(lines),
            None => {
                self.transcript
                    .push(format!("{name}: command not found"));
                if let Some(suggestion) = suggest(name) {
                    self.transcript
                        .push(format!("did you mean '{suggestion}'?"));
                }
            }
        }
        self.transcript.push(String::new());
        ConsoleOutcome::Output
    }

    /// Moves back through input history; returns the line to show.
    pub fn history_previous(&mut self) -> Option<&str> {
        if self.history.is_empty() {
            return None;
        }
        let next = match self.history_cursor {
            None => self.history.len() - 1,
            Some(0) => 0,
            Some(cursor) => cursor - 1,
        };
        self.history_cursor = Some(next);
        self.history.get(next).map(String::as_str)
    }

    /// Moves forward through input history; `None` means back to a blank
    /// input line.
    pub fn history_next(&mut self) -> Option<&str> {
        let cursor = self.history_cursor?;
        if cursor + 1 >= self.history.len() {
            self.history_cursor = None;
            return None;
        }
        self.history_cursor = Some(cursor + 1);
        self.history.get(cursor + 1).map(String::as_str)
    }
}

/// Prefix completion over command names.
pub fn complete(prefix: &str) -> Completion {
    let matches: Vec<&'static str> = COMMAND_NAMES
        .iter()
        .copied()
        .filter(|name| name.starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [] => Completion::None,
        [only] => Completion::Single((*only).to_owned()),
        _ => Completion::Multiple(matches),
    }
}

/// Closest known command to a mistyped name.
pub fn suggest(name: &str) -> Option<&'static str> {
    let mut best: Option<(f64, &'static str)> = None;
    for candidate in COMMAND_NAMES {
        let ratio = rapidfuzz::fuzz::ratio(name.chars(), candidate.chars());
        if ratio >= SUGGESTION_THRESHOLD && best.map_or(true, |(score, _)| ratio > score) {
            best = Some((ratio, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}

fn dispatch(name: &str, args: &[&str]) -> Option<Vec<String>> {
    let lines: Vec<String> = match name {
        "help" => text_lines(
            "Available commands:\n\
             \n\
             system:\n\
             \x20 help          show this help\n\
             \x20 clear         clear the console\n\
             \x20 pwd           show the console path\n\
             \x20 ls            list bundled resources\n\
             \x20 cat <file>    print a bundled file\n\
             \x20 echo <text>   print text\n\
             \x20 date          show the current time\n\
             \x20 whoami        show the current user\n\
             \x20 version       show the editor version\n\
             \x20 exit          close the console\n\
             \n\
             human contact:\n\
             \x20 contact       how to reach support\n\
             \x20 support       common issues and fixes\n\
             \x20 feedback      where to send suggestions\n\
             \x20 report        where to report bugs\n\
             \n\
             information:\n\
             \x20 about         about Halimede\n\
             \x20 features      what this editor can do\n\
             \x20 docs          where the documentation lives\n\
             \n\
             tips: Tab completes, Up/Down cycle history, Esc closes",
        ),
        "about" => text_lines(
            "Halimede — terminal-first HTML editor\n\
             \n\
             \x20 • source pane with live text preview\n\
             \x20 • select-and-edit elements in the preview\n\
             \x20 • folder ingestion with a project tree\n\
             \x20 • GitHub and Netlify publish targets\n\
             \x20 • persistent workspace layout",
        ),
        "version" => text_lines(concat!(
            "Halimede v",
            env!("CARGO_PKG_VERSION"),
            "\n targets: GitHub contents API, Netlify deploy API"
        )),
        "features" => text_lines(
            "core:\n\
             \x20 • source editing with modification tracking\n\
             \x20 • deterministic text preview with element index\n\
             visual editing:\n\
             \x20 • cycle and select rendered elements\n\
             \x20 • edit content in place, reconciled into the source\n\
             projects:\n\
             \x20 • folder ingestion, text/binary split, 10 MiB cap\n\
             deployment:\n\
             \x20 • GitHub create-or-update publishing\n\
             \x20 • Netlify ZIP and digest deploys with status polling\n\
             \x20 • auto-deploy on save, per-target history",
        ),
        "contact" => text_lines(
            "issues:  https://github.com/bnomei/halimede/issues\n\
             please include steps to reproduce and your terminal/OS",
        ),
        "support" => text_lines(
            "common issues:\n\
             \x20 • files won't load: check the 10 MiB limit and extension\n\
             \x20 • GitHub errors: token needs repo scope; check branch\n\
             \x20 • Netlify timeouts: try the ZIP method\n\
             still stuck? type 'contact'",
        ),
        "docs" => text_lines("documentation: https://docs.rs/halimede"),
        "feedback" => text_lines(
            "suggestions are welcome at https://github.com/bnomei/halimede/issues",
        ),
        "report" => text_lines(
            "found a bug? https://github.com/bnomei/halimede/issues/new\n\
             include the document that triggers it when possible",
        ),
        "echo" => vec![args.join(" ")],
        "ls" => text_lines(
            "README.md       project documentation\n\
             dom/            span-annotated HTML parsing\n\
             edit/           visual-edit reconciliation\n\
             preview/        text preview rendering\n\
             ingest/         file and folder ingestion\n\
             publish/        GitHub and Netlify targets\n\
             store/          persisted local state\n\
             tui/            the shell you are looking at",
        ),
        "cat" => match args.first() {
            None => vec!["usage: cat <file>".to_owned()],
            Some(&"README.md") => {
                vec!["Halimede — a terminal-first HTML editor with live preview".to_owned()]
            }
            Some(&"version") => vec![concat!("Halimede v", env!("CARGO_PKG_VERSION")).to_owned()],
            Some(other) => vec![format!("cat: {other}: No such file or directory")],
        },
        "pwd" => vec!["/halimede".to_owned()],
        "whoami" => vec!["halimede-user".to_owned()],
        "date" => {
            let seconds = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or(0);
            vec![format!("unix time: {seconds}")]
        }
        _ => return None,
    };
    Some(lines)
}

fn text_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_owned).collect()
}
