use std::fmt;

/// Phases of a download, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CacheCheck,
    DirectoryCheck,
    CreateDirectory,
    Fetch,
    CreateFile,
    Copy,
}

/// How a phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Yes,
    No,
    Done,
    Error,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Step::CacheCheck => "Previously downloaded?",
            Step::DirectoryCheck => "Download directory exists?",
            Step::CreateDirectory => "Creating download directory",
            Step::Fetch => "Downloading file",
            Step::CreateFile => "Creating destination file",
            Step::Copy => "Copying downloaded file",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Outcome::Yes => "yes",
            Outcome::No => "no",
            Outcome::Done => "done",
            Outcome::Error => "error",
        };
        f.write_str(text)
    }
}

/// Observer notified at each phase boundary of a download.
pub trait Reporter {
    fn start(&self, _step: Step) {}
    fn finish(&self, _step: Step, _outcome: Outcome) {}
}

/// Prints `Label... outcome` lines to stdout.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn start(&self, step: Step) {
        use std::io::Write;
        print!("{}...", step.label());
        let _ = std::io::stdout().flush();
    }

    fn finish(&self, _step: Step, outcome: Outcome) {
        println!(" {outcome}");
    }
}

pub struct SilentReporter;

impl Reporter for SilentReporter {}
