use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "zipgrab")]
#[command(version)]
#[command(about = "Extract a single entry from a ZIP archive with atomic replace", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipgrab app.apk assets/manager.apk /tmp/manager.apk   extract one entry\n  \
  zipgrab app.apk assets/manager.apk                    extract next to the current directory\n  \
  zipgrab -l app.apk                                    list archive entries")]
pub struct Cli {
    /// ZIP archive to read
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Entry name inside the archive (exact, case-sensitive)
    #[arg(value_name = "ENTRY", required_unless_present_any = ["list", "verbose"])]
    pub entry: Option<String>,

    /// Destination path (default: entry base name in the current directory)
    #[arg(value_name = "DEST")]
    pub dest: Option<PathBuf>,

    /// List entries (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }
}
