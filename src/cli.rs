use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "checkzip")]
#[command(version)]
#[command(about = "A Rust ZIP archive verifier", long_about = None)]
#[command(after_help = "Examples:\n  \
  checkzip data1.zip                  verify every member of data1.zip\n  \
  checkzip -l data1.zip               list member names\n  \
  checkzip --source ./tree out.zip    compare member names against ./tree\n  \
  checkzip --codepage 866 old.zip     decode legacy member names as CP866")]
pub struct Cli {
    /// ZIP file path
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Verify only these members (default: all)
    #[arg(value_name = "NAMES")]
    pub names: Vec<String>,

    /// List member names (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely with sizes, ratio and timestamps
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Compare member names against this source tree
    #[arg(long = "source", value_name = "DIR")]
    pub source: Option<String>,

    /// Codepage for member names stored without the UTF-8 flag
    #[arg(long = "codepage", value_name = "ID")]
    pub codepage: Option<u16>,

    /// Assert that this member is NOT in the archive
    #[arg(long = "expect-absent", value_name = "NAME", num_args = 1..)]
    pub expect_absent: Vec<String>,

    /// Quiet mode: print only the summary
    #[arg(short = 'q')]
    pub quiet: bool,
}
