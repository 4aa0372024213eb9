use apitest_core::test_gen::{ParserMode, TestSuiteConfig};
use apitest_core::{BasicAuth, OpenApiSource};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "apitest",
    version,
    about = "Generate and run conformance tests from an OpenAPI document",
    long_about = "apitest turns the examples and x-tests extensions of an OpenAPI document into a Rust test package, runs it, and reports one outcome per generated test."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate, build and run the test suite
    #[command(about = "Run the full pipeline against an API document")]
    Run(RunArgs),

    /// Only write the generated test package
    #[command(about = "Generate the test package without running it")]
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
pub struct SourceArgs {
    /// File path or http(s) URL of the OpenAPI document
    #[arg(help = "OpenAPI document to test against (file path or URL)")]
    pub source: String,

    /// Basic auth username for URL sources
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    /// Basic auth password for URL sources
    #[arg(long, requires = "username")]
    pub password: Option<String>,
}

impl SourceArgs {
    pub fn to_source(&self) -> OpenApiSource {
        let credentials = match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                Some(BasicAuth { username: username.clone(), password: password.clone() })
            }
            _ => None,
        };
        OpenApiSource::parse(&self.source, credentials)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ParserArg {
    Fast,
    Stable,
}

impl From<ParserArg> for ParserMode {
    fn from(arg: ParserArg) -> Self {
        match arg {
            ParserArg::Fast => ParserMode::Fast,
            ParserArg::Stable => ParserMode::Stable,
        }
    }
}

#[derive(Args, Debug)]
pub struct SuiteArgs {
    /// Base URL for live request tests, replacing the document's server
    #[arg(long)]
    pub host: Option<String>,

    /// Run the formatter over the generated sources
    #[arg(long)]
    pub format_output: bool,

    /// Also validate examples against their JSON schema
    #[arg(long)]
    pub validate_schema: bool,

    /// How generated tests decode payloads
    #[arg(long, value_enum)]
    pub parser: Option<ParserArg>,
}

impl SuiteArgs {
    /// Flags win over the configuration file
    pub fn apply(&self, suite: &mut TestSuiteConfig) {
        if let Some(host) = &self.host {
            suite.api_host_override = Some(host.clone());
        }
        suite.format_output |= self.format_output;
        suite.validate_schema |= self.validate_schema;
        if let Some(parser) = self.parser {
            suite.parser_mode = parser.into();
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub suite: SuiteArgs,

    /// Root for per-run working directories
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Where raw logs and archives are written
    #[arg(long)]
    pub archive_dir: Option<PathBuf>,

    /// Zip the generated package before it is removed
    #[arg(long)]
    pub keep_archive: bool,

    /// Kill the suite after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub suite: SuiteArgs,

    /// Directory to write the package into
    #[arg(short, long)]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags() {
        let cli = Cli::parse_from([
            "apitest",
            "-vv",
            "run",
            "https://api.example.com/openapi.yml",
            "--username",
            "ci",
            "--password",
            "secret",
            "--parser",
            "stable",
            "--keep-archive",
        ]);
        assert_eq!(cli.verbose, 2);

        let Commands::Run(args) = cli.command else { panic!("expected run") };
        assert!(args.keep_archive);
        match args.source.to_source() {
            OpenApiSource::Url { credentials: Some(auth), .. } => assert_eq!(auth.username, "ci"),
            other => panic!("unexpected {:?}", other),
        }

        let mut suite = TestSuiteConfig::default();
        args.suite.apply(&mut suite);
        assert_eq!(suite.parser_mode, ParserMode::Stable);
        assert!(!suite.validate_schema);
    }

    #[test]
    fn test_password_requires_username() {
        assert!(Cli::try_parse_from(["apitest", "run", "api.yml", "--password", "x"]).is_err());
    }

    #[test]
    fn test_generate_requires_out() {
        assert!(Cli::try_parse_from(["apitest", "generate", "api.yml"]).is_err());
        let cli = Cli::try_parse_from(["apitest", "generate", "api.yml", "--out", "suite"]).unwrap();
        assert!(matches!(cli.command, Commands::Generate(_)));
    }
}
