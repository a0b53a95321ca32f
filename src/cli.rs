use crate::output_formats::ReportFormat;
use crate::search::SearchMode;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(long, value_parser, default_value_t = false, global = true)]
    pub verbose: bool,

    #[clap(long, value_parser, global = true)]
    pub log: Option<PathBuf>,

    /// Config file to use instead of the default locations
    #[clap(long, value_parser, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search a directory tree and write reports
    Search {
        pattern: String,

        #[clap(default_value = ".")]
        path: PathBuf,

        #[clap(long, value_enum)]
        mode: Option<SearchMode>,

        #[clap(short, long, value_parser, default_value_t = false)]
        ignore_case: bool,

        /// File-name suffixes to search, e.g. `.html,.hbs`
        #[clap(long, value_parser, value_delimiter = ',')]
        extensions: Option<Vec<String>>,

        #[clap(long, value_enum, value_delimiter = ',')]
        format: Option<Vec<ReportFormat>>,

        #[clap(long, value_parser)]
        output_dir: Option<PathBuf>,

        #[clap(long, value_parser, default_value_t = false)]
        no_report: bool,

        #[clap(long, value_parser, default_value_t = false)]
        no_history: bool,

        /// Add each match's last author (`git blame`) to Markdown and HTML reports
        #[clap(long, value_parser, default_value_t = false)]
        blame: bool,

        #[clap(long, value_parser, default_value_t = false)]
        follow_links: bool,

        #[clap(long, value_parser, default_value_t = false)]
        skip_binary: bool,

        /// Skip files larger than this many MB
        #[clap(long, value_parser)]
        max_size: Option<u64>,

        #[clap(long, value_parser)]
        threads: Option<usize>,

        /// Matches to print to the terminal
        #[clap(long, value_parser)]
        limit: Option<usize>,
    },
    /// Show or clear previous searches
    History {
        #[clap(long, value_parser, default_value_t = false)]
        clear: bool,
    },
    /// Re-run a previous search by its number in `history`
    Replay {
        index: usize,

        #[clap(long, value_parser, default_value_t = false)]
        no_report: bool,
    },
    /// Prompt for the search parameters
    Interactive,
    /// Generate shell completions
    Completions {
        #[clap(value_enum)]
        shell: Shell,
    },
}
