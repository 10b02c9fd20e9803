use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "zipwalk")]
#[command(version)]
#[command(about = "Stream ZIP archives front to back, from files, pipes or HTTP", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipwalk data1.zip -x joe               extract all files except joe from data1.zip\n  \
  curl -s https://example.com/a.zip | zipwalk -l -   list a ZIP arriving on stdin\n  \
  zipwalk -p https://example.com/book.epub mimetype  print one entry of a remote archive")]
pub struct Cli {
    /// ZIP file path, HTTP URL, or - for standard input
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Files to extract (default: all)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "FILE", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    pub fn is_stdin(&self) -> bool {
        self.file == "-"
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.is_very_quiet() {
            log::LevelFilter::Off
        } else if self.quiet > 0 {
            log::LevelFilter::Error
        } else {
            log::LevelFilter::Warn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unzip_style_flags() {
        let cli = Cli::try_parse_from(["zipwalk", "-l", "-qq", "a.zip", "x.txt"]).unwrap();
        assert!(cli.list);
        assert_eq!(cli.files, ["x.txt"]);
        assert!(cli.is_very_quiet());
        assert_eq!(cli.log_level(), log::LevelFilter::Off);
    }

    #[test]
    fn recognizes_sources() {
        let cli = Cli::try_parse_from(["zipwalk", "-"]).unwrap();
        assert!(cli.is_stdin());
        assert!(!cli.is_http_url());
        let cli = Cli::try_parse_from(["zipwalk", "https://example.com/a.zip"]).unwrap();
        assert!(cli.is_http_url());
        assert_eq!(cli.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn pipe_implies_quiet() {
        let cli = Cli::try_parse_from(["zipwalk", "-p", "a.zip"]).unwrap();
        assert!(cli.is_quiet());
    }
}
