//! Command-line configuration

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_DATA_DIR: &str = ".pulseread";

#[derive(Parser, Debug)]
#[command(name = "pulseread")]
#[command(version, about = "Terminal speed reader (one word at a time)", long_about = None)]
#[command(after_help = "EXAMPLES:
    pulseread                     Open the library
    pulseread notes.txt           Import and start reading a file
    pulseread book.pdf --wpm 450  Import a PDF (needs the `pdf` feature)")]
pub struct Cli {
    /// Document to import and open (plain text, or PDF with the `pdf` feature)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Reading speed in words per minute (100-1500), overrides the saved speed
    #[arg(short, long)]
    pub wpm: Option<u32>,

    /// Directory holding the library, progress, settings and logs
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,
}

impl Cli {
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_arguments() {
        let cli = Cli::try_parse_from(["pulseread"]).unwrap();
        assert!(cli.file.is_none());
        assert!(cli.wpm.is_none());
        assert_eq!(cli.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(cli.log_dir(), PathBuf::from(DEFAULT_DATA_DIR).join("logs"));
    }

    #[test]
    fn parses_file_speed_and_data_dir() {
        let cli = Cli::try_parse_from(["pulseread", "book.txt", "--wpm", "450", "-d", "/tmp/pr"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("book.txt")));
        assert_eq!(cli.wpm, Some(450));
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/pr"));
    }

    #[test]
    fn rejects_non_numeric_speed() {
        assert!(Cli::try_parse_from(["pulseread", "--wpm", "fast"]).is_err());
    }
}
