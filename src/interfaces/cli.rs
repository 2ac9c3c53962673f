use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "copilot")]
#[command(about = "Multilingual conversational front-end for utility grid analytics.")]
#[command(version)]
pub struct Cli {
    /// Language the query is written in, or `auto` [default: en; auto for --transcribe]
    #[arg(short = 'l', long)]
    pub language: Option<String>,

    /// Caller role checked against each intent's allow-list
    #[arg(short = 'r', long)]
    pub role: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Synthesize speech for TEXT instead of answering a query
    #[arg(long, value_name = "TEXT")]
    pub speak: Option<String>,

    /// Where `--speak` writes its audio
    #[arg(short = 'o', long, default_value = "speech.wav")]
    pub output: PathBuf,

    /// Transcribe an audio file instead of answering a query
    #[arg(long, value_name = "FILE")]
    pub transcribe: Option<PathBuf>,

    /// Generate config sample
    #[arg(long)]
    pub generate_config: bool,

    /// Show configured engines and services
    #[arg(long)]
    pub status: bool,

    /// Query text
    #[arg(num_args = 1..)]
    pub query: Vec<String>,
}

impl Cli {
    pub fn query_text(&self) -> Option<String> {
        let text = self.query.join(" ");
        (!text.trim().is_empty()).then_some(text)
    }

    /// Language of typed text: the query or `--speak` input.
    pub fn text_language(&self) -> &str {
        self.language.as_deref().unwrap_or("en")
    }

    /// Language hint for `--transcribe`. Unset or `auto` leaves detection
    /// to the engine.
    pub fn transcription_language(&self) -> Option<String> {
        self.language
            .as_deref()
            .filter(|l| !l.eq_ignore_ascii_case("auto"))
            .map(str::to_string)
    }
}
