use std::io::{self, IsTerminal, Read};

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "doc-translator-rust",
    version,
    about = "Translate documents paragraph by paragraph with Azure Translator"
)]
struct Cli {
    /// Target language (default: pt-br)
    #[arg(short = 'l', long = "lang", default_value = "pt-br")]
    lang: String,

    /// Source language (default: from settings, usually en)
    #[arg(short = 'L', long = "source-lang")]
    source_lang: Option<String>,

    /// Document to translate (docx/txt/md). Reads text from stdin when omitted.
    #[arg(short = 'd', long = "data")]
    data: Option<String>,

    /// Output path (default: <stem>_<lang>.<ext> beside the input)
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Subscription key (overrides AZURE_TRANSLATOR_KEY)
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    doc_translator_rust::logging::init(cli.verbose)?;

    let input = if cli.data.is_some() || io::stdin().is_terminal() {
        None
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Some(buffer)
    };

    let output = doc_translator_rust::run(
        doc_translator_rust::Config {
            lang: cli.lang,
            source_lang: cli.source_lang,
            key: cli.key,
            data: cli.data,
            output: cli.output,
            settings_path: cli.read_settings,
        },
        input,
    )
    .await?;

    println!("{}", output);
    Ok(())
}
