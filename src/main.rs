use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use colloquy::{
    DiarizationConfig, ExportFormat, FfmpegAudioSource, HttpDiarizationClient,
    HttpRecognitionClient, KeywordStrategy, Language, Pipeline, RecognitionConfig, RunOptions,
    RunOutcome, formats,
};

#[derive(Parser)]
#[command(name = "colloquy")]
#[command(author, version, about = "Speaker-attributed transcript assembly pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one media file into an annotated transcript
    Process {
        /// Input media file (video or audio)
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        options: ProcessArgs,
    },

    /// Process every supported media file in a directory
    Batch {
        /// Directory containing media files
        #[arg(short, long)]
        dir: PathBuf,

        #[command(flatten)]
        options: ProcessArgs,
    },
}

#[derive(clap::Args)]
struct ProcessArgs {
    /// Language code (en, ru, zh)
    #[arg(short, long, default_value = "en")]
    language: String,

    /// Expected number of speakers
    #[arg(long)]
    speakers: Option<u32>,

    /// Keyword extraction strategy (tfidf or textrank)
    #[arg(long, default_value = "tfidf")]
    keyword_strategy: String,

    /// Number of top keywords to extract (0 disables)
    #[arg(long, default_value = "10")]
    top_keywords: usize,

    /// Export formats (json, csv, txt, plain)
    #[arg(long, value_delimiter = ',', default_value = "json,txt")]
    formats: Vec<String>,

    /// Directory for output files
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl ProcessArgs {
    /// Parse string arguments into typed run options; unknown names fail
    /// here, before anything runs.
    fn to_run_options(&self) -> Result<RunOptions> {
        let language: Language = self.language.parse()?;
        let keyword_strategy: KeywordStrategy = self.keyword_strategy.parse()?;
        let formats: Vec<ExportFormat> = self
            .formats
            .iter()
            .map(|f| f.parse())
            .collect::<Result<_, _>>()?;

        Ok(RunOptions {
            language,
            speaker_hint: self.speakers,
            keyword_strategy,
            top_keywords: self.top_keywords,
            formats,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process { input, options } => {
            setup_logging(options.verbose);
            let run_options = options.to_run_options()?;
            let pipeline = build_pipeline(&options.output_dir)?;

            let outcome = pipeline.run(&input, &run_options).await?;
            print_summary(&input, &outcome);
            Ok(())
        }
        Commands::Batch { dir, options } => {
            setup_logging(options.verbose);
            let run_options = options.to_run_options()?;
            let pipeline = build_pipeline(&options.output_dir)?;

            let inputs = discover_media(&dir)?;
            if inputs.is_empty() {
                anyhow::bail!("No supported media files found in {:?}", dir);
            }
            info!("Found {} media files in {:?}", inputs.len(), dir);

            let results = pipeline.run_batch(&inputs, &run_options).await;
            let mut failures = 0;
            for (input, result) in &results {
                match result {
                    Ok(outcome) => print_summary(input, outcome),
                    Err(err) => {
                        failures += 1;
                        eprintln!("FAILED {:?}: {err}", input);
                    }
                }
            }
            if failures > 0 {
                anyhow::bail!("{failures}/{} files failed", results.len());
            }
            Ok(())
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn build_pipeline(
    output_dir: &PathBuf,
) -> Result<Pipeline<FfmpegAudioSource, HttpDiarizationClient, HttpRecognitionClient>> {
    let diarization_config =
        DiarizationConfig::from_env().context("Diarization provider not configured")?;

    Ok(Pipeline::new(
        FfmpegAudioSource::default(),
        HttpDiarizationClient::new(diarization_config),
        HttpRecognitionClient::new(RecognitionConfig::from_env()),
        output_dir.clone(),
    ))
}

/// Supported media files in a directory, sorted for stable batch order.
fn discover_media(dir: &PathBuf) -> Result<Vec<PathBuf>> {
    let mut inputs: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {dir:?}"))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && formats::is_supported_file(p))
        .collect();
    inputs.sort();
    Ok(inputs)
}

fn print_summary(input: &PathBuf, outcome: &RunOutcome) {
    let report = &outcome.report;

    println!("Processed {:?}", input);
    println!(
        "  {} utterances, {} words, {:.1}s, speakers: {:?}",
        report.statistics.total_utterances,
        report.statistics.total_words,
        report.statistics.total_duration_secs,
        report.statistics.speakers
    );

    if !report.keywords.is_empty() {
        let terms: Vec<&str> = report
            .keywords
            .iter()
            .take(5)
            .map(|k| k.term.as_str())
            .collect();
        println!("  Top keywords: {}", terms.join(", "));
    }

    if !report.entities.summary.is_empty() {
        println!(
            "  Domain entities: {}/{} utterances related",
            report.entities.related_utterances, report.entities.total_utterances
        );
        for mention in report.entities.summary.iter().take(5) {
            println!(
                "    {} {} ({} utterances)",
                mention.category, mention.value, mention.utterance_count
            );
        }
    }

    for (format, path) in &outcome.written {
        println!("  {format} -> {path:?}");
    }
    for (format, err) in &outcome.failed_exports {
        eprintln!("  {format} export failed: {err}");
    }
}
