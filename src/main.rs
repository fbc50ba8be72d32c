use clap::{Args, Parser, Subcommand};
use dubscribe::export::{self, ExportFormat};
use dubscribe::transcript::{clean_transcript, Transcript};
use dubscribe::translation::{char_budget, RemoteTranslator};
use dubscribe::{paths, PipelineConfig, PipelineError, PipelineResult};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "dubscribe")]
#[command(about = "Turn speech-recognition transcripts into time-budgeted translated subtitles")]
struct Cli {
    /// Settings file (JSON). Defaults to the user settings file when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Clean, translate and export subtitles.
    Translate(TranslateArgs),
    /// Drop low-confidence words and write the cleaned transcript.
    Clean(CleanArgs),
    /// Print the character budget for a time span.
    #[command(allow_negative_numbers = true)]
    Budget {
        start: f64,
        end: f64,
        #[arg(long)]
        speech_rate: Option<f64>,
    },
}

#[derive(Debug, Args)]
struct TranslateArgs {
    /// Transcript JSON produced by the recognizer.
    input: PathBuf,
    /// Output file, or `-` for stdout. Defaults to `<stem>_ja.<ext>`.
    #[arg(short, long)]
    output: Option<String>,
    /// Directory for the default output file name.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// json, srt or vtt.
    #[arg(long, default_value = "json")]
    format: String,
    /// Add the source text under each SRT/VTT cue.
    #[arg(long)]
    with_source: bool,
    #[arg(long)]
    threshold: Option<f64>,
    #[arg(long)]
    speech_rate: Option<f64>,
    #[arg(long)]
    concurrency: Option<usize>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Translator endpoint URL.
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    model: Option<String>,
    /// plain, openai or anthropic.
    #[arg(long)]
    flavor: Option<String>,
}

#[derive(Debug, Args)]
struct CleanArgs {
    input: PathBuf,
    /// Output file, or `-` for stdout. Defaults to `<stem>_clean.json`.
    #[arg(short, long)]
    output: Option<String>,
    #[arg(long)]
    threshold: Option<f64>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if let Err(e) = dubscribe::init_logger(level) {
        eprintln!("warning: logging disabled: {}", e);
    }

    if let Err(error) = run(cli).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> PipelineResult<()> {
    let mut config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Translate(args) => translate(args, &mut config).await,
        Command::Clean(args) => {
            if let Some(t) = args.threshold {
                config.confidence_threshold = t;
            }
            config.validate()?;
            let transcript = Transcript::from_path(&args.input)?;
            let cleaned = clean_transcript(&transcript, config.confidence_threshold);
            let json = serde_json::to_string_pretty(&cleaned.to_json_value())?;
            let target = args
                .output
                .unwrap_or_else(|| paths::cleaned_output_path(&args.input).to_string_lossy().into_owned());
            write_output(&target, |w| Ok(writeln!(w, "{}", json)?))
        }
        Command::Budget {
            start,
            end,
            speech_rate,
        } => {
            let rate = speech_rate.unwrap_or(config.speech_rate);
            println!("{}", char_budget(start, end, rate));
            Ok(())
        }
    }
}

async fn translate(args: TranslateArgs, config: &mut PipelineConfig) -> PipelineResult<()> {
    if let Some(t) = args.threshold {
        config.confidence_threshold = t;
    }
    if let Some(r) = args.speech_rate {
        config.speech_rate = r;
    }
    if let Some(n) = args.concurrency {
        config.concurrency = n;
    }
    if args.timeout_secs.is_some() {
        config.timeout_secs = args.timeout_secs;
    }
    if let Some(e) = args.endpoint {
        config.translator.endpoint = Some(e);
    }
    if let Some(m) = args.model {
        config.translator.model = m;
    }
    if let Some(f) = args.flavor {
        config.translator.flavor = f.parse().map_err(PipelineError::InvalidConfig)?;
    }
    let format: ExportFormat = args.format.parse()?;

    let translator = RemoteTranslator::new(config.remote_config()?)
        .map_err(|e| PipelineError::TranslatorSetup(e.to_string()))?;

    let json = std::fs::read_to_string(&args.input)?;
    let subtitles = dubscribe::run_pipeline(&json, config, &translator).await?;

    let target = args.output.unwrap_or_else(|| {
        paths::translated_output_path(&args.input, args.out_dir.as_deref(), format.extension())
            .to_string_lossy()
            .into_owned()
    });
    write_output(&target, |w| {
        export::write_subtitles(w, format, &subtitles, args.with_source)
    })?;
    if target != "-" {
        info!("[export] {} subtitles written to {}", subtitles.len(), target);
    }
    Ok(())
}

/// Write to stdout for `-`, otherwise to the named file.
fn write_output<F>(target: &str, write: F) -> PipelineResult<()>
where
    F: FnOnce(&mut dyn Write) -> PipelineResult<()>,
{
    if target == "-" {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        write(&mut lock)?;
        lock.flush()?;
    } else {
        let path = Path::new(target);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        write(&mut file)?;
        file.flush()?;
    }
    Ok(())
}
