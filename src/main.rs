//! Translation evaluator CLI
//!
//! Usage:
//!   translation-evaluator evaluate <file|-> --from <lang> --to <lang> [--role <role>] [--mode reference|pairwise]
//!   translation-evaluator languages
//!   translation-evaluator help
//!
//! Required environment variables:
//! - OPENROUTER_API_KEY
//!
//! Optional:
//! - OPENROUTER_API_URL (defaults to the OpenRouter chat completions endpoint)
//! - TRANSLATION_MODELS (key=model_id list, defaults to the built-in roster)
//! - BACK_TRANSLATION_URL (back-translate through the provider when unset)
//! - REFERENCE_CACHE_PATH (defaults to .cache/back_translations.json)
//! - REQUEST_TIMEOUT_SECS (defaults to 60)

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::sync::Arc;
use tracing::{info, warn};
use translation_evaluator::{
    candidate::Candidate,
    config::Config,
    evaluation::{
        BackTranslator, EvaluationMode, EvaluationOutcome, EvaluationRequest, Evaluator, FileStore,
        HttpBackTranslator, MemoryStore, ProviderBackTranslator, ReferenceStore,
    },
    i18n::{Language, LanguageRegistry},
    provider::ProviderClient,
    scoring::{RankedResult, SemanticWeights},
    selection::{Role, TranslationSelection},
};

/// Arguments of the `evaluate` command
struct EvaluateArgs {
    input: String,
    source: Language,
    target: Language,
    role: Role,
    mode: EvaluationMode,
}

impl EvaluateArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let mut input = None;
        let mut source = None;
        let mut target = None;
        let mut role = Role::default();
        let mut mode = EvaluationMode::default();

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--from" => source = Some(Language::parse(flag_value(&mut iter, arg)?)?),
                "--to" => target = Some(Language::parse(flag_value(&mut iter, arg)?)?),
                "--role" => role = flag_value(&mut iter, arg)?.parse()?,
                "--mode" => mode = flag_value(&mut iter, arg)?.parse()?,
                flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
                value => {
                    if input.replace(value.to_string()).is_some() {
                        bail!("Only one input file may be given");
                    }
                }
            }
        }

        Ok(Self {
            input: input.context("Missing input file (use - for stdin)")?,
            source: source.context("Missing --from <lang>")?,
            target: target.context("Missing --to <lang>")?,
            role,
            mode,
        })
    }

    fn read_text(&self) -> Result<String> {
        if self.input == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read text from stdin")?;
            Ok(text)
        } else {
            std::fs::read_to_string(&self.input)
                .with_context(|| format!("Failed to read {}", self.input))
        }
    }
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .with_context(|| format!("{} requires a value", flag))
}

/// Open the persisted reference cache, falling back to memory if the file is unusable.
fn open_store(path: &str) -> Arc<dyn ReferenceStore> {
    match FileStore::open(path) {
        Ok(store) => {
            info!("Reference cache: {} ({} entries)", path, store.len());
            Arc::new(store)
        }
        Err(e) => {
            warn!("Reference cache unavailable, using memory only: {:#}", e);
            Arc::new(MemoryStore::new())
        }
    }
}

async fn evaluate_command(args: &[String]) -> Result<()> {
    let args = EvaluateArgs::parse(args)?;
    let config = Config::from_env()?;

    let selection = TranslationSelection::new(args.role, args.source, args.target, args.read_text()?)?;

    let provider = ProviderClient::new(
        &config.openrouter_api_url,
        &config.openrouter_api_key,
        config.request_timeout(),
    )?;

    // Step 1: Translate with every model
    let candidates = provider.translate_all(&config.models, &selection).await;
    let translated = candidates.iter().filter(|c| c.is_scorable()).count();
    info!("{} of {} models returned a translation", translated, candidates.len());

    // Step 2: Score and rank
    let collaborator: Arc<dyn BackTranslator> = match &config.back_translation_url {
        Some(url) => Arc::new(HttpBackTranslator::new(url, config.request_timeout())?),
        None => Arc::new(ProviderBackTranslator::new(
            provider.clone(),
            config.models.clone(),
            selection.role,
        )),
    };
    let evaluator = Evaluator::new(
        collaborator,
        open_store(&config.reference_cache_path),
        SemanticWeights::default(),
    );

    let request = EvaluationRequest::new(&selection.text, selection.source, selection.target, candidates.clone())
        .with_mode(args.mode);

    let ranked = match evaluator.evaluate(&request).await? {
        EvaluationOutcome::Completed(ranked) => ranked,
        EvaluationOutcome::Superseded => bail!("Evaluation was superseded"),
    };

    print_results(&selection, args.mode, &candidates, &ranked);

    let report = serde_json::to_string_pretty(&evaluator.metrics().report())
        .context("Failed to serialize metrics report")?;
    println!("\nMetrics:\n{}", report);

    Ok(())
}

fn print_results(
    selection: &TranslationSelection,
    mode: EvaluationMode,
    candidates: &[Candidate],
    ranked: &RankedResult,
) {
    println!("\n========================================");
    println!("  {} → {} ({} mode)", selection.source, selection.target, mode);
    println!("========================================");

    if ranked.is_empty() {
        println!("  No translations could be scored.");
    }

    for entry in ranked.iter() {
        let scores = &entry.scores;
        println!(
            "  #{} {:<10} overall {:>5.1}  lexical {:>5.1}  vector {:>5.1}  semantic {:>5.1}  {}",
            entry.rank + 1,
            scores.display_name,
            scores.overall,
            scores.lexical,
            scores.vector,
            scores.semantic,
            entry.tier.label()
        );
        if let Some(text) = candidates
            .iter()
            .find(|c| c.key == scores.candidate_key)
            .and_then(Candidate::scorable_text)
        {
            println!("     {}", text);
        }
    }

    for candidate in candidates.iter().filter(|c| ranked.get(&c.key).is_none()) {
        let reason = candidate
            .failure_reason
            .as_deref()
            .unwrap_or("no back-translation available");
        println!("  -  {:<10} not ranked: {}", candidate.display_name, reason);
    }
    println!("========================================");
}

fn languages_command() {
    println!("Supported languages:");
    for language in LanguageRegistry::get().list_enabled() {
        println!(
            "  {} {:<3} {:<12} {}",
            language.flag, language.code, language.name, language.native_name
        );
    }
}

fn print_usage() {
    let roles = Role::ALL
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    println!(
        r#"
Translate text with several models and rank the translations

USAGE:
    translation-evaluator <COMMAND>

COMMANDS:
    evaluate <file|-> --from <lang> --to <lang> [--role <role>] [--mode reference|pairwise]
               Translate the text and print the ranked translations
    languages  List supported languages
    help       Show this message

OPTIONS (evaluate):
    --from     Language of the text (code or English name)
    --to       Language to translate into
    --role     One of: {roles} (default: Other)
    --mode     reference compares back-translations with the original (default),
               pairwise compares the translations with each other

ENVIRONMENT VARIABLES:
    OPENROUTER_API_KEY    Provider API key (required for evaluate)
    OPENROUTER_API_URL    Chat completions endpoint
    TRANSLATION_MODELS    key=model_id list, e.g. chatgpt=openai/gpt-4o-mini,claude=anthropic/claude-3.5-haiku
    BACK_TRANSLATION_URL  Back-translation service (default: back-translate through the provider)
    REFERENCE_CACHE_PATH  Back-translation cache file (default: .cache/back_translations.json)
    REQUEST_TIMEOUT_SECS  HTTP timeout (default: 60)

EXAMPLES:
    translation-evaluator evaluate notes.txt --from en --to es
    echo "The cat sat." | translation-evaluator evaluate - --from English --to French --mode pairwise
"#,
        roles = roles
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_evaluator=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let command = &args[1];

    match command.as_str() {
        "evaluate" => evaluate_command(&args[2..]).await,
        "languages" => {
            languages_command();
            Ok(())
        }
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }
}
