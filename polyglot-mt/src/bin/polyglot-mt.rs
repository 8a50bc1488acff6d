use clap::{Arg, ArgAction, ArgMatches, Command};
use polyglot_mt::{
    BatchOptions, DeepLConfig, DeepLProvider, MachineTranslator, MarkerPolicy, MockMode,
    MockTranslator, MtResult, PlaceholderTranslator, translate_po_file,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let target = Arg::new("target")
        .long("target")
        .short('t')
        .help("Target language code (e.g., DE, PL, PT-BR)")
        .required(true);
    let source = Arg::new("source")
        .long("source")
        .short('s')
        .help("Source language code (default: detected by the provider)");
    let strict = Arg::new("strict")
        .long("strict")
        .help("Fail a translation when the provider drops a placeholder marker")
        .action(ArgAction::SetTrue);

    Command::new("polyglot-mt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Machine translation for gettext catalogs, keeping %(name)s placeholders intact")
        .subcommand_required(true)
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use mock translator instead of DeepL")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show detailed translation process")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("file")
                .about("Translate every untranslated entry of a PO file")
                .arg(
                    Arg::new("input")
                        .help("Input .po file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("output")
                        .help("Output .po file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .index(2),
                )
                .arg(target.clone())
                .arg(source.clone())
                .arg(strict.clone())
                .arg(
                    Arg::new("concurrency")
                        .long("concurrency")
                        .short('j')
                        .help("Number of translation requests in flight")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                ),
        )
        .subcommand(
            Command::new("text")
                .about("Translate a single message")
                .arg(
                    Arg::new("message")
                        .help("Source message to translate")
                        .required(true)
                        .index(1),
                )
                .arg(target)
                .arg(source)
                .arg(strict),
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    if matches.get_flag("mock") {
        run(MockTranslator::new(MockMode::Suffix), &matches).await
    } else {
        let provider = deepl_provider(DeepLConfig::from_env())?;
        run(provider, &matches).await
    }
}

/// Print what is wrong with the DeepL setup; the returned error only says that it failed
fn deepl_provider(
    config: MtResult<DeepLConfig>,
) -> Result<DeepLProvider, Box<dyn std::error::Error>> {
    match config.and_then(DeepLProvider::new) {
        Ok(provider) => Ok(provider),
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("   Set it with: export DEEPL_API_KEY=your_api_key");
            eprintln!("   Or use --mock to use mock translator");
            Err("DeepL provider not configured".into())
        }
    }
}

async fn run<T: MachineTranslator>(
    provider: T,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some((command, args)) = matches.subcommand() else {
        return Err("No command given".into());
    };

    let policy = if args.get_flag("strict") {
        MarkerPolicy::Strict
    } else {
        MarkerPolicy::Lenient
    };
    let translator = PlaceholderTranslator::new(provider).with_policy(policy);
    let target = args
        .get_one::<String>("target")
        .ok_or("Missing --target")?;
    let source = args.get_one::<String>("source").map(String::as_str);

    match command {
        "file" => {
            let input = args.get_one::<PathBuf>("input").ok_or("Missing input")?;
            let output = args.get_one::<PathBuf>("output").ok_or("Missing output")?;
            let concurrency = args.get_one::<usize>("concurrency").copied().unwrap_or(1);
            let options = BatchOptions::default().with_concurrency(concurrency);

            let report =
                translate_po_file(&translator, input, output, target, source, &options).await?;

            println!(
                "{} translated, {} already translated, {} failed",
                report.translated(),
                report.skipped(),
                report.failed()
            );
            for (key, err) in report.failures() {
                eprintln!("❌ {}: {}", key, err);
            }
        }
        "text" => {
            let message = args
                .get_one::<String>("message")
                .ok_or("Missing message")?;
            let translated = translator.translate(message, target, source).await?;
            println!("{}", translated);
        }
        other => return Err(format!("Unknown command '{}'", other).into()),
    }

    Ok(())
}
