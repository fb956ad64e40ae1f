//! CLI for Lumina - natural-language image editing.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use lumina::{
    codec, download, presets, EditClient, EditSession, GeminiModel, HttpTransport,
    ImageDimension,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lumina")]
#[command(about = "Edit images with natural-language instructions via Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit an image according to a text instruction
    Edit(EditArgs),

    /// Show media type, size and dimensions of an image
    Inspect(InspectArgs),

    /// Check the API key and model availability
    Health(HealthArgs),

    /// List the built-in edit instructions
    Presets,
}

#[derive(Args)]
struct EditArgs {
    /// Path to the source image
    input: PathBuf,

    /// What to change, in plain words
    #[arg(required_unless_present = "preset")]
    prompt: Option<String>,

    /// Use a built-in instruction instead (see `lumina presets`)
    #[arg(short, long, conflicts_with = "prompt")]
    preset: Option<usize>,

    /// Output file path (default: timestamped name in --dir)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for the timestamped output file
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Model to use
    #[arg(short, long, value_enum, default_value = "nano-banana")]
    model: ModelArg,

    /// Give up on the request after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Args)]
struct InspectArgs {
    /// Path to the image
    input: PathBuf,
}

#[derive(Args)]
struct HealthArgs {
    /// Model to check
    #[arg(short, long, value_enum, default_value = "nano-banana")]
    model: ModelArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    NanoBanana,
    NanoBananaPro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::NanoBanana => GeminiModel::NanoBanana,
            ModelArg::NanoBananaPro => GeminiModel::NanoBananaPro,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Edit(args) => {
            edit_image(args, cli.json).await?;
        }
        Commands::Inspect(args) => {
            inspect_image(args, cli.json)?;
        }
        Commands::Health(args) => {
            health_check(args, cli.json).await?;
        }
        Commands::Presets => {
            list_presets(cli.json)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "lumina=debug",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn edit_image(args: EditArgs, json_output: bool) -> anyhow::Result<()> {
    let prompt = match (args.prompt, args.preset) {
        (Some(prompt), _) => prompt,
        (None, Some(n)) => presets::preset(n)
            .with_context(|| {
                format!("no preset {n} (choose 1-{})", presets::PROMPT_PRESETS.len())
            })?
            .to_string(),
        (None, None) => anyhow::bail!("either a prompt or --preset is required"),
    };

    let mut transport = HttpTransport::builder();
    if let Some(secs) = args.timeout {
        transport = transport.timeout(Duration::from_secs(secs));
    }
    let client = EditClient::new(transport.build()?).with_model(args.model.into());

    let mut session = EditSession::new();
    session.select_image(
        codec::encode_file(&args.input)
            .with_context(|| format!("failed to load {}", args.input.display()))?,
    );
    session.set_prompt(prompt);

    if session.generate(&client).await.is_none() {
        anyhow::bail!("nothing to do: the prompt is empty");
    }

    let state = session.into_state();
    let image = match (state.generated_image, state.error) {
        (Some(image), None) => image,
        (_, Some(error)) => {
            if json_output {
                let result = serde_json::json!({
                    "type": "edit",
                    "success": false,
                    "error": error,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            anyhow::bail!(error);
        }
        (None, None) => anyhow::bail!("edit produced no image"),
    };

    let (path, size) = match args.output {
        Some(path) => {
            let size = download::save(&image, &path)?;
            (path, size)
        }
        None => {
            let path = download::save_to_dir(&image, &args.dir)?;
            let size = std::fs::metadata(&path)?.len() as usize;
            (path, size)
        }
    };
    let media_type = codec::decode(&image)?.media_type;

    if json_output {
        let result = serde_json::json!({
            "type": "edit",
            "success": true,
            "output": path.display().to_string(),
            "size_bytes": size,
            "media_type": media_type,
            "model": client.model().as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Edited image: {} ({} bytes, {}) via {}",
            path.display(),
            size,
            media_type,
            client.model()
        );
    }

    Ok(())
}

fn inspect_image(args: InspectArgs, json_output: bool) -> anyhow::Result<()> {
    let transport = codec::encode_file(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let url = codec::decode(&transport)?;
    let data = url.bytes()?;
    let dimensions = ImageDimension::from_header(&data);

    if json_output {
        let result = serde_json::json!({
            "path": args.input.display().to_string(),
            "media_type": url.media_type,
            "size_bytes": data.len(),
            "dimensions": dimensions,
            "transport_len": transport.len(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", args.input.display());
        println!("  Media type: {}", url.media_type);
        println!("  Size:       {} bytes", data.len());
        match dimensions {
            Some(d) => println!("  Dimensions: {}", d),
            None => println!("  Dimensions: unknown"),
        }
        println!("  Transport:  {} chars", transport.len());
    }

    Ok(())
}

async fn health_check(args: HealthArgs, json_output: bool) -> anyhow::Result<()> {
    let model: GeminiModel = args.model.into();
    let client = EditClient::from_env()?.with_model(model);
    let result = client.health_check().await;

    if json_output {
        let out = serde_json::json!({
            "model": model.as_str(),
            "ok": result.is_ok(),
            "error": result.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if result.is_ok() {
        println!("✓ {} reachable", model);
    }

    result?;
    Ok(())
}

fn list_presets(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        let items: Vec<_> = presets::numbered()
            .map(|(number, prompt)| serde_json::json!({ "number": number, "prompt": prompt }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for (number, prompt) in presets::numbered() {
            println!("{:>2}. {}", number, prompt);
        }
    }
    Ok(())
}
