mod blocks;
mod logging;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use colored::Colorize;
use forge_core::{builtin_personas, compile, compile_messages, detect_content_type, Config, ContentType};
use forge_llm::{create_provider, GenerationOptions, LLMProvider};
use workflow_system::{Workflow, WorkflowExecutor};

use blocks::BlockArgs;
use logging::init_logging;

#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "Compile structured prompts and run them against LLM backends")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the compiled prompt
    Compile {
        #[command(flatten)]
        blocks: BlockArgs,
    },
    /// Compile and send the prompt, streaming the answer
    Generate {
        #[command(flatten)]
        blocks: BlockArgs,

        /// Model identifier; also selects the backend
        #[arg(long, short)]
        model: Option<String>,

        #[arg(long)]
        temperature: Option<f32>,

        #[arg(long)]
        max_tokens: Option<u32>,
    },
    /// Run a workflow definition file
    Workflow {
        /// Workflow JSON file
        file: PathBuf,

        /// Initial context for the first step
        #[arg(long, short, default_value = "")]
        context: String,
    },
    /// List built-in personas
    Personas,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Commands::Compile { blocks } => compile_command(&blocks),
        Commands::Generate {
            blocks,
            model,
            temperature,
            max_tokens,
        } => generate_command(&blocks, model, temperature, max_tokens).await,
        Commands::Workflow { file, context } => workflow_command(&file, &context).await,
        Commands::Personas => {
            list_personas();
            Ok(())
        }
    }
}

fn describe_content(content: ContentType) -> String {
    match content {
        ContentType::Code { language: Some(language) } => format!("code ({language})"),
        other => other.as_str().to_string(),
    }
}

fn report_context(context: &str) {
    if !context.trim().is_empty() {
        let content = describe_content(detect_content_type(context));
        eprintln!("{}", format!("context: {content}").dimmed());
    }
}

fn compile_command(args: &BlockArgs) -> anyhow::Result<()> {
    let resolved = args.resolve(builtin_personas())?;
    report_context(&resolved.values.context);

    let prompt = compile(&resolved.order, &resolved.values, resolved.persona);
    if prompt.is_empty() {
        eprintln!("{}", "Nothing to compile: every block is empty".yellow());
        return Ok(());
    }
    if !resolved.order.is_complete() {
        eprintln!(
            "{}",
            format!("Preview only: block order is missing {:?}", resolved.order.missing()).yellow()
        );
    }

    println!("{}", prompt.preview());
    Ok(())
}

async fn generate_command(
    args: &BlockArgs,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
) -> anyhow::Result<()> {
    let config = Config::new();
    let model = model.unwrap_or_else(|| config.default_model.clone());

    let resolved = args.resolve(builtin_personas())?;
    report_context(&resolved.values.context);

    let messages = compile_messages(&resolved.order, &resolved.values, resolved.persona)?;
    if messages.is_empty() {
        anyhow::bail!("Nothing to send: every block is empty");
    }

    let provider = create_provider(&config, &model)?;
    eprintln!("{}", format!("🚀 {} via {}", model, provider.name()).cyan());

    let mut streamed = false;
    let mut options = GenerationOptions::new(model.clone()).on_progress(|fragment| {
        streamed = true;
        print!("{}", fragment.green());
        let _ = io::stdout().flush();
    });
    options.temperature = temperature;
    options.max_output_tokens = max_tokens;

    let started = Instant::now();
    let text = provider.generate(&messages, options).await?;

    if streamed {
        println!();
    } else {
        println!("{}", text.green());
    }
    eprintln!("{}", format!("✅ {} chars in {:?}", text.chars().count(), started.elapsed()).dimmed());
    Ok(())
}

async fn workflow_command(file: &Path, context: &str) -> anyhow::Result<()> {
    let config = Config::new();
    let workflow = Workflow::load(file)?;
    let executor = WorkflowExecutor::from_config(&config, builtin_personas().to_vec())?;

    println!(
        "{}",
        format!("🚀 {} ({} steps) with {}", workflow.name, workflow.nodes.len(), config.default_model).cyan()
    );

    let total = workflow.nodes.len();
    executor
        .run(&workflow, context, |step, text, label| {
            println!("{}", "─".repeat(50).dimmed());
            println!("{}", format!("[{}/{}] {}", step + 1, total, label).yellow());
            println!("{}", text);
        })
        .await?;

    println!("{}", "─".repeat(50).dimmed());
    println!("{}", "✅ Workflow complete".green());
    Ok(())
}

fn list_personas() {
    for persona in builtin_personas() {
        println!("{} {}", persona.id.cyan(), persona.name.bold());
        if !persona.thinking_style.is_empty() {
            println!("    {}", persona.thinking_style.dimmed());
        }
    }
}
