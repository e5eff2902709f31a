//! RSC Script Compiler Driver
//!
//! Command-line entry point for the export backend. The parser and type
//! checker run upstream and hand over the translation unit as JSON; this
//! driver runs the backend phases in order and writes the output module
//! with its export metadata.
//!
//! The exit status is decided by the diagnostic sink: the phases themselves
//! never abort on policy violations, they report and keep going.

use clap::{Parser, Subcommand};
use rsc_backend::{BackendOptions, ScriptBackend};
use rsc_common::{CompilerError, ErrorReporter};
use rsc_frontend::ir::Module;
use rsc_frontend::registry::ExportContext;
use rsc_frontend::TranslationUnit;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rsc")]
#[command(about = "RSC script compiler backend")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a parsed translation unit (JSON) into an output module
    Compile {
        /// Input translation unit file
        input: PathBuf,

        /// Output file for the generated module (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit the module as JSON instead of textual IR
        #[arg(long)]
        emit_json: bool,

        /// Permit user functions whose name starts with the reserved "rs"
        /// prefix
        #[arg(long)]
        allow_rs_prefix: bool,

        /// Generate code but skip export descriptor emission
        #[arg(long)]
        skip_export: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            input,
            output,
            emit_json,
            allow_rs_prefix,
            skip_export,
        } => {
            match compile_command(
                &input,
                output.as_deref(),
                emit_json,
                allow_rs_prefix,
                skip_export,
            ) {
                Ok(had_errors) => {
                    if had_errors {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Run the backend over one unit. Returns whether any error-severity
/// diagnostic was recorded.
fn compile_command(
    input: &Path,
    output: Option<&Path>,
    emit_json: bool,
    allow_rs_prefix: bool,
    skip_export: bool,
) -> Result<bool, CompilerError> {
    let source = fs::read_to_string(input)?;
    let mut unit: TranslationUnit = serde_json::from_str(&source)
        .map_err(|e| CompilerError::input_error(format!("failed to parse translation unit: {e}")))?;

    let mut reporter = ErrorReporter::new();
    let mut ctx = ExportContext::new();
    ctx.process_unit(&unit, &mut reporter);
    if skip_export {
        ctx.set_process_export(false);
    }

    let mut backend = ScriptBackend::new(BackendOptions { allow_rs_prefix });
    backend.handle_top_level_items(&mut unit.items, &mut reporter);
    backend.validate_unit(&mut unit, &ctx, &mut reporter);

    let mut module = Module::new(unit.name.clone());
    backend.lower_unit(&unit, &mut module)?;
    backend.emit_export_metadata(&ctx, &mut module, &mut reporter)?;

    reporter.print_diagnostics();
    if reporter.has_errors() {
        eprintln!("{}", reporter.summary());
    }

    let rendered = if emit_json {
        serde_json::to_string_pretty(&module)
            .map_err(|e| CompilerError::internal_error(format!("failed to serialize module: {e}")))?
    } else {
        module.to_string()
    };
    match output {
        Some(path) => fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }

    Ok(reporter.has_errors())
}
