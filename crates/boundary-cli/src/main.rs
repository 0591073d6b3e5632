use anyhow::{bail, Context, Result};
use boundary_config::{ConfigLoader, LossLevel, Settings};
use boundary_core::{Boundary, Linked, MarshalOptions, NativeApi, NativeLibrary};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "boundary",
    about = "Exercise the boundary marshaling protocol from the command line",
    long_about = "Send strings, integers and floats across the C ABI to the native \
                  counterpart and print what comes back.\n\n\
                  By default the statically linked counterpart is used. Point --library \
                  (or [library] path in boundary.toml) at a shared build to load it at \
                  runtime instead.",
    version,
    propagate_version = true
)]
struct Cli {
    /// Native counterpart shared library to load instead of the linked one
    #[arg(long, global = true, value_name = "PATH")]
    library: Option<PathBuf>,

    /// Explicit boundary.toml (default: search upward from the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// How lossy string decodes are reported (warn, info, debug, off)
    #[arg(long, global = true, value_name = "LEVEL")]
    decode_loss: Option<LossLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Echo one string through the native side
    ///
    /// The string is sent NUL-terminated, so anything after an embedded
    /// NUL is lost on the way back.
    ///
    /// EXAMPLES:
    ///   boundary echo-string "Hello World!"
    ///   boundary echo-string $'as\0asdf'
    #[command(visible_alias = "es")]
    EchoString {
        /// Text to send
        text: String,
    },

    /// Echo a string array through a result envelope
    ///
    /// Each echoed element is printed on its own line.
    ///
    /// EXAMPLES:
    ///   boundary echo-strings Here are some strings
    ///   boundary echo-strings "" "❤" A
    EchoStrings {
        /// Elements to send
        items: Vec<String>,
    },

    /// Echo a C int array through a result envelope
    ///
    /// Values outside the 32-bit range are rejected before anything is sent.
    ///
    /// EXAMPLES:
    ///   boundary echo-ints 1 2 3 4 5 6
    ///   boundary echo-ints -- -1 -2 -3 0
    EchoInts {
        /// Values to send
        #[arg(allow_negative_numbers = true)]
        values: Vec<i64>,
    },

    /// Echo a C float array through a result envelope
    ///
    /// Values travel as single precision and are printed as such.
    ///
    /// EXAMPLES:
    ///   boundary echo-floats 0.1 -0.2 999.9999
    EchoFloats {
        /// Values to send
        #[arg(allow_negative_numbers = true)]
        values: Vec<f64>,
    },

    /// Have the native side print a string
    ///
    /// EXAMPLES:
    ///   boundary print-string "Hello World!"
    PrintString {
        /// Text to print
        text: String,
    },

    /// Have the native side print a string array
    ///
    /// EXAMPLES:
    ///   boundary print-strings one two three
    PrintStrings {
        /// Elements to print
        items: Vec<String>,
    },

    /// Have the native side print a C int array
    ///
    /// EXAMPLES:
    ///   boundary print-ints 1 2 3
    PrintInts {
        /// Values to print
        #[arg(allow_negative_numbers = true)]
        values: Vec<i64>,
    },

    /// Have the native side print a C float array
    ///
    /// EXAMPLES:
    ///   boundary print-floats 1.5 -2.25
    PrintFloats {
        /// Values to print
        #[arg(allow_negative_numbers = true)]
        values: Vec<f64>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    let options = MarshalOptions::from_settings(&settings);

    match settings.library_path {
        Some(path) => {
            let library = unsafe { NativeLibrary::open(&path) }
                .with_context(|| format!("Failed to bind native library {}", path.display()))?;
            log::info!("using native library {}", library.path().display());
            run(&Boundary::with_options(library, options), cli.command)
        }
        None => {
            log::debug!("using linked native counterpart");
            run(&Boundary::with_options(Linked, options), cli.command)
        }
    }
}

/// Merge configuration sources, then let flags override them
fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut loader = ConfigLoader::new();
    let mut settings = match &cli.config {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            loader.load_from_directory(&cwd)?
        }
    };

    if let Some(library) = &cli.library {
        settings.library_path = Some(library.clone());
    }
    if let Some(level) = cli.decode_loss {
        settings.decode_loss = level;
    }
    Ok(settings)
}

fn run<N: NativeApi>(boundary: &Boundary<N>, command: Commands) -> Result<()> {
    let before = boundary.outstanding_allocations();

    match command {
        Commands::EchoString { text } => commands::echo::string(boundary, &text)?,
        Commands::EchoStrings { items } => commands::echo::strings(boundary, &items)?,
        Commands::EchoInts { values } => commands::echo::ints(boundary, &values)?,
        Commands::EchoFloats { values } => commands::echo::floats(boundary, &values)?,
        Commands::PrintString { text } => commands::print::string(boundary, &text),
        Commands::PrintStrings { items } => commands::print::strings(boundary, &items)?,
        Commands::PrintInts { values } => commands::print::ints(boundary, &values)?,
        Commands::PrintFloats { values } => commands::print::floats(boundary, &values)?,
    }

    let leaked = boundary.outstanding_allocations() - before;
    if leaked != 0 {
        bail!("Native heap not released: {} allocation(s) outstanding", leaked);
    }
    Ok(())
}
