use clap::{Parser, Subcommand};
use ppc::cli::{
    compress_file, decompress_file, show_info, CompressOptions, DecompressOptions,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Version info from build.rs
const VERSION: &str = env!("PPC_VERSION");
const PROFILE: &str = env!("PPC_PROFILE");
const GIT_HASH: &str = env!("PPC_GIT_HASH");

/// Environment variable holding the log filter
const LOG_ENV: &str = "PPC_LOG";

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} ({})", PROFILE, VERSION, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "ppc")]
#[command(author, about = "Password-protected compressed containers", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress and encrypt a file into a container
    #[command(alias = "c")]
    Compress {
        /// File to protect
        input: PathBuf,

        /// Output container (default: input with .ppc extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Passphrase
        #[arg(short, long, env = "PPC_PASSPHRASE", hide_env_values = true)]
        passphrase: String,

        /// MIME type of the input
        #[arg(long, default_value = "application/octet-stream")]
        mime: String,

        /// Codec name (huffman, none, zstd, lz4, brotli); default depends on MIME
        #[arg(long)]
        codec: Option<String>,

        /// Free-form note stored in the plaintext header
        #[arg(long)]
        notes: Option<String>,

        /// Do not authenticate the header
        #[arg(long)]
        no_bind_header: bool,
    },

    /// Decrypt and decompress a container
    #[command(alias = "d")]
    Decompress {
        /// Container file
        input: PathBuf,

        /// Output file (default: original name next to the container)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Passphrase
        #[arg(short, long, env = "PPC_PASSPHRASE", hide_env_values = true)]
        passphrase: String,
    },

    /// Show the header of a container without decrypting
    #[command(alias = "i")]
    Info {
        /// Container file to inspect
        file: PathBuf,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("ppc {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if Cli::command().print_help().is_err() {
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    init_logging();

    let result = match command {
        Commands::Compress {
            input,
            output,
            passphrase,
            mime,
            codec,
            notes,
            no_bind_header,
        } => {
            let options = CompressOptions {
                passphrase,
                mime,
                codec,
                notes,
                bind_header: !no_bind_header,
            };

            compress_file(&input, output.as_deref(), &options).map(|report| {
                println!(
                    "Compressed {} ({} bytes) to {} ({} bytes)",
                    input.display(),
                    report.orig_size,
                    report.output.display(),
                    report.container_size
                );
            })
        }

        Commands::Decompress {
            input,
            output,
            passphrase,
        } => {
            let options = DecompressOptions { passphrase };
            decompress_file(&input, output.as_deref(), &options)
                .map(|written| println!("Decompressed to {}", written.display()))
        }

        Commands::Info { file } => show_info(&file).map(|info| print!("{}", info)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_authentication() => {
            eprintln!("Error: invalid password or corrupted file");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
