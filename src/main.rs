use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use promptline::context::RenderContext;
use promptline::{render, server};

#[derive(Parser)]
#[command(name = "promptline")]
#[command(about = "Renders zsh prompt lines as a shell-source snippet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve prompt renders over a Unix domain socket
    Serve {
        /// Socket path (default: promptline.socket under the runtime directory)
        #[arg(short, long)]
        socket: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        None => {
            let ctx = RenderContext::from_env()?;
            print!("{}", render::render(&ctx).shell_snippet());
            Ok(())
        }
        Some(Commands::Serve { socket }) => {
            let socket = socket.unwrap_or_else(server::default_socket_path);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            runtime.block_on(server::run(&socket))
        }
    }
}
