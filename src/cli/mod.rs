pub mod args;
pub mod commands;

pub use args::{ExecArgs, LogsArgs, ServeArgs, ToolsArgs};
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "lazarus")]
#[command(version = crate::VERSION)]
#[command(about = "Self-healing tool orchestrator with a live audit trail")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: declare tools in lazarus.toml, start the service, then watch the audit feed while requests heal."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Run the HTTP orchestration service",
        long_about = "Serve exposes the tool execution endpoint, the audit log read/clear endpoints, and a WebSocket stream of new audit entries.",
        after_help = "Example:\n    lazarus serve ./workspace --bind 0.0.0.0:8900"
    )]
    Serve(ServeArgs),
    #[command(
        about = "Execute one tool with healing from the command line",
        long_about = "Exec runs a single orchestration: the named tool is attempted first, and registry fallbacks are tried in order if it fails. The full result is printed as JSON.",
        after_help = "Example:\n    lazarus exec amadeus_flights --category travel --params '{\"origin\":\"SFO\"}'"
    )]
    Exec(ExecArgs),
    #[command(
        about = "List the registry catalogue",
        long_about = "Tools prints every registered tool with its category, priority, active flag, and declared fallbacks.",
        after_help = "Example:\n    lazarus tools ./workspace"
    )]
    Tools(ToolsArgs),
    #[command(
        about = "Show or clear the audit log",
        long_about = "Logs prints the latest audit entries newest-first as JSON lines, or removes all entries with --clear.",
        after_help = "Examples:\n    lazarus logs --limit 20\n    lazarus logs --clear"
    )]
    Logs(LogsArgs),
}

pub async fn run(args: Args) -> crate::Result<()> {
    match args.command {
        Command::Serve(serve_args) => commands::serve(serve_args).await,
        Command::Exec(exec_args) => commands::exec(exec_args).await,
        Command::Tools(tools_args) => commands::tools(tools_args).await,
        Command::Logs(logs_args) => commands::logs(logs_args).await,
    }
}
