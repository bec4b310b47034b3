//! Yae CLI: local administration and a one-shot chat driver against an
//! in-process [`Yae`] instance. No remote backend — every invocation
//! initializes its own process-local runtime, same lifetime as the command.

mod adapters;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use yae_core::agent_loop::{run_agent_loop, AgentEvent};
use yae_core::config::AppConfig;
use yae_core::users::token::{generate_token, hash_token};
use yae_core::users::{Role, User};
use yae_core::yae::Yae;

use adapters::{EchoLlmAdapter, UnavailableWebAdapter};

#[derive(Parser, Debug)]
#[command(name = "yae")]
#[command(about = "Administer a Yae instance and chat with an agent")]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// User administration.
    Admin {
        #[command(subcommand)]
        cmd: AdminCommand,
    },
    /// Run one chat turn against a fresh local agent.
    Chat {
        /// The message to send. Reads a single line from stdin if omitted.
        message: Option<String>,

        /// System instructions prepended to the turn.
        #[arg(long)]
        instructions: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Create a user and print its bearer token (shown once).
    CreateUser {
        name: String,
        #[arg(long)]
        admin: bool,
    },
    /// List every registered user.
    ListUsers,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = AppConfig::from_env()?;
    let seed_admin_token = Yae::initialize(
        Arc::new(EchoLlmAdapter),
        Arc::new(UnavailableWebAdapter),
        config.pool_size,
    )
    .await?;
    tracing::debug!(token = %seed_admin_token, "seed admin token for this process");
    let yae = Yae::get_instance()?;

    match args.cmd {
        Command::Admin { cmd } => match cmd {
            AdminCommand::CreateUser { name, admin } => {
                let token = generate_token();
                let role = if admin { Role::Admin } else { Role::User };
                let user = User::new(name, hash_token(&token), role, chrono::Utc::now());
                yae.users().create(&user).await?;
                println!("created user {} ({:?})", user.id, user.role);
                println!("token: {token}");
            }
            AdminCommand::ListUsers => {
                let users = yae.users().list_all().await?;
                for user in users {
                    println!("{}\t{}\t{:?}", user.id, user.name, user.role);
                }
            }
        },
        Command::Chat { message, instructions } => {
            let message = match message {
                Some(m) => m,
                None => {
                    let mut line = String::new();
                    std::io::stdin().read_line(&mut line)?;
                    line.trim().to_string()
                }
            };
            let agent = yae.create_user_agent("cli-session").await?;
            let deps = yae.agent_loop_deps(&agent);

            use futures::StreamExt;
            let mut stream = run_agent_loop(deps, message, instructions, config.max_agent_steps);
            while let Some(event) = stream.next().await {
                match event {
                    AgentEvent::Thinking(text) => println!("[thinking] {text}"),
                    AgentEvent::ToolCall(text) => println!("[tool_call] {text}"),
                    AgentEvent::ToolResult(text) => println!("[tool_result] {text}"),
                    AgentEvent::ToolError(text) => println!("[tool_error] {text}"),
                    AgentEvent::Message(text) => println!("{text}"),
                    AgentEvent::Error(text) => eprintln!("[error] {text}"),
                }
            }
        }
    }

    Ok(())
}
