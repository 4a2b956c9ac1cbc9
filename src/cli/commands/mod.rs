//! Command execution.
//!
//! Each command reports its own outcome; this module validates arguments,
//! dispatches, and turns errors into an exit code with recovery suggestions.

mod gather;
mod preview;
mod publish;
mod status;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::EnvConfig;
use crate::error::Result;

use preview::execute_preview;
use publish::execute_publish;
use status::execute_status;

/// Execute the parsed command and return the process exit code
pub async fn execute_command(args: Args, env: &EnvConfig) -> Result<i32> {
    let config = RuntimeConfig::from(&args);

    let result = match args.validate() {
        Err(e) => Err(e.into()),
        Ok(()) => match &args.command {
            Command::Publish(publish) => execute_publish(publish, &config, env).await,
            Command::Preview(gather) => execute_preview(gather, &config),
            Command::Status { repo, release_id } => {
                execute_status(repo, *release_id, &config, env).await
            }
        },
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            if e.is_recoverable() {
                config.warning_println("This looks temporary; running the command again may succeed");
            }

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
