use std::fs;

use argh::FromArgs;
use camino::Utf8PathBuf;
use lookit_server::settings::ENVIRONMENT_DEFAULTS;

use crate::CliError;

/// Generate a .env file listing every server environment variable with its default value.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "server-env")]
pub struct GenerateServerEnv {
    /// path to env file to create (default: server.env in current directory)
    #[argh(positional, default = "Utf8PathBuf::from(\"server.env\")")]
    file_name: Utf8PathBuf,
    /// overwrite the file if it already exists
    #[argh(switch)]
    force: bool,
}

impl GenerateServerEnv {
    pub async fn run(&self) -> Result<(), CliError> {
        if self.file_name.exists() && !self.force {
            return Err(CliError::IOError(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists, use --force to overwrite", self.file_name),
            )));
        }

        tracing::info!("saving to {}", self.file_name);

        fs::write(&self.file_name, server_env())?;

        Ok(())
    }
}

fn server_env() -> String {
    ENVIRONMENT_DEFAULTS
        .iter()
        .map(|(name, value)| env_line(name, value))
        .collect()
}

fn env_line(name: &str, value: &str) -> String {
    let mut line = String::new();
    line.push_str(name);
    line.push('=');
    line.push_str(&shell_quote(value));
    line.push('\n');
    line
}

fn shell_quote(value: &str) -> String {
    if value.contains('\n') || value.contains('\t') || value.contains('\r') {
        // double quote
        format!(
            "\"{}\"",
            value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n")
                .replace('\t', "\\t")
                .replace('\r', "\\r")
        )
    } else {
        // single quote, with embedded quotes closed and escaped
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
