use crate::core::error::{ServiceError, ServiceResult};
use crate::core::launch::MessageSigner;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Signs by running an external program with the message appended as the last
/// argument, e.g. `solana sign-offchain-message`. The trimmed stdout is the
/// signature.
pub struct CommandSigner {
    program: String,
    args: Vec<String>,
}

impl CommandSigner {
    pub fn new(program: &str, args: &[String]) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
        }
    }
}

#[async_trait]
impl MessageSigner for CommandSigner {
    async fn sign_message(&self, message: &[u8]) -> ServiceResult<String> {
        let message = std::str::from_utf8(message)
            .map_err(|e| ServiceError::invalid(format!("challenge is not UTF-8: {e}")))?;
        debug!("Signing challenge with {}", self.program);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(message)
            .output()
            .await
            .map_err(|e| ServiceError::invalid(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(ServiceError::invalid(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let signature = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if signature.is_empty() {
            return Err(ServiceError::invalid(format!(
                "{} produced no signature",
                self.program
            )));
        }
        Ok(signature)
    }
}
