use serde_json::Value;

use super::error::ServiceError;
use super::schema::{command_name, parameters_from_args, CommandDescriptor};

// re-export ArgSchema for macros use
pub use super::schema::ArgSchema;

/// One callable function of a service, addressed by the LLM as
/// `<service>-<name>`.
#[async_trait::async_trait]
pub trait ServiceFunction: Send + Sync {
    fn service(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn args(&self) -> Vec<ArgSchema>;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value {
        parameters_from_args(&self.args())
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor {
            name: command_name(self.service(), self.name()),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }

    async fn run(&self, input: Value) -> Result<Value, ServiceError>;
}
