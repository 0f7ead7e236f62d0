use std::sync::Arc;

use rentdesk_agent::ChatService;
use rentdesk_core::domain::session::ConversationId;
use rentdesk_core::errors::DomainError;
use rentdesk_db::{migrations, SqlCatalogRepository};

use crate::commands::{
    open_pool, prepare, CommandResult, StepFailure, EXIT_INPUT, EXIT_LLM, EXIT_MIGRATION,
};

/// Routes a single message. Each invocation is its own conversation unless one is named,
/// and sessions do not outlive the process.
pub fn run(conversation: Option<&str>, text: &str) -> CommandResult {
    if let Err(error) = DomainError::check_message(text) {
        return CommandResult::failure("ask", "invalid_input", error.to_string(), EXIT_INPUT);
    }

    let (config, runtime) = match prepare("ask") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };
    let conversation =
        conversation.map(|id| ConversationId(id.to_string())).unwrap_or_default();

    let result = runtime.block_on(async {
        let pool = open_pool(&config).await?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;

        let catalog = Arc::new(SqlCatalogRepository::new(pool.clone()));
        let service = ChatService::from_config(&config, catalog)
            .map_err(|error| ("llm_setup", error.to_string(), EXIT_LLM))?;
        let reply = service
            .handle_message(&conversation, text)
            .await
            .map_err(|error| ("invalid_input", error.to_string(), EXIT_INPUT))?;

        pool.close().await;
        Ok::<_, StepFailure>(reply)
    });

    match result {
        Ok(reply) => {
            let message = match &reply.car_details {
                Some(car) => format!(
                    "{}\n[suggested: {} {} {} in {}, ${}/day]",
                    reply.message, car.year, car.brand, car.model, car.location, car.price
                ),
                None => reply.message,
            };
            CommandResult::success("ask", message)
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("ask", error_class, message, exit_code)
        }
    }
}
