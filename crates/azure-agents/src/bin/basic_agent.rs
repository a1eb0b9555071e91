//! Asks a plain assistant one question.

use std::process::ExitCode;

use azure_agents::agents::{BASIC_QUERY, basic_agent};
use azure_agents::cli;
use azure_agents::core::{RunOutcome, Runner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    cli::init();
    let model_client = match cli::model_client() {
        Ok(model_client) => model_client,
        Err(code) => return code,
    };
    let agent = basic_agent(model_client);

    println!("User: {BASIC_QUERY}");
    match cli::with_spinner(Runner::default().run(&agent, BASIC_QUERY)).await {
        Ok(RunOutcome::Completed(result)) => {
            println!("Agent: {}", result.final_output);
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Blocked(tripped)) => {
            println!("Guardrail triggered: {tripped}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
