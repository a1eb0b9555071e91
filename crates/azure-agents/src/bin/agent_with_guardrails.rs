//! Runs an education assistant behind content safety and homework
//! guardrails.

use std::process::ExitCode;

use azure_agents::agents::{EDUCATION_QUERIES, education_agent};
use azure_agents::cli;
use azure_agents::core::{RunOutcome, Runner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    cli::init();
    let model_client = match cli::model_client() {
        Ok(model_client) => model_client,
        Err(code) => return code,
    };
    let agent = education_agent(model_client.clone(), model_client);
    let runner = Runner::default();

    let mut code = ExitCode::SUCCESS;
    for query in EDUCATION_QUERIES {
        println!("\nUser: {query}");
        match cli::with_spinner(runner.run(&agent, query)).await {
            Ok(RunOutcome::Completed(result)) => {
                println!("Agent: {}", result.final_output);
            }
            Ok(RunOutcome::Blocked(tripped)) => {
                let message = tripped.output.message.as_deref().unwrap_or_default();
                println!("Guardrail triggered: {message}");
            }
            Err(err) => {
                println!("Error: {err}");
                code = ExitCode::FAILURE;
            }
        }
    }
    code
}
