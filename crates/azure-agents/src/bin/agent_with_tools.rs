//! Runs a research assistant that can check the weather, search the web
//! and do arithmetic.

use std::process::ExitCode;

use azure_agents::agents::{RESEARCH_QUERIES, research_agent};
use azure_agents::cli;
use azure_agents::core::{RunOutcome, Runner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    cli::init();
    let model_client = match cli::model_client() {
        Ok(model_client) => model_client,
        Err(code) => return code,
    };
    let agent = research_agent(model_client);
    let runner = Runner::default();

    let mut code = ExitCode::SUCCESS;
    for query in RESEARCH_QUERIES {
        println!("\nUser: {query}");
        match cli::with_spinner(runner.run(&agent, query)).await {
            Ok(RunOutcome::Completed(result)) => {
                println!("Agent: {}", result.final_output);
            }
            Ok(RunOutcome::Blocked(tripped)) => {
                println!("Guardrail triggered: {tripped}");
            }
            Err(err) => {
                println!("Error: {err}");
                code = ExitCode::FAILURE;
            }
        }
    }
    code
}
