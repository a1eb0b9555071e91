//! Runs a triage agent that hands questions off to subject tutors, and
//! prints the handoff path of each run.

use std::process::ExitCode;

use azure_agents::agents::{TRIAGE_QUESTIONS, education_triage};
use azure_agents::cli;
use azure_agents::core::{RunOutcome, Runner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    cli::init();
    let model_client = match cli::model_client() {
        Ok(model_client) => model_client,
        Err(code) => return code,
    };
    let triage = education_triage(model_client);
    let runner = Runner::default();

    let mut code = ExitCode::SUCCESS;
    for question in TRIAGE_QUESTIONS {
        println!("\nUser: {question}");
        match cli::with_spinner(runner.run(&triage, question)).await {
            Ok(RunOutcome::Completed(result)) => {
                println!("Agent: {}", result.final_output);
                if let Some(path) = cli::handoff_path(&result.handoffs) {
                    println!("\n{path}");
                }
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
