//! Then-step assertions for engine client behavioural scenarios.

use std::sync::PoisonError;

use dockhand::engine::{Containment, MASK_PLACEHOLDER};
use rstest_bdd_macros::then;

use super::state::{EngineClientState, FailureKind, Outcome, StepResult};

fn outcome(state: &EngineClientState) -> StepResult<Outcome> {
    state
        .outcome
        .get()
        .ok_or_else(|| String::from("operation outcome should be set"))
}

fn started_argvs(state: &EngineClientState) -> StepResult<Vec<Vec<String>>> {
    let started = state
        .started
        .get()
        .ok_or_else(|| String::from("start log should be set"))?;
    let specs = started.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(specs.iter().map(|spec| spec.argv.clone()).collect())
}

fn diagnostic_lines(state: &EngineClientState) -> StepResult<Vec<String>> {
    let sink = state
        .diagnostics
        .get()
        .ok_or_else(|| String::from("diagnostics sink should be set"))?;
    Ok(sink.commands())
}

fn expect_failure(state: &EngineClientState, expected: FailureKind) -> StepResult<String> {
    match outcome(state)? {
        Outcome::Failed { kind, message } if kind == expected => Ok(message),
        Outcome::Failed { kind, message } => Err(format!(
            "expected {expected:?} failure, got {kind:?}: {message}"
        )),
        other => Err(format!("expected {expected:?} failure, got {other:?}")),
    }
}

#[then("the run output is {expected}")]
fn run_output_is(engine_client_state: &EngineClientState, expected: String) -> StepResult<()> {
    match outcome(engine_client_state)? {
        Outcome::Stdout(stdout) if stdout == expected => Ok(()),
        other => Err(format!("expected run output {expected:?}, got {other:?}")),
    }
}

#[then("the engine was invoked with run -d -t")]
fn engine_invoked_with_run_detached(engine_client_state: &EngineClientState) -> StepResult<()> {
    let argvs = started_argvs(engine_client_state)?;
    let prefix: Vec<&str> = argvs
        .first()
        .map(|argv| argv.iter().take(4).map(String::as_str).collect())
        .unwrap_or_default();
    if prefix == ["docker", "run", "-d", "-t"] {
        Ok(())
    } else {
        Err(format!("unexpected invocation prefix {prefix:?}"))
    }
}

#[then("the operation fails with an engine command failure mentioning {context}")]
fn fails_with_engine_command_failure(
    engine_client_state: &EngineClientState,
    context: String,
) -> StepResult<()> {
    let message = expect_failure(engine_client_state, FailureKind::EngineCommand)?;
    if message.contains(&context) {
        Ok(())
    } else {
        Err(format!("expected failure to mention {context:?}, got {message}"))
    }
}

#[then("the operation fails with an execution failure")]
fn fails_with_execution_failure(engine_client_state: &EngineClientState) -> StepResult<()> {
    expect_failure(engine_client_state, FailureKind::Execution).map(|_| ())
}

#[then("the engine received the argument {argument}")]
fn engine_received_argument(
    engine_client_state: &EngineClientState,
    argument: String,
) -> StepResult<()> {
    let argvs = started_argvs(engine_client_state)?;
    if argvs.iter().flatten().any(|arg| *arg == argument) {
        Ok(())
    } else {
        Err(format!("no started command received {argument:?}: {argvs:?}"))
    }
}

#[then("no diagnostic line contains {text}")]
fn no_diagnostic_line_contains(
    engine_client_state: &EngineClientState,
    text: String,
) -> StepResult<()> {
    let lines = diagnostic_lines(engine_client_state)?;
    match lines.iter().find(|line| line.contains(&text)) {
        Some(line) => Err(format!("diagnostic line leaked {text:?}: {line}")),
        None => Ok(()),
    }
}

#[then("a diagnostic line contains the redaction placeholder")]
fn diagnostic_line_contains_placeholder(
    engine_client_state: &EngineClientState,
) -> StepResult<()> {
    let lines = diagnostic_lines(engine_client_state)?;
    if lines.iter().any(|line| line.contains(MASK_PLACEHOLDER)) {
        Ok(())
    } else {
        Err(format!("no diagnostic line was redacted: {lines:?}"))
    }
}

#[then("the process names are {names}")]
fn process_names_are(engine_client_state: &EngineClientState, names: String) -> StepResult<()> {
    let expected: Vec<&str> = names.split(',').map(str::trim).collect();
    match outcome(engine_client_state)? {
        Outcome::Processes(actual) if actual == expected => Ok(()),
        other => Err(format!("expected processes {expected:?}, got {other:?}")),
    }
}

#[then("the process list is empty")]
fn process_list_is_empty(engine_client_state: &EngineClientState) -> StepResult<()> {
    match outcome(engine_client_state)? {
        Outcome::Processes(actual) if actual.is_empty() => Ok(()),
        other => Err(format!("expected no processes, got {other:?}")),
    }
}

#[then("the host is not containerized")]
fn host_is_not_containerized(engine_client_state: &EngineClientState) -> StepResult<()> {
    match outcome(engine_client_state)? {
        Outcome::Containment(Containment::Absent) => Ok(()),
        other => Err(format!("expected absent containment, got {other:?}")),
    }
}

#[then("the host is container {expected}")]
fn host_is_container(engine_client_state: &EngineClientState, expected: String) -> StepResult<()> {
    match outcome(engine_client_state)? {
        Outcome::Containment(Containment::Present { container_id }) if container_id == expected => {
            Ok(())
        }
        other => Err(format!("expected container {expected:?}, got {other:?}")),
    }
}

#[then("hostname was not queried")]
fn hostname_was_not_queried(engine_client_state: &EngineClientState) -> StepResult<()> {
    let argvs = started_argvs(engine_client_state)?;
    if argvs
        .iter()
        .any(|argv| argv.first().is_some_and(|program| program == "hostname"))
    {
        Err(String::from("hostname should not have been queried"))
    } else {
        Ok(())
    }
}

#[then("an operational note was recorded")]
fn operational_note_was_recorded(engine_client_state: &EngineClientState) -> StepResult<()> {
    let sink = engine_client_state
        .diagnostics
        .get()
        .ok_or_else(|| String::from("diagnostics sink should be set"))?;
    if sink.notes().is_empty() {
        Err(String::from("expected an operational note"))
    } else {
        Ok(())
    }
}

#[then("the identity is {expected}")]
fn identity_is(engine_client_state: &EngineClientState, expected: String) -> StepResult<()> {
    match outcome(engine_client_state)? {
        Outcome::Identity(identity) if identity == expected => Ok(()),
        other => Err(format!("expected identity {expected:?}, got {other:?}")),
    }
}
