use std::sync::Arc;

use crate::console::input::ConsoleInput;
use crate::console::runner::ConsoleApplication;
use crate::kernel::error::Error;
use crate::tests::common::TestKernel;

fn console() -> ConsoleApplication {
    ConsoleApplication::new(Arc::new(TestKernel::build("test", "dev", true)))
}

async fn run(tokens: &[&str]) -> (crate::kernel::error::Result<i32>, String) {
    let mut output = Vec::new();
    let result = console()
        .run(&ConsoleInput::from_tokens(tokens.iter().copied()), &mut output)
        .await;
    (result, String::from_utf8(output).unwrap())
}

#[test]
fn test_collects_kernel_commands() {
    let console = console();
    assert_eq!(console.command_names(), vec!["echo", "fail"]);
    assert!(console.has("list"));
    assert!(console.has("help"));
    assert!(!console.has("missing"));
    assert_eq!(console.kernel().environment(), "dev");
}

#[tokio::test]
async fn test_list_is_default() {
    let (result, output) = run(&[]).await;
    assert_eq!(result.unwrap(), 0);
    assert!(output.starts_with("test (env: dev, debug: true)"));
    assert!(output.contains("echo"));
    assert!(output.contains("Print the arguments"));
}

#[tokio::test]
async fn test_runs_command_with_arguments() {
    let (result, output) = run(&["--env=dev", "echo", "a", "b"]).await;
    assert_eq!(result.unwrap(), 0);
    assert_eq!(output, "a b\n");
}

#[tokio::test]
async fn test_unknown_command_exits_with_one() {
    let (result, output) = run(&["deploy"]).await;
    assert_eq!(result.unwrap(), 1);
    assert_eq!(output, "Command \"deploy\" is not defined.\n");
}

#[tokio::test]
async fn test_help_for_command() {
    let (result, output) = run(&["help", "echo"]).await;
    assert_eq!(result.unwrap(), 0);
    assert!(output.contains("Print the arguments"));

    let (result, output) = run(&["echo", "--help"]).await;
    assert_eq!(result.unwrap(), 0);
    assert!(output.contains("Usage:"));

    let (result, _) = run(&["help", "missing"]).await;
    assert_eq!(result.unwrap(), 1);
}

#[tokio::test]
async fn test_version_flag() {
    let (result, output) = run(&["-V"]).await;
    assert_eq!(result.unwrap(), 0);
    assert!(output.starts_with("Mindy "));
    assert!(output.contains("kernel: test"));
}

#[tokio::test]
async fn test_command_error_is_returned_unchanged() {
    let (result, _) = run(&["fail"]).await;
    match result {
        Err(Error::Kernel(e)) => assert_eq!(e.to_string(), "command failed"),
        other => panic!("Expected kernel error, got {:?}", other),
    }
}
