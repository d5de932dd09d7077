/// End-to-end tests driving the binary over stdin.
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run_cli(input: &[u8]) -> Result<Output, Box<dyn std::error::Error>> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_integral-tex"))
        .env_remove("INTEGRAL_TEX_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut stdin = child.stdin.take().ok_or("Failed to open stdin")?;
    // The process may exit before consuming everything it was sent.
    let _ = stdin.write_all(input);
    drop(stdin);

    Ok(child.wait_with_output()?)
}

fn expect_failure(input: &str, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli(input.as_bytes())?;
    assert_eq!(output.status.code(), Some(1), "exit status for {input:?}");
    assert!(output.stdout.is_empty(), "stdout should be empty for {input:?}");
    assert_eq!(String::from_utf8_lossy(&output.stderr), format!("{message}\n"));
    Ok(())
}

#[test]
fn prints_the_integral() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli(b"Bounds   : 0, 1\nFunction : x**2\n")?;
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "\\int_{0}^{1} x^{2} \\mathrm{d}x\n"
    );
    assert!(output.stderr.is_empty());
    Ok(())
}

#[test]
fn accepts_input_without_trailing_newline() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli(b"Bounds   : 0, pi\nFunction : sin(x)")?;
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "\\int_{0}^{\\pi} \\sin{\\left(x \\right)} \\mathrm{d}x\n"
    );
    Ok(())
}

#[test]
fn rejects_a_wrong_bounds_prefix() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "Bounds: 0, 1\nFunction : x\n",
        "Invalid input format. Expected 'Bounds   : ...'",
    )
}

#[test]
fn rejects_a_wrong_function_prefix() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "Bounds   : 0, 1\nFunction: x\n",
        "Invalid input format. Expected 'Function : ...'",
    )
}

#[test]
fn rejects_malformed_bounds() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "Bounds   : 0,1\nFunction : x\n",
        "Invalid bounds format. Expected 'a, b'",
    )?;
    expect_failure(
        "Bounds   : 0, 1, 2\nFunction : x\n",
        "Invalid bounds format. Expected 'a, b'",
    )
}

#[test]
fn reports_missing_lines() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure("", "Input ended unexpectedly.")?;
    expect_failure("Bounds   : 0, 1\n", "Input ended unexpectedly.")
}

#[test]
fn reports_value_errors() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "Bounds   : 0, 1\nFunction : x*y\n",
        "Value error: the function may only depend on x, found y",
    )?;
    let output = run_cli(b"Bounds   : 0, 1\nFunction : sin(\n")?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Value error: "));
    Ok(())
}

#[test]
fn reports_a_dangling_power_operator() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli(b"Bounds   : 0, 1\nFunction : x**\n")?;
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Value error: "));
    Ok(())
}

#[test]
fn reports_indeterminate_forms() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "Bounds   : 0, oo - oo\nFunction : x\n",
        "Value error: indeterminate form in 'oo - oo'",
    )?;
    expect_failure(
        "Bounds   : 0, 1\nFunction : 0*oo\n",
        "Value error: indeterminate form in '0*oo'",
    )
}

#[test]
fn keeps_generated_integrands_factored() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli(b"Bounds   : 0, 1\nFunction : (x+1)**64*(x+2)\n")?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r"\left(x + 1\right)^{64}"), "{stdout}");
    Ok(())
}

#[test]
fn reports_attribute_errors() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "Bounds   : 0, 1\nFunction : x, x\n",
        "Attribute error: a tuple of 2 elements is not a scalar expression",
    )
}

#[test]
fn reports_undecodable_input() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli(b"Bounds   : 0, \xff\nFunction : x\n")?;
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error processing input: "));
    Ok(())
}

#[cfg(unix)]
#[test]
fn reports_an_interrupt_while_waiting_for_input() -> Result<(), Box<dyn std::error::Error>> {
    use std::thread;
    use std::time::Duration;

    let mut child = Command::new(env!("CARGO_BIN_EXE_integral-tex"))
        .env_remove("INTEGRAL_TEX_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    // Keep stdin open so the binary blocks on the first line.
    let stdin = child.stdin.take();
    thread::sleep(Duration::from_millis(500));

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()?;
    assert!(status.success());

    let output = child.wait_with_output()?;
    drop(stdin);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "Process interrupted by user.\n"
    );
    Ok(())
}
