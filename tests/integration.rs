//! End-to-end tests for scripted sessions
//!
//! Each test plays a small console program against a script and checks
//! either that the session completes or the exact diagnostic it produces.

use std::cell::RefCell;
use std::io::{self, BufRead, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::rc::Rc;

use stdio_script::common::config::Config;
use stdio_script::common::{logging, paths};
use stdio_script::{Error, ErrorReporter, Failure, FailureKind, Scenario, Session};

/// Message carried by a panic raised by the default reporter
fn panic_message<T>(result: std::thread::Result<T>) -> String {
    match result {
        Ok(_) => panic!("expected a failure, but the call succeeded"),
        Err(payload) => match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => payload
                .downcast::<&str>()
                .map(|m| m.to_string())
                .unwrap_or_default(),
        },
    }
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Asks for a name, greets, shows a menu and waits for a choice
fn greeting_program(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<()> {
    writeln!(output, "What is your name?")?;
    let mut name = String::new();
    input.read_line(&mut name)?;
    let name = name.trim_end();
    writeln!(output, "Hello, {}!", name)?;

    writeln!(output, "1) Play")?;
    writeln!(output, "2) Quit")?;
    let mut choice = String::new();
    input.read_line(&mut choice)?;
    if choice.trim_end() == "2" {
        writeln!(output, "Bye, {}.", name)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output-only scripts
// ---------------------------------------------------------------------------

#[test]
fn test_matching_output_completes() {
    logging::init_test();

    let session = Session::new().expect_output("Test1").expect_output("Test2");

    let mut channels = session.start().unwrap();
    writeln!(channels.stdout, "Test1").unwrap();
    writeln!(channels.stdout, "Test2").unwrap();
    session.stop().unwrap();
}

#[test]
fn test_mismatch_reports_history_and_values() {
    logging::init_test();

    let session = Session::with_options(true, 5)
        .expect_output("Test1")
        .expect_output("Test2");

    let mut channels = session.start().unwrap();
    writeln!(channels.stdout, "Test1").unwrap();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = writeln!(channels.stdout, "Test3");
    }));
    session.stop().unwrap();

    assert_eq!(
        panic_message(result),
        "Last 5 lines were:\n\
         [OUT]: Test1(enter)\n\
         [OUT]: (enter)\n\
         [OUT]: Test3(enter)\n\
         [OUT]: (enter)\n \
         ==> expected: <Test2> but was: <Test3>"
    );
}

#[test]
fn test_program_ending_early_is_reported_at_stop() {
    logging::init_test();

    let session = Session::with_options(true, 5)
        .expect_output("Test1")
        .expect_output("Test2");

    let mut channels = session.start().unwrap();
    writeln!(channels.stdout, "Test1").unwrap();
    let result = panic::catch_unwind(AssertUnwindSafe(|| session.stop()));

    assert_eq!(
        panic_message(result),
        "Program finished too early. It should have printed 'Test2'. Last 5 lines were:\n\
         [OUT]: Test1(enter)\n\
         [OUT]: (enter)\n"
    );
    assert!(!session.is_active());
}

#[test]
#[should_panic(expected = "expected: <Test2> but was: <Test3>")]
fn test_default_reporter_fails_the_test() {
    let mut session = Session::new().expect_output("Test1").expect_output("Test2");
    let _ = session.run(|_, stdout| {
        writeln!(stdout, "Test1").unwrap();
        writeln!(stdout, "Test3").unwrap();
    });
}

#[test]
fn test_fails_exactly_once_at_the_diverging_line() {
    let failures = Rc::new(RefCell::new(Vec::<Failure>::new()));
    let sink = Rc::clone(&failures);

    let session = Session::with_options(false, 10)
        .reporter(move |failure: Failure| {
            sink.borrow_mut().push(failure.clone());
            failure
        })
        .expect_multi_line_output("one\ntwo\nthree\nfour");

    let mut channels = session.start().unwrap();
    let mut results = Vec::new();
    for line in ["one", "two", "drei", "four"] {
        results.push(writeln!(channels.stdout, "{}", line).is_ok());
    }

    assert_eq!(results, vec![true, true, false, true]);
    let failures = failures.borrow();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].message, "expected: <three> but was: <drei>");
    assert_eq!(session.cursor(), 4);
}

#[test]
fn test_write_granularity_does_not_matter() {
    let transcript = b"first\nsecond line\r\n\nlast\n";
    let script = || {
        Session::new()
            .reporter(ErrorReporter)
            .expect_output("first")
            .expect_output("second line")
            .expect_output("")
            .expect_output("last")
    };

    let whole = script();
    let mut channels = whole.start().unwrap();
    channels.stdout.write_all(transcript).unwrap();
    whole.stop().unwrap();

    let bytewise = script();
    let mut channels = bytewise.start().unwrap();
    for byte in transcript {
        channels.stdout.write_all(&[*byte]).unwrap();
    }
    bytewise.stop().unwrap();

    assert_eq!(whole.history_context(), bytewise.history_context());
}

#[test]
fn test_failure_stops_the_rest_of_the_chunk() {
    let checked = Rc::new(RefCell::new(Vec::<String>::new()));
    let seen = Rc::clone(&checked);

    let session = Session::with_options(false, 10)
        .reporter(ErrorReporter)
        .expect_output("good")
        .match_output(move |line| {
            seen.borrow_mut().push(line.to_string());
            true
        });

    let mut channels = session.start().unwrap();
    let err = channels.stdout.write_all(b"bad\nnext\n").unwrap_err();
    assert_eq!(
        Failure::from_io(&err).map(|f| f.kind),
        Some(FailureKind::Mismatch)
    );

    assert_eq!(session.cursor(), 1);
    assert!(checked.borrow().is_empty());
    let history = session.history_context();
    assert!(history.contains("[OUT]: bad(enter)"));
    assert!(!history.contains("next"));
}

#[test]
fn test_multi_line_expectation_collapses_trailing_breaks() {
    let session = Session::new().expect_multi_line_output("a\n\n");
    assert_eq!(session.len(), 2);

    let mut channels = session.start().unwrap();
    write!(channels.stdout, "a\n\n").unwrap();
    session.stop().unwrap();
}

#[test]
fn test_multi_line_expectation_with_trailing_break() {
    let session = Session::new().expect_multi_line_output("a\nb\n");
    assert_eq!(session.len(), 3);

    let mut channels = session.start().unwrap();
    writeln!(channels.stdout, "a\nb\n").unwrap();
    session.stop().unwrap();
}

#[test]
fn test_wildcards_consume_one_line_each() {
    let session = Session::new().expect_n_lines(3).expect_output("end");

    let mut channels = session.start().unwrap();
    write!(channels.stdout, "anything\n\n42\n").unwrap();
    assert_eq!(session.cursor(), 3);
    writeln!(channels.stdout, "end").unwrap();
    session.stop().unwrap();
}

#[test]
fn test_output_after_script_is_tolerated() {
    let session = Session::new().expect_output("result");

    let mut channels = session.start().unwrap();
    writeln!(channels.stdout, "result").unwrap();
    writeln!(channels.stdout, "Goodbye!").unwrap();
    session.stop().unwrap();
}

#[test]
fn test_predicate_transform_and_producer_outputs() {
    let session = Session::new()
        .match_output(|line| line.starts_with("Total: "))
        .expect_output_transformed(|line| line.to_uppercase())
        .expect_output_with(|| format!("{} items", 2 + 1));

    let mut channels = session.start().unwrap();
    writeln!(channels.stdout, "Total: 12").unwrap();
    writeln!(channels.stdout, "DONE").unwrap();
    writeln!(channels.stdout, "3 items").unwrap();
    session.stop().unwrap();
}

// ---------------------------------------------------------------------------
// Input and interleaving
// ---------------------------------------------------------------------------

#[test]
fn test_input_served_character_by_character() {
    let session = Session::new().simulate_input("Alice");
    let mut channels = session.start().unwrap();

    let mut byte = [0u8; 1];
    for expected in b"Alice" {
        channels.stdin.read_exact(&mut byte).unwrap();
        assert_eq!(byte[0], *expected);
        assert_eq!(session.cursor(), 0);
    }
    channels.stdin.read_exact(&mut byte).unwrap();
    assert_eq!(byte[0], b'\n');
    assert_eq!(session.cursor(), 1);

    session.stop().unwrap();
}

#[test]
fn test_interactive_program_completes() {
    logging::init_test();

    let mut session = Session::new()
        .write_log(true)
        .expect_output("What is your name?")
        .simulate_input("Alice")
        .expect_output("Hello, Alice!")
        .expect_multi_line_output("1) Play\n2) Quit")
        .simulate_input("2")
        .expect_output("Bye, Alice.");

    session
        .run(|stdin, stdout| greeting_program(stdin, stdout))
        .unwrap()
        .unwrap();
    assert_eq!(session.cursor(), session.len());
}

#[test]
fn test_write_when_script_expects_read() {
    let session = Session::new()
        .reporter(ErrorReporter)
        .simulate_input("42");

    let mut channels = session.start().unwrap();
    let err = writeln!(channels.stdout, "Enter a number:").unwrap_err();
    let failure = Failure::from_io(&err).unwrap();

    assert_eq!(failure.kind, FailureKind::ChannelOrder);
    assert_eq!(
        failure.message,
        "Last 10 lines were:\n\
         [OUT]: Enter a number:(enter)\n\
         [OUT]: (enter)\n \
         ==> expected: <[IN] 42> but was: <[OUT] Enter a number:>"
    );
}

#[test]
fn test_read_when_script_expects_write() {
    let session = Session::new().reporter(ErrorReporter).expect_output("Hi");

    let mut channels = session.start().unwrap();
    let mut line = String::new();
    let err = channels.stdin.read_line(&mut line).unwrap_err();
    let failure = Failure::from_io(&err).unwrap();

    assert_eq!(failure.kind, FailureKind::ChannelOrder);
    assert_eq!(failure.message, "expected: <[OUT] Hi> but was: <[IN] ...>");
}

#[test]
fn test_reading_past_the_script_is_an_overrun() {
    let session = Session::new().reporter(ErrorReporter).simulate_input("x");

    let mut channels = session.start().unwrap();
    let mut line = String::new();
    channels.stdin.read_line(&mut line).unwrap();
    assert_eq!(line, "x\n");

    let err = channels.stdin.read_line(&mut line).unwrap_err();
    let failure = Failure::from_io(&err).unwrap();
    assert_eq!(failure.kind, FailureKind::Overrun);
    assert_eq!(
        failure.message,
        "You have an extra [IN] that is not needed. Last 10 lines were:\n[IN]: x(enter)\n"
    );
}

#[test]
fn test_run_surfaces_failure_as_error() {
    let mut session = Session::new()
        .reporter(ErrorReporter)
        .expect_output("What is your name?")
        .simulate_input("Alice")
        .expect_output("Hi, Alice!");

    let err = session
        .run(|stdin, stdout| greeting_program(stdin, stdout))
        .unwrap_err();

    match err {
        Error::Failure(failure) => {
            assert_eq!(failure.kind, FailureKind::Mismatch);
            assert!(failure
                .message
                .ends_with("expected: <Hi, Alice!> but was: <Hello, Alice!>"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!session.is_active());
}

#[test]
fn test_predicate_panic_is_reported_as_mismatch() {
    let session = Session::with_options(false, 10)
        .reporter(ErrorReporter)
        .match_output(|line| {
            let n: u32 = line.parse().expect("line should be a number");
            n > 10
        });

    let mut channels = session.start().unwrap();
    let err = writeln!(channels.stdout, "ten").unwrap_err();
    let failure = Failure::from_io(&err).unwrap();

    assert_eq!(failure.kind, FailureKind::Mismatch);
    assert!(failure.message.starts_with("line should be a number"));
}

// ---------------------------------------------------------------------------
// Configuration and scenario files
// ---------------------------------------------------------------------------

#[test]
fn test_session_from_config() {
    let config = Config::from_toml_str("[session]\nverbose_errors = false\nhistory_capacity = 2\n")
        .unwrap();
    let session = Session::from_config(&config.session)
        .reporter(ErrorReporter)
        .expect_output("a");

    let mut channels = session.start().unwrap();
    let err = writeln!(channels.stdout, "b").unwrap_err();
    assert_eq!(
        Failure::from_io(&err).unwrap().message,
        "expected: <a> but was: <b>"
    );
}

#[test]
fn test_session_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[session]\nverbose_errors = false\n").unwrap();

    std::env::set_var(paths::CONFIG_ENV, &path);
    let session = Session::from_default_config();
    std::env::remove_var(paths::CONFIG_ENV);

    let session = session.unwrap().reporter(ErrorReporter).expect_output("a");
    let mut channels = session.start().unwrap();
    let err = writeln!(channels.stdout, "b").unwrap_err();
    assert_eq!(
        Failure::from_io(&err).unwrap().message,
        "expected: <a> but was: <b>"
    );
}

#[test]
fn test_yaml_scenario_drives_program() {
    let scenario = Scenario::load(&fixture("greeting.yaml")).unwrap();
    assert_eq!(scenario.history_capacity, 5);

    scenario
        .run(|stdin, stdout| greeting_program(stdin, stdout))
        .unwrap()
        .unwrap();
}

#[test]
fn test_json_scenario_drives_program() {
    let scenario = Scenario::load(&fixture("greeting.json")).unwrap();
    assert!(!scenario.verbose_errors);

    scenario
        .run(|stdin, stdout| greeting_program(stdin, stdout))
        .unwrap()
        .unwrap();
}
