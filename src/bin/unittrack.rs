//! Self-test runner. Exercises the tracker the way a test suite would and
//! deliberately fails one requirement, so a healthy build ends with exactly
//! one error.

use std::{env, process, rc::Rc};

use tracing_subscriber::EnvFilter;
use unittrack::{
    Registry, RunTracker, TrackerConfig, TrackerError, cli::CommandLineConfig, require,
};

const SOME_VALUE: i64 = 10;
const DEFAULT_VALUES: [i64; 7] = [0, 1, 2, 3, 4, 5, 6];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print!("{}", CommandLineConfig::help());
        return;
    }
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let cli = match CommandLineConfig::from_args(&arg_refs) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };
    let config = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };

    let registry = match self_tests(dummy_values(&cli.values)) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };

    println!("Executing all tests.");
    let mut tracker = RunTracker::new(config);
    registry.run(&mut tracker);
    println!();
    let errors = tracker.finish();
    if cli.summary {
        tracker.summary();
    }
    if !cli.strict {
        println!(
            "\nNote: test4 fails on purpose to exercise the failure path, so the error count should be 1.\n"
        );
    }
    process::exit(if errors == cli.expected_errors() { 0 } else { 1 });
}

fn load_config(cli: &CommandLineConfig) -> Result<TrackerConfig, TrackerError> {
    let base = match &cli.config_file {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };
    Ok(cli.apply(base.apply_env()?))
}

fn dummy_values(overrides: &[i64]) -> Rc<Vec<i64>> {
    let mut values = DEFAULT_VALUES.to_vec();
    for (slot, value) in values.iter_mut().skip(1).zip(overrides) {
        *slot = *value;
    }
    Rc::new(values)
}

fn some_value() -> i64 {
    SOME_VALUE
}

fn self_tests(values: Rc<Vec<i64>>) -> Result<Registry, TrackerError> {
    let first = Rc::clone(&values);
    let second = values;
    Registry::new()
        .case("test0", "Test verbose output.", |t| {
            t.set_verbose(true);
            require!(t, t.is_verbose());

            t.next_case("test1", "Test disabling verbose output.");
            t.set_verbose(false);
            require!(t, !t.is_verbose());

            t.next_case("test2", "Test enabling verbose output again.");
            t.set_verbose(true);
            require!(t, t.is_verbose());
        })?
        .case("test3", "Test require - case should pass.", |t| {
            require!(t, some_value() == SOME_VALUE);
            require!(t, t.error_count() == 0);

            t.next_case("test4", "Test require - case should fail.");
            require!(t, some_value() == SOME_VALUE + 1);
            require!(t, t.error_count() == 1);
        })?
        .case(
            "test5",
            "Test setting tolerance low - may report a 'too slow' case.",
            |t| {
                t.set_tolerance(0.01);
                require!(t, some_value() == SOME_VALUE);
            },
        )?
        .case(
            "test6",
            "Test disabling timing by setting tolerance to zero.",
            |t| {
                t.timings_off();
                require!(t, some_value() == SOME_VALUE);
            },
        )?
        .case(
            "test7",
            "Test enabling timing by setting tolerance back to non-zero.",
            |t| {
                t.timings_on();
                require!(t, some_value() == SOME_VALUE);
            },
        )?
        .case("test8", "Test displaying test case state.", |t| {
            let state = t.to_string();
            t.console_mut().out(format_args!("{state}"));
        })?
        .case("test9", "Dummy test 1 affected by value 1.", move |t| {
            t.timings_off();
            require!(t, first[1] == 1);
            require!(t, first[2] == 2);

            t.next_case("test10", "Dummy test 1 affected by value 2.");
            require!(t, first[2] == 2);
            require!(t, first[3] == 3);
        })?
        .case("test11", "Dummy test 2 affected by value 3.", move |t| {
            require!(t, second[3] == 3);
        })
}
