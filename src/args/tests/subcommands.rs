use super::*;

#[test]
fn parse_orchestrator_defaults() -> AppResult<()> {
    let cli = Cli::try_parse_from(["swarmbench", "orchestrator"])?;
    match cli.command {
        Command::Orchestrator(args) => {
            if args.listen != "0.0.0.0:3000" {
                return Err(AppError::validation(format!(
                    "Unexpected listen: {}",
                    args.listen
                )));
            }
            if args.max_per_container.get() != 100 {
                return Err(AppError::validation("Unexpected max per container"));
            }
            if args.storage != StorageBackend::Memory || args.container != ContainerBackend::Process
            {
                return Err(AppError::validation("Unexpected backend defaults"));
            }
            if args.public_url.is_some() || args.config.is_some() {
                return Err(AppError::validation("Optional flags should default to None"));
            }
            Ok(())
        }
        Command::Runner(_) | Command::Local(_) => {
            Err(AppError::validation("Expected orchestrator subcommand"))
        }
    }
}

#[test]
fn parse_orchestrator_flags() -> AppResult<()> {
    let cli = Cli::try_parse_from([
        "swarmbench",
        "--verbose",
        "orchestrator",
        "--listen",
        "127.0.0.1:4000",
        "--max-per-container",
        "2",
        "--storage",
        "sqlite",
        "--container",
        "none",
    ])?;
    if !cli.verbose {
        return Err(AppError::validation("Expected verbose"));
    }
    match cli.command {
        Command::Orchestrator(args) => {
            if args.max_per_container.get() != 2
                || args.storage != StorageBackend::Sqlite
                || args.container != ContainerBackend::None
                || args.listen != "127.0.0.1:4000"
            {
                return Err(AppError::validation(format!("Unexpected args: {:?}", args)));
            }
            Ok(())
        }
        Command::Runner(_) | Command::Local(_) => {
            Err(AppError::validation("Expected orchestrator subcommand"))
        }
    }
}

#[test]
fn parse_orchestrator_rejects_zero_max_per_container() -> AppResult<()> {
    let result = Cli::try_parse_from(["swarmbench", "orchestrator", "--max-per-container", "0"]);
    if result.is_ok() {
        return Err(AppError::validation("Expected max-per-container 0 to fail"));
    }
    Ok(())
}

#[test]
fn parse_runner_flags() -> AppResult<()> {
    let cli = Cli::try_parse_from([
        "swarmbench",
        "runner",
        "--concurrency",
        "3",
        "--url",
        "http://localhost/{random}",
        "--duration",
        "500ms",
        "--timeout",
        "0",
        "--run-id",
        "run-1",
        "--runner-id",
        "task-1",
        "--api-url",
        "http://127.0.0.1:3000",
        "--startup-delay",
        "0s",
    ])?;
    match cli.command {
        Command::Runner(args) => {
            if args.concurrency.get() != 3 || args.duration != Duration::from_millis(500) {
                return Err(AppError::validation("Unexpected concurrency/duration"));
            }
            if !args.timeout.is_zero() || !args.startup_delay.is_zero() {
                return Err(AppError::validation("Zero timeout and delay should parse"));
            }
            if args.poll_interval != Duration::from_secs(1) || args.barrier_timeout.is_some() {
                return Err(AppError::validation("Unexpected barrier defaults"));
            }
            if args.random_max != 5_000_000 {
                return Err(AppError::validation("Unexpected random max"));
            }
            Ok(())
        }
        Command::Orchestrator(_) | Command::Local(_) => {
            Err(AppError::validation("Expected runner subcommand"))
        }
    }
}

#[test]
fn parse_local_short_flags() -> AppResult<()> {
    let cli = Cli::try_parse_from([
        "swarmbench",
        "local",
        "-c",
        "2",
        "-d",
        "1s",
        "-t",
        "50ms",
        "-u",
        "http://localhost",
    ])?;
    match cli.command {
        Command::Local(args) => {
            if args.concurrency.get() != 2
                || args.duration != Duration::from_secs(1)
                || args.timeout != Duration::from_millis(50)
                || args.url != "http://localhost"
            {
                return Err(AppError::validation(format!("Unexpected args: {:?}", args)));
            }
            Ok(())
        }
        Command::Orchestrator(_) | Command::Runner(_) => {
            Err(AppError::validation("Expected local subcommand"))
        }
    }
}
