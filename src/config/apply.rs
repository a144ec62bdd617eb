use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{OrchestratorArgs, PositiveUsize};
use crate::error::ConfigError;

use super::types::ConfigFile;

/// Copies config values into `args` wherever the flag was not set on the
/// command line or through its environment variable.
///
/// # Errors
///
/// Returns an error when a config value is out of range.
pub fn apply_config(
    args: &mut OrchestratorArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> Result<(), ConfigError> {
    if !is_explicit(matches, "listen")
        && let Some(listen) = config.listen.clone()
    {
        args.listen = listen;
    }

    if !is_explicit(matches, "max_per_container")
        && let Some(max) = config.max_per_container
    {
        args.max_per_container = PositiveUsize::try_from(max).map_err(|err| {
            ConfigError::InvalidValue {
                field: "max_per_container",
                source: err,
            }
        })?;
    }

    if !is_explicit(matches, "public_url")
        && let Some(public_url) = config.public_url.clone()
    {
        args.public_url = Some(public_url);
    }

    if !is_explicit(matches, "storage")
        && let Some(storage) = config.storage
    {
        args.storage = storage;
    }

    if !is_explicit(matches, "sqlite_path")
        && let Some(path) = config.sqlite_path.clone()
    {
        args.sqlite_path = path;
    }

    if !is_explicit(matches, "container")
        && let Some(container) = config.container
    {
        args.container = container;
    }

    if !is_explicit(matches, "runner_binary")
        && let Some(binary) = config.runner_binary.clone()
    {
        args.runner_binary = Some(binary);
    }

    if !is_explicit(matches, "log_dir")
        && let Some(log_dir) = config.log_dir.clone()
    {
        args.log_dir = log_dir;
    }

    Ok(())
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

/// Base URL handed to runners for their callbacks.
///
/// An explicit public URL wins. Otherwise it is derived from the listen
/// address, with a wildcard host replaced by loopback.
///
/// # Errors
///
/// Returns an error when no URL can be derived from the listen address.
pub fn resolve_public_url(args: &OrchestratorArgs) -> Result<String, ConfigError> {
    if let Some(public_url) = args.public_url.as_deref() {
        return Ok(public_url.trim_end_matches('/').to_owned());
    }

    if let Ok(addr) = args.listen.parse::<SocketAddr>() {
        let host = match addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip @ (IpAddr::V4(_) | IpAddr::V6(_)) => ip,
        };
        return Ok(format!("http://{}", SocketAddr::new(host, addr.port())));
    }

    match args.listen.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
            Ok(format!("http://{}:{}", host, port))
        }
        Some(_) | None => Err(ConfigError::PublicUrlUnresolved {
            listen: args.listen.clone(),
        }),
    }
}
