use std::io::Write;
use std::path::{Path, PathBuf};

use config::{Config, Format, LoadError};
use resolver::{HostName, Lookup, SystemResolver};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::AppError;

/// Which records a lookup asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Ip,
    NameServers,
}

impl Query {
    fn kind(self) -> &'static str {
        match self {
            Query::Ip => "ip",
            Query::NameServers => "ns",
        }
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    host: &'a str,
    kind: &'static str,
    records: &'a [String],
}

/// Loads the config named on the command line, or the default one.
///
/// Without a home directory there is no default file, so defaults apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, AppError> {
    match path {
        Some(path) => Ok(config::load_from_path(path)?),
        None => match config::load() {
            Err(LoadError::NoHomeDir) => {
                debug!("no home directory, using default config");
                Ok(Config::default())
            }
            result => Ok(result?),
        },
    }
}

/// Picks the host: flag first, then config, then [`Config::DEFAULT_HOST`].
pub fn select_host(flag: Option<HostName>, config: &Config) -> Result<HostName, AppError> {
    if let Some(host) = flag {
        return Ok(host);
    }

    let raw = config.host_or_default();
    raw.parse().map_err(|source| AppError::ConfigHost {
        host: raw.to_string(),
        source,
    })
}

/// Runs one lookup and writes its records to `out`.
///
/// Nothing is written when the lookup fails.
pub fn lookup<L, W>(
    resolver: &L,
    query: Query,
    host: &HostName,
    format: Format,
    out: &mut W,
) -> Result<(), AppError>
where
    L: Lookup + ?Sized,
    W: Write,
{
    let records: Box<dyn Iterator<Item = String>> = match query {
        Query::Ip => Box::new(resolver.lookup_ip(host)?.map(|ip| ip.to_string())),
        Query::NameServers => Box::new(resolver.lookup_ns(host)?.into_iter()),
    };

    match format {
        Format::Text => {
            for record in records {
                writeln!(out, "{record}")?;
            }
        }
        Format::Json => {
            let records: Vec<String> = records.collect();
            let report = Report {
                host: host.as_str(),
                kind: query.kind(),
                records: &records,
            };
            serde_json::to_writer(&mut *out, &report)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Entry point for `ip` and `servidores`.
pub fn run_lookup<W: Write>(
    query: Query,
    host: Option<HostName>,
    format: Option<Format>,
    config_path: Option<&Path>,
    out: &mut W,
) -> Result<(), AppError> {
    let config = load_config(config_path)?;
    let host = select_host(host, &config)?;
    let format = format.unwrap_or_else(|| config.format_or_default());

    let resolver = SystemResolver::with_overrides(config.nameserver_addr(), config.timeout());

    info!(%host, ?query, "looking up");
    lookup(&resolver, query, &host, format, out)
}

fn target_path(config_path: Option<&Path>) -> Result<PathBuf, AppError> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(config::config_path().ok_or(LoadError::NoHomeDir)?),
    }
}

/// `config path`: prints where the config file lives.
pub fn print_config_path<W: Write>(
    config_path: Option<&Path>,
    out: &mut W,
) -> Result<(), AppError> {
    let path = target_path(config_path)?;
    writeln!(out, "{}", path.display())?;
    Ok(())
}

/// `config init`: writes the default config unless one exists, then prints its path.
pub fn init_config<W: Write>(config_path: Option<&Path>, out: &mut W) -> Result<(), AppError> {
    let path = target_path(config_path)?;

    if config::ensure_config_exists_at(&path)? {
        info!(path = %path.display(), "wrote default config");
    } else {
        info!(path = %path.display(), "config already exists");
    }

    writeln!(out, "{}", path.display())?;
    Ok(())
}
