use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use curlir::{CurlParser, ParseOutput, Request, SupportedOptions, request::Body};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Part {
    Method,
    Url,
    Header,
    Data,
    Query,
    Auth,
    Warnings,
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn cli() -> Command {
    Command::new("curlir")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parses curl commands into a normalized request description")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("parse")
                .about("Parses a curl command")
                .arg(
                    Arg::new("command")
                        .help("The input curl command string")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("part")
                        .short('p')
                        .long("part")
                        .value_name("PART")
                        .help("Only print one part of the parsed requests")
                        .value_parser(clap::value_parser!(Part)),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print JSON instead of text")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("supported")
                        .long("supported")
                        .value_name("OPTIONS")
                        .help("Comma-separated curl options the target supports, e.g. url,header,data")
                        .value_delimiter(',')
                        .action(ArgAction::Append),
                ),
        )
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let result = match matches.subcommand() {
        Some(("parse", sub_matches)) => parse(sub_matches),
        _ => cli().print_help().map_err(Into::into),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn parse(matches: &ArgMatches) -> CliResult<()> {
    let command = matches
        .get_one::<String>("command")
        .ok_or("missing curl command")?;
    let mut parser = CurlParser::new();
    if let Some(names) = matches.get_many::<String>("supported") {
        parser = parser.with_supported(SupportedOptions::from_names(names)?);
    }
    let output = parser.parse(command)?;
    tracing::debug!(requests = output.requests.len(), "parsed command");

    let part = matches.get_one::<Part>("part").copied();
    if part != Some(Part::Warnings) {
        for warning in output.warnings.iter() {
            eprintln!("warning [{}]: {}", warning.code, warning.message);
        }
    }
    if matches.get_flag("json") {
        let json = match part {
            Some(part) => part_json(&output, part)?,
            None => serde_json::to_value(&output)?,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    match part {
        Some(part) => print_part(&output, part),
        None => {
            for request in &output.requests {
                for part in [Part::Method, Part::Header, Part::Data] {
                    print_request_part(request, part);
                }
            }
        }
    }
    Ok(())
}

fn part_json(output: &ParseOutput, part: Part) -> serde_json::Result<serde_json::Value> {
    if part == Part::Warnings {
        return serde_json::to_value(&output.warnings);
    }
    let values = output
        .requests
        .iter()
        .map(|request| match part {
            Part::Header => serde_json::to_value(&request.headers),
            Part::Data => serde_json::to_value(&request.body),
            _ => serde_json::to_value(
                request
                    .urls
                    .iter()
                    .map(|url| match part {
                        Part::Method => serde_json::to_value(&url.method),
                        Part::Query => serde_json::to_value(&url.query_list),
                        Part::Auth => serde_json::to_value(&url.auth),
                        _ => serde_json::to_value(&url.url),
                    })
                    .collect::<serde_json::Result<Vec<_>>>()?,
            ),
        })
        .collect::<serde_json::Result<Vec<_>>>()?;
    Ok(serde_json::Value::Array(values))
}

fn print_part(output: &ParseOutput, part: Part) {
    if part == Part::Warnings {
        for warning in output.warnings.iter() {
            println!("{}: {}", warning.code, warning.message);
        }
        return;
    }
    for request in &output.requests {
        print_request_part(request, part);
    }
}

fn print_request_part(request: &Request, part: Part) {
    match part {
        Part::Method => {
            for url in &request.urls {
                println!("{} {}", url.method, url.url);
            }
        }
        Part::Url => {
            for url in &request.urls {
                println!("{}", url.url);
            }
        }
        Part::Header => {
            for (name, value) in &request.headers {
                match value {
                    Some(value) => println!("{name}: {value}"),
                    None => println!("{name}:"),
                }
            }
        }
        Part::Data => match &request.body {
            Body::None => {}
            Body::Raw(data) => println!("{data}"),
            Body::FormParts(_) => {
                if let Some(data) = &request.data {
                    println!("{data}");
                }
            }
            Body::Multipart(parts) => {
                for part in parts {
                    println!("{}: {:?}", part.name, part.content);
                }
            }
        },
        Part::Query => {
            for url in &request.urls {
                for (key, value) in url.query_list.iter().flatten() {
                    println!("{key}={value}");
                }
            }
        }
        Part::Auth => {
            for url in &request.urls {
                if let Some((user, password)) = &url.auth {
                    println!("{:?} {user}:{password}", request.auth_type);
                }
            }
        }
        Part::Warnings => {}
    }
}
