use anyhow::{bail, Context};
use clap::{Arg, ArgAction, Command};
use contract_verifier::{
    fake_rest_api_registry, fake_rest_api_suite, ContractParser, SuiteCase, SuiteRunner, Verifier, VerifierConfig,
};
use log::info;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = Command::new("contract-verifier")
        .version(contract_verifier::VERSION)
        .about("Verify a REST API against declarative contracts")
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Base URL of the API under test")
                .default_value(contract_verifier::config::verifier_config::DEFAULT_BASE_URL),
        )
        .arg(
            Arg::new("timeout-ms")
                .short('t')
                .long("timeout-ms")
                .value_name("MILLIS")
                .help("Per-request timeout in milliseconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("30000"),
        )
        .arg(
            Arg::new("concurrency")
                .short('j')
                .long("concurrency")
                .value_name("N")
                .help("Maximum verifications in flight")
                .value_parser(clap::value_parser!(usize))
                .default_value("8"),
        )
        .arg(
            Arg::new("contracts")
                .long("contracts")
                .value_name("FILE")
                .help("Contract document (JSON, or YAML with yaml-support); defaults to the built-in catalog"),
        )
        .arg(
            Arg::new("suite")
                .long("suite")
                .value_name("FILE")
                .help("JSON array of suite cases; defaults to the built-in suite"),
        )
        .arg(
            Arg::new("resource")
                .short('r')
                .long("resource")
                .value_name("NAME")
                .help("Only run cases for this resource (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("header")
                .short('H')
                .long("header")
                .value_name("NAME:VALUE")
                .help("Extra header sent with every request (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the report as JSON")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let mut config = VerifierConfig::default()
        .with_timeout(Duration::from_millis(
            *matches.get_one::<u64>("timeout-ms").context("missing timeout")?,
        ))
        .with_max_concurrency(*matches.get_one::<usize>("concurrency").context("missing concurrency")?);
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url = base_url.clone();
    }
    for header in matches.get_many::<String>("header").into_iter().flatten() {
        let Some((name, value)) = header.split_once(':') else {
            bail!("header '{}' is not in NAME:VALUE form", header);
        };
        config = config.with_header(name.trim(), value.trim());
    }

    let registry = match matches.get_one::<String>("contracts") {
        Some(path) => ContractParser::from_file(path)
            .await
            .with_context(|| format!("loading contracts from {}", path))?
            .into_registry(),
        None => fake_rest_api_registry(),
    };

    let mut cases: Vec<SuiteCase> = match matches.get_one::<String>("suite") {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading suite {}", path))?;
            serde_json::from_str(&content).with_context(|| format!("parsing suite {}", path))?
        }
        None => fake_rest_api_suite(),
    };
    let resources: Vec<&String> = matches.get_many::<String>("resource").into_iter().flatten().collect();
    if !resources.is_empty() {
        cases.retain(|case| resources.iter().any(|r| r.as_str() == case.request.resource));
    }

    info!("Verifying {} cases against {}", cases.len(), config.base_url);
    let verifier = Arc::new(Verifier::with_http(Arc::new(registry), config)?);
    let report = SuiteRunner::new(verifier).run(cases).await;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
