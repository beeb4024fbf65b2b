use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use abipack::{function_ref, Abi, Address, DynamicValue, Method, SchemaProvider};
use abipack_contracts::{
    ABIPACK_COERCE_REPORT_SCHEMA_VERSION, ABIPACK_FUNCTION_REF_REPORT_SCHEMA_VERSION,
    ABIPACK_LOG_ENV, ABIPACK_METHODS_REPORT_SCHEMA_VERSION,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "abipack")]
#[command(about = "Coerce loosely-typed call arguments against a contract ABI.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Coerce one JSON input object into the typed arguments of a method.
    Coerce {
        #[arg(long, value_name = "PATH")]
        abi: PathBuf,
        #[command(flatten)]
        target: MethodTarget,
        /// JSON object keyed by parameter name ('-' reads stdin).
        #[arg(long, value_name = "PATH")]
        input: PathBuf,
    },
    /// List the functions of an ABI with their signatures and selectors.
    Methods {
        #[arg(long, value_name = "PATH")]
        abi: PathBuf,
    },
    /// Build a 24-byte external function reference (address ++ selector).
    FunctionRef {
        #[arg(long)]
        address: String,
        /// Four-byte selector as hex.
        #[arg(long, conflicts_with = "method")]
        selector: Option<String>,
        /// Take the selector from this method of --abi.
        #[arg(long, requires = "abi")]
        method: Option<String>,
        #[arg(long, value_name = "PATH")]
        abi: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct MethodTarget {
    /// Method name (overloads are suffixed 0, 1, ...).
    #[arg(long)]
    method: Option<String>,
    /// Four-byte method selector as hex.
    #[arg(long)]
    selector: Option<String>,
}

fn main() -> ExitCode {
    init_tracing();
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    if let Ok(filter) = EnvFilter::try_from_env(ABIPACK_LOG_ENV) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("tracing initialized");
    }
}

fn try_main() -> Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Command::Coerce { abi, target, input } => run_coerce(&abi, &target, &input),
        Command::Methods { abi } => run_methods(&abi),
        Command::FunctionRef {
            address,
            selector,
            method,
            abi,
        } => run_function_ref(&address, selector.as_deref(), method.as_deref(), abi.as_deref()),
    }
}

fn load_abi(path: &Path) -> Result<Abi> {
    let bytes = std::fs::read(path).with_context(|| format!("read ABI: {}", path.display()))?;
    Abi::from_json_slice(&bytes).with_context(|| format!("load ABI: {}", path.display()))
}

fn read_input(path: &Path) -> Result<DynamicValue> {
    let bytes = if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("read input from stdin")?;
        buf
    } else {
        std::fs::read(path).with_context(|| format!("read input: {}", path.display()))?
    };
    let v: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse input JSON: {}", path.display()))?;
    Ok(DynamicValue::from(v))
}

fn parse_hex_arg(flag: &str, s: &str) -> Result<Vec<u8>> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(digits).with_context(|| format!("{flag} must be hex: got {s:?}"))
}

fn method_json(m: &Method) -> Value {
    json!({
        "name": m.name,
        "signature": m.signature(),
        "selector": format!("0x{}", hex::encode(m.selector)),
    })
}

fn print_report(report: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(report).context("encode report JSON")?;
    println!("{text}");
    Ok(())
}

fn run_coerce(abi_path: &Path, target: &MethodTarget, input_path: &Path) -> Result<ExitCode> {
    let abi = load_abi(abi_path)?;
    let input = read_input(input_path)?;

    let method = match (&target.method, &target.selector) {
        (Some(name), _) => abi.method_by_name(name),
        (None, Some(sel)) => abi.method_by_selector(&parse_hex_arg("--selector", sel)?),
        (None, None) => anyhow::bail!("one of --method or --selector is required"),
    };
    let Some(method) = method else {
        let what = target
            .method
            .clone()
            .or_else(|| target.selector.clone())
            .unwrap_or_default();
        let err = abipack::Error::method_not_found(format!("{what:?}"));
        print_report(&json!({
            "schema_version": ABIPACK_COERCE_REPORT_SCHEMA_VERSION,
            "ok": false,
            "error": err.to_json(),
        }))?;
        return Ok(ExitCode::from(1));
    };

    match abipack::to_args(&method.inputs, &input) {
        Ok(args) => {
            let params: Vec<Value> = method
                .inputs
                .iter()
                .zip(&args)
                .map(|(p, v)| {
                    json!({
                        "name": p.name,
                        "type": p.ty.to_string(),
                        "value": v.to_json(),
                    })
                })
                .collect();
            print_report(&json!({
                "schema_version": ABIPACK_COERCE_REPORT_SCHEMA_VERSION,
                "ok": true,
                "method": method_json(method),
                "args": params,
            }))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::debug!(code = err.code(), "coerce failed");
            print_report(&json!({
                "schema_version": ABIPACK_COERCE_REPORT_SCHEMA_VERSION,
                "ok": false,
                "method": method_json(method),
                "error": err.to_json(),
            }))?;
            Ok(ExitCode::from(1))
        }
    }
}

fn run_methods(abi_path: &Path) -> Result<ExitCode> {
    let abi = load_abi(abi_path)?;
    let methods: Vec<Value> = abi.methods().map(method_json).collect();
    print_report(&json!({
        "schema_version": ABIPACK_METHODS_REPORT_SCHEMA_VERSION,
        "ok": true,
        "methods": methods,
    }))?;
    Ok(ExitCode::SUCCESS)
}

fn run_function_ref(
    address: &str,
    selector: Option<&str>,
    method: Option<&str>,
    abi_path: Option<&Path>,
) -> Result<ExitCode> {
    let address = Address::from_hex(address)
        .with_context(|| format!("--address must be 40 hex digits: got {address:?}"))?;
    let selector = match (selector, method, abi_path) {
        (Some(sel), _, _) => parse_hex_arg("--selector", sel)?,
        (None, Some(name), Some(path)) => {
            let abi = load_abi(path)?;
            let m = abi
                .method_by_name(name)
                .with_context(|| format!("method not found in {}: {name:?}", path.display()))?;
            m.selector.to_vec()
        }
        _ => anyhow::bail!("one of --selector or --method with --abi is required"),
    };

    match function_ref(&address, &selector) {
        Ok(fref) => {
            print_report(&json!({
                "schema_version": ABIPACK_FUNCTION_REF_REPORT_SCHEMA_VERSION,
                "ok": true,
                "function_ref": format!("0x{}", hex::encode(fref)),
            }))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            print_report(&json!({
                "schema_version": ABIPACK_FUNCTION_REF_REPORT_SCHEMA_VERSION,
                "ok": false,
                "error": err.to_json(),
            }))?;
            Ok(ExitCode::from(1))
        }
    }
}
