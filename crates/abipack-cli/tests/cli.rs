use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};

use abipack_contracts::{
    ABIPACK_COERCE_REPORT_SCHEMA_VERSION, ABIPACK_FUNCTION_REF_REPORT_SCHEMA_VERSION,
    ABIPACK_METHODS_REPORT_SCHEMA_VERSION,
};
use serde_json::{json, Value};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_dir(prefix: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = base.join(format!("{prefix}_{pid}_{n}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

const ABI_JSON: &str = r#"[
    {
        "type": "function",
        "name": "setLimit",
        "inputs": [
            {"name": "owner", "type": "address"},
            {"name": "limit", "type": "uint24"},
            {
                "name": "opts",
                "type": "tuple",
                "components": [
                    {"name": "enabled", "type": "bool"},
                    {"name": "tag", "type": "bytes4"}
                ]
            }
        ],
        "outputs": []
    },
    {
        "type": "function",
        "name": "transfer",
        "inputs": [
            {"name": "to", "type": "address"},
            {"name": "amount", "type": "uint256"}
        ],
        "outputs": [{"name": "", "type": "bool"}]
    },
    {"type": "event", "name": "Transfer", "inputs": []}
]"#;

const OWNER: &str = "0xd33258f4b6d2a1136b2a3e771b51a2f7d593be42";

fn write_abi(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("abi.json");
    std::fs::write(&path, ABI_JSON).expect("write abi");
    path
}

fn run(args: &[&std::ffi::OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_abipack"))
        .args(args)
        .output()
        .expect("run abipack")
}

fn report(out: &Output) -> Value {
    serde_json::from_slice(&out.stdout).unwrap_or_else(|err| {
        panic!(
            "parse report json: {err}\nstdout={}\nstderr={}",
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        )
    })
}

#[test]
fn coerce_report_lists_typed_args() {
    let dir = temp_dir("abipack_cli_coerce");
    let abi = write_abi(&dir);
    let input = dir.join("input.json");
    std::fs::write(
        &input,
        serde_json::to_vec(&json!({
            "Owner": OWNER,
            "limit": "0x10",
            "opts": {"enabled": "true", "tag": "0xdeadbeef"}
        }))
        .unwrap(),
    )
    .expect("write input");

    let out = run(&[
        "coerce".as_ref(),
        "--abi".as_ref(),
        abi.as_os_str(),
        "--method".as_ref(),
        "setLimit".as_ref(),
        "--input".as_ref(),
        input.as_os_str(),
    ]);
    assert!(
        out.status.success(),
        "status={}\nstderr={}",
        out.status,
        String::from_utf8_lossy(&out.stderr)
    );

    let v = report(&out);
    assert_eq!(
        v.get("schema_version").and_then(|s| s.as_str()),
        Some(ABIPACK_COERCE_REPORT_SCHEMA_VERSION)
    );
    assert_eq!(v.get("ok").and_then(|b| b.as_bool()), Some(true));
    assert_eq!(
        v["method"]["signature"].as_str(),
        Some("setLimit(address,uint24,(bool,bytes4))")
    );
    assert_eq!(v["args"][0]["value"], json!(OWNER));
    assert_eq!(v["args"][1]["type"], json!("uint24"));
    assert_eq!(v["args"][1]["value"], json!("16"));
    assert_eq!(v["args"][2]["value"], json!([true, "0xdeadbeef"]));
}

#[test]
fn coerce_failure_reports_code_and_path() {
    let dir = temp_dir("abipack_cli_coerce_fail");
    let abi = write_abi(&dir);
    let input = dir.join("input.json");
    std::fs::write(
        &input,
        serde_json::to_vec(&json!({
            "owner": OWNER,
            "limit": 1 << 24,
            "opts": {"enabled": true, "tag": "0xdeadbeef"}
        }))
        .unwrap(),
    )
    .expect("write input");

    let out = run(&[
        "coerce".as_ref(),
        "--abi".as_ref(),
        abi.as_os_str(),
        "--method".as_ref(),
        "setLimit".as_ref(),
        "--input".as_ref(),
        input.as_os_str(),
    ]);
    assert_eq!(out.status.code(), Some(1));

    let v = report(&out);
    assert_eq!(v.get("ok").and_then(|b| b.as_bool()), Some(false));
    assert_eq!(v["error"]["code"], json!("APK0210"));
    assert_eq!(v["error"]["kind"], json!("range_overflow"));
    assert_eq!(v["error"]["param"], json!("limit"));
    assert_eq!(v["error"]["path"], json!("limit"));
}

#[test]
fn coerce_unknown_method_is_a_report_not_a_crash() {
    let dir = temp_dir("abipack_cli_unknown");
    let abi = write_abi(&dir);
    let input = dir.join("input.json");
    std::fs::write(&input, "{}").expect("write input");

    let out = run(&[
        "coerce".as_ref(),
        "--abi".as_ref(),
        abi.as_os_str(),
        "--selector".as_ref(),
        "0x00000000".as_ref(),
        "--input".as_ref(),
        input.as_os_str(),
    ]);
    assert_eq!(out.status.code(), Some(1));
    let v = report(&out);
    assert_eq!(v["error"]["code"], json!("APK0001"));
}

#[test]
fn methods_lists_functions_with_selectors() {
    let dir = temp_dir("abipack_cli_methods");
    let abi = write_abi(&dir);

    let out = run(&["methods".as_ref(), "--abi".as_ref(), abi.as_os_str()]);
    assert!(out.status.success());

    let v = report(&out);
    assert_eq!(
        v.get("schema_version").and_then(|s| s.as_str()),
        Some(ABIPACK_METHODS_REPORT_SCHEMA_VERSION)
    );
    let methods = v["methods"].as_array().expect("methods array");
    assert_eq!(methods.len(), 2);
    let transfer = methods
        .iter()
        .find(|m| m["name"] == json!("transfer"))
        .expect("transfer listed");
    assert_eq!(transfer["signature"], json!("transfer(address,uint256)"));
    assert_eq!(transfer["selector"], json!("0xa9059cbb"));
}

#[test]
fn function_ref_from_selector_and_from_abi_agree() {
    let dir = temp_dir("abipack_cli_fref");
    let abi = write_abi(&dir);

    let direct = run(&[
        "function-ref".as_ref(),
        "--address".as_ref(),
        OWNER.as_ref(),
        "--selector".as_ref(),
        "a9059cbb".as_ref(),
    ]);
    assert!(
        direct.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&direct.stderr)
    );
    let v = report(&direct);
    assert_eq!(
        v.get("schema_version").and_then(|s| s.as_str()),
        Some(ABIPACK_FUNCTION_REF_REPORT_SCHEMA_VERSION)
    );
    let expected = format!("{OWNER}a9059cbb");
    assert_eq!(v["function_ref"], json!(expected));

    let via_abi = run(&[
        "function-ref".as_ref(),
        "--address".as_ref(),
        OWNER.as_ref(),
        "--method".as_ref(),
        "transfer".as_ref(),
        "--abi".as_ref(),
        abi.as_os_str(),
    ]);
    assert!(via_abi.status.success());
    assert_eq!(report(&via_abi)["function_ref"], json!(expected));
}

#[test]
fn function_ref_rejects_short_selector() {
    let out = run(&[
        "function-ref".as_ref(),
        "--address".as_ref(),
        OWNER.as_ref(),
        "--selector".as_ref(),
        "0xa9059c".as_ref(),
    ]);
    assert_eq!(out.status.code(), Some(1));
    let v = report(&out);
    assert_eq!(v["error"]["code"], json!("APK0400"));
}

#[test]
fn bad_abi_file_exits_with_context() {
    let dir = temp_dir("abipack_cli_bad_abi");
    let abi = dir.join("abi.json");
    std::fs::write(&abi, "{\"not\":\"an array\"}").expect("write abi");

    let out = run(&["methods".as_ref(), "--abi".as_ref(), abi.as_os_str()]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("load ABI"), "stderr={stderr}");
}

#[test]
fn coerce_keeps_wide_json_integers_exact() {
    let dir = temp_dir("abipack_cli_wide_int");
    let abi = write_abi(&dir);
    let input = dir.join("input.json");
    std::fs::write(
        &input,
        format!(r#"{{"to": "{OWNER}", "amount": 12345678901234567890123}}"#),
    )
    .expect("write input");

    let out = run(&[
        "coerce".as_ref(),
        "--abi".as_ref(),
        abi.as_os_str(),
        "--method".as_ref(),
        "transfer".as_ref(),
        "--input".as_ref(),
        input.as_os_str(),
    ]);
    assert!(
        out.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
    let v = report(&out);
    assert_eq!(v["args"][1]["value"], json!("12345678901234567890123"));
}
