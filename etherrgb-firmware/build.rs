//! Build script for etherrgb-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time
//! - Generates `device_config.rs` with the validated settings as constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use etherrgb_protocol::{CommandCode, MAX_DATA_LEN};

const TRIGGERS: &[(&str, &str)] = &[
    ("none", "None"),
    ("rising", "Rising"),
    ("falling", "Falling"),
    ("change", "Change"),
    ("high", "High"),
    ("low", "Low"),
];

const MAX_INPUT_BINDINGS: usize = 4;

fn main() {
    setup_linker();
    let config = load_config();
    let device = validate_network(&config);
    let bindings = validate_inputs(&config);
    generate(&device, &bindings);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Print a boxed diagnostic and fail the build
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");
    if !config_path.exists() {
        fail(
            "device.toml not found",
            &["Create device.toml in the etherrgb-firmware directory".to_string()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read device.toml", &[e.to_string()]),
    };

    match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let lines: Vec<String> = e
                .to_string()
                .lines()
                .map(|line| {
                    if line.len() > 60 {
                        format!("{}...", &line[..57])
                    } else {
                        line.to_string()
                    }
                })
                .collect();
            fail("Invalid TOML syntax in device.toml", &lines);
        }
    }
}

struct Device {
    port: u16,
    ip: [u8; 4],
    subnet: [u8; 4],
    gateway: [u8; 4],
    mac: [u8; 6],
    serial_polls: u16,
    network_polls: u16,
}

struct Binding {
    trigger: &'static str,
    code: u8,
    data: Vec<u8>,
}

fn parse_octets<const N: usize>(s: &str, sep: char, radix: u32) -> Option<[u8; N]> {
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != N {
        return None;
    }
    let mut out = [0u8; N];
    for (byte, part) in out.iter_mut().zip(parts) {
        *byte = u8::from_str_radix(part.trim(), radix).ok()?;
    }
    Some(out)
}

fn get_u16(table: &toml::Table, section: &str, key: &str, default: u16, errors: &mut Vec<String>) -> u16 {
    match table.get(key) {
        None => default,
        Some(toml::Value::Integer(v)) if (0..=u16::MAX as i64).contains(v) => *v as u16,
        Some(_) => {
            errors.push(format!("[{}] {} must be 0-65535", section, key));
            default
        }
    }
}

fn get_octets<const N: usize>(
    table: &toml::Table,
    key: &str,
    sep: char,
    radix: u32,
    errors: &mut Vec<String>,
) -> [u8; N] {
    match table.get(key) {
        Some(toml::Value::String(s)) => parse_octets(s, sep, radix).unwrap_or_else(|| {
            errors.push(format!("[network] invalid {} '{}'", key, s));
            [0; N]
        }),
        Some(_) => {
            errors.push(format!("[network] {} must be a string", key));
            [0; N]
        }
        None => {
            errors.push(format!("[network] missing '{}'", key));
            [0; N]
        }
    }
}

fn validate_network(config: &toml::Value) -> Device {
    let mut errors = Vec::new();
    let empty = toml::Table::new();

    let network = match config.get("network") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => fail("Invalid device.toml", &["[network] must be a table".to_string()]),
        None => fail("Invalid device.toml", &["Missing [network] section".to_string()]),
    };
    let timeouts = match config.get("timeouts") {
        Some(toml::Value::Table(t)) => t,
        _ => &empty,
    };

    let port = get_u16(network, "network", "port", 1234, &mut errors);
    if port == 0 {
        errors.push("[network] port must not be 0".to_string());
    }

    let device = Device {
        port,
        ip: get_octets(network, "ip", '.', 10, &mut errors),
        subnet: get_octets(network, "subnet", '.', 10, &mut errors),
        gateway: get_octets(network, "gateway", '.', 10, &mut errors),
        mac: get_octets(network, "mac", ':', 16, &mut errors),
        serial_polls: get_u16(timeouts, "timeouts", "serial_polls", u16::MAX, &mut errors),
        network_polls: get_u16(timeouts, "timeouts", "network_polls", u16::MAX, &mut errors),
    };

    if device.serial_polls == 0 || device.network_polls == 0 {
        errors.push("[timeouts] poll thresholds must be at least 1".to_string());
    }
    if device.ip == [0xFF; 4] {
        errors.push("[network] ip 255.255.255.255 marks an erased store".to_string());
    }

    if !errors.is_empty() {
        fail("Invalid network configuration", &errors);
    }
    device
}

fn validate_inputs(config: &toml::Value) -> Vec<Binding> {
    let inputs = match config.get("input") {
        None => return Vec::new(),
        Some(toml::Value::Array(a)) => a,
        Some(_) => fail("Invalid device.toml", &["[[input]] must be an array of tables".to_string()]),
    };

    let mut errors = Vec::new();
    if inputs.len() > MAX_INPUT_BINDINGS {
        errors.push(format!("at most {} [[input]] entries", MAX_INPUT_BINDINGS));
    }

    let mut bindings = Vec::new();
    for (i, input) in inputs.iter().enumerate() {
        let Some(input) = input.as_table() else {
            errors.push(format!("input {} must be a table", i));
            continue;
        };

        let trigger = match input.get("trigger") {
            Some(toml::Value::String(name)) => {
                match TRIGGERS.iter().find(|(key, _)| *key == name.as_str()) {
                    Some((_, variant)) => *variant,
                    None => {
                        errors.push(format!("input {} unknown trigger '{}'", i, name));
                        continue;
                    }
                }
            }
            Some(_) => {
                errors.push(format!("input {} trigger must be a string", i));
                continue;
            }
            None => {
                errors.push(format!("input {} missing 'trigger'", i));
                continue;
            }
        };

        if trigger == "None" {
            bindings.push(Binding {
                trigger,
                code: 0,
                data: Vec::new(),
            });
            continue;
        }

        let code = match input.get("code") {
            Some(toml::Value::Integer(c)) => match u8::try_from(*c).ok().and_then(CommandCode::from_byte) {
                Some(code) => code,
                None => {
                    errors.push(format!("input {} unknown command code {:#04x}", i, c));
                    continue;
                }
            },
            _ => {
                errors.push(format!("input {} missing integer 'code'", i));
                continue;
            }
        };

        let data: Vec<u8> = match input.get("data") {
            None => Vec::new(),
            Some(toml::Value::Array(values)) => {
                let bytes: Vec<u8> = values
                    .iter()
                    .filter_map(|v| v.as_integer())
                    .filter(|v| (0..=255).contains(v))
                    .map(|v| v as u8)
                    .collect();
                if bytes.len() != values.len() {
                    errors.push(format!("input {} data must be bytes 0-255", i));
                    continue;
                }
                bytes
            }
            Some(_) => {
                errors.push(format!("input {} data must be an array", i));
                continue;
            }
        };

        let required = code.required_length() as usize;
        if data.len() != required || data.len() > MAX_DATA_LEN {
            errors.push(format!(
                "input {} {:?} needs {} data bytes, got {}",
                i,
                code,
                required,
                data.len()
            ));
            continue;
        }

        bindings.push(Binding {
            trigger,
            code: code.to_byte(),
            data,
        });
    }

    if !errors.is_empty() {
        fail("Invalid input configuration", &errors);
    }
    bindings
}

fn bytes(values: &[u8]) -> String {
    values
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn generate(device: &Device, bindings: &[Binding]) {
    let mut out = String::new();
    out.push_str("// Generated by build.rs from device.toml\n\n");
    out.push_str(&format!(
        "pub const DEVICE: DeviceConfig = DeviceConfig {{\n    \
            server_port: {},\n    \
            default_ip: [{}],\n    \
            subnet: [{}],\n    \
            gateway: [{}],\n    \
            mac: [{}],\n    \
            serial_timeout_polls: {},\n    \
            network_timeout_polls: {},\n\
        }};\n\n",
        device.port,
        bytes(&device.ip),
        bytes(&device.subnet),
        bytes(&device.gateway),
        bytes(&device.mac),
        device.serial_polls,
        device.network_polls,
    ));

    out.push_str(&format!(
        "pub const BINDINGS: [BindingConfig; {}] = [\n",
        MAX_INPUT_BINDINGS
    ));
    for slot in 0..MAX_INPUT_BINDINGS {
        match bindings.get(slot) {
            Some(b) if b.trigger != "None" => {
                let mut data = [0u8; MAX_DATA_LEN];
                data[..b.data.len()].copy_from_slice(&b.data);
                out.push_str(&format!(
                    "    BindingConfig {{ trigger: Trigger::{}, code: {:#04x}, data: [{}], data_len: {} }},\n",
                    b.trigger,
                    b.code,
                    bytes(&data),
                    b.data.len()
                ));
            }
            _ => out.push_str("    BindingConfig::unused(),\n"),
        }
    }
    out.push_str("];\n");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("device_config.rs"), out).unwrap();
}
