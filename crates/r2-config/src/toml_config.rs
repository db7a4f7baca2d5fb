use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml::Value;

use crate::span_config::{PeLogLevels, R2Variant, SpanConfig};
use crate::span_state::SharedSpanConfig;

const EXPECTED_CONFIG_VERSION: &str = "1";

/// Build a `SharedSpanConfig` from a TOML document. Unknown top-level
/// fields are a hard configure failure, same as an unknown string
/// option in a freetdm-style option-parsing loop.
pub fn from_toml_str(toml_str: &str, span_id: r2_core::SpanId) -> Result<SharedSpanConfig, Box<dyn std::error::Error>> {
    let root: TomlSpanRoot = toml::from_str(toml_str)?;

    if root.config_version != EXPECTED_CONFIG_VERSION {
        return Err(format!("unrecognized config_version: {}, expected {}", root.config_version, EXPECTED_CONFIG_VERSION).into());
    }
    if !root.extra.is_empty() {
        return Err(format!("unknown configuration option(s): {:?}", sorted_keys(&root.extra)).into());
    }

    let mut cfg = SpanConfig::new(span_id, root.channel_count);

    if let Some(variant) = root.variant {
        cfg.variant = R2Variant::parse(&variant)?;
    }
    if let Some(category) = root.category {
        cfg.category = parse_category(&category)?;
    }
    if let Some(logdir) = root.logdir {
        cfg.logdir = PathBuf::from(logdir);
    }
    if let Some(logging) = root.logging {
        cfg.logging = PeLogLevels::parse(&logging)?;
    }
    cfg.advanced_protocol_file = root.advanced_protocol_file.map(PathBuf::from);
    if let Some(v) = root.max_ani {
        cfg.max_ani = v;
    }
    if let Some(v) = root.max_dnis {
        cfg.max_dnis = v;
    }
    cfg.mfback_timeout_ms = root.mfback_timeout;
    cfg.metering_pulse_timeout_ms = root.metering_pulse_timeout;
    if let Some(v) = root.mf_dump_size {
        cfg.mf_dump_size = v;
    }
    cfg.immediate_accept = root.immediate_accept.unwrap_or(false);
    cfg.skip_category = root.skip_category.unwrap_or(false);
    cfg.get_ani_first = root.get_ani_first.unwrap_or(false);
    cfg.call_files = root.call_files.unwrap_or(false);
    cfg.double_answer = root.double_answer.unwrap_or(false);
    cfg.charge_calls = root.charge_calls.unwrap_or(false);
    cfg.forced_release = root.forced_release.unwrap_or(false);
    cfg.allow_collect_calls = root.allow_collect_calls.unwrap_or(false);
    cfg.accept_on_offer = root.accept_on_offer.unwrap_or(false);

    cfg.validate()?;
    Ok(SharedSpanConfig::from_config(cfg))
}

pub fn from_reader<R: Read>(reader: R, span_id: r2_core::SpanId) -> Result<SharedSpanConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    BufReader::new(reader).read_to_string(&mut contents)?;
    from_toml_str(&contents, span_id)
}

pub fn from_file<P: AsRef<Path>>(path: P, span_id: r2_core::SpanId) -> Result<SharedSpanConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    from_reader(BufReader::new(f), span_id)
}

fn parse_category(name: &str) -> Result<r2_tal::CallerCategory, Box<dyn std::error::Error>> {
    use r2_tal::CallerCategory::*;
    Ok(match name.to_ascii_lowercase().as_str() {
        "national_subscriber" => NationalSubscriber,
        "national_priority" => NationalPriority,
        "international" => International,
        "international_priority" => InternationalPriority,
        "collect_call" => CollectCall,
        other => return Err(format!("unknown calling-party category: {other}").into()),
    })
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// Strict DTO mirroring the span configuration option table 1:1.
/// Extra/unrecognized fields are captured via `#[serde(flatten)]` and
/// rejected after deserialization, the same pattern applied to every
/// nested table below.
#[derive(Deserialize)]
struct TomlSpanRoot {
    config_version: String,
    channel_count: u32,

    variant: Option<String>,
    category: Option<String>,
    logdir: Option<String>,
    logging: Option<String>,
    advanced_protocol_file: Option<String>,

    max_ani: Option<usize>,
    max_dnis: Option<usize>,
    mfback_timeout: Option<u32>,
    metering_pulse_timeout: Option<u32>,
    mf_dump_size: Option<usize>,

    immediate_accept: Option<bool>,
    skip_category: Option<bool>,
    get_ani_first: Option<bool>,
    call_files: Option<bool>,
    double_answer: Option<bool>,
    charge_calls: Option<bool>,
    forced_release: Option<bool>,
    allow_collect_calls: Option<bool>,
    accept_on_offer: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let toml = r#"
            config_version = "1"
            channel_count = 4
        "#;
        let shared = from_toml_str(toml, r2_core::SpanId(1)).expect("minimal config should parse");
        assert_eq!(shared.config().channel_count, 4);
        assert_eq!(shared.config().max_ani, 10);
        assert_eq!(shared.config().max_dnis, 4);
    }

    #[test]
    fn rejects_unknown_top_level_option() {
        let toml = r#"
            config_version = "1"
            channel_count = 4
            bogus_option = true
        "#;
        assert!(from_toml_str(toml, r2_core::SpanId(1)).is_err());
    }

    #[test]
    fn rejects_unknown_variant() {
        let toml = r#"
            config_version = "1"
            channel_count = 4
            variant = "atlantis"
        "#;
        assert!(from_toml_str(toml, r2_core::SpanId(1)).is_err());
    }

    #[test]
    fn rejects_bad_config_version() {
        let toml = r#"
            config_version = "99"
            channel_count = 4
        "#;
        assert!(from_toml_str(toml, r2_core::SpanId(1)).is_err());
    }

    #[test]
    fn applies_explicit_options() {
        let toml = r#"
            config_version = "1"
            channel_count = 2
            variant = "brazil"
            logging = "debug,error"
            immediate_accept = true
            max_dnis = 6
        "#;
        let shared = from_toml_str(toml, r2_core::SpanId(2)).unwrap();
        let cfg = shared.config();
        assert_eq!(cfg.variant.name(), "brazil");
        assert!(cfg.logging.debug);
        assert!(cfg.logging.error);
        assert!(!cfg.logging.notice);
        assert!(cfg.immediate_accept);
        assert_eq!(cfg.max_dnis, 6);
    }
}
