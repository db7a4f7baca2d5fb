use r2_core::ConfigError;
use r2_tal::CallerCategory;

/// Upper bound on timeslots per span. 31 usable timeslots on an E1
/// trunk (timeslot 0 carries framing, timeslot 16 often carries CAS
/// itself depending on signaling mode) plus a little headroom for
/// PRI-style layouts that don't reserve a slot.
pub const MAX_CHANNELS_PER_SPAN: u32 = 32;

/// PE variant selection (the `variant` option). Per-variant R2 tone/timer
/// tables are out of scope; this is just the set of names `configure`
/// recognizes before handing the string to the PE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum R2Variant {
    Itu,
    Argentina,
    Brazil,
    Chile,
    China,
    Colombia,
    CzechRepublic,
    Ecuador,
    Mexico,
    Philippines,
    Venezuela,
}

impl R2Variant {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        use R2Variant::*;
        Ok(match name.to_ascii_lowercase().as_str() {
            "itu" => Itu,
            "argentina" => Argentina,
            "brazil" => Brazil,
            "chile" => Chile,
            "china" => China,
            "colombia" => Colombia,
            "czech" | "czech_republic" => CzechRepublic,
            "ecuador" => Ecuador,
            "mexico" => Mexico,
            "philippines" => Philippines,
            "venezuela" => Venezuela,
            other => return Err(ConfigError::UnknownVariant(other.to_string())),
        })
    }

    pub fn name(&self) -> &'static str {
        use R2Variant::*;
        match self {
            Itu => "itu",
            Argentina => "argentina",
            Brazil => "brazil",
            Chile => "chile",
            China => "china",
            Colombia => "colombia",
            CzechRepublic => "czech_republic",
            Ecuador => "ecuador",
            Mexico => "mexico",
            Philippines => "philippines",
            Venezuela => "venezuela",
        }
    }
}

impl Default for R2Variant {
    fn default() -> Self {
        R2Variant::Itu
    }
}

/// `logging` option: a csv of levels, OR-combined into a mask. PE
/// uses this to decide what it writes to its own log file; it has no
/// bearing on this crate's own `tracing` output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeLogLevels {
    pub debug: bool,
    pub notice: bool,
    pub warning: bool,
    pub error: bool,
}

impl PeLogLevels {
    /// Default mask: `notice,warning,error`.
    pub fn default_mask() -> Self {
        Self { debug: false, notice: true, warning: true, error: true }
    }

    pub fn parse(csv: &str) -> Result<Self, ConfigError> {
        let mut mask = Self::default();
        mask = Self { debug: false, notice: false, warning: false, error: false };
        for level in csv.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match level.to_ascii_lowercase().as_str() {
                "debug" => mask.debug = true,
                "notice" => mask.notice = true,
                "warning" | "warn" => mask.warning = true,
                "error" => mask.error = true,
                other => return Err(ConfigError::Other(format!("unknown logging level: {other}"))),
            }
        }
        Ok(mask)
    }
}

/// The full span option table, immutable once `configure` succeeds.
#[derive(Debug, Clone)]
pub struct SpanConfig {
    pub span_id: r2_core::SpanId,
    pub channel_count: u32,

    pub variant: R2Variant,
    pub category: CallerCategory,
    pub logdir: std::path::PathBuf,
    pub logging: PeLogLevels,
    pub advanced_protocol_file: Option<std::path::PathBuf>,

    pub max_ani: usize,
    pub max_dnis: usize,
    pub mfback_timeout_ms: Option<u32>,
    pub metering_pulse_timeout_ms: Option<u32>,
    pub mf_dump_size: usize,

    pub immediate_accept: bool,
    pub skip_category: bool,
    pub get_ani_first: bool,
    pub call_files: bool,
    pub double_answer: bool,
    pub charge_calls: bool,
    pub forced_release: bool,
    pub allow_collect_calls: bool,
    pub accept_on_offer: bool,
}

impl SpanConfig {
    pub fn new(span_id: r2_core::SpanId, channel_count: u32) -> Self {
        Self {
            span_id,
            channel_count,
            variant: R2Variant::default(),
            category: CallerCategory::NationalSubscriber,
            logdir: platform_default_logdir(),
            logging: PeLogLevels::default_mask(),
            advanced_protocol_file: None,
            max_ani: 10,
            max_dnis: 4,
            mfback_timeout_ms: None,
            metering_pulse_timeout_ms: None,
            mf_dump_size: 0,
            immediate_accept: false,
            skip_category: false,
            get_ani_first: false,
            call_files: false,
            double_answer: false,
            charge_calls: false,
            forced_release: false,
            allow_collect_calls: false,
            accept_on_offer: false,
        }
    }

    /// Any failure tears down all partial allocations, starting here —
    /// `validate` is the gate `configure` runs before allocating
    /// anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_count == 0 || self.channel_count > MAX_CHANNELS_PER_SPAN {
            return Err(ConfigError::InvalidChannelCount);
        }
        if self.max_ani == 0 || self.max_dnis == 0 {
            return Err(ConfigError::Other("max_ani and max_dnis must be non-zero".into()));
        }
        Ok(())
    }
}

fn platform_default_logdir() -> std::path::PathBuf {
    if cfg!(target_os = "windows") {
        std::path::PathBuf::from(r"C:\freetdm\logs")
    } else {
        std::path::PathBuf::from("/var/log/r2-spand")
    }
}
