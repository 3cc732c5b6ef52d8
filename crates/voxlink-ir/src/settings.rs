use std::fmt;

/// Lowest settable temperature in °C.
pub const MIN_TEMPERATURE: u8 = 17;
/// Highest settable temperature in °C.
pub const MAX_TEMPERATURE: u8 = 30;
/// Temperature used when a command does not set one.
pub const DEFAULT_TEMPERATURE: u8 = 26;

/// Fan speed. The code occupies the whole fan byte; the low five bits are a
/// timer field and are always zero here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FanSpeed {
    #[default]
    Auto,
    Low,
    Medium,
    High,
}

impl FanSpeed {
    pub fn code(self) -> u8 {
        match self {
            FanSpeed::Auto => 0xA0,
            FanSpeed::Low => 0xE0,
            FanSpeed::Medium => 0x80,
            FanSpeed::High => 0x40,
        }
    }

    /// Match a classifier token (`自动`/`auto`, `低`/`low`, `中`/`medium`,
    /// `高`/`high`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "自动" => Some(FanSpeed::Auto),
            "低" => Some(FanSpeed::Low),
            "中" => Some(FanSpeed::Medium),
            "高" => Some(FanSpeed::High),
            t if t.eq_ignore_ascii_case("auto") => Some(FanSpeed::Auto),
            t if t.eq_ignore_ascii_case("low") => Some(FanSpeed::Low),
            t if t.eq_ignore_ascii_case("medium") => Some(FanSpeed::Medium),
            t if t.eq_ignore_ascii_case("high") => Some(FanSpeed::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FanSpeed::Auto => "auto",
            FanSpeed::Low => "low",
            FanSpeed::Medium => "medium",
            FanSpeed::High => "high",
        }
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating mode, carried in the low nibble of the temperature byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Cool,
    Dehumidify,
    Fan,
    Auto,
    Heat,
}

impl Mode {
    /// Mode nibble. Dehumidify and Fan share a code in this protocol.
    pub fn nibble(self) -> u8 {
        match self {
            Mode::Cool => 0x0,
            Mode::Dehumidify | Mode::Fan => 0x4,
            Mode::Auto => 0x8,
            Mode::Heat => 0xC,
        }
    }

    /// Match a classifier token (`制冷`/`cool`, `除湿`/`dehumidify`,
    /// `送风`/`fan`, `自动`/`auto`, `制热`/`heat`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "制冷" => Some(Mode::Cool),
            "除湿" => Some(Mode::Dehumidify),
            "送风" => Some(Mode::Fan),
            "自动" => Some(Mode::Auto),
            "制热" => Some(Mode::Heat),
            t if t.eq_ignore_ascii_case("cool") => Some(Mode::Cool),
            t if t.eq_ignore_ascii_case("dehumidify") => Some(Mode::Dehumidify),
            t if t.eq_ignore_ascii_case("fan") => Some(Mode::Fan),
            t if t.eq_ignore_ascii_case("auto") => Some(Mode::Auto),
            t if t.eq_ignore_ascii_case("heat") => Some(Mode::Heat),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Cool => "cool",
            Mode::Dehumidify => "dehumidify",
            Mode::Fan => "fan",
            Mode::Auto => "auto",
            Mode::Heat => "heat",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Temperature nibble for 17..=30 °C. The codes are not monotonic.
pub fn temperature_nibble(celsius: u8) -> Option<u8> {
    let nibble = match celsius {
        17 => 0x0,
        18 => 0x1,
        19 => 0x3,
        20 => 0x2,
        21 => 0x6,
        22 => 0x7,
        23 => 0x5,
        24 => 0x4,
        25 => 0xC,
        26 => 0xD,
        27 => 0x9,
        28 => 0x8,
        29 => 0xA,
        30 => 0xB,
        _ => return None,
    };
    Some(nibble)
}

/// What a command's `value` turned out to mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedAttribute {
    /// A temperature within 17..=30 °C.
    Temperature(u8),
    Fan(FanSpeed),
    Mode(Mode),
    /// All digits, but not a settable temperature. Nothing is changed.
    OutOfRange,
    /// Matches no vocabulary. Nothing is changed.
    Unrecognized,
}

impl ResolvedAttribute {
    /// Classify a token. Digits are tried first, then fan words, then mode
    /// words, so a shared word like `auto` is a fan speed.
    pub fn resolve(token: &str) -> Self {
        let token = token.trim();
        if let Some(digits) = decimal_digits(token) {
            return match digits.parse::<u8>() {
                Ok(t) if (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&t) => {
                    ResolvedAttribute::Temperature(t)
                }
                _ => ResolvedAttribute::OutOfRange,
            };
        }
        if let Some(fan) = FanSpeed::from_token(token) {
            return ResolvedAttribute::Fan(fan);
        }
        if let Some(mode) = Mode::from_token(token) {
            return ResolvedAttribute::Mode(mode);
        }
        ResolvedAttribute::Unrecognized
    }
}

/// ASCII form of a token made only of ASCII or full-width (`０`-`９`)
/// digits.
fn decimal_digits(token: &str) -> Option<String> {
    if token.is_empty() {
        return None;
    }
    token
        .chars()
        .map(|c| match c {
            '0'..='9' => Some(c),
            '０'..='９' => char::from_digit(u32::from(c) - u32::from('０'), 10),
            _ => None,
        })
        .collect()
}

/// The full state an IR frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrSettings {
    pub temperature: u8,
    pub mode: Mode,
    pub fan: FanSpeed,
}

impl IrSettings {
    /// Apply one attribute. Out-of-range and unrecognized values leave the
    /// settings untouched.
    pub fn apply(&mut self, attribute: ResolvedAttribute) {
        match attribute {
            ResolvedAttribute::Temperature(t) => self.temperature = t,
            ResolvedAttribute::Fan(fan) => self.fan = fan,
            ResolvedAttribute::Mode(mode) => self.mode = mode,
            ResolvedAttribute::OutOfRange | ResolvedAttribute::Unrecognized => {}
        }
    }

    /// Temperature/mode byte: temperature nibble high, mode nibble low.
    ///
    /// A temperature outside the table falls back to the default's code.
    pub fn temp_mode_byte(&self) -> u8 {
        let temp = temperature_nibble(self.temperature)
            .or_else(|| temperature_nibble(DEFAULT_TEMPERATURE))
            .unwrap_or(0xD);
        (temp << 4) | self.mode.nibble()
    }
}

impl Default for IrSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            mode: Mode::Cool,
            fan: FanSpeed::Auto,
        }
    }
}

impl fmt::Display for IrSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}°C mode={} fan={}",
            self.temperature, self.mode, self.fan
        )
    }
}
