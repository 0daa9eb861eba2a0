//! The engine's parameter set and its name-based accessor table.
//!
//! Every parameter is a typed field of [`VhsConfig`]. External tools address
//! them by their underscore-prefixed names (`_video_noise`, ...) through a
//! static [`ParamSpec`] table, which also carries the documented range.
//! Out-of-range numbers are clamped into range with a warning; unknown names
//! and values of the wrong type are rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::warn;

use super::filters::VHS_RATE;
use super::tape::TapeSpeed;
use crate::error::{ConfigError, Result};

/// Full parameter set of the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VhsConfig {
    pub composite_preemphasis: f64,
    pub composite_preemphasis_cut: f64,
    pub vhs_out_sharpen: f64,
    pub vhs_edge_wave: i32,

    pub vhs_head_switching: bool,
    pub head_switching_speed: i32,
    pub vhs_head_switching_point: f64,
    pub vhs_head_switching_phase: f64,
    pub vhs_head_switching_phase_noise: f64,

    pub color_bleed_before: bool,
    pub color_bleed_horiz: i32,
    pub color_bleed_vert: i32,

    /// 1.0 disables ringing
    pub ringing: f64,
    pub enable_ringing2: bool,
    pub ringing_power: i32,
    pub ringing_shift: f64,
    pub ringing_clip: bool,
    pub freq_noise_size: f64,
    pub freq_noise_amplitude: f64,

    pub composite_in_chroma_lowpass: bool,
    pub composite_out_chroma_lowpass: bool,
    pub composite_out_chroma_lowpass_lite: bool,

    pub video_chroma_noise: i32,
    pub video_chroma_phase_noise: i32,
    pub video_chroma_loss: i32,
    pub video_noise: i32,

    pub subcarrier_amplitude: i32,
    pub subcarrier_amplitude_back: i32,
    pub emulating_vhs: bool,
    /// Encode the subcarrier but never decode it back (debug view)
    pub nocolor_subcarrier: bool,
    pub vhs_chroma_vert_blend: bool,
    pub vhs_svideo_out: bool,
    /// NTSC timing and chroma blending on output
    pub output_ntsc: bool,
    pub video_scanline_phase_shift: i32,
    pub video_scanline_phase_shift_offset: i32,
    pub output_vhs_tape_speed: TapeSpeed,

    pub black_line_cut: bool,
    /// Border width in pixels, 0 for 1.7% of the frame width
    pub black_line_border: i32,
}

impl Default for VhsConfig {
    fn default() -> Self {
        Self {
            composite_preemphasis: 0.0,
            composite_preemphasis_cut: 1_000_000.0,
            vhs_out_sharpen: 1.5,
            vhs_edge_wave: 0,

            vhs_head_switching: false,
            head_switching_speed: 0,
            // About four scanlines above vsync
            vhs_head_switching_point: 1.0 - (4.5 + 0.01) / 262.5,
            vhs_head_switching_phase: (1.0 - 0.01) / 262.5,
            // 1/500 of a scanline
            vhs_head_switching_phase_noise: 1.0 / 500.0 / 262.5,

            color_bleed_before: true,
            color_bleed_horiz: 0,
            color_bleed_vert: 0,

            ringing: 1.0,
            enable_ringing2: false,
            ringing_power: 2,
            ringing_shift: 0.0,
            ringing_clip: false,
            freq_noise_size: 0.0,
            freq_noise_amplitude: 2.0,

            composite_in_chroma_lowpass: true,
            composite_out_chroma_lowpass: true,
            composite_out_chroma_lowpass_lite: true,

            video_chroma_noise: 0,
            video_chroma_phase_noise: 0,
            video_chroma_loss: 0,
            video_noise: 2,

            subcarrier_amplitude: 50,
            subcarrier_amplitude_back: 50,
            emulating_vhs: false,
            nocolor_subcarrier: false,
            vhs_chroma_vert_blend: true,
            vhs_svideo_out: false,
            output_ntsc: true,
            video_scanline_phase_shift: 180,
            video_scanline_phase_shift_offset: 0,
            output_vhs_tape_speed: TapeSpeed::Sp,

            black_line_cut: false,
            black_line_border: 0,
        }
    }
}

/// A parameter value as exchanged with external tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Token(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            ParamValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            ParamValue::Float(f) if f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            ParamValue::Token(s) => Some(s),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Int(i) => Value::Number((*i).into()),
            ParamValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            ParamValue::Token(s) => Value::String(s.clone()),
        }
    }

    fn from_json(name: &str, value: &Value) -> Result<Self> {
        let converted = match value {
            Value::Bool(b) => Some(ParamValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(ParamValue::Int)
                .or_else(|| n.as_f64().map(ParamValue::Float)),
            Value::String(s) => Some(ParamValue::Token(s.clone())),
            _ => None,
        };
        converted.ok_or_else(|| {
            ConfigError::TypeMismatch {
                name: name.to_string(),
                expected: "number, boolean or string".to_string(),
            }
            .into()
        })
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Token(value.to_string())
    }
}

/// Value domain of a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Float { min: f64, max: f64 },
    Int { min: i64, max: i64 },
    /// Integer restricted to a fixed set; other values snap to the nearest
    Choice(&'static [i64]),
    Bool,
    TapeSpeed,
}

impl ParamKind {
    fn expected(&self) -> &'static str {
        match self {
            ParamKind::Float { .. } => "number",
            ParamKind::Int { .. } | ParamKind::Choice(_) => "integer",
            ParamKind::Bool => "boolean",
            ParamKind::TapeSpeed => "tape speed (SP, LP or EP)",
        }
    }
}

/// One entry of the accessor table
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    get: fn(&VhsConfig) -> ParamValue,
    set: fn(&mut VhsConfig, &ParamValue),
}

impl ParamSpec {
    /// Coerce `value` into this parameter's domain.
    ///
    /// Returns the stored value and whether it had to be clamped.
    fn normalize(&self, value: &ParamValue) -> Result<(ParamValue, bool)> {
        let mismatch = || -> crate::error::VhsError {
            ConfigError::TypeMismatch {
                name: self.name.to_string(),
                expected: self.kind.expected().to_string(),
            }
            .into()
        };

        match self.kind {
            ParamKind::Float { min, max } => {
                let v = value.as_f64().filter(|v| !v.is_nan()).ok_or_else(mismatch)?;
                let c = v.clamp(min, max);
                Ok((ParamValue::Float(c), c != v))
            }
            ParamKind::Int { min, max } => {
                let v = value.as_i64().ok_or_else(mismatch)?;
                let c = v.clamp(min, max);
                Ok((ParamValue::Int(c), c != v))
            }
            ParamKind::Choice(choices) => {
                let v = value.as_i64().ok_or_else(mismatch)?;
                let c = choices
                    .iter()
                    .copied()
                    .min_by_key(|c| (c - v).abs())
                    .unwrap_or(v);
                Ok((ParamValue::Int(c), c != v))
            }
            ParamKind::Bool => {
                let v = value.as_bool().ok_or_else(mismatch)?;
                Ok((ParamValue::Bool(v), false))
            }
            ParamKind::TapeSpeed => {
                let token = value.as_token().ok_or_else(mismatch)?;
                let speed: TapeSpeed = token.parse()?;
                Ok((ParamValue::Token(speed.token().to_string()), false))
            }
        }
    }
}

macro_rules! float_param {
    ($name:literal, $field:ident, $min:expr, $max:expr) => {
        ParamSpec {
            name: $name,
            kind: ParamKind::Float { min: $min, max: $max },
            get: |c| ParamValue::Float(c.$field),
            set: |c, v| {
                if let ParamValue::Float(x) = v {
                    c.$field = *x;
                }
            },
        }
    };
}

macro_rules! int_param {
    ($name:literal, $field:ident, $kind:expr) => {
        ParamSpec {
            name: $name,
            kind: $kind,
            get: |c| ParamValue::Int(c.$field as i64),
            set: |c, v| {
                if let ParamValue::Int(x) = v {
                    c.$field = *x as i32;
                }
            },
        }
    };
    ($name:literal, $field:ident, $min:expr, $max:expr) => {
        int_param!($name, $field, ParamKind::Int { min: $min, max: $max })
    };
}

macro_rules! bool_param {
    ($name:literal, $field:ident) => {
        ParamSpec {
            name: $name,
            kind: ParamKind::Bool,
            get: |c| ParamValue::Bool(c.$field),
            set: |c, v| {
                if let ParamValue::Bool(x) = v {
                    c.$field = *x;
                }
            },
        }
    };
}

static PARAMS: &[ParamSpec] = &[
    float_param!("_composite_preemphasis", composite_preemphasis, 0.0, 10.0),
    float_param!("_composite_preemphasis_cut", composite_preemphasis_cut, 1.0, VHS_RATE / 2.0),
    float_param!("_vhs_out_sharpen", vhs_out_sharpen, 1.0, 5.0),
    int_param!("_vhs_edge_wave", vhs_edge_wave, 0, 10),
    bool_param!("_vhs_head_switching", vhs_head_switching),
    int_param!("_head_switching_speed", head_switching_speed, 0, 100),
    float_param!("_vhs_head_switching_point", vhs_head_switching_point, 0.0, 1.0),
    float_param!("_vhs_head_switching_phase", vhs_head_switching_phase, 0.0, 1.0),
    float_param!("_vhs_head_switching_phase_noise", vhs_head_switching_phase_noise, 0.0, 1.0),
    bool_param!("_color_bleed_before", color_bleed_before),
    int_param!("_color_bleed_horiz", color_bleed_horiz, 0, 10),
    int_param!("_color_bleed_vert", color_bleed_vert, 0, 10),
    float_param!("_ringing", ringing, 0.0, 1.0),
    bool_param!("_enable_ringing2", enable_ringing2),
    int_param!("_ringing_power", ringing_power, 0, 10),
    float_param!("_ringing_shift", ringing_shift, 0.0, 3.0),
    bool_param!("_ringing_clip", ringing_clip),
    float_param!("_freq_noise_size", freq_noise_size, 0.0, 2.0),
    float_param!("_freq_noise_amplitude", freq_noise_amplitude, 0.0, 5.0),
    bool_param!("_composite_in_chroma_lowpass", composite_in_chroma_lowpass),
    bool_param!("_composite_out_chroma_lowpass", composite_out_chroma_lowpass),
    bool_param!("_composite_out_chroma_lowpass_lite", composite_out_chroma_lowpass_lite),
    int_param!("_video_chroma_noise", video_chroma_noise, 0, 16384),
    int_param!("_video_chroma_phase_noise", video_chroma_phase_noise, 0, 50),
    int_param!("_video_chroma_loss", video_chroma_loss, 0, 100_000),
    int_param!("_video_noise", video_noise, 0, 4200),
    int_param!("_subcarrier_amplitude", subcarrier_amplitude, 1, 100),
    int_param!("_subcarrier_amplitude_back", subcarrier_amplitude_back, 1, 100),
    bool_param!("_emulating_vhs", emulating_vhs),
    bool_param!("_nocolor_subcarrier", nocolor_subcarrier),
    bool_param!("_vhs_chroma_vert_blend", vhs_chroma_vert_blend),
    bool_param!("_vhs_svideo_out", vhs_svideo_out),
    bool_param!("_output_ntsc", output_ntsc),
    int_param!(
        "_video_scanline_phase_shift",
        video_scanline_phase_shift,
        ParamKind::Choice(&[0, 90, 180, 270])
    ),
    int_param!("_video_scanline_phase_shift_offset", video_scanline_phase_shift_offset, 0, 3),
    ParamSpec {
        name: "_output_vhs_tape_speed",
        kind: ParamKind::TapeSpeed,
        get: |c| ParamValue::Token(c.output_vhs_tape_speed.token().to_string()),
        set: |c, v| {
            if let Some(speed) = v.as_token().and_then(|t| t.parse().ok()) {
                c.output_vhs_tape_speed = speed;
            }
        },
    },
    bool_param!("_black_line_cut", black_line_cut),
    int_param!("_black_line_border", black_line_border, 0, 64),
];

fn spec(name: &str) -> Result<&'static ParamSpec> {
    PARAMS.iter().find(|p| p.name == name).ok_or_else(|| {
        ConfigError::UnknownParameter {
            name: name.to_string(),
        }
        .into()
    })
}

impl VhsConfig {
    /// Every parameter name, in table order
    pub fn param_names() -> impl Iterator<Item = &'static str> {
        PARAMS.iter().map(|p| p.name)
    }

    /// Table entry for `name`
    pub fn param_spec(name: &str) -> Option<&'static ParamSpec> {
        spec(name).ok()
    }

    pub fn get(&self, name: &str) -> Result<ParamValue> {
        Ok((spec(name)?.get)(self))
    }

    /// Set a parameter by name, clamping numbers into range
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<()> {
        let spec = spec(name)?;
        let value = value.into();
        let (stored, clamped) = spec.normalize(&value)?;
        if clamped {
            warn!("{} = {:?} is out of range, using {:?}", name, value, stored);
        }
        (spec.set)(self, &stored);
        Ok(())
    }

    /// Copy of this configuration with every value inside its range
    pub fn clamped(&self) -> VhsConfig {
        let mut out = self.clone();
        for spec in PARAMS {
            let current = (spec.get)(self);
            if let Ok((stored, true)) = spec.normalize(&current) {
                warn!("{} = {:?} is out of range, using {:?}", spec.name, current, stored);
                (spec.set)(&mut out, &stored);
            }
        }
        out
    }

    /// Flat `{ "_name": value }` object of every parameter
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = PARAMS
            .iter()
            .map(|p| (p.name.to_string(), (p.get)(self).to_json()))
            .collect();
        Value::Object(map)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_json()).map_err(|e| {
            ConfigError::InvalidValue {
                key: "parameters".to_string(),
                value: e.to_string(),
            }
            .into()
        })
    }

    /// Apply a flat parameter object on top of the defaults.
    ///
    /// Missing names keep their default values.
    pub fn from_json(value: &Value) -> Result<VhsConfig> {
        let map = value.as_object().ok_or_else(|| ConfigError::TypeMismatch {
            name: "parameters".to_string(),
            expected: "object".to_string(),
        })?;

        let mut config = VhsConfig::default();
        for (name, v) in map {
            config.set(name, ParamValue::from_json(name, v)?)?;
        }
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<VhsConfig> {
        let value: Value = serde_json::from_str(text).map_err(|e| ConfigError::InvalidValue {
            key: "parameters".to_string(),
            value: e.to_string(),
        })?;
        Self::from_json(&value)
    }
}
