//! Parameter introspection for discoverable engine controls.
//!
//! Hosts enumerate an engine's continuous controls through
//! [`ParameterInfo`] without running any audio: each control is described by
//! a [`ParamDescriptor`] carrying display metadata, range, a stable numeric
//! [`ParamId`], and a stable string ID. Together with the registry's port
//! layout this forms the static port-list declaration a host reads before
//! instantiating anything.
//!
//! Index-based access keeps the audio-thread paths trivial; the by-name and
//! by-id lookups are setup-path conveniences.

/// Scaling curve for mapping a parameter between plain and normalized space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamScale {
    /// Linear mapping (default).
    #[default]
    Linear,
    /// Logarithmic mapping — frequency-style controls. Requires `min > 0`.
    Logarithmic,
}

/// Stable numeric parameter identifier.
///
/// Once assigned, a `ParamId` must never change for a given control: hosts
/// persist automation against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Capability flags for host communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Host can automate this parameter (default).
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Parameter has discrete steps.
    pub const STEPPED: Self = Self(1 << 1);
    /// Parameter should be hidden from generic host UI.
    pub const HIDDEN: Self = Self(1 << 2);

    /// Returns true if all bits of `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Unit type for formatting a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUnit {
    /// Decibels.
    Decibels,
    /// Hertz.
    Hertz,
    /// Milliseconds.
    Milliseconds,
    /// Percent.
    Percent,
    /// Dimensionless.
    None,
}

impl ParamUnit {
    /// Display suffix for the unit.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Percent => "%",
            ParamUnit::None => "",
        }
    }
}

/// Metadata describing a single engine control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full name for display.
    pub name: &'static str,
    /// Short name for hardware displays, eight characters or fewer.
    pub short_name: &'static str,
    /// Unit for value formatting.
    pub unit: ParamUnit,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Default value on construction and reset.
    pub default: f32,
    /// Recommended encoder step.
    pub step: f32,
    /// Stable numeric ID for automation and persistence.
    pub id: ParamId,
    /// Stable string ID, `"engine_param"` convention.
    pub string_id: &'static str,
    /// Normalization curve.
    pub scale: ParamScale,
    /// Host capability flags.
    pub flags: ParamFlags,
}

impl ParamDescriptor {
    /// Dimensionless control with an explicit range.
    pub const fn custom(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            min,
            max,
            default,
            step: 0.01,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Linear,
            flags: ParamFlags::AUTOMATABLE,
        }
    }

    /// Gain control in decibels.
    pub const fn gain_db(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        let mut d = Self::custom(name, short_name, min, max, default);
        d.unit = ParamUnit::Decibels;
        d.step = 0.5;
        d
    }

    /// Frequency control in Hz, logarithmic by default.
    pub const fn freq_hz(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        let mut d = Self::custom(name, short_name, min, max, default);
        d.unit = ParamUnit::Hertz;
        d.step = 1.0;
        d.scale = ParamScale::Logarithmic;
        d
    }

    /// Time control in milliseconds.
    pub const fn time_ms(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        let mut d = Self::custom(name, short_name, min, max, default);
        d.unit = ParamUnit::Milliseconds;
        d.step = 1.0;
        d
    }

    /// Set the stable numeric and string IDs (builder style).
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Set the normalization scale (builder style).
    pub const fn with_scale(mut self, scale: ParamScale) -> Self {
        self.scale = scale;
        self
    }

    /// Set the capability flags (builder style).
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Clamp a value to this control's range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Map a plain value into normalized [0, 1], respecting the scale.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        match self.scale {
            ParamScale::Linear => (value - self.min) / range,
            ParamScale::Logarithmic => {
                if self.min <= 0.0 || value <= 0.0 {
                    return 0.0;
                }
                libm::logf(value / self.min) / libm::logf(self.max / self.min)
            }
        }
    }

    /// Map a normalized [0, 1] value back to the plain range.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let t = normalized.clamp(0.0, 1.0);
        match self.scale {
            ParamScale::Linear => self.min + t * (self.max - self.min),
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return self.min;
                }
                self.min * libm::expf(t * libm::logf(self.max / self.min))
            }
        }
    }
}

/// Trait for engines that expose introspectable controls.
///
/// Indices are zero-based and stable for the lifetime of the instance.
/// Implementations clamp on set and ignore out-of-range indices.
pub trait ParameterInfo {
    /// Number of controls. Valid indices are `0..param_count()`.
    fn param_count(&self) -> usize;

    /// Descriptor for the control at `index`, or `None` past the end.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current value of the control at `index` (0.0 past the end).
    fn get_param(&self, index: usize) -> f32;

    /// Set the control at `index`, clamping to the descriptor range.
    fn set_param(&mut self, index: usize, value: f32);

    /// Find a control index by name or short name, case-insensitive.
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        (0..self.param_count()).find(|&i| {
            self.param_info(i).is_some_and(|d| {
                d.name.eq_ignore_ascii_case(name) || d.short_name.eq_ignore_ascii_case(name)
            })
        })
    }

    /// Find a control index by its stable [`ParamId`].
    fn param_index_by_id(&self, id: ParamId) -> Option<usize> {
        (0..self.param_count()).find(|&i| self.param_info(i).is_some_and(|d| d.id == id))
    }
}
