use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` chart axis bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisDomain {
    pub min: f64,
    pub max: f64,
}

impl AxisDomain {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

pub const DEFAULT_APR_DOMAIN: AxisDomain = AxisDomain::new(0.0, 100.0);
pub const DEFAULT_TVL_DOMAIN: AxisDomain = AxisDomain::new(0.0, 1_000_000.0);

/// Step the padded bounds are snapped outward to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    Tenths,
    Units,
}

impl Rounding {
    fn floor(self, value: f64) -> f64 {
        match self {
            Self::Tenths => (value * 10.0).floor() / 10.0,
            Self::Units => value.floor(),
        }
    }

    fn ceil(self, value: f64) -> f64 {
        match self {
            Self::Tenths => (value * 10.0).ceil() / 10.0,
            Self::Units => value.ceil(),
        }
    }
}

/// Padding applied around the observed value range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisPadding {
    pub fraction: f64,
    pub min_padding: f64,
    pub rounding: Rounding,
}

impl AxisPadding {
    pub const APR: Self = Self {
        fraction: 0.05,
        min_padding: 0.1,
        rounding: Rounding::Tenths,
    };

    pub const TVL: Self = Self {
        fraction: 0.03,
        min_padding: 1000.0,
        rounding: Rounding::Units,
    };
}

/// Pads the value range by `max(range * padding_fraction, min_padding)` on
/// each side, clamps the lower bound at zero and snaps both bounds outward to
/// one decimal place. Returns `None` when no finite value is present.
pub fn compute_domain<I>(values: I, padding_fraction: f64, min_padding: f64) -> Option<AxisDomain>
where
    I: IntoIterator<Item = f64>,
{
    compute_domain_with(
        values,
        AxisPadding {
            fraction: padding_fraction,
            min_padding,
            rounding: Rounding::Tenths,
        },
    )
}

pub fn compute_domain_with<I>(values: I, padding: AxisPadding) -> Option<AxisDomain>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = bounds(values)?;
    let pad = ((max - min) * padding.fraction).max(padding.min_padding);
    Some(AxisDomain {
        min: padding.rounding.floor((min - pad).max(0.0)),
        max: padding.rounding.ceil(max + pad),
    })
}

/// Multiplicative domain used by the protocol chart:
/// `[max(0, floor(min * low)), ceil(max * high)]`.
pub fn compute_scaled_domain<I>(values: I, low: f64, high: f64) -> Option<AxisDomain>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = bounds(values)?;
    Some(AxisDomain {
        min: (min * low).floor().max(0.0),
        max: (max * high).ceil(),
    })
}

fn bounds<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((f64::min(min, value), f64::max(max, value))),
        })
}
