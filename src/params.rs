use crate::error::{GeometryError, Result};

/// Inclusive value range accepted for a parameter field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest accepted value.
    pub min: f64,
    /// Largest accepted value.
    pub max: f64,
}

impl Bounds {
    /// Returns `true` if `value` is finite and lies within the range.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 10_000.0,
        }
    }
}

/// Identifies one scalar of a [`ParameterSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterField {
    /// Size along X.
    Width,
    /// Size along Y.
    Depth,
    /// Size along Z.
    Height,
}

impl ParameterField {
    /// All fields, in declaration order.
    pub const ALL: [Self; 3] = [Self::Width, Self::Depth, Self::Height];

    /// Display name of the field.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Depth => "depth",
            Self::Height => "height",
        }
    }

    /// Accepted range for the field.
    #[must_use]
    pub fn bounds(self) -> Bounds {
        Bounds::default()
    }

    fn check(self, value: f64) -> Result<f64> {
        let bounds = self.bounds();
        if bounds.contains(value) {
            Ok(value)
        } else {
            Err(GeometryError::InvalidParameter {
                parameter: self.name(),
                value,
                min: bounds.min,
                max: bounds.max,
            }
            .into())
        }
    }
}

/// The numeric inputs of a parametric box: width, depth and height.
///
/// Every value held by a `ParameterSet` is within its field's [`Bounds`];
/// out-of-range input is rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    x: f64,
    y: f64,
    z: f64,
}

impl ParameterSet {
    /// Creates a parameter set from width, depth and height.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidParameter`] if any value is non-finite
    /// or outside its bounds.
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self> {
        Ok(Self {
            x: ParameterField::Width.check(x)?,
            y: ParameterField::Depth.check(y)?,
            z: ParameterField::Height.check(z)?,
        })
    }

    /// Defaults used by the creation command.
    #[must_use]
    pub fn creation_default() -> Self {
        Self {
            x: 0.80,
            y: 0.80,
            z: 2.0,
        }
    }

    /// Width (X extent).
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Depth (Y extent).
    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Height (Z extent).
    #[must_use]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Returns the value of one field.
    #[must_use]
    pub fn get(&self, field: ParameterField) -> f64 {
        match field {
            ParameterField::Width => self.x,
            ParameterField::Depth => self.y,
            ParameterField::Height => self.z,
        }
    }

    /// Sets one field. The set is left unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidParameter`] if `value` is out of bounds.
    pub fn set(&mut self, field: ParameterField, value: f64) -> Result<()> {
        let value = field.check(value)?;
        match field {
            ParameterField::Width => self.x = value,
            ParameterField::Depth => self.y = value,
            ParameterField::Height => self.z = value,
        }
        Ok(())
    }

    /// Returns a copy with one field replaced.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidParameter`] if `value` is out of bounds.
    pub fn with(mut self, field: ParameterField, value: f64) -> Result<Self> {
        self.set(field, value)?;
        Ok(self)
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            x: 100.0,
            y: 0.80,
            z: 2.0,
        }
    }
}
