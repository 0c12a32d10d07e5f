use std::ops::Neg;

/// A single Ising spin. The discriminants are the physical values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Spin {
    Down = -1,
    Up = 1,
}

impl Spin {
    #[inline]
    pub fn value(self) -> i8 {
        self as i8
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.value() as f64
    }

    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Up => Self::Down,
        }
    }
}

impl Neg for Spin {
    type Output = Self;

    fn neg(self) -> Self {
        self.flipped()
    }
}

impl From<Spin> for i8 {
    fn from(s: Spin) -> i8 {
        s.value()
    }
}
