// Hbar amounts held as signed tinybars.
use std::fmt;

pub const TINYBARS_PER_HBAR: i64 = 100_000_000;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Hbar(i64);

impl Hbar {
    pub const ZERO: Hbar = Hbar(0);

    pub const fn from_tinybars(tinybars: i64) -> Self {
        Self(tinybars)
    }

    pub const fn new(hbars: i64) -> Self {
        Self(hbars * TINYBARS_PER_HBAR)
    }

    pub const fn to_tinybars(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Hbar) -> Option<Hbar> {
        self.0.checked_add(other.0).map(Hbar)
    }

    pub fn checked_sub(self, other: Hbar) -> Option<Hbar> {
        self.0.checked_sub(other.0).map(Hbar)
    }
}

impl fmt::Display for Hbar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = TINYBARS_PER_HBAR.unsigned_abs();
        write!(f, "{sign}{}.{:08} ℏ", abs / per, abs % per)
    }
}

#[cfg(test)]
mod tests {
    use super::Hbar;

    #[test]
    fn display_uses_eight_decimals() {
        assert_eq!(Hbar::new(10).to_string(), "10.00000000 ℏ");
        assert_eq!(Hbar::from_tinybars(-150).to_string(), "-0.00000150 ℏ");
    }

    #[test]
    fn checked_sub_detects_overflow() {
        assert_eq!(Hbar::from_tinybars(i64::MIN).checked_sub(Hbar::from_tinybars(1)), None);
        assert_eq!(
            Hbar::new(2).checked_sub(Hbar::new(1)),
            Some(Hbar::from_tinybars(100_000_000))
        );
    }
}
