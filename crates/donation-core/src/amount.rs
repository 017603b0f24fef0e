//! Donation amount selection: presets or a custom ERG figure.

use chain_erg::NANOERGS_PER_ERG;

use crate::config::DonationConfig;
use crate::error::DonationError;

/// Decimal places in one ERG.
const ERG_DECIMALS: usize = 9;

/// How the user picked the amount in the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountChoice {
    /// Index into the configured presets.
    Preset(usize),
    /// Free-form ERG amount, e.g. `"2.5"`.
    Custom(String),
}

/// Resolve the user's choice into nanoERG, enforcing the configured minimum.
pub fn resolve_amount(choice: &AmountChoice, config: &DonationConfig) -> Result<u64, DonationError> {
    let amount = match choice {
        AmountChoice::Preset(index) => *config.presets.get(*index).ok_or_else(|| {
            DonationError::InvalidAmount(format!("no preset at position {index}"))
        })?,
        AmountChoice::Custom(text) => parse_erg(text)?,
    };

    if amount < config.min_donation {
        return Err(DonationError::InvalidAmount(format!(
            "minimum donation is {} ERG",
            format_erg(config.min_donation)
        )));
    }
    Ok(amount)
}

/// Parse a decimal ERG amount into nanoERG.
pub fn parse_erg(input: &str) -> Result<u64, DonationError> {
    let text = input.trim();
    let invalid = || DonationError::InvalidAmount(format!("{input:?} is not an ERG amount"));

    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > ERG_DECIMALS {
        return Err(DonationError::InvalidAmount(format!(
            "at most {ERG_DECIMALS} decimal places are supported"
        )));
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<width$}", width = ERG_DECIMALS)
            .parse()
            .map_err(|_| invalid())?
    };

    let nano = whole
        .checked_mul(NANOERGS_PER_ERG)
        .and_then(|n| n.checked_add(frac))
        .ok_or_else(|| DonationError::InvalidAmount("amount is too large".into()))?;

    if nano == 0 {
        return Err(DonationError::InvalidAmount("amount must be positive".into()));
    }
    Ok(nano)
}

/// Format nanoERG as a trimmed decimal ERG string.
pub fn format_erg(nano: u64) -> String {
    let whole = nano / NANOERGS_PER_ERG;
    let frac = nano % NANOERGS_PER_ERG;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0width$}", width = ERG_DECIMALS);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional() {
        assert_eq!(parse_erg("1").unwrap(), 1_000_000_000);
        assert_eq!(parse_erg("2.5").unwrap(), 2_500_000_000);
        assert_eq!(parse_erg(" 0.001 ").unwrap(), 1_000_000);
        assert_eq!(parse_erg(".5").unwrap(), 500_000_000);
        assert_eq!(parse_erg("3.").unwrap(), 3_000_000_000);
        assert_eq!(parse_erg("0.000000001").unwrap(), 1);
    }

    #[test]
    fn rejects_garbage() {
        for input in ["", ".", "abc", "-1", "1.2.3", "1,5", "+2", "0", "0.0"] {
            assert!(parse_erg(input).is_err(), "{input:?} should fail");
        }
    }

    #[test]
    fn rejects_too_many_decimals() {
        assert!(parse_erg("0.0000000001").is_err());
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_erg("99999999999999999999").is_err());
        assert!(parse_erg("18446744074").is_err());
    }

    #[test]
    fn formats_erg() {
        assert_eq!(format_erg(1_000_000_000), "1");
        assert_eq!(format_erg(1_500_000_000), "1.5");
        assert_eq!(format_erg(1_100_000), "0.0011");
        assert_eq!(format_erg(0), "0");
    }

    #[test]
    fn resolves_presets_and_custom() {
        let config = DonationConfig::default();
        assert_eq!(
            resolve_amount(&AmountChoice::Preset(0), &config).unwrap(),
            config.presets[0]
        );
        assert_eq!(
            resolve_amount(&AmountChoice::Custom("3".into()), &config).unwrap(),
            3_000_000_000
        );
        assert!(resolve_amount(&AmountChoice::Preset(99), &config).is_err());
    }

    #[test]
    fn enforces_minimum_donation() {
        let config = DonationConfig::default();
        let err = resolve_amount(&AmountChoice::Custom("0.000001".into()), &config).unwrap_err();
        assert!(err.to_string().contains("minimum donation is 0.01 ERG"));
    }
}
