/// Digit grouping and decimal mark for one display locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separators {
    pub thousands: char,
    pub decimal: char,
}

pub const EN_SEPARATORS: Separators = Separators {
    thousands: ',',
    decimal: '.',
};

pub const LATAM_SEPARATORS: Separators = Separators {
    thousands: '.',
    decimal: ',',
};

/// Two-decimal amount with thousands grouping and a leading symbol: -R$1.234,56
pub fn money_with(val: f64, symbol: &str, sep: Separators) -> String {
    let negative = val < 0.0 && format!("{:.2}", val.abs()) != "0.00";
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(sep.thousands);
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    format!("{sign}{symbol}{with_commas}{}{dec_part}", sep.decimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(val: f64) -> String {
        money_with(val, "$", EN_SEPARATORS)
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.10), "$42.10");
    }

    #[test]
    fn test_latam_separators() {
        assert_eq!(money_with(1234.5, "R$", LATAM_SEPARATORS), "R$1.234,50");
        assert_eq!(money_with(-7500000.0, "₲", LATAM_SEPARATORS), "-₲7.500.000,00");
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        assert_eq!(money(-0.001), "$0.00");
    }
}
