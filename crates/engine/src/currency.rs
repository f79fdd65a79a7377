//! Currency codes as they appear in the travel data.
//!
//! The backing stores carry whatever spelling the person entering the expense
//! used (`$`, `US$`, `€`, `Sfr.`, regional names of the franc). The rate table
//! is keyed by canonical ISO-like 3-letter codes, so every code coming from
//! data goes through [`normalize_code`] before lookup or comparison.
//!
//! The settlement currency is the Swiss franc: every reconciliation total is
//! expressed in CHF and CHF always converts at 1.0.

/// Canonical code of the settlement currency.
pub const SETTLEMENT_CURRENCY: &str = "CHF";

/// Symbol and spelling variants rewritten before stripping.
///
/// Order matters: `US$` must be rewritten before the bare `$`, and `SFR`
/// swallows the `SFR.` variant (the leftover dot is stripped below).
const REPLACEMENTS: &[(&str, &str)] = &[
    ("US$", "USD"),
    ("$", "USD"),
    ("€", "EUR"),
    ("EURO", "EUR"),
    ("SFR", "CHF"),
    ("FR.", "CHF"),
    ("FRANCO", "CHF"),
    ("FRANCI", "CHF"),
];

/// Normalizes a raw currency spelling to a canonical code.
///
/// Uppercases and trims, rewrites known symbol/spelling variants, then keeps
/// only `A-Z` (drops things like `USD ` or `USD/CHF` separators). Empty or
/// fully stripped input defaults to [`SETTLEMENT_CURRENCY`].
///
/// # Examples
///
/// ```rust
/// use engine::currency::normalize_code;
///
/// assert_eq!(normalize_code("US$"), "USD");
/// assert_eq!(normalize_code(" eur "), "EUR");
/// assert_eq!(normalize_code("Sfr."), "CHF");
/// assert_eq!(normalize_code(""), "CHF");
/// ```
#[must_use]
pub fn normalize_code(raw: &str) -> String {
    let mut code = raw.trim().to_uppercase();
    for (variant, canonical) in REPLACEMENTS {
        code = code.replace(variant, canonical);
    }
    let code: String = code.chars().filter(char::is_ascii_uppercase).collect();

    if code.is_empty() {
        SETTLEMENT_CURRENCY.to_string()
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollar_variants_map_to_usd() {
        assert_eq!(normalize_code("$"), "USD");
        assert_eq!(normalize_code("US$"), "USD");
        assert_eq!(normalize_code("usd"), "USD");
    }

    #[test]
    fn euro_variants_map_to_eur() {
        assert_eq!(normalize_code("€"), "EUR");
        assert_eq!(normalize_code("euro"), "EUR");
        assert_eq!(normalize_code("EUR"), "EUR");
    }

    #[test]
    fn franc_variants_map_to_chf() {
        assert_eq!(normalize_code("chf"), "CHF");
        assert_eq!(normalize_code("Sfr"), "CHF");
        assert_eq!(normalize_code("SFR."), "CHF");
        assert_eq!(normalize_code("Fr."), "CHF");
        assert_eq!(normalize_code("franco"), "CHF");
        assert_eq!(normalize_code("franci svizzeri"), "CHFSVIZZERI");
    }

    #[test]
    fn strips_non_letters() {
        assert_eq!(normalize_code("USD "), "USD");
        assert_eq!(normalize_code("USD/CHF"), "USDCHF");
    }

    #[test]
    fn empty_defaults_to_settlement() {
        assert_eq!(normalize_code(""), "CHF");
        assert_eq!(normalize_code("  "), "CHF");
        assert_eq!(normalize_code("123"), "CHF");
    }
}
