//! Display formatting for frame values

use std::fmt;
use std::sync::Arc;

/// Caller-supplied formatter replacing [`NumberFormat::format`]
#[derive(Clone)]
pub struct CustomFormatter(Arc<dyn Fn(f64) -> String + Send + Sync>);

impl CustomFormatter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn call(&self, value: f64) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for CustomFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomFormatter(..)")
    }
}

/// Default grouping/decimal formatter.
///
/// Produces `sign + prefix + integer + decimal_separator + fraction + suffix`,
/// where the sign is `-` for negative input and empty otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct NumberFormat {
    pub decimal_places: u32,
    pub use_grouping: bool,
    pub grouping_separator: String,
    pub decimal_separator: String,
    pub prefix: String,
    pub suffix: String,
    /// Glyphs for digits 0-9; empty means plain ASCII digits
    pub numerals: Vec<String>,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_places: 0,
            use_grouping: true,
            grouping_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            prefix: String::new(),
            suffix: String::new(),
            numerals: Vec::new(),
        }
    }
}

impl NumberFormat {
    pub fn format(&self, value: f64) -> String {
        let sign = if value < 0.0 { "-" } else { "" };
        let fixed = format!("{:.*}", self.decimal_places as usize, value.abs());

        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (fixed.as_str(), None),
        };

        let int_part = if self.use_grouping {
            group_digits(int_part, &self.grouping_separator)
        } else {
            int_part.to_string()
        };

        let mut out = String::with_capacity(fixed.len() + self.prefix.len() + self.suffix.len());
        out.push_str(sign);
        out.push_str(&self.prefix);
        self.push_digits(&mut out, &int_part);
        if let Some(frac_part) = frac_part {
            out.push_str(&self.decimal_separator);
            self.push_digits(&mut out, frac_part);
        }
        out.push_str(&self.suffix);
        out
    }

    /// Read back text produced by [`NumberFormat::format`].
    ///
    /// Strips sign, prefix, suffix and grouping separators and maps numeral
    /// glyphs back to digits. Returns `None` if the remainder is not a finite
    /// number.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let body = body.strip_prefix(self.prefix.as_str()).unwrap_or(body);
        let body = body.strip_suffix(self.suffix.as_str()).unwrap_or(body);

        let mut plain = String::with_capacity(body.len());
        let mut rest = body;
        while !rest.is_empty() {
            if !self.decimal_separator.is_empty() && rest.starts_with(&self.decimal_separator) {
                plain.push('.');
                rest = &rest[self.decimal_separator.len()..];
                continue;
            }
            if !self.grouping_separator.is_empty() && rest.starts_with(&self.grouping_separator) {
                rest = &rest[self.grouping_separator.len()..];
                continue;
            }
            let glyph = self
                .numerals
                .iter()
                .enumerate()
                .find(|(_, glyph)| !glyph.is_empty() && rest.starts_with(glyph.as_str()));
            if let Some((digit, glyph)) = glyph {
                plain.push(char::from(b'0' + digit as u8));
                rest = &rest[glyph.len()..];
                continue;
            }
            let ch = rest.chars().next()?;
            plain.push(ch);
            rest = &rest[ch.len_utf8()..];
        }

        let value = plain.parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(if negative { -value } else { value })
    }

    fn push_digits(&self, out: &mut String, digits: &str) {
        if self.numerals.is_empty() {
            out.push_str(digits);
            return;
        }
        for ch in digits.chars() {
            match ch.to_digit(10).and_then(|d| self.numerals.get(d as usize)) {
                Some(glyph) => out.push_str(glyph),
                None => out.push(ch),
            }
        }
    }
}

/// Insert `separator` every three digits, counting from the right
fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(digits.len() + (len / 3) * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}
