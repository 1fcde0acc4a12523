//! Barcode text classification and check-digit verification
//!
//! The decoder hands this layer opaque digit strings. Classification and
//! the GTIN mod-10 check are advisory: a failed check is logged, not
//! rejected, since the store treats the barcode as an opaque key.

use std::fmt;

/// Symbologies recognized by length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeFormat {
    Ean8,
    UpcA,
    Ean13,
}

impl BarcodeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarcodeFormat::Ean8 => "EAN-8",
            BarcodeFormat::UpcA => "UPC-A",
            BarcodeFormat::Ean13 => "EAN-13",
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a barcode string by digit count
///
/// Returns `None` for non-digit input or unsupported lengths.
pub fn classify(code: &str) -> Option<BarcodeFormat> {
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match code.len() {
        8 => Some(BarcodeFormat::Ean8),
        12 => Some(BarcodeFormat::UpcA),
        13 => Some(BarcodeFormat::Ean13),
        _ => None,
    }
}

/// Verify the GTIN mod-10 check digit
///
/// Numbering digits from the right starting at 1 (the check digit), digits
/// in even positions carry weight 3 and odd positions weight 1; the code is
/// valid when the weighted sum is divisible by 10. The same rule covers
/// EAN-8, UPC-A, and EAN-13.
pub fn check_digit_valid(code: &str) -> bool {
    let digits: Option<Vec<u32>> = code.chars().map(|c| c.to_digit(10)).collect();
    let Some(digits) = digits else {
        return false;
    };
    if digits.is_empty() {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 1 { d * 3 } else { *d })
        .sum();

    sum % 10 == 0
}

/// A code is well-formed when it has a supported length, all digits, and a
/// valid check digit
pub fn is_well_formed(code: &str) -> bool {
    classify(code).is_some() && check_digit_valid(code)
}
