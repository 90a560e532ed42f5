/// Barcode symbologies the station declares support for.
///
/// This is configuration, not user-editable: the native backend negotiates
/// its detector against this list, and the fallback decoder receives it
/// translated into its own naming scheme.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbology {
    Aztec,
    Code128,
    Code39,
    Code93,
    Codabar,
    DataMatrix,
    Ean13,
    Ean8,
    Itf,
    Pdf417,
    QrCode,
    UpcA,
    UpcE,
}

/// The full declared set, in declaration order.
pub const DECLARED_SYMBOLOGIES: [Symbology; 13] = [
    Symbology::Aztec,
    Symbology::Code128,
    Symbology::Code39,
    Symbology::Code93,
    Symbology::Codabar,
    Symbology::DataMatrix,
    Symbology::Ean13,
    Symbology::Ean8,
    Symbology::Itf,
    Symbology::Pdf417,
    Symbology::QrCode,
    Symbology::UpcA,
    Symbology::UpcE,
];

impl Symbology {
    /// Canonical lower-case name, as the native backend reports formats.
    pub fn name(self) -> &'static str {
        match self {
            Symbology::Aztec => "aztec",
            Symbology::Code128 => "code_128",
            Symbology::Code39 => "code_39",
            Symbology::Code93 => "code_93",
            Symbology::Codabar => "codabar",
            Symbology::DataMatrix => "data_matrix",
            Symbology::Ean13 => "ean_13",
            Symbology::Ean8 => "ean_8",
            Symbology::Itf => "itf",
            Symbology::Pdf417 => "pdf417",
            Symbology::QrCode => "qr_code",
            Symbology::UpcA => "upc_a",
            Symbology::UpcE => "upc_e",
        }
    }

    /// The fallback decoder library's name for this symbology, when it has
    /// one. Formats without a mapping are skipped during translation.
    pub fn fallback_name(self) -> Option<&'static str> {
        let name = match self {
            Symbology::Aztec => "AZTEC",
            Symbology::Code128 => "CODE_128",
            Symbology::Code39 => "CODE_39",
            Symbology::Code93 => "CODE_93",
            Symbology::Codabar => "CODABAR",
            Symbology::DataMatrix => "DATA_MATRIX",
            Symbology::Ean13 => "EAN_13",
            Symbology::Ean8 => "EAN_8",
            Symbology::Itf => "ITF",
            Symbology::Pdf417 => "PDF_417",
            Symbology::QrCode => "QR_CODE",
            Symbology::UpcA => "UPC_A",
            Symbology::UpcE => "UPC_E",
        };
        Some(name)
    }
}

/// Translate a symbology list into the fallback decoder's naming scheme,
/// dropping anything it has no name for.
pub fn fallback_format_names(symbologies: &[Symbology]) -> Vec<String> {
    symbologies
        .iter()
        .filter_map(|s| s.fallback_name())
        .map(|name| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_set_is_complete_and_unique() {
        assert_eq!(DECLARED_SYMBOLOGIES.len(), 13);
        let mut names: Vec<_> = DECLARED_SYMBOLOGIES.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 13);
    }

    #[test]
    fn every_declared_symbology_translates() {
        let names = fallback_format_names(&DECLARED_SYMBOLOGIES);
        assert_eq!(names.len(), 13);
        assert!(names.contains(&"QR_CODE".to_string()));
        assert!(names.contains(&"PDF_417".to_string()));
    }
}
