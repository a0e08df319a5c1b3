//! Named values of `segmentation_upid_type`.
//!
//! The decoder keeps the UPID as opaque bytes; these helpers name the type
//! and render the bytes for people.

/// Format of the UPID carried by a segmentation descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum SegmentationUpidType {
    #[default]
    NotUsed,
    UserDefinedDeprecated,
    ISCI,
    AdID,
    UMID,
    ISANDeprecated,
    ISAN,
    TID,
    AiringID,
    ADI,
    EIDR,
    ATSCContentIdentifier,
    MPU,
    MID,
    ADSInformation,
    URI,
    UUID,
    SCR,
    Reserved(u8),
}

const NAMED: [(SegmentationUpidType, &str); 18] = {
    use SegmentationUpidType::*;
    [
        (NotUsed, "Not Used"),
        (UserDefinedDeprecated, "User Defined (Deprecated)"),
        (ISCI, "ISCI"),
        (AdID, "Ad-ID"),
        (UMID, "UMID"),
        (ISANDeprecated, "ISAN (Deprecated)"),
        (ISAN, "ISAN"),
        (TID, "TID"),
        (AiringID, "Airing ID"),
        (ADI, "ADI"),
        (EIDR, "EIDR"),
        (ATSCContentIdentifier, "ATSC Content Identifier"),
        (MPU, "MPU"),
        (MID, "MID"),
        (ADSInformation, "ADS Information"),
        (URI, "URI"),
        (UUID, "UUID"),
        (SCR, "SCR"),
    ]
};

impl From<u8> for SegmentationUpidType {
    fn from(value: u8) -> Self {
        NAMED
            .get(value as usize)
            .map(|(upid_type, _)| *upid_type)
            .unwrap_or(SegmentationUpidType::Reserved(value))
    }
}

impl From<SegmentationUpidType> for u8 {
    fn from(value: SegmentationUpidType) -> Self {
        match value {
            SegmentationUpidType::Reserved(id) => id,
            named => NAMED
                .iter()
                .position(|(upid_type, _)| *upid_type == named)
                .map_or(0xFF, |id| id as u8),
        }
    }
}

impl SegmentationUpidType {
    pub fn description(&self) -> &'static str {
        NAMED
            .iter()
            .find(|(upid_type, _)| upid_type == self)
            .map_or("Reserved", |(_, name)| name)
    }

    /// Whether the UPID bytes of this type are printable text.
    pub fn is_text(&self) -> bool {
        use SegmentationUpidType::*;
        matches!(
            self,
            UserDefinedDeprecated
                | ISCI
                | AdID
                | TID
                | ADI
                | EIDR
                | ADSInformation
                | URI
                | SCR
                | MPU
        )
    }
}

/// Renders UPID bytes as text when the type is textual and the bytes are
/// printable ASCII, or as `0x`-prefixed hex otherwise.
pub fn format_upid(upid_type: SegmentationUpidType, upid: &[u8]) -> String {
    let printable = upid.iter().all(|b| b.is_ascii_graphic() || *b == b' ');
    if upid_type.is_text() && !upid.is_empty() && printable {
        upid.iter().map(|&b| b as char).collect()
    } else {
        crate::fmt::format_as_hex(upid)
    }
}
