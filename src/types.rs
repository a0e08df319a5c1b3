//! Named values of `segmentation_type_id`.

macro_rules! segmentation_types {
    ($($name:ident = $id:literal => $description:literal,)+) => {
        /// Meaning of a segmentation descriptor's `segmentation_type_id`.
        ///
        /// The decoded tree keeps the raw id; this is a lookup for display.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[non_exhaustive]
        pub enum SegmentationType {
            $(#[doc = $description] $name,)+
            /// An id with no assigned meaning.
            Reserved(u8),
        }

        impl SegmentationType {
            pub fn id(&self) -> u8 {
                match self {
                    $(SegmentationType::$name => $id,)+
                    SegmentationType::Reserved(id) => *id,
                }
            }

            pub fn description(&self) -> &'static str {
                match self {
                    $(SegmentationType::$name => $description,)+
                    SegmentationType::Reserved(_) => "Reserved",
                }
            }
        }

        impl From<u8> for SegmentationType {
            fn from(id: u8) -> Self {
                match id {
                    $($id => SegmentationType::$name,)+
                    other => SegmentationType::Reserved(other),
                }
            }
        }
    };
}

segmentation_types! {
    NotIndicated = 0x00 => "Not Indicated",
    ContentIdentification = 0x01 => "Content Identification",
    ProgramStart = 0x10 => "Program Start",
    ProgramEnd = 0x11 => "Program End",
    ProgramEarlyTermination = 0x12 => "Program Early Termination",
    ProgramBreakaway = 0x13 => "Program Breakaway",
    ProgramResumption = 0x14 => "Program Resumption",
    ProgramRunoverPlanned = 0x15 => "Program Runover Planned",
    ProgramRunoverUnplanned = 0x16 => "Program Runover Unplanned",
    ProgramOverlapStart = 0x17 => "Program Overlap Start",
    ProgramBlackoutOverride = 0x18 => "Program Blackout Override",
    ProgramJoin = 0x19 => "Program Join",
    ChapterStart = 0x20 => "Chapter Start",
    ChapterEnd = 0x21 => "Chapter End",
    BreakStart = 0x22 => "Break Start",
    BreakEnd = 0x23 => "Break End",
    OpeningCreditStart = 0x24 => "Opening Credit Start",
    OpeningCreditEnd = 0x25 => "Opening Credit End",
    ClosingCreditStart = 0x26 => "Closing Credit Start",
    ClosingCreditEnd = 0x27 => "Closing Credit End",
    ProviderAdvertisementStart = 0x30 => "Provider Advertisement Start",
    ProviderAdvertisementEnd = 0x31 => "Provider Advertisement End",
    DistributorAdvertisementStart = 0x32 => "Distributor Advertisement Start",
    DistributorAdvertisementEnd = 0x33 => "Distributor Advertisement End",
    ProviderPlacementOpportunityStart = 0x34 => "Provider Placement Opportunity Start",
    ProviderPlacementOpportunityEnd = 0x35 => "Provider Placement Opportunity End",
    DistributorPlacementOpportunityStart = 0x36 => "Distributor Placement Opportunity Start",
    DistributorPlacementOpportunityEnd = 0x37 => "Distributor Placement Opportunity End",
    ProviderOverlayPlacementOpportunityStart = 0x38 => "Provider Overlay Placement Opportunity Start",
    ProviderOverlayPlacementOpportunityEnd = 0x39 => "Provider Overlay Placement Opportunity End",
    DistributorOverlayPlacementOpportunityStart = 0x3A => "Distributor Overlay Placement Opportunity Start",
    DistributorOverlayPlacementOpportunityEnd = 0x3B => "Distributor Overlay Placement Opportunity End",
    ProviderPromoStart = 0x3C => "Provider Promo Start",
    ProviderPromoEnd = 0x3D => "Provider Promo End",
    DistributorPromoStart = 0x3E => "Distributor Promo Start",
    DistributorPromoEnd = 0x3F => "Distributor Promo End",
    UnscheduledEventStart = 0x40 => "Unscheduled Event Start",
    UnscheduledEventEnd = 0x41 => "Unscheduled Event End",
    AlternateContentOpportunityStart = 0x42 => "Alternate Content Opportunity Start",
    AlternateContentOpportunityEnd = 0x43 => "Alternate Content Opportunity End",
    ProviderAdBlockStart = 0x44 => "Provider Ad Block Start",
    ProviderAdBlockEnd = 0x45 => "Provider Ad Block End",
    DistributorAdBlockStart = 0x46 => "Distributor Ad Block Start",
    DistributorAdBlockEnd = 0x47 => "Distributor Ad Block End",
    NetworkStart = 0x50 => "Network Start",
    NetworkEnd = 0x51 => "Network End",
}
