use clap::ValueEnum;

/// Electricity production source tracked by NED.
///
/// The set is closed: every timestamp bucket and every emitted record carries
/// all of these, zero-filled when the provider returned nothing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum, derive_more::Display)]
pub enum SourceType {
    #[display("solar")]
    Solar,

    /// Onshore wind.
    #[display("wind")]
    Wind,

    #[display("wind_offshore")]
    WindOffshore,

    #[display("coal")]
    Coal,

    #[display("gas")]
    Gas,

    #[display("nuclear")]
    Nuclear,

    #[display("biomass")]
    Biomass,

    #[display("hydro")]
    Hydro,

    #[display("other")]
    Other,
}

impl SourceType {
    /// All source types in the fixed fetch and display order.
    pub const ALL: [Self; 9] = [
        Self::Solar,
        Self::Wind,
        Self::WindOffshore,
        Self::Coal,
        Self::Gas,
        Self::Nuclear,
        Self::Biomass,
        Self::Hydro,
        Self::Other,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// NED's numeric energy type code.
    pub const fn code(self) -> u8 {
        match self {
            Self::Solar => 2,
            Self::Wind => 1,
            Self::WindOffshore => 17,
            Self::Coal => 4,
            Self::Gas => 5,
            Self::Nuclear => 6,
            Self::Biomass => 7,
            Self::Hydro => 8,
            Self::Other => 9,
        }
    }

    /// Whether the source counts towards the green share.
    pub const fn is_green(self) -> bool {
        matches!(self, Self::Solar | Self::Wind | Self::WindOffshore)
    }
}
