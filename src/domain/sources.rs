use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Generation source categories as labelled by the ENTSO-E transparency platform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum EnergySource {
    #[strum(serialize = "Biomass")]
    Biomass,
    #[strum(serialize = "Fossil Brown coal/Lignite")]
    FossilBrownCoalLignite,
    #[strum(serialize = "Fossil Coal-derived gas")]
    FossilCoalDerivedGas,
    #[strum(serialize = "Fossil Gas")]
    FossilGas,
    #[strum(serialize = "Fossil Hard coal")]
    FossilHardCoal,
    #[strum(serialize = "Fossil Oil")]
    FossilOil,
    #[strum(serialize = "Fossil Oil shale")]
    FossilOilShale,
    #[strum(serialize = "Fossil Peat")]
    FossilPeat,
    #[strum(serialize = "Geothermal")]
    Geothermal,
    #[strum(serialize = "Hydro Pumped Storage")]
    HydroPumpedStorage,
    #[strum(serialize = "Hydro Run-of-river and poundage")]
    HydroRunOfRiver,
    #[strum(serialize = "Hydro Water Reservoir")]
    HydroWaterReservoir,
    #[strum(serialize = "Marine")]
    Marine,
    #[strum(serialize = "Nuclear")]
    Nuclear,
    #[strum(serialize = "Other renewable")]
    OtherRenewable,
    #[strum(serialize = "Solar")]
    Solar,
    #[strum(serialize = "Waste")]
    Waste,
    #[strum(serialize = "Wind Offshore")]
    WindOffshore,
    #[strum(serialize = "Wind Onshore")]
    WindOnshore,
    #[strum(serialize = "Other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCategory {
    Renewable,
    NonRenewable,
}

impl EnergySource {
    /// ENTSO-E `psrType` code (B01..B20).
    pub fn psr_code(&self) -> &'static str {
        match self {
            Self::Biomass => "B01",
            Self::FossilBrownCoalLignite => "B02",
            Self::FossilCoalDerivedGas => "B03",
            Self::FossilGas => "B04",
            Self::FossilHardCoal => "B05",
            Self::FossilOil => "B06",
            Self::FossilOilShale => "B07",
            Self::FossilPeat => "B08",
            Self::Geothermal => "B09",
            Self::HydroPumpedStorage => "B10",
            Self::HydroRunOfRiver => "B11",
            Self::HydroWaterReservoir => "B12",
            Self::Marine => "B13",
            Self::Nuclear => "B14",
            Self::OtherRenewable => "B15",
            Self::Solar => "B16",
            Self::Waste => "B17",
            Self::WindOffshore => "B18",
            Self::WindOnshore => "B19",
            Self::Other => "B20",
        }
    }

    pub fn from_psr_code(code: &str) -> Option<Self> {
        Self::iter().find(|s| s.psr_code() == code)
    }

    pub fn category(&self) -> SourceCategory {
        match self {
            Self::Geothermal
            | Self::HydroPumpedStorage
            | Self::HydroRunOfRiver
            | Self::HydroWaterReservoir
            | Self::Marine
            | Self::OtherRenewable
            | Self::Solar
            | Self::Waste
            | Self::WindOffshore
            | Self::WindOnshore => SourceCategory::Renewable,
            Self::Biomass
            | Self::FossilBrownCoalLignite
            | Self::FossilCoalDerivedGas
            | Self::FossilGas
            | Self::FossilHardCoal
            | Self::FossilOil
            | Self::FossilOilShale
            | Self::FossilPeat
            | Self::Nuclear
            | Self::Other => SourceCategory::NonRenewable,
        }
    }

    pub fn is_wind_or_solar(&self) -> bool {
        matches!(self, Self::Solar | Self::WindOffshore | Self::WindOnshore)
    }
}

/// Human label for a `psrType` code; codes outside B01..B20 keep the grid-asset names.
pub fn psr_label(code: &str) -> Option<&'static str> {
    if let Some(source) = EnergySource::from_psr_code(code) {
        return Some(source.into());
    }
    match code {
        "A03" => Some("Mixed"),
        "A04" => Some("Generation"),
        "A05" => Some("Load"),
        "B21" => Some("AC Link"),
        "B22" => Some("DC Link"),
        "B23" => Some("Substation"),
        "B24" => Some("Transformer"),
        _ => None,
    }
}

/// Table columns split into the three aggregate sets; unrecognized columns are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnClassification {
    pub renewable: Vec<String>,
    pub wind_solar: Vec<String>,
    pub non_renewable: Vec<String>,
}

impl ColumnClassification {
    pub fn classify(columns: &[String]) -> Self {
        let mut out = Self::default();
        for column in columns {
            let Ok(source) = column.parse::<EnergySource>() else {
                continue;
            };
            match source.category() {
                SourceCategory::Renewable => out.renewable.push(column.clone()),
                SourceCategory::NonRenewable => out.non_renewable.push(column.clone()),
            }
            if source.is_wind_or_solar() {
                out.wind_solar.push(column.clone());
            }
        }
        out
    }
}
