//! Ownable board assets: streets, railroads, and utilities.

use serde::{Deserialize, Serialize};

use crate::board::{ColorGroup, Square, SquareKind};
use crate::economy::{self, ImprovementLevel};

use super::{PlayerId, PropertyId};

/// The asset type tag, used for update-time kind checks on the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetTag {
    Street,
    Railroad,
    Utility,
}

/// Street-specific data. Real value and current rent are always derived
/// from the base price/rent and the improvement level, never set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetData {
    pub color: ColorGroup,
    pub level: ImprovementLevel,
    pub base_rent: f64,
    pub current_rent: f64,
}

/// Kind-specific asset payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssetKind {
    Street(StreetData),
    Railroad,
    Utility,
}

/// An ownable asset. Instantiated once from the board at game setup with
/// the bank as owner; transferred and improved through events; never
/// destroyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: PropertyId,
    pub owner: PlayerId,
    pub name: String,
    pub position: usize,
    pub base_price: f64,
    pub market_value: f64,
    /// Intrinsic value; derived from base price and improvement level.
    pub real_value: f64,
    pub kind: AssetKind,
}

impl Asset {
    /// Builds the asset for an ownable square. Returns `None` for squares
    /// that cannot be owned.
    pub fn from_square(id: PropertyId, position: usize, square: &Square) -> Option<Asset> {
        let (base_price, kind) = match square.kind {
            SquareKind::Property {
                color,
                price,
                base_rent,
            } => (
                price,
                AssetKind::Street(StreetData {
                    color,
                    level: ImprovementLevel::Unimproved,
                    base_rent,
                    current_rent: base_rent,
                }),
            ),
            SquareKind::Railroad { price } => (price, AssetKind::Railroad),
            SquareKind::Utility { price } => (price, AssetKind::Utility),
            _ => return None,
        };
        Some(Asset {
            id,
            owner: PlayerId::BANK,
            name: square.name.to_string(),
            position,
            base_price,
            market_value: base_price,
            real_value: base_price,
            kind,
        })
    }

    pub fn tag(&self) -> AssetTag {
        match self.kind {
            AssetKind::Street(_) => AssetTag::Street,
            AssetKind::Railroad => AssetTag::Railroad,
            AssetKind::Utility => AssetTag::Utility,
        }
    }

    /// The street payload, if this asset is a street.
    pub fn street(&self) -> Option<&StreetData> {
        match &self.kind {
            AssetKind::Street(data) => Some(data),
            _ => None,
        }
    }

    /// Moves the street to `level` and re-derives real value and current
    /// rent from the base figures. The monopoly doubling is applied at
    /// payment time, not here.
    pub fn set_level(&mut self, level: ImprovementLevel) {
        if let AssetKind::Street(data) = &mut self.kind {
            data.level = level;
            data.current_rent = economy::street_rent(data.base_rent, level, false);
            self.real_value = economy::valuation(self.base_price, level);
        }
    }
}
