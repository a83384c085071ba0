use crate::types::TokenKind;
use align_types::TokenAmount;
use serde::{Deserialize, Serialize};

/// Minted/burned totals for one token kind.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct KindSupply {
    pub minted: TokenAmount,
    pub burned: TokenAmount,
}

impl KindSupply {
    pub fn circulating(&self) -> TokenAmount {
        self.minted.saturating_sub(self.burned)
    }
}

/// Running supply totals across the four token kinds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SupplyLedger {
    temp_align: KindSupply,
    align: KindSupply,
    temp_rep: KindSupply,
    rep: KindSupply,
}

impl SupplyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(&self, kind: TokenKind) -> KindSupply {
        match kind {
            TokenKind::TempAlign => self.temp_align,
            TokenKind::Align => self.align,
            TokenKind::TempRep => self.temp_rep,
            TokenKind::Rep => self.rep,
        }
    }

    pub(crate) fn record_mint(&mut self, kind: TokenKind, amount: TokenAmount) {
        let entry = self.entry(kind);
        entry.minted = entry.minted.saturating_add(amount);
    }

    pub(crate) fn record_burn(&mut self, kind: TokenKind, amount: TokenAmount) {
        let entry = self.entry(kind);
        entry.burned = entry.burned.saturating_add(amount);
    }

    fn entry(&mut self, kind: TokenKind) -> &mut KindSupply {
        match kind {
            TokenKind::TempAlign => &mut self.temp_align,
            TokenKind::Align => &mut self.align,
            TokenKind::TempRep => &mut self.temp_rep,
            TokenKind::Rep => &mut self.rep,
        }
    }
}
