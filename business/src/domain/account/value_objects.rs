use serde::{Deserialize, Serialize};

/// Retailers (and the email sentinel) the linking engine can connect to.
/// Discriminants are the native engine codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetailerId {
    Email = 0,
    Acme = 1,
    Albertsons = 2,
    Amazon = 3,
    AmazonCa = 4,
    AmazonUk = 5,
    BestBuy = 6,
    Costco = 7,
    Cvs = 8,
    DollarGeneral = 9,
    HomeDepot = 10,
    Instacart = 11,
    Kroger = 12,
    Publix = 13,
    SamsClub = 14,
    Safeway = 15,
    Target = 16,
    Walgreens = 17,
    Walmart = 18,
    WalmartCa = 19,
}

// Indexed by discriminant.
const RETAILERS: [(RetailerId, &str, i32); 20] = [
    (RetailerId::Email, "email", 0),
    (RetailerId::Acme, "acme", 1),
    (RetailerId::Albertsons, "albertsons", 2),
    (RetailerId::Amazon, "amazon", 3),
    (RetailerId::AmazonCa, "amazon_ca", 4),
    (RetailerId::AmazonUk, "amazon_uk", 5),
    (RetailerId::BestBuy, "best_buy", 6),
    (RetailerId::Costco, "costco", 7),
    (RetailerId::Cvs, "cvs", 8),
    (RetailerId::DollarGeneral, "dollar_general", 9),
    (RetailerId::HomeDepot, "home_depot", 10),
    (RetailerId::Instacart, "instacart", 11),
    (RetailerId::Kroger, "kroger", 12),
    (RetailerId::Publix, "publix", 13),
    (RetailerId::SamsClub, "sams_club", 14),
    (RetailerId::Safeway, "safeway", 15),
    (RetailerId::Target, "target", 16),
    (RetailerId::Walgreens, "walgreens", 17),
    (RetailerId::Walmart, "walmart", 18),
    (RetailerId::WalmartCa, "walmart_ca", 19),
];

impl RetailerId {
    /// Integer code used by the native linking engine.
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        RETAILERS
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(retailer, _, _)| *retailer)
    }

    pub fn as_str(self) -> &'static str {
        RETAILERS[self as usize].1
    }

    pub fn is_email(self) -> bool {
        self == RetailerId::Email
    }
}

impl std::fmt::Display for RetailerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RetailerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        RETAILERS
            .iter()
            .find(|(_, name, _)| *name == normalized)
            .map(|(retailer, _, _)| *retailer)
            .ok_or_else(|| format!("Invalid retailer: {}", s))
    }
}

/// Verification lifecycle of a linked account.
///
/// `Unverified -> Pending -> {Verified, InteractionRequired, Failed}` and
/// `InteractionRequired -> {Pending, Failed}`. `Verified` and `Failed` are settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    Unverified,
    Pending,
    InteractionRequired,
    Verified,
    Failed,
}

impl VerificationState {
    pub fn can_transition_to(self, next: VerificationState) -> bool {
        use VerificationState::*;
        matches!(
            (self, next),
            (Unverified, Pending)
                | (Pending, Verified)
                | (Pending, InteractionRequired)
                | (Pending, Failed)
                | (InteractionRequired, Pending)
                | (InteractionRequired, Failed)
        )
    }

    /// Moves to `next`, or returns the rejected pair when the edge does not exist.
    pub fn transition(
        self,
        next: VerificationState,
    ) -> Result<VerificationState, (VerificationState, VerificationState)> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err((self, next))
        }
    }

    pub fn is_settled(self) -> bool {
        matches!(self, VerificationState::Verified | VerificationState::Failed)
    }
}

impl std::fmt::Display for VerificationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationState::Unverified => write!(f, "unverified"),
            VerificationState::Pending => write!(f, "pending"),
            VerificationState::InteractionRequired => write!(f, "interaction_required"),
            VerificationState::Verified => write!(f, "verified"),
            VerificationState::Failed => write!(f, "failed"),
        }
    }
}
