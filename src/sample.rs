//! Demo payload and instruction used by the binary.

use serde::Serialize;

/// Instruction that pins the model to the numbers it is given.
pub const STRICT_SYSTEM_PROMPT: &str = r#"You are a financial reasoning engine.
Use ONLY the numeric values provided in the JSON input.
Do NOT invent or modify numbers.
Do NOT calculate new values.
Only interpret and explain the data.
MUST Return valid JSON matching: {"summary": "", "risk_analysis": "", "strategy": "", "confidence": ""}."#;

/// Pre-computed portfolio metrics, as produced by the backend.
/// Field order is the serialization order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioMetrics {
    pub portfolio_beta: f64,
    pub risk_score: f64,
    pub sector_exposure: SectorExposure,
    pub sentiment_score: f64,
    pub impact_score: u32,
    pub projected_drawdown: f64,
}

/// Percentage of holdings per sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorExposure {
    pub tech: u32,
    pub finance: u32,
}

pub fn sample_metrics() -> PortfolioMetrics {
    PortfolioMetrics {
        portfolio_beta: 1.18,
        risk_score: 1.5,
        sector_exposure: SectorExposure {
            tech: 44,
            finance: 12,
        },
        sentiment_score: -0.7,
        impact_score: 73,
        projected_drawdown: -2.4,
    }
}
