//! Price normalization errors.

/// Errors that can occur while turning a raw venue price into output amounts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid price: adjusted price {adjusted} is not positive")]
    InvalidPrice { adjusted: String },

    #[error("Invalid fee: {fee_units} units with a scale of {fee_scale} leaves no input")]
    InvalidFee { fee_units: u32, fee_scale: u32 },
}
