//! Swap event declarations for the supported venues.
//!
//! Only the `Swap` event of each pool contract is needed: it carries the pool
//! price after the swap, which is all the normalizer consumes.

pub(crate) mod uniswap_v3 {
    use alloy::sol;
    sol! {
        #[derive(Debug)]
        event Swap(
            address indexed sender,
            address indexed recipient,
            int256 amount0,
            int256 amount1,
            uint160 sqrtPriceX96,
            uint128 liquidity,
            int24 tick
        );
    }
}

/// Algebra pools (QuickSwap V3) name the sqrt price `price`. The event
/// signature is identical to Uniswap V3's.
pub(crate) mod algebra {
    use alloy::sol;
    sol! {
        #[derive(Debug)]
        event Swap(
            address indexed sender,
            address indexed recipient,
            int256 amount0,
            int256 amount1,
            uint160 price,
            uint128 liquidity,
            int24 tick
        );
    }
}

pub(crate) mod pancake_v3 {
    use alloy::sol;
    sol! {
        #[derive(Debug)]
        event Swap(
            address indexed sender,
            address indexed recipient,
            int256 amount0,
            int256 amount1,
            uint160 sqrtPriceX96,
            uint128 liquidity,
            int24 tick,
            uint128 protocolFeesToken0,
            uint128 protocolFeesToken1
        );
    }
}
