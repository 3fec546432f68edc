/// Complementary error function, Chebyshev fit with fractional error below 1.2e-7.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 { ans } else { 2.0 - ans }
}

/// Standard normal cumulative distribution.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

pub fn d1(spot: f64, strike: f64, expiry: f64, rate: f64, volatility: f64) -> f64 {
    ((spot / strike).ln() + (rate + volatility * volatility / 2.0) * expiry)
        / (volatility * expiry.sqrt())
}

pub fn d2(spot: f64, strike: f64, expiry: f64, rate: f64, volatility: f64) -> f64 {
    d1(spot, strike, expiry, rate, volatility) - volatility * expiry.sqrt()
}

/// European call value. Degenerate inputs collapse to intrinsic value.
pub fn black_scholes_call(spot: f64, strike: f64, expiry: f64, rate: f64, volatility: f64) -> f64 {
    if spot <= 0.0 || strike <= 0.0 || expiry <= 0.0 || volatility <= 0.0 {
        return (spot - strike).max(0.0);
    }

    let d1 = d1(spot, strike, expiry, rate, volatility);
    let d2 = d1 - volatility * expiry.sqrt();
    spot * norm_cdf(d1) - strike * (-rate * expiry).exp() * norm_cdf(d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_cdf_reference_points() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((norm_cdf(1.0) - 0.841_344_746).abs() < 1e-6);
        assert!((norm_cdf(-1.96) - 0.024_997_895).abs() < 1e-6);
    }

    #[test]
    fn test_at_the_money_call() {
        // S = K = 100, T = 1, r = 0, sigma = 0.2
        let value = black_scholes_call(100.0, 100.0, 1.0, 0.0, 0.2);
        assert!((value - 7.965_567).abs() < 1e-4);
    }

    #[test]
    fn test_coconut_coupon_fair_value() {
        let value = black_scholes_call(10_000.0, 10_000.0, 245.0 / 365.0, 0.0, 0.193_785);
        assert!(value > 620.0 && value < 640.0, "unexpected fair value {value}");
    }

    #[test]
    fn test_degenerate_inputs_return_intrinsic() {
        assert_eq!(black_scholes_call(105.0, 100.0, 0.0, 0.0, 0.2), 5.0);
        assert_eq!(black_scholes_call(95.0, 100.0, 1.0, 0.0, 0.0), 0.0);
    }
}
