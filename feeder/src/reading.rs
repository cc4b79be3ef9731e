use rand::Rng;

/// Plausible operating range for a sensor type, plus the wider range outliers fall in.
struct Profile {
    normal: (f64, f64),
    outlier: (f64, f64),
    outlier_rate: f64,
    decimals: usize,
}

fn profile(kind: &str) -> Profile {
    match kind {
        "temperature" => Profile {
            normal: (24.0, 32.0),
            outlier: (10.0, 40.0),
            outlier_rate: 0.05,
            decimals: 1,
        },
        "ph" => Profile {
            normal: (6.5, 8.5),
            outlier: (4.0, 10.0),
            outlier_rate: 0.03,
            decimals: 2,
        },
        "dissolved_oxygen" => Profile {
            normal: (4.0, 9.0),
            outlier: (0.5, 12.0),
            outlier_rate: 0.05,
            decimals: 2,
        },
        "salinity" => Profile {
            normal: (10.0, 25.0),
            outlier: (0.0, 40.0),
            outlier_rate: 0.02,
            decimals: 1,
        },
        _ => Profile {
            normal: (0.0, 100.0),
            outlier: (0.0, 100.0),
            outlier_rate: 0.0,
            decimals: 2,
        },
    }
}

/// Simulated reading for `kind`, formatted as the text the service stores.
pub fn generate_reading(rng: &mut impl Rng, kind: &str) -> String {
    let p = profile(kind);
    let (low, high) = if rng.gen_bool(p.outlier_rate) {
        p.outlier
    } else {
        p.normal
    };

    format!("{:.*}", p.decimals, rng.gen_range(low..high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_known_types_within_outlier_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for kind in ["temperature", "ph", "dissolved_oxygen", "salinity"] {
            let (low, high) = profile(kind).outlier;
            for _ in 0..500 {
                let value: f64 = generate_reading(&mut rng, kind).parse().unwrap();
                assert!(value >= low && value <= high, "{} out of range: {}", kind, value);
            }
        }
    }

    #[test]
    fn test_unknown_type_uses_percent_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let value: f64 = generate_reading(&mut rng, "turbidity").parse().unwrap();
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_decimal_places() {
        let mut rng = StdRng::seed_from_u64(1);
        let value = generate_reading(&mut rng, "ph");
        assert_eq!(value.split('.').nth(1).map(str::len), Some(2));
    }
}
