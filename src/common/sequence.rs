use crate::errors::ConfigError;
use crate::lagged_fib::LaggedFibonacci;
use rand::SeedableRng;
use std::fmt;
use std::ops::Deref;

pub const MAX_PORT: i64 = 65535;

/// Where the knock ports come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSource {
    /// Pseudorandom ports derived from a secret shared with the listener.
    Seeded { seed: i64, count: i64, offset: i64 },
    /// Caller supplied ports, knocked as given.
    Literal { ports: Vec<i64> },
}

/// Ordered, non-empty list of ports knocked by every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSequence(Vec<i64>);

impl PortSequence {
    pub fn new(ports: Vec<i64>) -> Result<Self, ConfigError> {
        if ports.is_empty() {
            return Err(ConfigError::EmptySequence);
        }
        Ok(PortSequence(ports))
    }
}

impl Deref for PortSequence {
    type Target = [i64];

    fn deref(&self) -> &[i64] {
        &self.0
    }
}

impl fmt::Display for PortSequence {
    // left-aligned, six columns per port
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for port in self.0.iter() {
            write!(f, "{:<6}", port)?;
        }
        Ok(())
    }
}

pub fn generate(source: &PortSource) -> Result<PortSequence, ConfigError> {
    let ports = match source {
        PortSource::Seeded {
            seed,
            count,
            offset,
        } => seeded(*seed, *count, *offset)?,
        PortSource::Literal { ports } => ports.clone(),
    };
    PortSequence::new(ports)
}

/// `count` ports, each `offset + int31n(65535 - offset)`. The generator is
/// built from `seed` for this call only, so a triple always yields the same
/// ports, and they are the ports a `math/rand` based listener derives from
/// the same seed.
///
/// Ports fall in `[offset, 65535)` except for offset 65535, where the span is
/// empty and every port is 65535 instead of a draw from an empty range.
pub fn seeded(seed: i64, count: i64, offset: i64) -> Result<Vec<i64>, ConfigError> {
    if count < 1 {
        return Err(ConfigError::EmptySequence);
    }
    if !(0..=MAX_PORT).contains(&offset) {
        return Err(ConfigError::OffsetOutOfRange(offset));
    }
    let mut rng = LaggedFibonacci::seed_from_u64(seed as u64);
    let span = (MAX_PORT - offset) as i32;
    let ports = (0..count)
        .map(|_| {
            if span == 0 {
                offset
            } else {
                offset + rng.int31n(span) as i64
            }
        })
        .collect();
    Ok(ports)
}

/// Parse a comma separated list of ports. Order and duplicates are kept and
/// the values are not range checked.
pub fn parse_literal(seq: &str) -> Result<Vec<i64>, ConfigError> {
    if seq.is_empty() {
        return Err(ConfigError::EmptySequence);
    }
    seq.split(',')
        .map(|token| {
            token.parse::<i64>().map_err(|e| ConfigError::InvalidPort {
                token: token.to_owned(),
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_is_deterministic() {
        let a = seeded(1337, 8, 30000).unwrap();
        let b = seeded(1337, 8, 30000).unwrap();
        assert_eq!(a, b);
        let source = PortSource::Seeded {
            seed: 1337,
            count: 8,
            offset: 30000,
        };
        assert_eq!(*generate(&source).unwrap(), a[..]);
    }

    #[test]
    fn seeded_matches_known_sequences() {
        assert_eq!(
            seeded(1, 4, 65435).unwrap(),
            vec![65516, 65522, 65482, 65494]
        );
        assert_eq!(seeded(0, 3, 30000).unwrap(), vec![64074, 63909, 42418]);
        assert_eq!(
            seeded(42, 5, 30000).unwrap(),
            vec![36800, 51407, 35423, 48585, 32743]
        );
        assert_eq!(
            seeded(-7, 4, 40000).unwrap(),
            vec![44989, 47463, 56445, 57411]
        );
        assert_eq!(
            seeded(1337, 6, 1024).unwrap(),
            vec![56043, 56901, 60878, 3627, 28604, 15076]
        );
        assert_eq!(seeded(i64::MAX, 3, 0).unwrap(), vec![53126, 4722, 41687]);
    }

    #[test]
    fn seed_zero_and_modulus_agree() {
        // both reduce to the same internal seed
        assert_eq!(
            seeded(2147483647, 2, 30000).unwrap(),
            seeded(0, 2, 30000).unwrap()
        );
    }

    #[test]
    fn different_seeds_give_different_sequences() {
        assert_ne!(seeded(1, 16, 0).unwrap(), seeded(2, 16, 0).unwrap());
        assert_ne!(seeded(-1, 16, 0).unwrap(), seeded(1, 16, 0).unwrap());
    }

    #[test]
    fn seeded_ports_stay_in_range() {
        for offset in [0, 1024, 30000, 65000, 65534] {
            let ports = seeded(42, 500, offset).unwrap();
            assert_eq!(ports.len(), 500);
            assert!(ports.iter().all(|p| (offset..MAX_PORT).contains(p)));
        }
    }

    #[test]
    fn offset_at_the_top_is_degenerate() {
        assert_eq!(seeded(7, 3, 65535).unwrap(), vec![65535, 65535, 65535]);
    }

    #[test]
    fn seeded_rejects_bad_parameters() {
        assert_eq!(seeded(0, 0, 30000), Err(ConfigError::EmptySequence));
        assert_eq!(seeded(0, -3, 30000), Err(ConfigError::EmptySequence));
        assert_eq!(seeded(0, 1, -1), Err(ConfigError::OffsetOutOfRange(-1)));
        assert_eq!(seeded(0, 1, 65536), Err(ConfigError::OffsetOutOfRange(65536)));
    }

    #[test]
    fn literal_keeps_order() {
        assert_eq!(
            parse_literal("40000,41000,42000").unwrap(),
            vec![40000, 41000, 42000]
        );
        assert_eq!(parse_literal("9,9,1").unwrap(), vec![9, 9, 1]);
        // no range check in literal mode
        assert_eq!(parse_literal("70000,-2").unwrap(), vec![70000, -2]);
    }

    #[test]
    fn literal_names_the_bad_token() {
        match parse_literal("40000,x,41000") {
            Err(ConfigError::InvalidPort { token, .. }) => assert_eq!(token, "x"),
            other => panic!("unexpected {:?}", other),
        }
        let err = parse_literal("1, 2").unwrap_err();
        assert!(err.to_string().starts_with("invalid port \" 2\""));
        assert!(matches!(
            parse_literal("1,,2"),
            Err(ConfigError::InvalidPort { token, .. }) if token.is_empty()
        ));
    }

    #[test]
    fn empty_sequences_are_rejected() {
        assert_eq!(parse_literal(""), Err(ConfigError::EmptySequence));
        assert_eq!(PortSequence::new(vec![]), Err(ConfigError::EmptySequence));
        let source = PortSource::Literal { ports: vec![] };
        assert_eq!(generate(&source), Err(ConfigError::EmptySequence));
    }

    #[test]
    fn display_pads_each_port() {
        let seq = PortSequence::new(vec![80, 40000, 7]).unwrap();
        assert_eq!(seq.to_string(), "80    40000 7     ");
    }
}
