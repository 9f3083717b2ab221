//! Effect folding: reducing an effect stream into position balances.

use crate::account::Positions;
use crate::effect::Effect;
use crate::error::Result;

/// Folds `effects` into a position map, starting from `seed` (or all zeroes).
///
/// Adds each effect's `amt` to the running balance for its ticker, in
/// sequence order. Pure accumulation: folding two batches in turn equals
/// folding their concatenation, so folds may be resumed incrementally.
pub fn fold<I>(effects: I, seed: Option<Positions>) -> Positions
where
    I: IntoIterator<Item = Effect>,
{
    let mut posns = seed.unwrap_or_default();
    for effect in effects {
        posns.add(&effect.ticker, effect.amt);
    }
    posns
}

/// Folds a fallible effect stream into `posns` in place.
///
/// Propagates the first error; effects consumed before it remain applied,
/// which is fine because the caller aborts the whole run on error.
pub fn fold_into<I>(posns: &mut Positions, effects: I) -> Result<()>
where
    I: IntoIterator<Item = Result<Effect>>,
{
    for effect in effects {
        let effect = effect?;
        posns.add(&effect.ticker, effect.amt);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Decimal4;
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal4 {
        Decimal4::from_str(s).unwrap()
    }

    fn eff(ticker: &str, amt: &str) -> Effect {
        Effect::new(ticker, dec(amt), 1, 1)
    }

    #[test]
    fn test_fold_without_seed_starts_from_zero() {
        let posns = fold(vec![eff("test", "50")], None);
        assert_eq!(posns.get("test"), dec("50"));
    }

    #[test]
    fn test_fold_extends_seed() {
        let posns = fold(vec![eff("test", "50")], None);
        let posns = fold(vec![eff("test", "50")], Some(posns));

        assert_eq!(posns.get("test"), dec("100"));
    }

    #[test]
    fn test_fold_is_incremental() {
        let batch_a = vec![eff("GOOG", "4"), eff("CASH", "-2560")];
        let batch_b = vec![eff("AAPL", "5"), eff("CASH", "10")];

        let two_step = fold(batch_b.clone(), Some(fold(batch_a.clone(), None)));
        let one_step = fold(batch_a.into_iter().chain(batch_b), None);

        assert_eq!(two_step, one_step);
    }

    #[test]
    fn test_fold_into_propagates_errors() {
        let mut posns = Positions::new();
        let stream: Vec<Result<Effect>> = vec![
            Ok(eff("GOOG", "4")),
            Err(EngineError::MissingField { field: "amt" }),
        ];

        assert!(fold_into(&mut posns, stream).is_err());
        // The effect before the error is still applied.
        assert_eq!(posns.get("GOOG"), dec("4"));
    }
}
